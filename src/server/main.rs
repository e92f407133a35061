use todo_app::adapters::http::HttpServer;
use todo_app::config::ServerConfig;
use todo_app::service::TodoService;
use todo_app::storage::sqlite::{self, SqliteTodoRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = ServerConfig::from_env();
    let pool = sqlite::connect(&config.database_url).await?;
    let todo_service = TodoService::new(SqliteTodoRepository::new(pool));

    let server = HttpServer::new(todo_service, &config).await?;
    server.run().await
}
