use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::core::{TodoError, TodoInput, TodoResponse};
use crate::service::TodoService;
use crate::storage::sqlite::SqliteTodoRepository;

#[derive(Clone)]
pub struct AppState {
    pub todo_service: Arc<TodoService<SqliteTodoRepository>>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

pub async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TodoResponse>>, TodoError> {
    let todos = match params.completed {
        Some(completed) => state.todo_service.list_by_completed(completed).await?,
        None => state.todo_service.list_all().await?,
    };
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, TodoError> {
    Ok(Json(state.todo_service.get_by_id(id).await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Json(body): Json<TodoInput>,
) -> Result<(StatusCode, Json<TodoResponse>), TodoError> {
    let todo = state.todo_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TodoInput>,
) -> Result<Json<TodoResponse>, TodoError> {
    Ok(Json(state.todo_service.update(id, body).await?))
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, TodoError> {
    Ok(Json(state.todo_service.toggle_completed(id).await?))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, TodoError> {
    state.todo_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_todos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TodoResponse>>, TodoError> {
    let keyword = params.keyword.unwrap_or_default();
    Ok(Json(state.todo_service.search(&keyword).await?))
}

async fn health_route() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/search", get(search_todos))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todos/{id}/toggle", patch(toggle_todo))
}

pub fn router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        });

    Router::new()
        .route("/health", get(health_route))
        .nest("/api", api_routes())
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new(
        todo_service: TodoService<SqliteTodoRepository>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let state = AppState {
            todo_service: Arc::new(todo_service),
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to listen on port {}", config.port))?;
        Ok(Self {
            router: router(state),
            listener,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}
