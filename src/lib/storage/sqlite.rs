use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::core::{Todo, TodoError, ValidTodo};
use crate::storage::TodoRepository;

/// SQLite compares LIKE patterns case-insensitively unless told
/// otherwise; keyword search must stay case-sensitive.
pub fn connect_options(url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .pragma("case_sensitive_like", "ON");
    Ok(options)
}

/// Opens the database at `url`, creating file and schema when missing,
/// and returns the pool shared by all repositories.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options(url)?)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            completed BOOLEAN NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// `%`, `_` and the escape character itself must match literally when
/// they appear inside a keyword.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn insert(&self, record: ValidTodo) -> Result<Todo, TodoError> {
        let now = Utc::now().naive_utc();
        let completed = record.completed.unwrap_or(false);
        let result = sqlx::query(
            "INSERT INTO todos (title, description, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(&record.description)
        .bind(completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(Todo {
            id: result.last_insert_rowid(),
            title: record.title,
            description: record.description,
            completed,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let todo = sqlx::query_as("SELECT * FROM todos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        let todos = sqlx::query_as("SELECT * FROM todos")
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>, TodoError> {
        let todos =
            sqlx::query_as("SELECT * FROM todos WHERE completed = ? ORDER BY created_at DESC")
                .bind(completed)
                .fetch_all(&self.pool)
                .await?;
        Ok(todos)
    }

    async fn find_created_after(&self, cutoff: NaiveDateTime) -> Result<Vec<Todo>, TodoError> {
        let todos = sqlx::query_as("SELECT * FROM todos WHERE created_at > ?")
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Todo>, TodoError> {
        let pattern = format!("%{}%", escape_like(keyword));
        let todos = sqlx::query_as(
            "SELECT * FROM todos
             WHERE title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\'",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn update(&self, id: i64, changes: ValidTodo) -> Result<Todo, TodoError> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            "UPDATE todos
             SET title = ?, description = ?, completed = COALESCE(?, completed), updated_at = ?
             WHERE id = ?",
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.completed)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id));
        }
        self.find_by_id(id).await?.ok_or(TodoError::NotFound(id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }

    async fn count_by_completed(&self, completed: bool) -> Result<i64, TodoError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE completed = ?")
            .bind(completed)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
