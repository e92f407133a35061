use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;

use crate::core::{Todo, TodoError, ValidTodo};
use crate::storage::TodoRepository;

#[derive(Default)]
struct Inner {
    // Monotonic so ids are never reused after a delete.
    next_id: i64,
    rows: Vec<Todo>,
}

/// Keeps rows in process memory. Mirrors the SQLite repository's
/// semantics closely enough for service-level tests and demos.
#[derive(Clone, Default)]
pub struct InMemoryTodoRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_keyword(todo: &Todo, keyword: &str) -> bool {
    todo.title.contains(keyword)
        || todo
            .description
            .as_deref()
            .is_some_and(|d| d.contains(keyword))
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn insert(&self, record: ValidTodo) -> Result<Todo, TodoError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let now = Utc::now().naive_utc();
        let todo = Todo {
            id: inner.next_id,
            title: record.title,
            description: record.description,
            completed: record.completed.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        inner.rows.push(todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().find(|t| t.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.clone())
    }

    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>, TodoError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Todo> = inner
            .rows
            .iter()
            .filter(|t| t.completed == completed)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_created_after(&self, cutoff: NaiveDateTime) -> Result<Vec<Todo>, TodoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|t| t.created_at > cutoff)
            .cloned()
            .collect())
    }

    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Todo>, TodoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|t| contains_keyword(t, keyword))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: ValidTodo) -> Result<Todo, TodoError> {
        let mut inner = self.inner.write().await;
        let todo = inner
            .rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TodoError::NotFound(id))?;
        todo.title = changes.title;
        todo.description = changes.description;
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now().naive_utc();
        Ok(todo.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|t| t.id != id);
        if inner.rows.len() == before {
            return Err(TodoError::NotFound(id));
        }
        Ok(())
    }

    async fn count_by_completed(&self, completed: bool) -> Result<i64, TodoError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().filter(|t| t.completed == completed).count() as i64)
    }
}
