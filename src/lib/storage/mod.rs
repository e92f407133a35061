pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::core::{Todo, TodoError, ValidTodo};

/// Persistence seam between the service and the entity store. Every
/// mutating call maps to a single-row statement; the store's implicit
/// per-statement transaction is the only concurrency control, so
/// concurrent updates to the same id are last-writer-wins.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn insert(&self, record: ValidTodo) -> Result<Todo, TodoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, TodoError>;
    async fn find_all(&self) -> Result<Vec<Todo>, TodoError>;
    /// Ordered by creation time, newest first.
    async fn find_by_completed(&self, completed: bool) -> Result<Vec<Todo>, TodoError>;
    async fn find_created_after(&self, cutoff: NaiveDateTime) -> Result<Vec<Todo>, TodoError>;
    /// Case-sensitive substring match over title or description.
    async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<Todo>, TodoError>;
    /// Overwrites title and description, overwrites `completed` only
    /// when supplied, and refreshes `updated_at`.
    async fn update(&self, id: i64, changes: ValidTodo) -> Result<Todo, TodoError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), TodoError>;
    async fn count_by_completed(&self, completed: bool) -> Result<i64, TodoError>;
}
