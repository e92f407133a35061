use tracing::info;

use crate::core::{Todo, TodoError, TodoInput, TodoResponse, ValidTodo, validate};
use crate::storage::TodoRepository;

/// Business rules on top of the repository: validation, not-found
/// semantics, and entity to response mapping. Takes its store handle
/// explicitly; there is no ambient global state.
pub struct TodoService<R: TodoRepository> {
    repository: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn list_all(&self) -> Result<Vec<TodoResponse>, TodoError> {
        let todos = self.repository.find_all().await?;
        Ok(to_responses(todos))
    }

    /// Newest first.
    pub async fn list_by_completed(&self, completed: bool) -> Result<Vec<TodoResponse>, TodoError> {
        let todos = self.repository.find_by_completed(completed).await?;
        Ok(to_responses(todos))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<TodoResponse, TodoError> {
        let todo = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        Ok(todo.into())
    }

    pub async fn create(&self, input: TodoInput) -> Result<TodoResponse, TodoError> {
        let record = validate(input)?;
        let todo = self.repository.insert(record).await?;
        info!(id = todo.id, "created todo");
        Ok(todo.into())
    }

    /// Overwrites title and description unconditionally; `completed`
    /// only when the caller supplied it.
    pub async fn update(&self, id: i64, input: TodoInput) -> Result<TodoResponse, TodoError> {
        let changes = validate(input)?;
        let todo = self.repository.update(id, changes).await?;
        info!(id, "updated todo");
        Ok(todo.into())
    }

    pub async fn toggle_completed(&self, id: i64) -> Result<TodoResponse, TodoError> {
        let todo = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        let changes = ValidTodo {
            title: todo.title,
            description: todo.description,
            completed: Some(!todo.completed),
        };
        let toggled = self.repository.update(id, changes).await?;
        info!(id, completed = toggled.completed, "toggled todo");
        Ok(toggled.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), TodoError> {
        self.repository.delete_by_id(id).await?;
        info!(id, "deleted todo");
        Ok(())
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<TodoResponse>, TodoError> {
        // An empty keyword would match every row under substring
        // semantics; return nothing instead.
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let todos = self.repository.search_by_keyword(keyword).await?;
        Ok(to_responses(todos))
    }

    pub async fn count_by_completed(&self, completed: bool) -> Result<i64, TodoError> {
        self.repository.count_by_completed(completed).await
    }
}

fn to_responses(todos: Vec<Todo>) -> Vec<TodoResponse> {
    todos.into_iter().map(TodoResponse::from).collect()
}
