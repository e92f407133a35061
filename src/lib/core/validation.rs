use crate::core::error::TodoError;
use crate::core::todo::TodoInput;

pub const TITLE_MAX_CHARS: usize = 255;

/// A request body that passed field validation. `completed` stays
/// optional: absent means "false" on insert and "leave unchanged" on
/// update.
#[derive(Debug, Clone)]
pub struct ValidTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

pub fn validate(input: TodoInput) -> Result<ValidTodo, TodoError> {
    let title = input.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(TodoError::invalid("title", "title must not be blank"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(TodoError::invalid(
            "title",
            format!("title must not exceed {TITLE_MAX_CHARS} characters"),
        ));
    }
    Ok(ValidTodo {
        title,
        description: input.description,
        completed: input.completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: Option<&str>) -> TodoInput {
        TodoInput {
            title: title.map(str::to_string),
            ..TodoInput::default()
        }
    }

    #[test]
    fn rejects_missing_title() {
        assert!(matches!(
            validate(input(None)),
            Err(TodoError::InvalidInput { field: "title", .. })
        ));
    }

    #[test]
    fn rejects_empty_title() {
        assert!(validate(input(Some(""))).is_err());
    }

    #[test]
    fn rejects_whitespace_only_title() {
        assert!(validate(input(Some("   \t "))).is_err());
    }

    #[test]
    fn rejects_title_over_255_chars() {
        let long = "x".repeat(256);
        assert!(validate(input(Some(&long))).is_err());
    }

    #[test]
    fn accepts_title_of_exactly_255_chars() {
        let max = "x".repeat(255);
        let valid = validate(input(Some(&max))).unwrap();
        assert_eq!(valid.title.len(), 255);
    }

    #[test]
    fn keeps_completed_unset_when_absent() {
        let valid = validate(input(Some("do it"))).unwrap();
        assert!(valid.completed.is_none());
        assert!(valid.description.is_none());
    }

    #[test]
    fn passes_supplied_fields_through() {
        let valid = validate(TodoInput {
            title: Some("do it".into()),
            description: Some("soon".into()),
            completed: Some(true),
        })
        .unwrap();
        assert_eq!(valid.description.as_deref(), Some("soon"));
        assert_eq!(valid.completed, Some(true));
    }
}
