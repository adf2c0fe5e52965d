use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskboardError {
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskboardError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Io(_))
    }
}

impl From<serde_json::Error> for TaskboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = TaskboardError::validation("title", "Title is required");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Validation error on `title`: Title is required"
        );
    }

    #[test]
    fn test_classifiers_are_exclusive() {
        let err = TaskboardError::Conflict("cannot delete column with existing tickets".into());
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert!(!err.is_unauthorized());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_io_counts_as_store_failure() {
        let err: TaskboardError = std::io::Error::other("disk gone").into();
        assert!(err.is_store());
    }
}
