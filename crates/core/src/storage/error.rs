use thiserror::Error;

/// Errors that can occur during item store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store throttled: {0}")]
    Throttled(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for item store operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Item",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Item not found: abc-123");
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "Item",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Item already exists: abc-123");
    }

    #[test]
    fn test_repository_error_unavailable_display() {
        let error = RepositoryError::Unavailable("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Store unavailable: timeout after 30s");
    }

    #[test]
    fn test_repository_error_throttled_display() {
        let error = RepositoryError::Throttled("Throughput exceeded".to_string());
        assert_eq!(error.to_string(), "Store throttled: Throughput exceeded");
    }

    #[test]
    fn test_repository_error_serialization_display() {
        let error = RepositoryError::Serialization("unsupported number".to_string());
        assert_eq!(error.to_string(), "Serialization error: unsupported number");
    }
}
