//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! The gateway does not expose store failure kinds to callers: anything other
//! than a missing item is reported as an internal error.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - every other variant -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use itemgate_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Item",
///     id: "abc-123".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. }
        | RepositoryError::Unavailable(_)
        | RepositoryError::Throttled(_)
        | RepositoryError::QueryFailed(_)
        | RepositoryError::Serialization(_)
        | RepositoryError::InvalidData(_) => 500,
    }
}
