//! Error types for the registry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Student with DNI {0} already exists")]
    Conflict(i64),

    #[error("{0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl RegistryError {
    /// HTTP status reported to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RegistryError::Conflict(1).status(), StatusCode::CONFLICT);
        assert_eq!(
            RegistryError::NotFound("DNI 1 not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RegistryError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_message_is_verbatim() {
        let err = RegistryError::NotFound("DNI 42 not found".into());
        assert_eq!(err.to_string(), "DNI 42 not found");
    }
}
