//! API error taxonomy
//!
//! Every remote operation settles with either its payload or an `ApiError`.
//! None of these are fatal: they are scoped to the single request that
//! produced them and leave the rest of the screen usable.

use thiserror::Error;

/// Error returned by a template service call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection refused, timeout, server temporarily unavailable
    #[error("network error: {0}")]
    TransientNetwork(String),
    /// The target resource does not exist (e.g. deleted concurrently)
    #[error("not found: {0}")]
    NotFound(String),
    /// Caller is not authenticated or not authorized
    #[error("permission denied: {0}")]
    Permission(String),
    /// The submitted manifest or request was rejected
    #[error("invalid request: {0}")]
    Validation(String),
    /// The server answered with something we could not interpret
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Map a Connect protocol error code (e.g. `not_found`) to an error
    pub fn from_connect_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "not_found" => ApiError::NotFound(message),
            "permission_denied" | "unauthenticated" => ApiError::Permission(message),
            "invalid_argument" | "already_exists" | "failed_precondition" | "out_of_range" => {
                ApiError::Validation(message)
            }
            "unavailable" | "deadline_exceeded" | "resource_exhausted" | "aborted" => {
                ApiError::TransientNetwork(message)
            }
            _ => ApiError::Unexpected(format!("{}: {}", code, message)),
        }
    }

    /// Map a bare HTTP status when the body carries no Connect error
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => ApiError::NotFound(message),
            401 | 403 => ApiError::Permission(message),
            400 | 409 | 422 => ApiError::Validation(message),
            408 | 429 | 500..=599 => ApiError::TransientNetwork(message),
            _ => ApiError::Unexpected(format!("HTTP {}: {}", status, message)),
        }
    }

    /// Short label used in notifications
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::TransientNetwork(_) => "network",
            ApiError::NotFound(_) => "not found",
            ApiError::Permission(_) => "permission",
            ApiError::Validation(_) => "validation",
            ApiError::Unexpected(_) => "unexpected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_codes_map_to_taxonomy() {
        assert_eq!(
            ApiError::from_connect_code("not_found", "gone"),
            ApiError::NotFound("gone".to_string())
        );
        assert!(matches!(
            ApiError::from_connect_code("unauthenticated", "no token"),
            ApiError::Permission(_)
        ));
        assert!(matches!(
            ApiError::from_connect_code("already_exists", "dup"),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_connect_code("unavailable", "down"),
            ApiError::TransientNetwork(_)
        ));
        assert!(matches!(
            ApiError::from_connect_code("internal", "boom"),
            ApiError::Unexpected(_)
        ));
    }

    #[test]
    fn test_http_status_fallback() {
        assert!(matches!(ApiError::from_http_status(404, ""), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_http_status(403, ""), ApiError::Permission(_)));
        assert!(matches!(ApiError::from_http_status(503, ""), ApiError::TransientNetwork(_)));
        assert!(matches!(ApiError::from_http_status(418, ""), ApiError::Unexpected(_)));
    }

    #[test]
    fn test_display_includes_message() {
        let err = ApiError::NotFound("tmpl-a".to_string());
        assert_eq!(err.to_string(), "not found: tmpl-a");
        assert_eq!(err.kind(), "not found");
    }
}
