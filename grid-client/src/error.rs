//! Error types for the Grid client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Grid client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ClientError {
    /// Create an error from a non-success status code and response body
    ///
    /// The hub answers errors as `{"error": "..."}`; the message is pulled
    /// out of that envelope when present.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.to_string());

        match status {
            404 => Self::NotFound(message),
            400 => Self::InvalidRequest(message),
            _ => Self::ApiError { status, message },
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the call never reached the hub (connection refused, timeout, ...)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    /// Check if retrying the same call later could succeed
    ///
    /// Transport failures and 5xx answers are transient; a 4xx answer will
    /// not change on retry.
    pub fn is_transient(&self) -> bool {
        self.is_transport() || self.is_server_error()
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidRequest(_))
            || matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_extracts_message() {
        let err = ClientError::from_status(404, r#"{"error":"Job abc not found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Resource not found: Job abc not found");
    }

    #[test]
    fn test_from_status_plain_body() {
        let err = ClientError::from_status(409, "conflict");
        assert!(matches!(
            &err,
            ClientError::ApiError { status: 409, message } if message == "conflict"
        ));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_server_error() {
        let err = ClientError::from_status(500, "");
        assert!(err.is_server_error());
        assert!(!err.is_transport());
        assert!(err.is_transient());
        assert!(!ClientError::from_status(404, "").is_transient());
    }
}
