// Error handling module
// Every failure surfaced by the gateway is normalized into ApiError so call
// sites see one shape: message, optional machine-readable code, optional
// HTTP status

use thiserror::Error;

/// Machine-readable error codes attached to terminal auth failures
pub mod codes {
    /// Refresh was attempted and failed; the user must log in again
    pub const REFRESH_FAILED: &str = "REFRESH_FAILED";

    /// The refresh endpoint itself rejected the call; no retry is possible
    pub const AUTH_REQUIRED: &str = "AUTH_REQUIRED";
}

/// Errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Terminal authentication failure: refresh is impossible or already failed
    #[error("{message}")]
    AuthRequired {
        message: String,
        code: &'static str,
    },

    /// Error response from the backend, normalized from the response envelope
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// Transport-level failure (connect, timeout, TLS, ...)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected envelope shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Internal client error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status associated with this error, when one exists
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthRequired { .. } => Some(401),
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::Internal(_) => None,
        }
    }

    /// Machine-readable error code, when one exists
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::AuthRequired { code, .. } => Some(code),
            ApiError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_required_shape() {
        let err = ApiError::AuthRequired {
            message: "Token refresh failed. Please login again.".to_string(),
            code: codes::REFRESH_FAILED,
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.code(), Some("REFRESH_FAILED"));
        assert_eq!(err.to_string(), "Token refresh failed. Please login again.");
    }

    #[test]
    fn test_api_error_shape() {
        let err = ApiError::Api {
            status: 403,
            message: "Insufficient permissions".to_string(),
            code: None,
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "Insufficient permissions");
    }

    #[test]
    fn test_decode_error_has_no_status() {
        let err = ApiError::Decode("missing field `status`".to_string());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("Invalid response"));
    }

    #[test]
    fn test_internal_error_message() {
        let err = ApiError::Internal(anyhow::anyhow!("request body is not cloneable"));
        assert_eq!(err.to_string(), "Internal error: request body is not cloneable");
        assert_eq!(err.status(), None);
    }
}
