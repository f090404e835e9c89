//! Client error types.
//!
//! The transport itself lives outside this workspace; implementations map
//! their failures onto [`ClientError`] so the reconciler can tell a missing
//! resource apart from everything else.

use std::fmt;

/// HTTP status the remote service uses for "does not exist".
pub const STATUS_NOT_FOUND: u16 = 404;

/// Errors returned by an alerts client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// The request never produced a response (connection, timeout, TLS).
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Creates a new `Api` error.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a 404 `Api` error.
    #[must_use]
    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::api(STATUS_NOT_FOUND, format!("{what} not found"))
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the HTTP status, if the API answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(STATUS_NOT_FOUND)
    }
}

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(ClientError::not_found("issue alert 1").is_not_found());
        assert!(ClientError::api(404, "gone").is_not_found());
        assert!(!ClientError::api(500, "boom").is_not_found());
        assert!(!ClientError::transport("reset").is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::not_found("metric alert 7");
        assert_eq!(err.to_string(), "API error 404: metric alert 7 not found");
        assert_eq!(ClientError::transport("timed out").to_string(), "Transport error: timed out");
    }
}
