//! Reconciliation error types.

use std::fmt;

use alertsync_client::ClientError;
use alertsync_core::IdentifierError;

use crate::mapping::MappingError;

/// Errors that abort the reconciliation of one resource.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The stored identifier does not decode.
    #[error(transparent)]
    MalformedIdentifier(#[from] IdentifierError),

    /// The resource does not exist where an existing one is required.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource kind, e.g. `issue alert`.
        kind: &'static str,
        /// Composite identifier of the missing resource.
        id: String,
    },

    /// A transport failure, passed through unchanged.
    #[error("Transport error: {0}")]
    Transport(ClientError),

    /// The declaration or the response cannot be translated.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
}

impl ReconcileError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The underlying transport error, for callers deciding on a retry.
    #[must_use]
    pub fn transport_error(&self) -> Option<&ClientError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the error category for logging.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedIdentifier(_) => ErrorCategory::Identifier,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Mapping(_) => ErrorCategory::Mapping,
        }
    }
}

/// Categories of reconciliation errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Identifier,
    NotFound,
    Transport,
    Mapping,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::NotFound => write!(f, "not_found"),
            Self::Transport => write!(f, "transport"),
            Self::Mapping => write!(f, "mapping"),
        }
    }
}
