//! Error taxonomy for the assessment core.
//!
//! Defined in `proctor-core` so the session layer can classify backend
//! failures for resume/retry decisions without string matching.

use thiserror::Error;

use crate::session::SessionState;

/// Errors returned when talking to the learning backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed or the token lacks access.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend returned a non-2xx response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The backend was unreachable.
    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Returns `true` if retrying the same request may succeed.
    ///
    /// The session controller resumes an in-progress exam after a
    /// transient submission failure instead of discarding answers.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => true,
            ApiError::Api { status, .. } => *status >= 500,
            ApiError::Unauthorized(_) | ApiError::NotFound(_) => false,
        }
    }
}

/// Errors produced by the assessment core itself.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A payload or identifier failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Assignment resolution re-entered too many times without settling.
    #[error("assignment resolution attempted {attempts} times without settling; giving up")]
    RedirectLoop { attempts: u32 },

    /// An operation was requested in a session state that forbids it.
    #[error("invalid operation '{action}' in session state {state:?}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },

    /// The local draft store could not be written.
    #[error("draft store error: {0}")]
    Store(String),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ApiError::Network("connection refused".into()).is_transient());
        assert!(ApiError::Timeout(30).is_transient());
        assert!(ApiError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(!ApiError::Api {
            status: 422,
            message: "bad payload".into()
        }
        .is_transient());
        assert!(!ApiError::Unauthorized("expired token".into()).is_transient());
        assert!(!ApiError::NotFound("assessment".into()).is_transient());
    }
}
