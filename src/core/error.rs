//! Error type system for the adminlite data-access layer
//!
//! One central error enum covers the whole taxonomy the gateways care
//! about: transport failures (which may trigger fallback), authentication
//! failures (which reset the session), domain failures (surfaced to the
//! caller), and not-found (a hard error for edits against unknown records).

use serde::Serialize;

/// Main error type for the adminlite system
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // Transport-level failures: the backend is unreachable, answered with a
    // non-2xx status, or returned a body that is not the expected envelope.
    // Reads and identity-safe writes may fall back on these.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    // Authentication failures
    #[error("No authentication token available")]
    Unauthenticated,

    #[error("Authorization rejected by backend (status {0})")]
    Unauthorized(u16),

    // Domain failures: the backend answered `success: false`
    #[error("{0}")]
    Domain(String),

    // Not-found is a hard error for update/delete, never masked by fallback
    #[error("Record not found: {0}")]
    NotFound(String),

    // Ambient-layer errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session already terminated")]
    SessionTerminated,
}

impl AdminError {
    /// Whether this error counts as a transport failure, i.e. the class of
    /// failure that permits serving from the fallback store.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AdminError::Network(_) | AdminError::Status(_) | AdminError::MalformedResponse(_)
        )
    }

    /// Whether the backend explicitly rejected our credentials.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, AdminError::Unauthorized(_))
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AdminError>;

/// Serializable error detail, used when an operation outcome is reported
/// to a caller that renders it (message plus a stable kind tag).
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

impl From<&AdminError> for ErrorDetail {
    fn from(err: &AdminError) -> Self {
        let kind = match err {
            AdminError::Network(_) | AdminError::Status(_) | AdminError::MalformedResponse(_) => {
                "transport"
            }
            AdminError::Unauthenticated | AdminError::Unauthorized(_) => "auth",
            AdminError::Domain(_) => "domain",
            AdminError::NotFound(_) => "not_found",
            AdminError::Config(_) => "config",
            AdminError::Io(_) | AdminError::Serialization(_) => "internal",
            AdminError::SessionTerminated => "session",
        };
        ErrorDetail {
            kind,
            message: err.to_string(),
        }
    }
}
