//! Error types for session implementations

use thiserror::Error;

/// Result type alias using [`SessionError`]
pub type SessionResult<T> = Result<T, SessionError>;

/// Session error taxonomy
///
/// `Navigation`, `ElementNotFound` and `InteractionTimeout` mirror what the
/// browser reports; the remaining variants belong to the driver sidecar
/// plumbing. Callers see these unmodified.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Navigation failed: {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out interacting with: {0}")]
    InteractionTimeout(String),

    #[error("Playwright not found. Install with: npx playwright install")]
    DriverNotFound,

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Driver protocol error: {0}")]
    Protocol(String),

    #[error("Session is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
