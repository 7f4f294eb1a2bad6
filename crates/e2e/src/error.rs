//! Error types for the scenario suite

use authflow_session::SessionError;
use thiserror::Error;

/// Result type alias using [`E2eError`]
pub type E2eResult<T> = Result<T, E2eError>;

/// Suite-level error taxonomy
///
/// Session errors pass through unmodified; a scenario fails on any of
/// these with no retry and no partial success.
#[derive(Error, Debug)]
pub enum E2eError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Target unreachable: {url} after {attempts} attempts")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
