//! The `Session` and `SessionFactory` traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Serialized cookies/local-storage snapshot enabling session resumption.
///
/// Opaque to callers: captured from one session and handed back to a
/// factory unmodified. Nothing in this crate inspects its contents beyond
/// the implementation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageState(pub serde_json::Value);

/// HTML5 constraint-validation flags read from a form input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityState {
    /// `validity.valueMissing`: a required field was left empty.
    pub value_missing: bool,
    /// `validity.typeMismatch`: the value does not match the input type.
    pub type_mismatch: bool,
    /// `validity.tooShort`: the value is shorter than the field minlength.
    pub too_short: bool,
    /// The element's `checkValidity()` result.
    pub valid: bool,
}

/// One isolated browsing context.
///
/// Every operation either completes or fails within the implementation's
/// configured action timeout; nothing blocks indefinitely. The session's
/// lifecycle is owned by whoever opened it, and a closed session rejects
/// further operations.
#[async_trait]
pub trait Session: Send {
    /// Direct the context to a URL. Navigation failures (timeout, DNS,
    /// unknown route) surface as [`SessionError::Navigation`].
    ///
    /// [`SessionError::Navigation`]: crate::error::SessionError::Navigation
    async fn goto(&mut self, url: &str) -> SessionResult<()>;

    /// Fill an input with a value, taken verbatim.
    async fn fill(&mut self, selector: &str, value: &str) -> SessionResult<()>;

    /// Check a checkbox.
    async fn check(&mut self, selector: &str) -> SessionResult<()>;

    /// Click an element.
    async fn click(&mut self, selector: &str) -> SessionResult<()>;

    /// Whether an element is currently visible. A missing element is
    /// reported as not visible, not as an error.
    async fn is_visible(&mut self, selector: &str) -> SessionResult<bool>;

    /// Wait until an element is visible, or time out.
    async fn wait_visible(&mut self, selector: &str) -> SessionResult<()>;

    /// Wait until the context's URL equals the given URL, or time out.
    async fn wait_for_url(&mut self, url: &str) -> SessionResult<()>;

    /// The context's current URL.
    async fn current_url(&mut self) -> SessionResult<String>;

    /// The current value of an input element.
    async fn input_value(&mut self, selector: &str) -> SessionResult<String>;

    /// The constraint-validation state of an input element.
    async fn validity(&mut self, selector: &str) -> SessionResult<ValidityState>;

    /// Submit a form element directly, bypassing its submit control.
    async fn submit_form(&mut self, selector: &str) -> SessionResult<()>;

    /// Capture the persisted storage snapshot for this context.
    async fn storage_state(&mut self) -> SessionResult<StorageState>;

    /// Tear the context down.
    async fn close(&mut self) -> SessionResult<()>;
}

/// Opens fresh, mutually isolated sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a new session, optionally restored from a captured storage
    /// snapshot. The snapshot is passed through unmodified.
    async fn open(&self, storage: Option<&StorageState>) -> SessionResult<Box<dyn Session>>;
}
