//! Browser session abstraction for login-flow E2E tests
//!
//! A `Session` is one isolated browsing context: navigate, interact with
//! form elements, read HTML5 constraint-validation state, and capture or
//! restore the persisted storage snapshot that makes remember-me round
//! trips possible. A `SessionFactory` opens fresh sessions, optionally
//! restored from a previously captured `StorageState`.
//!
//! Two implementations ship with this crate:
//! - [`playwright::PlaywrightFactory`] drives a real browser through a
//!   persistent Node sidecar speaking line-delimited JSON.
//! - [`fake::FakeApp`] is a deterministic in-process double of the target
//!   application, used by the checked-in test suite.
//!
//! Errors propagate unmodified: no retry, no recovery, no translation
//! beyond classifying driver messages into the error taxonomy.

pub mod error;
pub mod fake;
pub mod playwright;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{Session, SessionFactory, StorageState, ValidityState};
