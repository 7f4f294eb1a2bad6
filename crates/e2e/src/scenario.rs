//! Declarative scenario data model
//!
//! A scenario is a pure data triple: the inputs it submits, the actions
//! it performs through the page model, and the single expected outcome.
//! Scenarios serialize to YAML, so an environment can add cases beside
//! the built-in catalog without recompiling.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::fixtures::Credential;
use crate::page::Route;

/// One complete test case: actions plus expected observable outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Actions to perform in order
    pub actions: Vec<Action>,

    /// The expected outcome
    pub expect: Expectation,
}

/// A page-model operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Open the login route.
    Navigate,

    /// Fill the form verbatim and activate submit.
    Submit {
        email: String,
        password: String,
        #[serde(default)]
        remember_me: bool,
    },

    /// Click the forgot-password affordance. The runner asserts the
    /// affordance is visible before activating it.
    ClickForgotPassword,
}

impl From<Credential> for Action {
    fn from(credential: Credential) -> Self {
        Action::Submit {
            email: credential.email,
            password: credential.password,
            remember_me: credential.remember_me,
        }
    }
}

/// The expected observable outcome. Exactly one category applies per
/// scenario; the enum enforces that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Expectation {
    /// Navigation success: the session ends up at the given route.
    Redirect { route: Route },

    /// The inline error indicator becomes visible and the URL stays on
    /// the login route.
    InlineError,

    /// Native constraint validation on one or more fields.
    FieldValidation {
        checks: Vec<FieldCheck>,
        /// When set, the URL must remain the login route and the email
        /// field's `checkValidity()` must report false.
        #[serde(default)]
        submission_blocked: bool,
    },

    /// Remember-me round trip: the landing route is reached, the storage
    /// state restores authenticated access in a fresh session, and an
    /// explicit logout then redirects that session to the login route.
    PersistenceRoundTrip,
}

/// A single per-field validation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub field: FormField,
    #[serde(flatten)]
    pub kind: ValidationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationKind {
    /// `validity.valueMissing` is set.
    ValueMissing,
    /// `validity.typeMismatch` is set.
    TypeMismatch,
    /// Policy-level check: the entered value is shorter than `min_len`.
    /// Not a hard block unless the form enforces a minlength.
    TooShort { min_len: usize },
}

impl Scenario {
    /// Parse a scenario from a YAML string.
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a scenario from a YAML file.
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all scenarios from a directory tree.
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }

        Ok(scenarios)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
