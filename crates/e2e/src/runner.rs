//! Scenario execution
//!
//! Runs scenarios against a `SessionFactory`. Every scenario gets its own
//! fresh session, so scenarios share no mutable state and may run in any
//! order; isolation comes from the session, not from this code. A
//! scenario fails on the first session error or unmet expectation; there
//! is no retry and no partial success.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use authflow_session::{Session, SessionError, SessionFactory};

use crate::error::{E2eError, E2eResult};
use crate::page::{
    LoginPage, Route, Routes, EMAIL_INPUT, ERROR_INDICATOR, FORGOT_PASSWORD_LINK, LOGOUT_FORM,
    PASSWORD_INPUT,
};
use crate::scenario::{Action, Expectation, FieldCheck, FormField, Scenario, ValidationKind};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Route table of the target deployment
    pub routes: Routes,

    /// Directory for the results JSON
    pub output_dir: PathBuf,

    /// How long the preflight keeps polling the login route
    pub preflight_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            routes: Routes::default(),
            output_dir: PathBuf::from("test-results"),
            preflight_timeout: Duration::from_secs(30),
        }
    }
}

/// Executes scenarios through the page model against a session factory.
pub struct ScenarioRunner<F> {
    factory: F,
    config: RunnerConfig,
}

impl<F: SessionFactory> ScenarioRunner<F> {
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, RunnerConfig::default())
    }

    pub fn with_config(factory: F, config: RunnerConfig) -> Self {
        Self { factory, config }
    }

    pub fn routes(&self) -> &Routes {
        &self.config.routes
    }

    /// Poll the login route until it answers, so a dead target fails fast
    /// instead of timing out scenario by scenario.
    pub async fn preflight(&self) -> E2eResult<()> {
        let url = self.config.routes.url(Route::Login);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < self.config.preflight_timeout {
            attempts += 1;

            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => warn!("preflight returned {}", resp.status()),
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for target at {}...", url);
                    }
                    if !e.is_connect() && !e.is_timeout() {
                        warn!("preflight error: {}", e);
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        Err(E2eError::TargetUnreachable { url, attempts })
    }

    /// Run a list of scenarios, capturing per-scenario failures.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let scenario_start = Instant::now();
            let outcome = self.run(scenario).await;
            let duration_ms = scenario_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    passed += 1;
                    info!("✓ {} ({} ms)", scenario.name, duration_ms);
                    results.push(ScenarioResult {
                        name: scenario.name.clone(),
                        success: true,
                        duration_ms,
                        error: None,
                    });
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", scenario.name, e);
                    results.push(ScenarioResult {
                        name: scenario.name.clone(),
                        success: false,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run a single scenario in a fresh session.
    pub async fn run(&self, scenario: &Scenario) -> E2eResult<()> {
        debug!("running scenario: {}", scenario.name);

        let mut session = self.factory.open(None).await?;
        let outcome = self.drive(&mut session, scenario).await;
        let _ = session.close().await;
        outcome
    }

    async fn drive(
        &self,
        session: &mut Box<dyn Session>,
        scenario: &Scenario,
    ) -> E2eResult<()> {
        let routes = &self.config.routes;

        for action in &scenario.actions {
            match action {
                Action::Navigate => {
                    LoginPage::new(session.as_mut(), routes).navigate().await?;
                }
                Action::Submit {
                    email,
                    password,
                    remember_me,
                } => {
                    LoginPage::new(session.as_mut(), routes)
                        .submit_credentials(email, password, *remember_me)
                        .await?;
                }
                Action::ClickForgotPassword => {
                    // The affordance must be visible before it is used.
                    if !session.is_visible(FORGOT_PASSWORD_LINK).await? {
                        return Err(E2eError::Assertion(
                            "forgot-password affordance is not visible".to_string(),
                        ));
                    }
                    LoginPage::new(session.as_mut(), routes)
                        .forgot_password()
                        .await?;
                }
            }
        }

        self.check(session, &scenario.expect).await
    }

    async fn check(
        &self,
        session: &mut Box<dyn Session>,
        expect: &Expectation,
    ) -> E2eResult<()> {
        let routes = &self.config.routes;
        let login_url = routes.url(Route::Login);

        match expect {
            Expectation::Redirect { route } => {
                let url = routes.url(*route);
                session.wait_for_url(&url).await.map_err(|e| match e {
                    SessionError::InteractionTimeout(_) => {
                        E2eError::Assertion(format!("expected redirect to {url}"))
                    }
                    other => other.into(),
                })
            }

            Expectation::InlineError => {
                session
                    .wait_visible(ERROR_INDICATOR)
                    .await
                    .map_err(|e| match e {
                        SessionError::InteractionTimeout(_) => E2eError::Assertion(
                            "inline error indicator never became visible".to_string(),
                        ),
                        other => other.into(),
                    })?;

                let current = session.current_url().await?;
                if current != login_url {
                    return Err(E2eError::Assertion(format!(
                        "expected no redirect, but URL is {current}"
                    )));
                }
                Ok(())
            }

            Expectation::FieldValidation {
                checks,
                submission_blocked,
            } => {
                for check in checks {
                    self.check_field(session, check).await?;
                }

                if *submission_blocked {
                    let current = session.current_url().await?;
                    if current != login_url {
                        return Err(E2eError::Assertion(format!(
                            "submission should have been blocked, but URL is {current}"
                        )));
                    }
                    let validity = session.validity(EMAIL_INPUT).await?;
                    if validity.valid {
                        return Err(E2eError::Assertion(
                            "form reported valid despite a blocked submission".to_string(),
                        ));
                    }
                }
                Ok(())
            }

            Expectation::PersistenceRoundTrip => {
                let landing_url = routes.url(Route::Landing);
                session.wait_for_url(&landing_url).await?;

                let storage = session.storage_state().await?;
                session.close().await?;

                // Simulated browser restart: a fresh session built from the
                // persisted storage state alone.
                let mut restored = self.factory.open(Some(&storage)).await?;
                let outcome = self
                    .check_restored(&mut restored, &landing_url, &login_url)
                    .await;
                let _ = restored.close().await;
                outcome
            }
        }
    }

    async fn check_restored(
        &self,
        session: &mut Box<dyn Session>,
        landing_url: &str,
        login_url: &str,
    ) -> E2eResult<()> {
        session.goto(landing_url).await?;
        let current = session.current_url().await?;
        if current != landing_url {
            return Err(E2eError::Assertion(format!(
                "restored session was not authenticated, URL is {current}"
            )));
        }

        session.submit_form(LOGOUT_FORM).await?;
        session.wait_for_url(login_url).await.map_err(|e| match e {
            SessionError::InteractionTimeout(_) => {
                E2eError::Assertion("logout did not redirect to the login route".to_string())
            }
            other => other.into(),
        })
    }

    async fn check_field(
        &self,
        session: &mut Box<dyn Session>,
        check: &FieldCheck,
    ) -> E2eResult<()> {
        let selector = match check.field {
            FormField::Email => EMAIL_INPUT,
            FormField::Password => PASSWORD_INPUT,
        };

        match check.kind {
            ValidationKind::ValueMissing => {
                let validity = session.validity(selector).await?;
                if !validity.value_missing {
                    return Err(E2eError::Assertion(format!(
                        "{:?} field did not report a required-value violation",
                        check.field
                    )));
                }
            }
            ValidationKind::TypeMismatch => {
                let validity = session.validity(selector).await?;
                if !validity.type_mismatch {
                    return Err(E2eError::Assertion(format!(
                        "{:?} field did not report a type mismatch",
                        check.field
                    )));
                }
            }
            ValidationKind::TooShort { min_len } => {
                let value = session.input_value(selector).await?;
                let len = value.chars().count();
                if len >= min_len {
                    return Err(E2eError::Assertion(format!(
                        "{:?} value length {} is not below the minimum {}",
                        check.field, len, min_len
                    )));
                }
            }
        }
        Ok(())
    }

    /// Write suite results as pretty JSON into the output directory.
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
