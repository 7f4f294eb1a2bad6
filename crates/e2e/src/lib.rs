//! Authflow E2E suite
//!
//! Scenario-driven tests for a hosted application's login flow. The crate
//! is a library invoked by an external runner; it defines the page model,
//! the fixture and scenario data, and the execution that ties them to a
//! browser session.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Scenario suite (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── preflight() - target reachability                    │
//! │    ├── run(scenario) -> ScenarioResult                      │
//! │    └── run_all(&[Scenario]) -> SuiteResult                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  LoginPage - selector-decoupled facade over the login form  │
//! │    ├── navigate()                                           │
//! │    ├── submit_credentials(email, password, remember_me)     │
//! │    └── forgot_password()                                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (data, YAML-loadable)                             │
//! │    ├── actions: navigate | submit | click_forgot_password   │
//! │    └── expect: redirect | inline_error | field_validation   │
//! │                | persistence_round_trip                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions come from an `authflow_session::SessionFactory`: the Playwright
//! sidecar for the live deployment, or the deterministic fake for the
//! checked-in tests.

pub mod catalog;
pub mod error;
pub mod fixtures;
pub mod page;
pub mod runner;
pub mod scenario;

pub use catalog::catalog;
pub use error::{E2eError, E2eResult};
pub use fixtures::{Credential, FixtureSet, UserFixture};
pub use page::{LoginPage, Route, Routes};
pub use runner::{RunnerConfig, ScenarioResult, ScenarioRunner, SuiteResult};
pub use scenario::{Action, Expectation, Scenario};
