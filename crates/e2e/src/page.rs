//! Page model for the login form
//!
//! `LoginPage` presents a stable, selector-decoupled interface to the
//! form: each operation is a straight sequence of element interactions
//! with no retry or branching of its own. Element failures and timeouts
//! propagate unmodified; observing the outcome of a submission is the
//! caller's job.

use authflow_session::{Session, SessionResult, ValidityState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Email input on the login form.
pub const EMAIL_INPUT: &str = r#"input[name="email"]"#;
/// Password input on the login form.
pub const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
/// Remember-me toggle.
pub const REMEMBER_CHECKBOX: &str = r#"input[name="remember"]"#;
/// Submit control.
pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
/// Inline error rendered on rejected credentials.
pub const ERROR_INDICATOR: &str = ".invalid-feedback, .alert-danger";
/// The forgot-password affordance.
pub const FORGOT_PASSWORD_LINK: &str = "text=Forgot Your Password?";
/// Logout form on the authenticated landing page.
pub const LOGOUT_FORM: &str = "#logout-form";

/// Symbolic route names, resolved against [`Routes`] at run time so
/// scenario data stays environment-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Landing,
    PasswordReset,
}

/// Route table for one deployment of the target application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routes {
    pub base_url: String,
    pub login: String,
    pub landing: String,
    pub password_reset: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            base_url: "https://qa-test.medifyapp.com".to_string(),
            login: "/login".to_string(),
            landing: "/master-items".to_string(),
            password_reset: "/password/reset".to_string(),
        }
    }
}

impl Routes {
    /// Routes with the conventional paths under a different base URL.
    pub fn under(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolve a symbolic route to an absolute URL.
    pub fn url(&self, route: Route) -> String {
        let path = match route {
            Route::Login => &self.login,
            Route::Landing => &self.landing,
            Route::PasswordReset => &self.password_reset,
        };
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Façade over the login form's interactive elements.
pub struct LoginPage<'a> {
    session: &'a mut dyn Session,
    routes: &'a Routes,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a mut dyn Session, routes: &'a Routes) -> Self {
        Self { session, routes }
    }

    /// Direct the session to the login route. Navigation failures
    /// propagate to the caller.
    pub async fn navigate(&mut self) -> SessionResult<()> {
        self.session.goto(&self.routes.url(Route::Login)).await
    }

    /// Fill the email and password fields with the given values verbatim,
    /// optionally toggle remember-me, then activate submit.
    ///
    /// No client-side sanitization happens here; constraint validation is
    /// the browser's and the application's responsibility. The resulting
    /// page transition or in-page error render is observed by the caller.
    pub async fn submit_credentials(
        &mut self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> SessionResult<()> {
        debug!(email, remember_me, "submitting credentials");
        self.session.fill(EMAIL_INPUT, email).await?;
        self.session.fill(PASSWORD_INPUT, password).await?;
        if remember_me {
            self.session.check(REMEMBER_CHECKBOX).await?;
        }
        self.session.click(SUBMIT_BUTTON).await
    }

    /// Activate the forgot-password affordance.
    pub async fn forgot_password(&mut self) -> SessionResult<()> {
        self.session.click(FORGOT_PASSWORD_LINK).await
    }

    pub async fn error_visible(&mut self) -> SessionResult<bool> {
        self.session.is_visible(ERROR_INDICATOR).await
    }

    pub async fn email_validity(&mut self) -> SessionResult<ValidityState> {
        self.session.validity(EMAIL_INPUT).await
    }

    pub async fn password_validity(&mut self) -> SessionResult<ValidityState> {
        self.session.validity(PASSWORD_INPUT).await
    }

    pub async fn password_value(&mut self) -> SessionResult<String> {
        self.session.input_value(PASSWORD_INPUT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_resolve_against_the_base_url() {
        let routes = Routes::under("https://app.test/");
        assert_eq!(routes.url(Route::Login), "https://app.test/login");
        assert_eq!(routes.url(Route::Landing), "https://app.test/master-items");
        assert_eq!(
            routes.url(Route::PasswordReset),
            "https://app.test/password/reset"
        );
    }

    #[test]
    fn default_routes_target_the_qa_deployment() {
        let routes = Routes::default();
        assert_eq!(routes.url(Route::Login), "https://qa-test.medifyapp.com/login");
    }
}
