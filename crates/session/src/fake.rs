//! Deterministic in-process double of the target application
//!
//! `FakeApp` models the observable login-flow behavior of the deployed
//! application: an HTML5-validated login form, a credential check, an
//! inline error render on bad credentials, remember-me token issuance,
//! storage-state capture/restore, and a logout form on the landing page.
//! It implements the same `Session` contract the Playwright driver does,
//! so the scenario suite runs against it unchanged and deterministically.
//!
//! The fake recognizes exactly the DOM surface the login page exposes;
//! anything else is `ElementNotFound`, matching what a real browser
//! interaction would report.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tracing::debug;

use crate::error::{SessionError, SessionResult};
use crate::session::{Session, SessionFactory, StorageState, ValidityState};

const EMAIL_INPUT: &str = r#"input[name="email"]"#;
const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
const REMEMBER_CHECKBOX: &str = r#"input[name="remember"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
const ERROR_INDICATOR: &str = ".invalid-feedback, .alert-danger";
const FORGOT_PASSWORD_LINK: &str = "text=Forgot Your Password?";
const LOGOUT_FORM: &str = "#logout-form";

const REMEMBER_COOKIE: &str = "remember_token";

/// A credential the fake application accepts.
#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub password: String,
}

impl Account {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Absolute URLs the fake application serves.
#[derive(Debug, Clone)]
pub struct AppUrls {
    pub login: String,
    pub landing: String,
    pub password_reset: String,
}

impl AppUrls {
    /// Conventional routes under a base URL.
    pub fn under(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            login: format!("{base}/login"),
            landing: format!("{base}/master-items"),
            password_reset: format!("{base}/password/reset"),
        }
    }
}

struct AppState {
    accounts: Vec<Account>,
    urls: AppUrls,
    /// Issued remember-me tokens, token -> account email. Shared across
    /// sessions: logout invalidates the token for every future restore.
    remember_tokens: Mutex<HashMap<String, String>>,
    token_seq: Mutex<u64>,
}

impl AppState {
    fn issue_token(&self, email: &str) -> String {
        let mut seq = self.token_seq.lock();
        *seq += 1;
        let token = format!("remember-{:04}", *seq);
        self.remember_tokens
            .lock()
            .insert(token.clone(), email.to_string());
        token
    }

    fn token_valid(&self, token: &str) -> bool {
        self.remember_tokens.lock().contains_key(token)
    }

    fn revoke_token(&self, token: &str) {
        self.remember_tokens.lock().remove(token);
    }
}

/// Factory for deterministic fake sessions.
pub struct FakeApp {
    state: Arc<AppState>,
}

impl FakeApp {
    pub fn new(accounts: Vec<Account>, urls: AppUrls) -> Self {
        Self {
            state: Arc::new(AppState {
                accounts,
                urls,
                remember_tokens: Mutex::new(HashMap::new()),
                token_seq: Mutex::new(0),
            }),
        }
    }
}

#[async_trait]
impl SessionFactory for FakeApp {
    async fn open(&self, storage: Option<&StorageState>) -> SessionResult<Box<dyn Session>> {
        let token = storage.and_then(remember_token_from);
        let authenticated = token
            .as_deref()
            .map(|t| self.state.token_valid(t))
            .unwrap_or(false);

        debug!(authenticated, "opening fake session");

        Ok(Box::new(FakeSession {
            app: Arc::clone(&self.state),
            url: "about:blank".to_string(),
            page: PageKind::Blank,
            email: String::new(),
            password: String::new(),
            remember: false,
            error_visible: false,
            authenticated,
            remember_token: token,
            closed: false,
        }))
    }
}

fn remember_token_from(storage: &StorageState) -> Option<String> {
    storage.0.get("cookies")?.as_array()?.iter().find_map(|c| {
        if c.get("name")?.as_str()? == REMEMBER_COOKIE {
            Some(c.get("value")?.as_str()?.to_string())
        } else {
            None
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Blank,
    Login,
    Landing,
    PasswordReset,
}

/// One fake browsing context.
pub struct FakeSession {
    app: Arc<AppState>,
    url: String,
    page: PageKind,
    email: String,
    password: String,
    remember: bool,
    error_visible: bool,
    authenticated: bool,
    remember_token: Option<String>,
    closed: bool,
}

impl FakeSession {
    fn ensure_open(&self) -> SessionResult<()> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn show_login(&mut self) {
        self.url = self.app.urls.login.clone();
        self.page = PageKind::Login;
        self.email.clear();
        self.password.clear();
        self.remember = false;
        self.error_visible = false;
    }

    fn email_validity(&self) -> ValidityState {
        let value_missing = self.email.is_empty();
        let type_mismatch = !value_missing && !looks_like_email(&self.email);
        ValidityState {
            value_missing,
            type_mismatch,
            too_short: false,
            valid: !value_missing && !type_mismatch,
        }
    }

    fn password_validity(&self) -> ValidityState {
        let value_missing = self.password.is_empty();
        // The form declares no minlength, so short passwords pass native
        // validation and are rejected server-side instead.
        ValidityState {
            value_missing,
            type_mismatch: false,
            too_short: false,
            valid: !value_missing,
        }
    }

    fn submit_login_form(&mut self) {
        if !self.email_validity().valid || !self.password_validity().valid {
            // Native validation blocks submission; nothing leaves the page.
            debug!("fake submit blocked by constraint validation");
            return;
        }

        let matched = self
            .app
            .accounts
            .iter()
            .any(|a| a.email == self.email && a.password == self.password);

        if matched {
            if self.remember {
                self.remember_token = Some(self.app.issue_token(&self.email));
            }
            self.authenticated = true;
            self.error_visible = false;
            self.url = self.app.urls.landing.clone();
            self.page = PageKind::Landing;
        } else {
            self.error_visible = true;
        }
    }

    fn visible(&self, selector: &str) -> bool {
        match self.page {
            PageKind::Login => match selector {
                EMAIL_INPUT | PASSWORD_INPUT | REMEMBER_CHECKBOX | SUBMIT_BUTTON
                | FORGOT_PASSWORD_LINK => true,
                ERROR_INDICATOR => self.error_visible,
                _ => false,
            },
            PageKind::Landing => selector == LOGOUT_FORM,
            PageKind::Blank | PageKind::PasswordReset => false,
        }
    }
}

/// HTML5-style email shape check: something before and after a single `@`,
/// no whitespace.
fn looks_like_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn goto(&mut self, url: &str) -> SessionResult<()> {
        self.ensure_open()?;

        if url == self.app.urls.login {
            self.show_login();
        } else if url == self.app.urls.landing {
            if self.authenticated {
                self.url = self.app.urls.landing.clone();
                self.page = PageKind::Landing;
            } else {
                self.show_login();
            }
        } else if url == self.app.urls.password_reset {
            self.url = self.app.urls.password_reset.clone();
            self.page = PageKind::PasswordReset;
        } else {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                reason: "no such route".to_string(),
            });
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> SessionResult<()> {
        self.ensure_open()?;
        if self.page != PageKind::Login {
            return Err(SessionError::ElementNotFound(selector.to_string()));
        }
        match selector {
            EMAIL_INPUT => self.email = value.to_string(),
            PASSWORD_INPUT => self.password = value.to_string(),
            _ => return Err(SessionError::ElementNotFound(selector.to_string())),
        }
        Ok(())
    }

    async fn check(&mut self, selector: &str) -> SessionResult<()> {
        self.ensure_open()?;
        if self.page == PageKind::Login && selector == REMEMBER_CHECKBOX {
            self.remember = true;
            Ok(())
        } else {
            Err(SessionError::ElementNotFound(selector.to_string()))
        }
    }

    async fn click(&mut self, selector: &str) -> SessionResult<()> {
        self.ensure_open()?;
        if self.page != PageKind::Login {
            return Err(SessionError::ElementNotFound(selector.to_string()));
        }
        match selector {
            SUBMIT_BUTTON => {
                self.submit_login_form();
                Ok(())
            }
            FORGOT_PASSWORD_LINK => {
                self.url = self.app.urls.password_reset.clone();
                self.page = PageKind::PasswordReset;
                Ok(())
            }
            _ => Err(SessionError::ElementNotFound(selector.to_string())),
        }
    }

    async fn is_visible(&mut self, selector: &str) -> SessionResult<bool> {
        self.ensure_open()?;
        Ok(self.visible(selector))
    }

    async fn wait_visible(&mut self, selector: &str) -> SessionResult<()> {
        self.ensure_open()?;
        // Fake time never advances: what is not visible now never will be.
        if self.visible(selector) {
            Ok(())
        } else {
            Err(SessionError::InteractionTimeout(selector.to_string()))
        }
    }

    async fn wait_for_url(&mut self, url: &str) -> SessionResult<()> {
        self.ensure_open()?;
        if self.url == url {
            Ok(())
        } else {
            Err(SessionError::InteractionTimeout(url.to_string()))
        }
    }

    async fn current_url(&mut self) -> SessionResult<String> {
        self.ensure_open()?;
        Ok(self.url.clone())
    }

    async fn input_value(&mut self, selector: &str) -> SessionResult<String> {
        self.ensure_open()?;
        if self.page != PageKind::Login {
            return Err(SessionError::ElementNotFound(selector.to_string()));
        }
        match selector {
            EMAIL_INPUT => Ok(self.email.clone()),
            PASSWORD_INPUT => Ok(self.password.clone()),
            _ => Err(SessionError::ElementNotFound(selector.to_string())),
        }
    }

    async fn validity(&mut self, selector: &str) -> SessionResult<ValidityState> {
        self.ensure_open()?;
        if self.page != PageKind::Login {
            return Err(SessionError::ElementNotFound(selector.to_string()));
        }
        match selector {
            EMAIL_INPUT => Ok(self.email_validity()),
            PASSWORD_INPUT => Ok(self.password_validity()),
            _ => Err(SessionError::ElementNotFound(selector.to_string())),
        }
    }

    async fn submit_form(&mut self, selector: &str) -> SessionResult<()> {
        self.ensure_open()?;
        if self.page == PageKind::Landing && selector == LOGOUT_FORM {
            if let Some(token) = self.remember_token.take() {
                self.app.revoke_token(&token);
            }
            self.authenticated = false;
            self.show_login();
            Ok(())
        } else {
            Err(SessionError::ElementNotFound(selector.to_string()))
        }
    }

    async fn storage_state(&mut self) -> SessionResult<StorageState> {
        self.ensure_open()?;
        let cookies = match (&self.remember_token, self.authenticated) {
            (Some(token), true) => json!([{ "name": REMEMBER_COOKIE, "value": token }]),
            _ => json!([]),
        };
        Ok(StorageState(json!({ "cookies": cookies, "origins": [] })))
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://app.test";

    fn app() -> FakeApp {
        FakeApp::new(
            vec![Account::new("qa.user@example.com", "Passw0rd!")],
            AppUrls::under(BASE),
        )
    }

    async fn login(
        session: &mut Box<dyn Session>,
        email: &str,
        password: &str,
        remember: bool,
    ) -> SessionResult<()> {
        session.goto(&format!("{BASE}/login")).await?;
        session.fill(EMAIL_INPUT, email).await?;
        session.fill(PASSWORD_INPUT, password).await?;
        if remember {
            session.check(REMEMBER_CHECKBOX).await?;
        }
        session.click(SUBMIT_BUTTON).await
    }

    #[tokio::test]
    async fn valid_credentials_reach_the_landing_page() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        login(&mut session, "qa.user@example.com", "Passw0rd!", false)
            .await
            .unwrap();
        assert_eq!(
            session.current_url().await.unwrap(),
            format!("{BASE}/master-items")
        );
    }

    #[tokio::test]
    async fn wrong_password_renders_inline_error_without_redirect() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        login(&mut session, "qa.user@example.com", "wrongpassword", false)
            .await
            .unwrap();
        assert!(session.is_visible(ERROR_INDICATOR).await.unwrap());
        assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/login"));
    }

    #[tokio::test]
    async fn empty_fields_report_value_missing_and_block_submission() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        session.goto(&format!("{BASE}/login")).await.unwrap();
        session.click(SUBMIT_BUTTON).await.unwrap();

        let email = session.validity(EMAIL_INPUT).await.unwrap();
        let password = session.validity(PASSWORD_INPUT).await.unwrap();
        assert!(email.value_missing);
        assert!(password.value_missing);
        assert!(!email.valid);
        assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/login"));
    }

    #[tokio::test]
    async fn malformed_email_reports_type_mismatch() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        login(&mut session, "invalid-email", "Passw0rd!", false)
            .await
            .unwrap();
        let validity = session.validity(EMAIL_INPUT).await.unwrap();
        assert!(validity.type_mismatch);
        assert!(!validity.valid);
    }

    #[tokio::test]
    async fn unauthenticated_landing_access_redirects_to_login() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        session.goto(&format!("{BASE}/master-items")).await.unwrap();
        assert_eq!(session.current_url().await.unwrap(), format!("{BASE}/login"));
    }

    #[tokio::test]
    async fn remember_me_storage_restores_an_authenticated_session() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        login(&mut session, "qa.user@example.com", "Passw0rd!", true)
            .await
            .unwrap();
        let storage = session.storage_state().await.unwrap();
        session.close().await.unwrap();

        let mut restored = app.open(Some(&storage)).await.unwrap();
        restored.goto(&format!("{BASE}/master-items")).await.unwrap();
        assert_eq!(
            restored.current_url().await.unwrap(),
            format!("{BASE}/master-items")
        );
    }

    #[tokio::test]
    async fn storage_without_remember_me_restores_nothing() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        login(&mut session, "qa.user@example.com", "Passw0rd!", false)
            .await
            .unwrap();
        let storage = session.storage_state().await.unwrap();

        let mut restored = app.open(Some(&storage)).await.unwrap();
        restored.goto(&format!("{BASE}/master-items")).await.unwrap();
        assert_eq!(
            restored.current_url().await.unwrap(),
            format!("{BASE}/login")
        );
    }

    #[tokio::test]
    async fn logout_invalidates_the_remember_token() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        login(&mut session, "qa.user@example.com", "Passw0rd!", true)
            .await
            .unwrap();
        let storage = session.storage_state().await.unwrap();

        let mut restored = app.open(Some(&storage)).await.unwrap();
        restored.goto(&format!("{BASE}/master-items")).await.unwrap();
        restored.submit_form(LOGOUT_FORM).await.unwrap();
        assert_eq!(
            restored.current_url().await.unwrap(),
            format!("{BASE}/login")
        );

        // The token behind the old snapshot is gone.
        let mut again = app.open(Some(&storage)).await.unwrap();
        again.goto(&format!("{BASE}/master-items")).await.unwrap();
        assert_eq!(again.current_url().await.unwrap(), format!("{BASE}/login"));
    }

    #[tokio::test]
    async fn unknown_selector_is_element_not_found() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        session.goto(&format!("{BASE}/login")).await.unwrap();
        let err = session.fill("#no-such-input", "x").await.unwrap_err();
        assert!(matches!(err, SessionError::ElementNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_url_is_a_navigation_failure() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        let err = session.goto("https://elsewhere.test/").await.unwrap_err();
        assert!(matches!(err, SessionError::Navigation { .. }));
    }

    #[tokio::test]
    async fn closed_session_rejects_operations() {
        let app = app();
        let mut session = app.open(None).await.unwrap();
        session.close().await.unwrap();
        let err = session.current_url().await.unwrap_err();
        assert!(matches!(err, SessionError::Closed));
    }

    #[test]
    fn email_shape_check_matches_html5_behavior() {
        assert!(looks_like_email("user@example.com"));
        assert!(looks_like_email("a@b"));
        assert!(!looks_like_email("invalid-email"));
        assert!(!looks_like_email("hahaha"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("user@"));
        assert!(!looks_like_email("user name@example.com"));
        assert!(!looks_like_email("a@b@c"));
    }
}
