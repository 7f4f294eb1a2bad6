//! Credential fixtures
//!
//! Fixtures are loaded once per run and passed explicitly to whatever
//! needs them; there is no shared global fixture list.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// A credential as submitted to the login form. Immutable per scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl Credential {
    /// The same credential with the remember-me toggle set.
    pub fn remembered(mut self) -> Self {
        self.remember_me = true;
        self
    }
}

/// A named credential with a known valid/invalid classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFixture {
    pub name: String,
    pub email: String,
    pub password: String,
    pub valid: bool,
}

impl UserFixture {
    pub fn credential(&self) -> Credential {
        Credential {
            email: self.email.clone(),
            password: self.password.clone(),
            remember_me: false,
        }
    }
}

/// An ordered collection of user fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureSet {
    users: Vec<UserFixture>,
}

impl FixtureSet {
    pub fn new(users: Vec<UserFixture>) -> Self {
        Self { users }
    }

    /// Parse a fixture set from a JSON array of user records.
    pub fn from_json(json: &str) -> E2eResult<Self> {
        let users: Vec<UserFixture> = serde_json::from_str(json)?;
        Ok(Self { users })
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn users(&self) -> &[UserFixture] {
        &self.users
    }

    /// First fixture classified valid.
    pub fn valid_user(&self) -> E2eResult<&UserFixture> {
        self.users
            .iter()
            .find(|u| u.valid)
            .ok_or_else(|| E2eError::Fixture("no valid user fixture".to_string()))
    }

    /// First fixture classified invalid.
    pub fn invalid_user(&self) -> E2eResult<&UserFixture> {
        self.users
            .iter()
            .find(|u| !u.valid)
            .ok_or_else(|| E2eError::Fixture("no invalid user fixture".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_user_fixture_array() {
        let json = r#"[
            { "name": "qa", "email": "qa.user@example.com", "password": "Passw0rd!", "valid": true },
            { "name": "intruder", "email": "invalid@example.com", "password": "wrongpassword", "valid": false }
        ]"#;
        let fixtures = FixtureSet::from_json(json).unwrap();
        assert_eq!(fixtures.users().len(), 2);
        assert_eq!(fixtures.valid_user().unwrap().email, "qa.user@example.com");
        assert_eq!(fixtures.invalid_user().unwrap().name, "intruder");
    }

    #[test]
    fn missing_classification_is_a_fixture_error() {
        let fixtures = FixtureSet::new(vec![UserFixture {
            name: "qa".to_string(),
            email: "qa.user@example.com".to_string(),
            password: "Passw0rd!".to_string(),
            valid: true,
        }]);
        assert!(matches!(
            fixtures.invalid_user(),
            Err(E2eError::Fixture(_))
        ));
    }
}
