//! Built-in login scenario catalog
//!
//! The canonical set of login scenarios, built from an explicitly passed
//! fixture set. Environments can extend this with YAML scenario files;
//! these are the cases every deployment must pass.

use crate::error::E2eResult;
use crate::fixtures::{Credential, FixtureSet};
use crate::page::Route;
use crate::scenario::{Action, Expectation, FieldCheck, FormField, Scenario, ValidationKind};

/// Minimum password length the account policy expects. The login form
/// does not enforce a minlength, so the catalog observes the entered
/// length instead of expecting a hard block.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Build the catalog from a fixture set. Fails when the set lacks a
/// valid or an invalid user.
pub fn catalog(fixtures: &FixtureSet) -> E2eResult<Vec<Scenario>> {
    let valid = fixtures.valid_user()?;
    let invalid = fixtures.invalid_user()?;

    Ok(vec![
        Scenario {
            name: "valid-login".to_string(),
            description: "Valid credentials redirect to the landing route".to_string(),
            tags: tags(&["auth", "smoke"]),
            actions: vec![Action::Navigate, valid.credential().into()],
            expect: Expectation::Redirect {
                route: Route::Landing,
            },
        },
        Scenario {
            name: "invalid-login".to_string(),
            description: "Unknown credentials render the inline error, no redirect".to_string(),
            tags: tags(&["auth"]),
            actions: vec![Action::Navigate, invalid.credential().into()],
            expect: Expectation::InlineError,
        },
        Scenario {
            name: "wrong-password".to_string(),
            description: "A known account with the wrong password renders the inline error"
                .to_string(),
            tags: tags(&["auth"]),
            actions: vec![
                Action::Navigate,
                Credential {
                    password: "wrongpassword".to_string(),
                    ..valid.credential()
                }
                .into(),
            ],
            expect: Expectation::InlineError,
        },
        Scenario {
            name: "empty-fields".to_string(),
            description: "Submitting empty fields trips required validation on both, \
                          and nothing is submitted"
                .to_string(),
            tags: tags(&["validation"]),
            actions: vec![
                Action::Navigate,
                Action::Submit {
                    email: String::new(),
                    password: String::new(),
                    remember_me: false,
                },
            ],
            expect: Expectation::FieldValidation {
                checks: vec![
                    FieldCheck {
                        field: FormField::Email,
                        kind: ValidationKind::ValueMissing,
                    },
                    FieldCheck {
                        field: FormField::Password,
                        kind: ValidationKind::ValueMissing,
                    },
                ],
                submission_blocked: true,
            },
        },
        Scenario {
            name: "malformed-email".to_string(),
            description: "A malformed email sets the type-mismatch validation flag".to_string(),
            tags: tags(&["validation"]),
            actions: vec![
                Action::Navigate,
                Action::Submit {
                    email: "invalid-email".to_string(),
                    password: valid.password.clone(),
                    remember_me: false,
                },
            ],
            expect: Expectation::FieldValidation {
                checks: vec![FieldCheck {
                    field: FormField::Email,
                    kind: ValidationKind::TypeMismatch,
                }],
                submission_blocked: false,
            },
        },
        Scenario {
            name: "short-password".to_string(),
            description: "A one-character password is below the policy minimum".to_string(),
            tags: tags(&["validation"]),
            actions: vec![
                Action::Navigate,
                Action::Submit {
                    email: valid.email.clone(),
                    password: "a".to_string(),
                    remember_me: false,
                },
            ],
            expect: Expectation::FieldValidation {
                checks: vec![FieldCheck {
                    field: FormField::Password,
                    kind: ValidationKind::TooShort {
                        min_len: MIN_PASSWORD_LEN,
                    },
                }],
                submission_blocked: false,
            },
        },
        Scenario {
            name: "remember-me".to_string(),
            description: "Remember-me keeps the session across a browser restart until logout"
                .to_string(),
            tags: tags(&["auth", "persistence"]),
            actions: vec![Action::Navigate, valid.credential().remembered().into()],
            expect: Expectation::PersistenceRoundTrip,
        },
        Scenario {
            name: "forgot-password".to_string(),
            description: "The forgot-password affordance is visible and navigates to the \
                          reset route"
                .to_string(),
            tags: tags(&["navigation"]),
            actions: vec![Action::Navigate, Action::ClickForgotPassword],
            expect: Expectation::Redirect {
                route: Route::PasswordReset,
            },
        },
        Scenario {
            name: "malformed-email-blocks-submit".to_string(),
            description: "A malformed email prevents form submission entirely".to_string(),
            tags: tags(&["validation"]),
            actions: vec![
                Action::Navigate,
                Action::Submit {
                    email: "hahaha".to_string(),
                    password: valid.password.clone(),
                    remember_me: false,
                },
            ],
            expect: Expectation::FieldValidation {
                checks: vec![FieldCheck {
                    field: FormField::Email,
                    kind: ValidationKind::TypeMismatch,
                }],
                submission_blocked: true,
            },
        },
    ])
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
