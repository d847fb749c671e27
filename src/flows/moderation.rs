//! Admin flows that collect a reason or a value before a moderation action.

use crate::config::Limits;
use crate::db::{ProfileField, Severity};
use crate::flows::{Flow, Input, Keys, Prompt, Step};
use crate::validation::{self, ValidationError};

fn reason_prompt(action: &str, limits: &Limits) -> Prompt {
    Prompt::new(
        format!(
            "Send the reason for {action} (up to {} characters).",
            limits.reason_max
        ),
        Keys::Cancel,
    )
}

fn reason_step<S, O>(
    state: S,
    input: Input,
    limits: &Limits,
    done: impl FnOnce(String) -> O,
) -> Step<S, O> {
    match input {
        Input::Text(text) => match validation::validate_reason(&text, limits) {
            Ok(reason) => Step::Done(done(reason)),
            Err(error) => Step::Retry { state, error },
        },
        _ => Step::Retry {
            state,
            error: ValidationError::WrongInput {
                expected: "the reason as a text message",
            },
        },
    }
}

/// A moderation target plus the stated reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reasoned {
    /// User or listing id the action applies to.
    pub target_id: i64,
    /// Validated reason.
    pub reason: String,
}

/// Warning a user: severity, then reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarnUser {
    /// Waiting for a severity button.
    Severity {
        /// User being warned (`users.id`).
        user_id: i64,
    },
    /// Waiting for the reason.
    Reason {
        /// User being warned (`users.id`).
        user_id: i64,
        /// Chosen severity.
        severity: Severity,
    },
}

/// A complete warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarnOutcome {
    /// User being warned (`users.id`).
    pub user_id: i64,
    /// Severity.
    pub severity: Severity,
    /// Reason.
    pub reason: String,
}

impl WarnUser {
    /// First step.
    pub fn start(user_id: i64) -> Self {
        Self::Severity { user_id }
    }
}

impl Flow for WarnUser {
    type Output = WarnOutcome;

    fn prompt(&self, limits: &Limits) -> Prompt {
        match self {
            Self::Severity { .. } => Prompt::new("\u{26A0}\u{FE0F} Choose the warning severity:", Keys::Severity),
            Self::Reason { .. } => reason_prompt("the warning", limits),
        }
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        match self {
            Self::Severity { user_id } => match input {
                Input::Choice(choice) => match validation::parse_severity(&choice) {
                    Ok(severity) => Step::next(Self::Reason { user_id, severity }, limits),
                    Err(error) => Step::retry(self, error),
                },
                _ => Step::retry(
                    self,
                    ValidationError::WrongInput {
                        expected: "a severity using the buttons",
                    },
                ),
            },
            Self::Reason { user_id, severity } => reason_step(self, input, limits, |reason| {
                WarnOutcome {
                    user_id,
                    severity,
                    reason,
                }
            }),
        }
    }
}

/// Blocking a user: reason only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockUser {
    /// Waiting for the reason.
    Reason {
        /// User being blocked (`users.id`).
        user_id: i64,
    },
}

impl BlockUser {
    /// First step.
    pub fn start(user_id: i64) -> Self {
        Self::Reason { user_id }
    }
}

impl Flow for BlockUser {
    type Output = Reasoned;

    fn prompt(&self, limits: &Limits) -> Prompt {
        reason_prompt("blocking this user", limits)
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        let Self::Reason { user_id } = self;
        reason_step(self, input, limits, |reason| Reasoned {
            target_id: user_id,
            reason,
        })
    }
}

/// Flagging a listing: reason only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagListing {
    /// Waiting for the reason.
    Reason {
        /// Listing being flagged.
        listing_id: i64,
    },
}

impl FlagListing {
    /// First step.
    pub fn start(listing_id: i64) -> Self {
        Self::Reason { listing_id }
    }
}

impl Flow for FlagListing {
    type Output = Reasoned;

    fn prompt(&self, limits: &Limits) -> Prompt {
        reason_prompt("flagging this listing", limits)
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        let Self::Reason { listing_id } = self;
        reason_step(self, input, limits, |reason| Reasoned {
            target_id: listing_id,
            reason,
        })
    }
}

/// Changing one profile field on a user's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditUserProfile {
    /// Waiting for the new value.
    Value {
        /// User being edited (`users.id`).
        user_id: i64,
        /// Field being edited.
        field: ProfileField,
    },
}

/// A validated admin profile change. `None` clears the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfileEdit {
    /// User being edited (`users.id`).
    pub user_id: i64,
    /// Field edited.
    pub field: ProfileField,
    /// New value.
    pub value: Option<String>,
}

impl EditUserProfile {
    /// First step.
    pub fn start(user_id: i64, field: ProfileField) -> Self {
        Self::Value { user_id, field }
    }
}

impl Flow for EditUserProfile {
    type Output = UserProfileEdit;

    fn prompt(&self, _limits: &Limits) -> Prompt {
        let Self::Value { user_id, field } = self;
        Prompt::new(
            format!(
                "\u{270F}\u{FE0F} Send the new {} for user #{user_id}, or press Skip to clear it.",
                field.as_str()
            ),
            Keys::Skip,
        )
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        let Self::Value { user_id, field } = self;
        let value = match input {
            Input::Skip => None,
            Input::Text(text) => match validation::validate_profile_value(field, &text, limits) {
                Ok(value) => value,
                Err(error) => return Step::retry(self, error),
            },
            _ => {
                return Step::retry(
                    self,
                    ValidationError::WrongInput {
                        expected: "the new value as a text message",
                    },
                )
            }
        };
        Step::Done(UserProfileEdit {
            user_id,
            field,
            value,
        })
    }
}
