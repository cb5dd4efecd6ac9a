//! Error types for the booking client.
//!
//! Each boundary gets its own enum: the HTTP service, the bot-verification
//! provider, configuration loading, and the form session that ties them
//! together. [`SessionError`] is the one a form surfaces to the user.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use slot_engine::{format_key, Selection};
use thiserror::Error;

use crate::form::FormErrors;

/// Generic text shown when a submission fails for reasons the user can't fix.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Failures talking to the booking service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures obtaining a bot-verification token.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification provider is not ready")]
    NotReady,

    #[error("verification provider failed: {0}")]
    Provider(String),

    #[error("verification provider was not ready after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Failures loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid timezone: {0}")]
    Timezone(String),
}

/// Why a selection was rejected during the availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ConflictReason {
    /// The service reports the slot as taken.
    AlreadyBooked,
    /// The same date and slot was already chosen at this earlier position.
    DuplicateOf(usize),
}

/// One rejected selection, addressed by its position in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub index: usize,
    pub selection: Selection,
    pub reason: ConflictReason,
}

impl ConflictReport {
    /// Field-level message naming the conflicting date and time.
    pub fn message(&self) -> String {
        let date = format_key(self.selection.date);
        match self.reason {
            ConflictReason::AlreadyBooked => format!(
                "Date {} and Time {} are already booked.",
                date, self.selection.slot
            ),
            ConflictReason::DuplicateOf(first) => format!(
                "Date {} and Time {} are already chosen for class {}.",
                date,
                self.selection.slot,
                first + 1
            ),
        }
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Failures of a form-session action (availability check or submission).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("form is incomplete: {0}")]
    Invalid(FormErrors),

    #[error("{} selection(s) are not available", .0.len())]
    Conflicts(Vec<ConflictReport>),

    #[error("bot verification failed: {0}")]
    Verification(#[from] VerifyError),

    #[error("availability check failed: {0}")]
    Service(#[from] ServiceError),

    #[error("submission failed: {0}")]
    Submission(#[source] ServiceError),
}

impl SessionError {
    /// Whether retrying the same action without changing the form can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::Verification(_) | SessionError::Service(_) | SessionError::Submission(_)
        )
    }

    /// Text to show the user, one line per problem.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Invalid(errors) => errors.to_string(),
            SessionError::Conflicts(reports) => reports
                .iter()
                .map(ConflictReport::message)
                .collect::<Vec<_>>()
                .join("\n"),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn report(reason: ConflictReason) -> ConflictReport {
        ConflictReport {
            index: 1,
            selection: Selection::new(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(), "2pm-5pm"),
            reason,
        }
    }

    #[test]
    fn conflict_messages_name_date_and_time() {
        assert_eq!(
            report(ConflictReason::AlreadyBooked).message(),
            "Date 06/09/2025 and Time 2pm-5pm are already booked."
        );
        assert_eq!(
            report(ConflictReason::DuplicateOf(0)).message(),
            "Date 06/09/2025 and Time 2pm-5pm are already chosen for class 1."
        );
    }

    #[test]
    fn conflicts_are_not_retryable_but_submission_is() {
        let conflicts = SessionError::Conflicts(vec![report(ConflictReason::AlreadyBooked)]);
        assert!(!conflicts.is_retryable());

        let submission = SessionError::Submission(ServiceError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert!(submission.is_retryable());
        assert_eq!(submission.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
