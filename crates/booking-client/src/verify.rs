//! Bot-verification tokens.
//!
//! The verification provider (a reCAPTCHA-style widget in the browser) may
//! not be initialised when the user first submits. Instead of failing, the
//! session waits briefly and asks again, up to a bounded number of attempts.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::VerifyError;

/// Action name the booking backend expects on submission tokens.
pub const SUBMIT_ACTION: &str = "submit_form";

/// An opaque token proving the request came from a human-driven form.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VerificationToken(String);

impl VerificationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationToken(..)")
    }
}

/// Source of verification tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Produce a token for `action`.
    ///
    /// Returns `VerifyError::NotReady` while the provider is still loading;
    /// callers retry that case. Any other error is final.
    async fn execute(&self, action: &str) -> Result<VerificationToken, VerifyError>;
}

/// A provider that always returns the same token, or is never ready.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<VerificationToken>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(VerificationToken::new),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn execute(&self, _action: &str) -> Result<VerificationToken, VerifyError> {
        self.token.clone().ok_or(VerifyError::NotReady)
    }
}

/// How long to keep asking a provider that is not ready yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(500),
        }
    }
}

/// Obtain a token, retrying while the provider reports `NotReady`.
///
/// # Errors
/// Returns `VerifyError::Exhausted` once every attempt came back `NotReady`,
/// or the provider's own error as soon as it reports anything else.
pub async fn acquire_token(
    provider: &dyn TokenProvider,
    action: &str,
    policy: RetryPolicy,
) -> Result<VerificationToken, VerifyError> {
    let attempts = policy.attempts.max(1);

    for attempt in 1..=attempts {
        match provider.execute(action).await {
            Ok(token) => {
                debug!(attempt, action, "verification token acquired");
                return Ok(token);
            }
            Err(VerifyError::NotReady) if attempt < attempts => {
                warn!(
                    attempt,
                    delay_ms = policy.delay.as_millis() as u64,
                    "verification provider not ready, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(VerifyError::NotReady) => {}
            Err(err) => return Err(err),
        }
    }

    Err(VerifyError::Exhausted { attempts })
}
