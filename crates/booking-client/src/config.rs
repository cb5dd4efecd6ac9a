//! Client configuration: a TOML file with environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::verify::{RetryPolicy, SUBMIT_ACTION};

pub const DEFAULT_BASE_URL: &str = "https://ai-schedular-backend.onrender.com";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_REDIRECT_URL: &str = "https://ka.kableacademy.com/techcred-registration-thank-you";

pub const BASE_URL_ENV: &str = "SLOT_BOOKING_BASE_URL";
pub const TOKEN_ENV: &str = "SLOT_BOOKING_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// IANA zone used to decide what "today" is for the date windows.
    pub timezone: String,
    /// Days between today and the first bookable date.
    pub lead_days: u32,
    /// Number of dates in the rolling window.
    pub window_len: usize,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// Where the form sends the user after a successful booking.
    pub redirect_url: Option<String>,
    pub verification: VerificationConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            lead_days: 2,
            window_len: 7,
            request_timeout_secs: 30,
            cache_ttl_secs: 600,
            redirect_url: Some(DEFAULT_REDIRECT_URL.to_string()),
            verification: VerificationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub action: String,
    pub attempts: u32,
    pub retry_delay_ms: u64,
    /// Fixed token for non-browser use (CLI, staging backends).
    pub token: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            action: SUBMIT_ACTION.to_string(),
            attempts: 10,
            retry_delay_ms: 500,
            token: None,
        }
    }
}

impl ClientConfig {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.verification.attempts,
            delay: Duration::from_millis(self.verification.retry_delay_ms),
        }
    }

    /// Override values from the environment, looked up through `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.verification.token = Some(token);
        }
        self
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("slot-booking").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration, then apply environment overrides.
///
/// An explicit `path` must be readable. Without one, the default location is
/// tried and a missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => match config_path() {
            Some(default) if default.exists() => read_config(&default)?,
            _ => ClientConfig::default(),
        },
    };

    Ok(config.apply_env(|key| std::env::var(key).ok()))
}

fn read_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            base_url = "http://localhost:5000"
            lead_days = 3

            [verification]
            attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.lead_days, 3);
        assert_eq!(config.window_len, 7);
        assert_eq!(config.verification.attempts, 2);
        assert_eq!(config.verification.action, SUBMIT_ACTION);
    }

    #[test]
    fn env_overrides_file_values() {
        let config = ClientConfig::default().apply_env(|key| match key {
            BASE_URL_ENV => Some("http://staging".to_string()),
            TOKEN_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://staging");
        assert_eq!(config.verification.token, None);
    }

    #[test]
    fn bad_timezone_is_reported() {
        let config = ClientConfig {
            timezone: "Mars/Olympus".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.timezone(), Err(ConfigError::Timezone(_))));
        assert_eq!(
            ClientConfig::default().timezone().unwrap(),
            chrono_tz::America::New_York
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/slot-booking.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            parse_config("lead_days = \"soon\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
