//! Agent configuration.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file via dotenvy). The resolved [`AgentConfig`] is built once at
//! startup and is read-only afterwards.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const CONTROLLER_URL_ENV: &str = "FENNEC_CONTROLLER_URL";
pub const AGENT_TOKEN_ENV: &str = "FENNEC_AGENT_TOKEN";
pub const HEARTBEAT_INTERVAL_ENV: &str = "FENNEC_HEARTBEAT_INTERVAL_SECONDS";
pub const POLL_INTERVAL_ENV: &str = "FENNEC_POLL_INTERVAL_MS";

/// Timeout applied to every controller request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Resolved connection and timing parameters.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Controller base URL, without trailing slashes.
    pub controller_url: String,
    /// Bearer token sent on every request. Never logged.
    pub token: SecretString,
    /// Delay between cycles in `work` mode.
    pub poll_interval: Duration,
    /// Period between heartbeats while a job runs.
    pub heartbeat_interval: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl AgentConfig {
    /// Create a config with default intervals.
    pub fn new(controller_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            controller_url: normalize_url(&controller_url.into()),
            token: SecretString::from(token.into()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first; it never
    /// overrides variables that are already set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let controller_url = get(CONTROLLER_URL_ENV)
            .map(|url| normalize_url(&url))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                key: CONTROLLER_URL_ENV.to_string(),
            })?;

        let token = get(AGENT_TOKEN_ENV).ok_or_else(|| ConfigError::MissingRequired {
            key: AGENT_TOKEN_ENV.to_string(),
        })?;

        let heartbeat_interval = match get(HEARTBEAT_INTERVAL_ENV) {
            Some(raw) => Duration::from_secs(parse_positive(HEARTBEAT_INTERVAL_ENV, &raw)?),
            None => DEFAULT_HEARTBEAT_INTERVAL,
        };

        let poll_interval = match get(POLL_INTERVAL_ENV) {
            Some(raw) => Duration::from_millis(parse_positive(POLL_INTERVAL_ENV, &raw)?),
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            controller_url,
            token: SecretString::from(token),
            poll_interval,
            heartbeat_interval,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
        }),
    }
}
