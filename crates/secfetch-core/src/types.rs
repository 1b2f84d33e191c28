//! Configuration types for a secfetch run

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default trigger for the parameter-store provider
pub const DEFAULT_SSM_PREFIX: &str = "ssm://";
/// Default trigger for the secret-manager provider
pub const DEFAULT_SECRETS_PREFIX: &str = "secrets://";
/// Default trigger for the environment provider
pub const DEFAULT_ENV_PREFIX: &str = "env://";
/// Default trigger for the base64 provider
pub const DEFAULT_BASE64_PREFIX: &str = "base64://";

/// Default number of fetch attempts per placeholder
pub const DEFAULT_RETRIES: u32 = 3;
/// Default per-line fetch deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default base delay for paced retry strategies, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Textual triggers, one per provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderPrefixes {
    #[serde(default = "default_ssm_prefix")]
    pub ssm: String,

    #[serde(default = "default_secrets_prefix")]
    pub secrets: String,

    #[serde(default = "default_env_prefix")]
    pub env: String,

    #[serde(default = "default_base64_prefix")]
    pub base64: String,
}

impl Default for ProviderPrefixes {
    fn default() -> Self {
        Self {
            ssm: default_ssm_prefix(),
            secrets: default_secrets_prefix(),
            env: default_env_prefix(),
            base64: default_base64_prefix(),
        }
    }
}

impl ProviderPrefixes {
    /// Triggers paired with their provider tag, in provider order
    pub fn tagged(&self) -> [(&'static str, &str); 4] {
        [
            ("ssm", self.ssm.as_str()),
            ("secrets", self.secrets.as_str()),
            ("env", self.env.as_str()),
            ("base64", self.base64.as_str()),
        ]
    }
}

fn default_ssm_prefix() -> String {
    DEFAULT_SSM_PREFIX.to_string()
}
fn default_secrets_prefix() -> String {
    DEFAULT_SECRETS_PREFIX.to_string()
}
fn default_env_prefix() -> String {
    DEFAULT_ENV_PREFIX.to_string()
}
fn default_base64_prefix() -> String {
    DEFAULT_BASE64_PREFIX.to_string()
}

/// Settings for one secfetch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecfetchConfig {
    /// Provider triggers
    #[serde(default)]
    pub prefixes: ProviderPrefixes,

    /// Fetch attempts per placeholder
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Deadline shared by every fetch on one line, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pacing between fetch attempts
    #[serde(default)]
    pub retry_strategy: RetryStrategy,

    /// Base delay for the paced strategies, in milliseconds
    #[serde(default = "default_initial_delay")]
    pub retry_delay_ms: u64,

    /// Report failures without failing the run
    #[serde(default)]
    pub ignore_errors: bool,
}

impl Default for SecfetchConfig {
    fn default() -> Self {
        Self {
            prefixes: ProviderPrefixes::default(),
            retries: default_retries(),
            timeout_secs: default_timeout_secs(),
            retry_strategy: RetryStrategy::default(),
            retry_delay_ms: default_initial_delay(),
            ignore_errors: false,
        }
    }
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl SecfetchConfig {
    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let tagged = self.prefixes.tagged();

        for (tag, prefix) in &tagged {
            if prefix.is_empty() {
                return Err(Error::invalid_config(format!(
                    "trigger for the {} provider must not be empty",
                    tag
                )));
            }
        }

        for (i, (first, prefix)) in tagged.iter().enumerate() {
            if let Some((second, _)) = tagged[i + 1..].iter().find(|(_, p)| p == prefix) {
                return Err(Error::DuplicatePrefix {
                    prefix: prefix.to_string(),
                    first: *first,
                    second: *second,
                });
            }
        }

        if self.retries == 0 {
            return Err(Error::invalid_config("retries must be at least 1"));
        }

        if self.timeout_secs == 0 {
            return Err(Error::invalid_config("timeout must be at least 1 second"));
        }

        Ok(())
    }

    /// Retry policy applied to every fetch
    ///
    /// With the default strategy attempts follow each other immediately and
    /// the line deadline is the only time bound.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retries,
            strategy: self.retry_strategy,
            initial_delay_ms: self.retry_delay_ms,
            ..RetryPolicy::default()
        }
    }

    /// Deadline shared by every fetch on one line
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry policy for an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Retry strategy
    #[serde(default)]
    pub strategy: RetryStrategy,

    /// Backoff multiplier for exponential strategies
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            strategy: RetryStrategy::default(),
            backoff_multiplier: default_backoff_multiplier(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_RETRIES
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_initial_delay() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
fn default_max_delay() -> u64 {
    5000
}

/// Retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetryStrategy {
    /// Retry immediately (default)
    #[default]
    None,

    /// Fixed delay between retries
    FixedDelay,

    /// Exponential backoff
    ExponentialBackoff,

    /// Linear backoff
    LinearBackoff,
}

impl RetryStrategy {
    /// Names accepted by `from_str`, in declaration order
    pub const NAMES: [&'static str; 4] = ["none", "fixed", "exponential", "linear"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FixedDelay => "fixed",
            Self::ExponentialBackoff => "exponential",
            Self::LinearBackoff => "linear",
        }
    }
}

impl fmt::Display for RetryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetryStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fixed" | "fixed-delay" => Ok(Self::FixedDelay),
            "exponential" | "exponential-backoff" => Ok(Self::ExponentialBackoff),
            "linear" | "linear-backoff" => Ok(Self::LinearBackoff),
            other => Err(Error::invalid_config(format!(
                "unknown retry strategy '{}' (expected one of: {})",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}
