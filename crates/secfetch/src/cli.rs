//! CLI argument parsing with clap
//!
//! Every option can also be set through its environment variable.

use clap::builder::FalseyValueParser;
use clap::Parser;
use secfetch_core::types::{
    DEFAULT_BASE64_PREFIX, DEFAULT_ENV_PREFIX, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SECRETS_PREFIX, DEFAULT_SSM_PREFIX, DEFAULT_TIMEOUT_SECS,
};
use secfetch_core::{ProviderPrefixes, RetryStrategy, SecfetchConfig};

/// Replace secret placeholders in text read from stdin
///
/// Placeholders look like `ssm://app/db//password`, `secrets://prod/api//token`,
/// `env://HOME` or `base64://aGVsbG8=`; append `//base64` to encode the result.
#[derive(Parser, Debug)]
#[command(name = "secfetch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Trigger for parameter store placeholders
    #[arg(long, env = "SEC_SSM_PREFIX", default_value = DEFAULT_SSM_PREFIX)]
    pub ssm_prefix: String,

    /// Trigger for secrets manager placeholders
    #[arg(long, env = "SEC_SECRETS_PREFIX", default_value = DEFAULT_SECRETS_PREFIX)]
    pub secrets_prefix: String,

    /// Trigger for environment variable placeholders
    #[arg(long, env = "SEC_ENV_PREFIX", default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,

    /// Trigger for inline base64 placeholders
    #[arg(long, env = "SEC_BASE64_PREFIX", default_value = DEFAULT_BASE64_PREFIX)]
    pub base64_prefix: String,

    /// Fetch attempts per placeholder
    #[arg(long, env = "RETRIES", default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Pacing between attempts: none, fixed, exponential or linear
    #[arg(long, env = "SEC_RETRY_STRATEGY", default_value_t = RetryStrategy::None)]
    pub retry_strategy: RetryStrategy,

    /// Base delay between attempts for the paced strategies
    #[arg(long, env = "SEC_RETRY_DELAY", value_name = "MILLISECONDS", default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay: u64,

    /// Time budget for all fetches on one line
    #[arg(long, env = "SEC_TIMEOUT", value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Log unresolved placeholders without failing the run
    #[arg(long, env = "SEC_IGNORE_ERR", value_parser = FalseyValueParser::new())]
    pub ignore_errors: bool,

    /// AWS region (defaults to the SDK's region chain)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run configuration described by the parsed arguments
    pub fn config(&self) -> SecfetchConfig {
        SecfetchConfig {
            prefixes: ProviderPrefixes {
                ssm: self.ssm_prefix.clone(),
                secrets: self.secrets_prefix.clone(),
                env: self.env_prefix.clone(),
                base64: self.base64_prefix.clone(),
            },
            retries: self.retries,
            timeout_secs: self.timeout,
            retry_strategy: self.retry_strategy,
            retry_delay_ms: self.retry_delay,
            ignore_errors: self.ignore_errors,
        }
    }
}
