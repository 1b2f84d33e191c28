//! Environment variable provider

use crate::error::{Result, SecretError};
use crate::placeholder::build_pattern;
use crate::providers::{FetchContext, SecretProvider};
use async_trait::async_trait;
use regex::Regex;

const CHARSET: &str = "a-zA-Z0-9_";

/// Reads secrets from the process environment
pub struct EnvProvider {
    prefix: String,
    pattern: Regex,
}

impl EnvProvider {
    pub fn new(prefix: &str) -> Result<Self> {
        Ok(Self {
            prefix: prefix.to_string(),
            pattern: build_pattern(prefix, CHARSET)?,
        })
    }
}

#[async_trait]
impl SecretProvider for EnvProvider {
    async fn fetch(&self, _ctx: &FetchContext, identifier: &str) -> Result<String> {
        // An empty variable counts as unset
        match std::env::var(identifier) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(SecretError::NotFound {
                name: identifier.to_string(),
            }),
        }
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;
    use tokio::time::Instant;

    fn ctx() -> FetchContext {
        FetchContext::new(Instant::now() + Duration::from_secs(30))
    }

    #[tokio::test]
    #[serial]
    async fn test_env_provider_fetch() {
        std::env::set_var("SECFETCH_TEST_SECRET", "my_secret_value");

        let provider = EnvProvider::new("env://").unwrap();
        let value = provider.fetch(&ctx(), "SECFETCH_TEST_SECRET").await.unwrap();
        assert_eq!(value, "my_secret_value");

        std::env::remove_var("SECFETCH_TEST_SECRET");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_provider_not_found() {
        std::env::remove_var("SECFETCH_TEST_MISSING");

        let provider = EnvProvider::new("env://").unwrap();
        let err = provider
            .fetch(&ctx(), "SECFETCH_TEST_MISSING")
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::NotFound { ref name } if name == "SECFETCH_TEST_MISSING"));
    }

    #[tokio::test]
    #[serial]
    async fn test_env_provider_empty_is_not_found() {
        std::env::set_var("SECFETCH_TEST_EMPTY", "");

        let provider = EnvProvider::new("env://").unwrap();
        let result = provider.fetch(&ctx(), "SECFETCH_TEST_EMPTY").await;
        assert!(matches!(result, Err(SecretError::NotFound { .. })));

        std::env::remove_var("SECFETCH_TEST_EMPTY");
    }

    #[test]
    fn test_env_pattern_stops_at_non_identifier() {
        let provider = EnvProvider::new("env://").unwrap();
        let m = provider.pattern().find("PATH=env://HOME-dir").unwrap();
        assert_eq!(m.as_str(), "env://HOME");
    }
}
