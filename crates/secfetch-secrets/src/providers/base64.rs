//! Inline base64 provider
//!
//! The identifier is the payload itself; fetching decodes it locally.

use crate::error::{Result, SecretError};
use crate::placeholder::build_pattern;
use crate::providers::{FetchContext, SecretProvider};
use ::base64::engine::general_purpose::STANDARD;
use ::base64::Engine;
use async_trait::async_trait;
use regex::Regex;

const CHARSET: &str = "a-zA-Z0-9+/=";

pub struct Base64Provider {
    prefix: String,
    pattern: Regex,
}

impl Base64Provider {
    pub fn new(prefix: &str) -> Result<Self> {
        Ok(Self {
            prefix: prefix.to_string(),
            pattern: build_pattern(prefix, CHARSET)?,
        })
    }
}

#[async_trait]
impl SecretProvider for Base64Provider {
    async fn fetch(&self, _ctx: &FetchContext, identifier: &str) -> Result<String> {
        let bytes = STANDARD
            .decode(identifier)
            .map_err(|e| SecretError::DecodeFailed {
                message: e.to_string(),
            })?;

        String::from_utf8(bytes).map_err(|e| SecretError::DecodeFailed {
            message: e.to_string(),
        })
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn name(&self) -> &'static str {
        "base64"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    fn ctx() -> FetchContext {
        FetchContext::new(Instant::now() + Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_decode_valid_payload() {
        let provider = Base64Provider::new("base64://").unwrap();
        let value = provider.fetch(&ctx(), "aGVsbG8gd29ybGQ=").await.unwrap();
        assert_eq!(value, "hello world");
    }

    #[tokio::test]
    async fn test_decode_invalid_payload() {
        let provider = Base64Provider::new("base64://").unwrap();
        let err = provider.fetch(&ctx(), "invalid==").await.unwrap_err();
        assert!(matches!(err, SecretError::DecodeFailed { .. }));
    }

    #[tokio::test]
    async fn test_decode_non_utf8_payload() {
        // 0xff 0xfe
        let provider = Base64Provider::new("base64://").unwrap();
        let err = provider.fetch(&ctx(), "//4=").await.unwrap_err();
        assert!(matches!(err, SecretError::DecodeFailed { .. }));
    }

    #[test]
    fn test_prefix_and_pattern() {
        let provider = Base64Provider::new("b64:").unwrap();
        assert_eq!(provider.prefix(), "b64:");
        assert_eq!(provider.name(), "base64");

        let m = provider.pattern().find("v=b64:dXNlcg==, next").unwrap();
        assert_eq!(m.as_str(), "b64:dXNlcg==");
    }
}
