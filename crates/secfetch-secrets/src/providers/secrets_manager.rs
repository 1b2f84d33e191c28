//! Secrets Manager provider
//!
//! Identifiers are secret names or ARNs and are passed through unchanged.

use crate::error::{Result, SecretError};
use crate::placeholder::build_pattern;
use crate::providers::{FetchContext, SecretProvider};
use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use regex::Regex;
use tracing::debug;

/// Identifier charset: alphanumerics and `/_+=.@:-`, enough for names and ARNs
const CHARSET: &str = "a-zA-Z0-9/_+=.@:-";

/// Secrets Manager backend capability
#[async_trait]
pub trait SecretsManagerClient: Send + Sync {
    /// Fetch the string value of `secret_id`
    ///
    /// Binary-only secrets yield `Ok(None)`.
    async fn fetch_secret_string(&self, secret_id: &str) -> anyhow::Result<Option<String>>;
}

#[async_trait]
impl SecretsManagerClient for aws_sdk_secretsmanager::Client {
    async fn fetch_secret_string(&self, secret_id: &str) -> anyhow::Result<Option<String>> {
        let output = self
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| anyhow!("get secret value: {}", DisplayErrorContext(&e)))?;

        Ok(output.secret_string().map(str::to_string))
    }
}

pub struct SecretsManagerProvider<C> {
    client: C,
    prefix: String,
    pattern: Regex,
}

impl<C: SecretsManagerClient> SecretsManagerProvider<C> {
    pub fn new(client: C, prefix: &str) -> Result<Self> {
        Ok(Self {
            client,
            prefix: prefix.to_string(),
            pattern: build_pattern(prefix, CHARSET)?,
        })
    }
}

#[async_trait]
impl<C: SecretsManagerClient> SecretProvider for SecretsManagerProvider<C> {
    async fn fetch(&self, ctx: &FetchContext, identifier: &str) -> Result<String> {
        debug!(secret_id = %identifier, "get secret value");

        let value = ctx
            .bounded(identifier, async {
                self.client
                    .fetch_secret_string(identifier)
                    .await
                    .map_err(|e| SecretError::fetch_failed(identifier, format!("{:#}", e)))
            })
            .await?;

        value.ok_or_else(|| SecretError::EmptyPayload {
            identifier: identifier.to_string(),
        })
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn name(&self) -> &'static str {
        "secrets"
    }
}
