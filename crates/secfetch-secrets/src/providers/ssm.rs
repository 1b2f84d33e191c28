//! Parameter store provider
//!
//! Identifiers are parameter paths; a missing leading `/` is added. Secure
//! string parameters are always decrypted.

use crate::error::{Result, SecretError};
use crate::placeholder::build_pattern;
use crate::providers::{FetchContext, SecretProvider};
use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use regex::Regex;
use tracing::debug;

/// Identifier charset: alphanumerics and `_.-/`
const CHARSET: &str = "a-zA-Z0-9_./-";

/// Parameter store backend capability
#[async_trait]
pub trait ParameterStoreClient: Send + Sync {
    /// Fetch the decrypted value of parameter `name`
    ///
    /// Returns `Ok(None)` when the parameter carries no value.
    async fn fetch_parameter(&self, name: &str) -> anyhow::Result<Option<String>>;
}

#[async_trait]
impl ParameterStoreClient for aws_sdk_ssm::Client {
    async fn fetch_parameter(&self, name: &str) -> anyhow::Result<Option<String>> {
        let output = self
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| anyhow!("get parameter: {}", DisplayErrorContext(&e)))?;

        Ok(output
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(str::to_string))
    }
}

pub struct SsmProvider<C> {
    client: C,
    prefix: String,
    pattern: Regex,
}

impl<C: ParameterStoreClient> SsmProvider<C> {
    pub fn new(client: C, prefix: &str) -> Result<Self> {
        Ok(Self {
            client,
            prefix: prefix.to_string(),
            pattern: build_pattern(prefix, CHARSET)?,
        })
    }

    /// Parameter name for `path`, with a leading `/`
    pub fn parameter_name(path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }
}

#[async_trait]
impl<C: ParameterStoreClient> SecretProvider for SsmProvider<C> {
    async fn fetch(&self, ctx: &FetchContext, identifier: &str) -> Result<String> {
        let name = Self::parameter_name(identifier);
        debug!(parameter = %name, "get ssm");

        let value = ctx
            .bounded(&name, async {
                self.client
                    .fetch_parameter(&name)
                    .await
                    .map_err(|e| SecretError::fetch_failed(&name, format!("{:#}", e)))
            })
            .await?;

        value.ok_or(SecretError::EmptyPayload { identifier: name })
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn pattern(&self) -> &Regex {
        &self.pattern
    }

    fn name(&self) -> &'static str {
        "ssm"
    }
}
