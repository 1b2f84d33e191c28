//! Secret provider trait and implementations

pub mod base64;
pub mod env;
pub mod secrets_manager;
pub mod ssm;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use secfetch_core::ProviderPrefixes;
use std::future::Future;
use tokio::time::Instant;

pub use self::base64::Base64Provider;
pub use env::EnvProvider;
pub use secrets_manager::{SecretsManagerClient, SecretsManagerProvider};
pub use ssm::{ParameterStoreClient, SsmProvider};

/// Per-line fetch context
///
/// Carries the deadline shared by every fetch on the current line.
#[derive(Debug, Clone, Copy)]
pub struct FetchContext {
    deadline: Instant,
}

impl FetchContext {
    pub fn new(deadline: Instant) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Run a backend call, failing it once the deadline passes
    pub async fn bounded<T, F>(&self, identifier: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(crate::error::SecretError::fetch_failed(
                identifier,
                "deadline exceeded",
            )),
        }
    }
}

/// Trait for secret providers
///
/// A provider owns a trigger prefix and a pattern recognising its
/// placeholders, and turns an identifier into a raw secret body.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Fetch the raw body for `identifier`
    async fn fetch(&self, ctx: &FetchContext, identifier: &str) -> Result<String>;

    /// Trigger text, e.g. `ssm://`
    fn prefix(&self) -> &str;

    /// Pattern matching this provider's placeholders, starting with the literal prefix
    fn pattern(&self) -> &Regex;

    /// Short tag for log output
    fn name(&self) -> &'static str;
}

/// Build the providers in resolution order: parameter store, secrets
/// manager, environment, base64
pub fn build_registry<P, S>(
    prefixes: &ProviderPrefixes,
    parameter_store: P,
    secrets_manager: S,
) -> Result<Vec<Box<dyn SecretProvider>>>
where
    P: ParameterStoreClient + 'static,
    S: SecretsManagerClient + 'static,
{
    Ok(vec![
        Box::new(SsmProvider::new(parameter_store, &prefixes.ssm)?),
        Box::new(SecretsManagerProvider::new(
            secrets_manager,
            &prefixes.secrets,
        )?),
        Box::new(EnvProvider::new(&prefixes.env)?),
        Box::new(Base64Provider::new(&prefixes.base64)?),
    ])
}
