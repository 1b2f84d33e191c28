//! Placeholder resolution for secfetch
//!
//! This crate rewrites text lines by replacing placeholders such as
//! `ssm://app/db//password` with live secret values:
//! - **Providers**: parameter store, secrets manager, environment, inline base64
//! - **Grammar**: `<prefix><identifier>[//<key>][//base64]`
//! - **Structured payloads**: JSON then YAML key lookup
//! - **Caching**: at most one backend fetch per identifier per run
//! - **Retries**: uniform retry policy bounded by a per-line deadline

pub mod aws;
pub mod cache;
pub mod error;
pub mod payload;
pub mod placeholder;
pub mod providers;
pub mod resolver;
pub mod security;

pub use aws::AwsClients;
pub use cache::{CacheLookup, SecretCache};
pub use error::{Result, SecretError};
pub use placeholder::Placeholder;
pub use providers::{
    build_registry, Base64Provider, EnvProvider, FetchContext, ParameterStoreClient,
    SecretProvider, SecretsManagerClient, SecretsManagerProvider, SsmProvider,
};
pub use resolver::{LineResolution, SecretResolver, Unresolved};
pub use security::{fingerprint, AuditLog, SecureString};
