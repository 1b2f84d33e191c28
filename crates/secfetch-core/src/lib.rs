//! # secfetch-core
//!
//! Core library for secfetch providing:
//! - Run configuration (provider triggers, retry count, fetch deadline, error policy)
//! - Configuration validation errors
//! - Retry execution engine with policy-based configuration and a shared deadline

pub mod error;
pub mod retry;
pub mod types;

pub use error::{Error, Result};
pub use types::{ProviderPrefixes, RetryPolicy, RetryStrategy, SecfetchConfig};
