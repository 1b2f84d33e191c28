//! Security utilities for secret handling
//!
//! Provides:
//! - SecureString with zeroize
//! - Fingerprints (truncated SHA-256) for logging resolved values
//! - Audit logging (never logs secret values)

use crate::error::SecretError;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of hash bytes kept in a fingerprint
const FINGERPRINT_BYTES: usize = 8;

/// A secure string that is automatically zeroed on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get the string value (use with caution)
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to owned String (consumes self)
    pub fn into_string(mut self) -> String {
        std::mem::take(&mut self.inner)
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString([REDACTED {} bytes])", self.len())
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Fingerprint of a secret value: the first 8 bytes of its SHA-256, hex encoded
///
/// Only for correlating log lines; never used for lookups.
pub fn fingerprint(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

/// Audit log entry for one secret lookup
#[derive(Debug, Clone)]
pub struct AuditLog {
    pub operation: &'static str,
    pub provider: &'static str,
    pub identifier: String,
    pub checksum: Option<String>,
    pub error: Option<String>,
}

impl AuditLog {
    /// A backend fetch of `value`
    pub fn fetched(provider: &'static str, identifier: &str, value: &SecureString) -> Self {
        Self::with_checksum("fetch", provider, identifier, value)
    }

    /// A cache hit returning `value`
    pub fn cached(provider: &'static str, identifier: &str, value: &SecureString) -> Self {
        Self::with_checksum("cache", provider, identifier, value)
    }

    /// A failed resolution of the placeholder text `placeholder`
    ///
    /// The operation names the stage that failed.
    pub fn failed(provider: &'static str, placeholder: &str, error: &SecretError) -> Self {
        Self {
            operation: error.stage(),
            provider,
            identifier: placeholder.to_string(),
            checksum: None,
            error: Some(error.to_string()),
        }
    }

    fn with_checksum(
        operation: &'static str,
        provider: &'static str,
        identifier: &str,
        value: &SecureString,
    ) -> Self {
        Self {
            operation,
            provider,
            identifier: identifier.to_string(),
            checksum: Some(fingerprint(value.as_str())),
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Log the audit entry (never logs secret values)
    pub fn log(&self) {
        match &self.error {
            None => tracing::info!(
                operation = self.operation,
                provider = self.provider,
                identifier = %self.identifier,
                checksum = self.checksum.as_deref().unwrap_or_default(),
                "secret resolved"
            ),
            Some(error) => tracing::error!(
                operation = self.operation,
                provider = self.provider,
                placeholder = %self.identifier,
                error = %error,
                "failed to resolve placeholder"
            ),
        }
    }
}
