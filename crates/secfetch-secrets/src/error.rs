//! Error types for placeholder resolution

use thiserror::Error;

/// Result type alias using `SecretError`
pub type Result<T> = std::result::Result<T, SecretError>;

/// Failures while resolving a placeholder or reading input
#[derive(Error, Debug)]
pub enum SecretError {
    /// Backend call failed
    #[error("fetch {identifier}: {message}")]
    FetchFailed { identifier: String, message: String },

    /// Backend answered without a usable string body
    #[error("secret {identifier} has no string value")]
    EmptyPayload { identifier: String },

    /// Environment variable absent or empty
    #[error("environment variable {name} not found")]
    NotFound { name: String },

    /// Inline payload is not valid base64 text
    #[error("decode base64: {message}")]
    DecodeFailed { message: String },

    /// Structured body has no such key
    #[error("key {key} not found in secret body")]
    KeyNotFound { key: String },

    /// Body is neither a JSON nor a YAML mapping
    #[error("secret body is neither a JSON nor a YAML mapping: {reason}")]
    UnparseableBody { reason: String },

    /// Every fetch attempt failed
    #[error("fetch {identifier} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        identifier: String,
        attempts: u32,
        #[source]
        source: Box<SecretError>,
    },

    /// The line's fetch deadline ran out
    #[error("fetch {identifier} exceeded the deadline after {attempts} attempts")]
    DeadlineExceeded { identifier: String, attempts: u32 },

    /// Reading the input stream failed
    #[error("error reading standard input: {0}")]
    InputRead(#[from] std::io::Error),

    /// Provider trigger produced an unusable pattern
    #[error("invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl SecretError {
    /// Create a fetch failure
    pub fn fetch_failed(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Whether this error came out of a single provider fetch
    ///
    /// These are the errors the retry policy retries.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. }
                | Self::EmptyPayload { .. }
                | Self::NotFound { .. }
                | Self::DecodeFailed { .. }
        )
    }

    /// Pipeline stage a resolution failure came from: `fetch` or `extract`
    pub fn stage(&self) -> &'static str {
        match self.root() {
            Self::DeadlineExceeded { .. } => "fetch",
            err if err.is_fetch_error() => "fetch",
            Self::KeyNotFound { .. } | Self::UnparseableBody { .. } => "extract",
            _ => "resolve",
        }
    }

    /// The provider error behind a retry failure, or `self`
    pub fn root(&self) -> &SecretError {
        match self {
            Self::RetriesExhausted { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_classification() {
        assert!(SecretError::fetch_failed("/a", "boom").is_fetch_error());
        assert!(SecretError::NotFound {
            name: "X".to_string()
        }
        .is_fetch_error());
        assert!(!SecretError::KeyNotFound {
            key: "k".to_string()
        }
        .is_fetch_error());
        assert!(!SecretError::DeadlineExceeded {
            identifier: "/a".to_string(),
            attempts: 1
        }
        .is_fetch_error());
    }

    #[test]
    fn test_stage_of_failures() {
        let exhausted = SecretError::RetriesExhausted {
            identifier: "/a".to_string(),
            attempts: 3,
            source: Box::new(SecretError::fetch_failed("/a", "throttled")),
        };
        assert_eq!(exhausted.stage(), "fetch");
        assert_eq!(
            SecretError::DeadlineExceeded {
                identifier: "/a".to_string(),
                attempts: 0
            }
            .stage(),
            "fetch"
        );
        assert_eq!(
            SecretError::KeyNotFound {
                key: "k".to_string()
            }
            .stage(),
            "extract"
        );
        assert_eq!(
            SecretError::InputRead(std::io::Error::other("closed")).stage(),
            "resolve"
        );
    }

    #[test]
    fn test_root_unwraps_retry_failure() {
        let err = SecretError::RetriesExhausted {
            identifier: "TOKEN".to_string(),
            attempts: 3,
            source: Box::new(SecretError::NotFound {
                name: "TOKEN".to_string(),
            }),
        };

        assert!(matches!(err.root(), SecretError::NotFound { .. }));
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("TOKEN"));
    }
}
