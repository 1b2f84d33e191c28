//! Error types for the retry execution engine
//!
//! A retried operation ends in one of two ways short of success: every
//! attempt failed, or the shared deadline ran out first.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during retry execution
///
/// The error type is generic over `E`, the underlying error type from the
/// operation being retried.
#[derive(Debug)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The shared deadline expired
    ///
    /// Either an attempt was still in flight when the deadline passed (it is
    /// dropped), or the deadline had already passed before the next attempt.
    DeadlineExceeded {
        /// Number of attempts started before the deadline hit
        attempts: u32,
        /// The last completed attempt's error, if any
        last_error: Option<E>,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "retry exhausted after {} attempts over {:.2}s: {}",
                    attempts,
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::DeadlineExceeded {
                attempts,
                last_error,
            } => {
                if let Some(err) = last_error {
                    write!(
                        f,
                        "deadline exceeded after {} attempts: {}",
                        attempts, err
                    )
                } else {
                    write!(f, "deadline exceeded after {} attempts", attempts)
                }
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::DeadlineExceeded {
                last_error: Some(err),
                ..
            } => Some(err),
            RetryError::DeadlineExceeded { .. } => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new deadline error
    pub fn deadline_exceeded(attempts: u32, last_error: Option<E>) -> Self {
        RetryError::DeadlineExceeded {
            attempts,
            last_error,
        }
    }

    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::DeadlineExceeded { attempts, .. } => *attempts,
        }
    }

    /// Check if this error indicates all retries were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if this error indicates the deadline ran out
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, RetryError::DeadlineExceeded { .. })
    }

    /// Get the underlying error, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::DeadlineExceeded { last_error, .. } => last_error,
        }
    }
}
