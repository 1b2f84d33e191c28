//! Retry observation and logging
//!
//! This module provides the `RetryObserver` trait for monitoring retry attempts
//! and a `TracingObserver` implementation that logs using the `tracing` crate.

use std::error::Error;
#[cfg(test)]
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Observer trait for retry attempt events
///
/// Implement this trait to receive callbacks during retry execution.
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// Called when an attempt fails and will be retried
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration);

    /// Called when the operation succeeds
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// Called when all retry attempts are exhausted
    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error);

    /// Called when the shared deadline cuts the retry short
    fn on_deadline_exceeded(&self, attempts: u32) {
        let _ = attempts;
    }
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_success`: INFO (if > 1 attempt) or DEBUG (first attempt)
/// - `on_exhausted`: DEBUG (the caller reports the final failure)
/// - `on_deadline_exceeded`: WARN
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried (for log context)
    operation: String,
}

impl TracingObserver {
    /// Create a new tracing observer
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Get the operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            max_attempts = max_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                operation = %self.operation,
                attempt = attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        tracing::debug!(
            operation = %self.operation,
            attempts = attempts,
            error = %final_error,
            "all retry attempts exhausted"
        );
    }

    fn on_deadline_exceeded(&self, attempts: u32) {
        tracing::warn!(
            operation = %self.operation,
            attempts = attempts,
            "deadline exceeded, giving up"
        );
    }
}

/// An observer that collects statistics about retry attempts
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    exhaustions: AtomicU32,
    deadlines: AtomicU32,
}

#[cfg(test)]
impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of attempt starts
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    /// Get the number of failures
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Get the number of successes
    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    /// Get the number of exhaustions
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    /// Get the number of deadline expiries
    pub fn deadlines(&self) -> u32 {
        self.deadlines.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_deadline_exceeded(&self, _attempts: u32) {
        self.deadlines.fetch_add(1, Ordering::SeqCst);
    }
}

/// Implement RetryObserver for Arc<T> where T: RetryObserver
#[cfg(test)]
impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_deadline_exceeded(&self, attempts: u32) {
        (**self).on_deadline_exceeded(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_noop_observer() {
        let observer = NoOpObserver;
        let error = io::Error::other("test");

        observer.on_attempt_start(1, 3);
        observer.on_attempt_failed(1, &error, Duration::from_millis(100));
        observer.on_success(2, Duration::from_millis(500));
        observer.on_exhausted(3, &error);
        observer.on_deadline_exceeded(2);
    }

    #[test]
    fn test_stats_observer_exhaustion() {
        let observer = StatsObserver::new();
        let error = io::Error::other("test");

        observer.on_attempt_start(1, 3);
        observer.on_attempt_failed(1, &error, Duration::ZERO);
        observer.on_attempt_start(2, 3);
        observer.on_attempt_failed(2, &error, Duration::ZERO);
        observer.on_attempt_start(3, 3);
        observer.on_exhausted(3, &error);

        assert_eq!(observer.attempt_starts(), 3);
        assert_eq!(observer.failures(), 2);
        assert_eq!(observer.exhaustions(), 1);
        assert_eq!(observer.deadlines(), 0);
    }

    #[test]
    fn test_tracing_observer_creation() {
        let observer = TracingObserver::new("ssm /app/db");
        assert_eq!(observer.operation(), "ssm /app/db");

        let default_observer = TracingObserver::default();
        assert_eq!(default_observer.operation(), "retry");
    }

    #[test]
    fn test_arc_observer() {
        let observer = std::sync::Arc::new(StatsObserver::new());

        observer.on_attempt_start(1, 3);
        observer.on_deadline_exceeded(1);

        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.deadlines(), 1);
    }
}
