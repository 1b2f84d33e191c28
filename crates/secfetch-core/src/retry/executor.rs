//! Retry execution engine
//!
//! This module provides the core retry execution logic with configurable
//! policies, observers and an optional shared deadline.

use std::error::Error;
use std::future::Future;
use std::time::Instant as StdInstant;

use tokio::time::Instant;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::strategies::calculate_delay;

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use secfetch_core::retry::{RetryExecutorBuilder, TracingObserver};
/// use secfetch_core::types::RetryPolicy;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::default())
///     .with_observer(TracingObserver::new("fetch"))
///     .with_jitter(false)
///     .build();
/// ```
pub struct RetryExecutorBuilder<O = NoOpObserver> {
    policy: RetryPolicy,
    observer: O,
    jitter: bool,
    deadline: Option<Instant>,
}

impl Default for RetryExecutorBuilder<NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<NoOpObserver> {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            observer: NoOpObserver,
            jitter: true,
            deadline: None,
        }
    }
}

impl<O> RetryExecutorBuilder<O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            observer,
            jitter: self.jitter,
            deadline: self.deadline,
        }
    }

    /// Enable or disable jitter (enabled by default)
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Bound every attempt and every delay by `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<O> {
        RetryExecutor {
            policy: self.policy,
            observer: self.observer,
            jitter: self.jitter,
            deadline: self.deadline,
        }
    }
}

/// A retry executor with configurable policy, observer and deadline
///
/// Use `RetryExecutorBuilder` to create an instance. Every error is retried;
/// a policy with `max_attempts == 0` still makes one attempt.
pub struct RetryExecutor<O> {
    policy: RetryPolicy,
    observer: O,
    jitter: bool,
    deadline: Option<Instant>,
}

impl<O> RetryExecutor<O>
where
    O: RetryObserver,
{
    /// Execute an operation with retry logic
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + Send + 'static,
    {
        let start = StdInstant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<E> = None;
        let mut attempt = 0;

        loop {
            if self.deadline_passed() {
                self.observer.on_deadline_exceeded(attempt);
                return Err(RetryError::deadline_exceeded(attempt, last_error));
            }

            attempt += 1;
            self.observer.on_attempt_start(attempt, max_attempts);

            let outcome = match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, op()).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        self.observer.on_deadline_exceeded(attempt);
                        return Err(RetryError::deadline_exceeded(attempt, last_error));
                    }
                },
                None => op().await,
            };

            match outcome {
                Ok(result) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(result);
                }
                Err(err) => {
                    if attempt >= max_attempts {
                        self.observer.on_exhausted(attempt, &err);
                        return Err(RetryError::exhausted(attempt, err, start.elapsed()));
                    }

                    let delay = calculate_delay(&self.policy, attempt, self.jitter);
                    self.observer.on_attempt_failed(attempt, &err, delay);
                    last_error = Some(err);

                    if !delay.is_zero() {
                        let wake = Instant::now() + delay;
                        let wake = match self.deadline {
                            Some(deadline) => wake.min(deadline),
                            None => wake,
                        };
                        tokio::time::sleep_until(wake).await;
                    }
                }
            }
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}
