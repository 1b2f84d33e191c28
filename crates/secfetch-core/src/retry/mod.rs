//! Retry execution engine with policy-based configuration
//!
//! Every secret fetch goes through this engine. It retries uniformly (no
//! error is treated as permanent) and can be bounded by a deadline shared
//! across several executions, so that one slow line cannot stall the run.
//!
//! # Features
//!
//! - Multiple retry strategies: None, Fixed, Exponential, Linear backoff
//! - Configurable jitter for backoff delays
//! - Optional shared deadline bounding every attempt and every delay
//! - Observable retry attempts via the `RetryObserver` trait
//! - Built-in `TracingObserver` for logging
//!
//! # Example
//!
//! ```rust,no_run
//! use secfetch_core::retry::{RetryError, RetryExecutorBuilder, TracingObserver};
//! use secfetch_core::types::RetryPolicy;
//! use std::time::Duration;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
//!
//!     RetryExecutorBuilder::new()
//!         .with_policy(RetryPolicy::default())
//!         .with_observer(TracingObserver::new("fetch"))
//!         .with_deadline(deadline)
//!         .build()
//!         .execute(|| async { Ok("value".to_string()) })
//!         .await
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::{RetryExecutor, RetryExecutorBuilder};
pub use observer::{NoOpObserver, RetryObserver, TracingObserver};
pub use strategies::calculate_delay;
