//! Line resolution pipeline
//!
//! Runs every provider over a line in registry order. Each provider scans
//! the output of the previous provider's pass, so text produced by an
//! earlier provider can be matched by a later one.
//!
//! Per placeholder:
//! - cache lookup on `prefix + path`, fetching with retries on a miss
//! - optional key extraction from a JSON or YAML body
//! - optional base64 re-encoding
//! - replacement of the first remaining occurrence of the placeholder text

use crate::cache::{CacheLookup, SecretCache};
use crate::error::{Result, SecretError};
use crate::payload;
use crate::placeholder::{scan, Placeholder};
use crate::providers::{FetchContext, SecretProvider};
use crate::security::{AuditLog, SecureString};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secfetch_core::retry::{RetryError, RetryExecutorBuilder, TracingObserver};
use secfetch_core::{RetryPolicy, SecfetchConfig};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A placeholder left in the output because it could not be resolved
#[derive(Debug)]
pub struct Unresolved {
    /// Placeholder text as it appears in the line
    pub placeholder: String,
    /// Tag of the provider that matched it
    pub provider: &'static str,
    pub error: SecretError,
}

/// Outcome of resolving one line
#[derive(Debug)]
pub struct LineResolution {
    /// The rewritten line
    pub line: String,
    /// Placeholders that kept their literal text
    pub unresolved: Vec<Unresolved>,
}

impl LineResolution {
    /// Whether every placeholder on the line was replaced
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolves placeholders through an ordered set of providers
pub struct SecretResolver {
    providers: Vec<Box<dyn SecretProvider>>,
    cache: SecretCache,
    policy: RetryPolicy,
    fetch_timeout: Duration,
}

impl SecretResolver {
    /// Create a resolver with an empty cache
    pub fn new(
        providers: Vec<Box<dyn SecretProvider>>,
        policy: RetryPolicy,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            cache: SecretCache::new(),
            policy,
            fetch_timeout,
        }
    }

    /// Create a resolver using the retry and deadline settings of `config`
    pub fn from_config(providers: Vec<Box<dyn SecretProvider>>, config: &SecfetchConfig) -> Self {
        Self::new(providers, config.retry_policy(), config.fetch_timeout())
    }

    pub fn cache(&self) -> &SecretCache {
        &self.cache
    }

    /// Resolve every placeholder in `line`
    ///
    /// Failures never abort the line: each failing placeholder is logged once,
    /// keeps its literal text and is listed in the result.
    pub async fn resolve_line(&self, line: &str) -> LineResolution {
        let ctx = FetchContext::new(Instant::now() + self.fetch_timeout);
        let mut current = line.to_string();
        let mut unresolved = Vec::new();

        for provider in &self.providers {
            let snapshot = current.clone();
            let placeholders = scan(provider.pattern(), provider.prefix(), &snapshot);
            if placeholders.is_empty() {
                continue;
            }
            debug!(
                provider = provider.name(),
                count = placeholders.len(),
                "placeholders found"
            );

            for placeholder in placeholders {
                match self
                    .resolve_placeholder(provider.as_ref(), &ctx, &placeholder)
                    .await
                {
                    Ok(value) => {
                        current = current.replacen(placeholder.raw, &value, 1);
                    }
                    Err(error) => {
                        AuditLog::failed(provider.name(), placeholder.raw, &error).log();
                        unresolved.push(Unresolved {
                            placeholder: placeholder.raw.to_string(),
                            provider: provider.name(),
                            error,
                        });
                    }
                }
            }
        }

        LineResolution {
            line: current,
            unresolved,
        }
    }

    async fn resolve_placeholder(
        &self,
        provider: &dyn SecretProvider,
        ctx: &FetchContext,
        placeholder: &Placeholder<'_>,
    ) -> Result<String> {
        let key = SecretCache::key(provider.prefix(), &placeholder.path);
        let (body, lookup) = self
            .cache
            .get_or_fetch(&key, || self.fetch_with_retry(provider, ctx, &placeholder.path))
            .await?;

        let audit = match lookup {
            CacheLookup::Fetched => AuditLog::fetched(provider.name(), &placeholder.path, &body),
            CacheLookup::Hit => AuditLog::cached(provider.name(), &placeholder.path, &body),
        };
        audit.log();

        let value = match &placeholder.key {
            Some(key) => payload::extract(body.as_str(), key)?,
            None => body.as_str().to_string(),
        };

        if placeholder.wants_encoding {
            Ok(STANDARD.encode(value.as_bytes()))
        } else {
            Ok(value)
        }
    }

    async fn fetch_with_retry(
        &self,
        provider: &dyn SecretProvider,
        ctx: &FetchContext,
        path: &str,
    ) -> Result<SecureString> {
        let executor = RetryExecutorBuilder::new()
            .with_policy(self.policy.clone())
            .with_observer(TracingObserver::new(format!("{} {}", provider.name(), path)))
            .with_deadline(ctx.deadline())
            .build();

        executor
            .execute(|| provider.fetch(ctx, path))
            .await
            .map(SecureString::from)
            .map_err(|e| match e {
                RetryError::Exhausted {
                    attempts, source, ..
                } => SecretError::RetriesExhausted {
                    identifier: path.to_string(),
                    attempts,
                    source: Box::new(source),
                },
                RetryError::DeadlineExceeded { attempts, .. } => SecretError::DeadlineExceeded {
                    identifier: path.to_string(),
                    attempts,
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::build_pattern;
    use async_trait::async_trait;
    use regex::Regex;
    use secfetch_core::RetryStrategy;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Mock provider serving fixed bodies and counting fetches
    struct MockProvider {
        prefix: String,
        pattern: Regex,
        bodies: HashMap<String, String>,
        calls: Arc<AtomicU32>,
        /// Fail this many calls before answering
        failures: u32,
    }

    impl MockProvider {
        fn new(prefix: &str, bodies: &[(&str, &str)]) -> Self {
            Self {
                prefix: prefix.to_string(),
                pattern: build_pattern(prefix, "a-zA-Z0-9_./-").unwrap(),
                bodies: bodies
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: Arc::new(AtomicU32::new(0)),
                failures: 0,
            }
        }

        fn failing(mut self, failures: u32) -> Self {
            self.failures = failures;
            self
        }
    }

    #[async_trait]
    impl SecretProvider for MockProvider {
        async fn fetch(&self, _ctx: &FetchContext, identifier: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(SecretError::fetch_failed(identifier, "throttled"));
            }
            self.bodies
                .get(identifier)
                .cloned()
                .ok_or_else(|| SecretError::fetch_failed(identifier, "no such secret"))
        }

        fn prefix(&self) -> &str {
            &self.prefix
        }

        fn pattern(&self) -> &Regex {
            &self.pattern
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: attempts,
            strategy: RetryStrategy::None,
            ..RetryPolicy::default()
        }
    }

    fn resolver(providers: Vec<Box<dyn SecretProvider>>) -> SecretResolver {
        SecretResolver::new(providers, policy(3), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_resolve_plain_and_keyed() {
        let provider = MockProvider::new(
            "mock://",
            &[("db", r#"{"user": "admin", "port": 5432}"#), ("token", "abc")],
        );
        let resolver = resolver(vec![Box::new(provider)]);

        let result = resolver
            .resolve_line("t=mock://token u=mock://db//user p=mock://db//port")
            .await;

        assert!(result.is_complete());
        assert_eq!(result.line, "t=abc u=admin p=5432");
    }

    #[tokio::test]
    async fn test_same_identifier_fetched_once() {
        let provider = MockProvider::new("mock://", &[("db", "user: adm1n\npass: s3cret")]);
        let calls = provider.calls.clone();
        let resolver = resolver(vec![Box::new(provider)]);

        let first = resolver.resolve_line("mock://db//user").await;
        let second = resolver
            .resolve_line("mock://db//pass mock://db//user")
            .await;

        assert_eq!(first.line, "adm1n");
        assert_eq!(second.line, "s3cret adm1n");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_encoding_applies_after_extraction() {
        let provider = MockProvider::new("mock://", &[("creds", "user: adm1n")]);
        let resolver = resolver(vec![Box::new(provider)]);

        let result = resolver.resolve_line("mock://creds//user//base64").await;

        assert_eq!(result.line, STANDARD.encode("adm1n"));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let provider = MockProvider::new("mock://", &[("token", "abc")]).failing(2);
        let calls = provider.calls.clone();
        let resolver = resolver(vec![Box::new(provider)]);

        let result = resolver.resolve_line("mock://token").await;

        assert_eq!(result.line, "abc");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_strategy_waits_between_attempts() {
        let provider = MockProvider::new("mock://", &[("token", "abc")]).failing(2);
        let policy = RetryPolicy {
            max_attempts: 3,
            strategy: RetryStrategy::FixedDelay,
            initial_delay_ms: 1000,
            ..RetryPolicy::default()
        };
        let resolver =
            SecretResolver::new(vec![Box::new(provider)], policy, Duration::from_secs(30));

        let start = Instant::now();
        let result = resolver.resolve_line("mock://token").await;

        assert_eq!(result.line, "abc");
        // Two waits of 1s plus up to 25% jitter each
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "{:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(2500), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_exhausted_retries_leave_placeholder() {
        let provider = MockProvider::new("mock://", &[("token", "abc")]).failing(10);
        let calls = provider.calls.clone();
        let resolver = resolver(vec![Box::new(provider)]);

        let result = resolver.resolve_line("a=mock://token b=mock://token").await;

        assert_eq!(result.line, "a=mock://token b=mock://token");
        assert_eq!(result.unresolved.len(), 2);
        assert_eq!(result.unresolved[0].placeholder, "mock://token");
        assert!(matches!(
            result.unresolved[0].error,
            SecretError::RetriesExhausted { attempts: 3, .. }
        ));
        // Failures are not cached: the second occurrence retried again
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let provider = MockProvider::new("mock://", &[("db", r#"{"user": "admin"}"#)]);
        let resolver = resolver(vec![Box::new(provider)]);

        let result = resolver.resolve_line("x mock://db//password y").await;

        assert_eq!(result.line, "x mock://db//password y");
        assert!(matches!(
            result.unresolved[0].error,
            SecretError::KeyNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_later_provider_sees_earlier_output() {
        let first = MockProvider::new("one://", &[("a", "two://b")]);
        let second = MockProvider::new("two://", &[("b", "done")]);
        let resolver = resolver(vec![Box::new(first), Box::new(second)]);

        let result = resolver.resolve_line("one://a").await;

        assert_eq!(result.line, "done");
    }

    #[tokio::test]
    async fn test_cache_is_scoped_by_prefix() {
        let first = MockProvider::new("one://", &[("x", "from one")]);
        let second = MockProvider::new("two://", &[("x", "from two")]);
        let resolver = resolver(vec![Box::new(first), Box::new(second)]);

        let result = resolver.resolve_line("one://x|two://x").await;

        assert_eq!(result.line, "from one|from two");
        assert_eq!(resolver.cache().len().await, 2);
    }

    struct SlowProvider {
        pattern: Regex,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl SecretProvider for SlowProvider {
        async fn fetch(&self, ctx: &FetchContext, identifier: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ctx.bounded(identifier, async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("late".to_string())
            })
            .await
        }

        fn prefix(&self) -> &str {
            "slow://"
        }

        fn pattern(&self) -> &Regex {
            &self.pattern
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_shared_across_line() {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = SlowProvider {
            pattern: build_pattern("slow://", "a-z").unwrap(),
            calls: calls.clone(),
        };
        let resolver =
            SecretResolver::new(vec![Box::new(provider)], policy(3), Duration::from_secs(5));

        let result = resolver.resolve_line("slow://a slow://b").await;

        assert_eq!(result.line, "slow://a slow://b");
        assert_eq!(result.unresolved.len(), 2);
        for entry in &result.unresolved {
            assert!(matches!(entry.error, SecretError::DeadlineExceeded { .. }));
        }
        // The first fetch used the whole budget; the second never started
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_line_without_placeholders_is_unchanged() {
        let provider = MockProvider::new("mock://", &[]);
        let resolver = resolver(vec![Box::new(provider)]);

        let line = "  plain text, with ssm:/almost and trailing space ";
        let result = resolver.resolve_line(line).await;

        assert_eq!(result.line, line);
        assert!(result.is_complete());
    }
}
