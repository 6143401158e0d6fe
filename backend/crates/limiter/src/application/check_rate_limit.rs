//! Check Rate Limit Use Case

use crate::application::bounded;
use crate::application::config::RateLimitConfig;
use crate::domain::repository::{CounterStore, IncrementOutcome};
use crate::domain::services::{LimitPolicy, derive_window_key};
use crate::domain::value_objects::{RecordKey, WindowKey};
use crate::error::{LimiterError, LimiterResult, StoreError};
use platform::rate_limit::{RateLimitResult, retry_after_secs};
use std::sync::Arc;

/// Check Rate Limit Use Case
///
/// Holds no counters of its own: the store's conditional increment is the
/// only synchronization point, so any number of handler instances can run
/// this concurrently against the same store.
pub struct CheckRateLimitUseCase<S>
where
    S: CounterStore,
{
    store: Arc<S>,
    config: Arc<RateLimitConfig>,
    policy: Arc<LimitPolicy>,
}

impl<S> CheckRateLimitUseCase<S>
where
    S: CounterStore,
{
    pub fn new(store: Arc<S>, config: Arc<RateLimitConfig>) -> Self {
        let policy = Arc::new(config.policy());
        Self::with_policy(store, config, policy)
    }

    /// Reuse a policy table built once, e.g. by the middleware state.
    pub fn with_policy(
        store: Arc<S>,
        config: Arc<RateLimitConfig>,
        policy: Arc<LimitPolicy>,
    ) -> Self {
        Self {
            store,
            config,
            policy,
        }
    }

    /// Count one request for `identity` at `now_ms` and decide.
    ///
    /// ## Returns
    /// * `Ok(result)` - `result.allowed` tells whether the request may proceed
    /// * `Err(LimiterError::Store { .. })` - the store failed; the outcome is
    ///   indeterminate and the caller applies its own policy
    pub async fn execute(
        &self,
        identity: &str,
        roles: &[String],
        now_ms: i64,
    ) -> LimiterResult<RateLimitResult> {
        let window_size = self.config.window_size_secs();
        let WindowKey { window, key } = derive_window_key(identity, now_ms, window_size);
        let limit = self.policy.limit_for(roles);
        let expires_at = window.end.saturating_add(self.config.grace_secs());

        let outcome = bounded(
            self.config.store_timeout,
            self.store.try_increment(&key, limit, &window, expires_at),
        )
        .await
        .map_err(|e| store_error(identity, &key, e))?;

        match outcome {
            IncrementOutcome::Admitted { count, limit } => {
                let remaining = limit.saturating_sub(count);
                tracing::debug!(
                    identity = %identity,
                    key = %key,
                    count,
                    limit,
                    remaining,
                    "Request admitted"
                );
                Ok(RateLimitResult::allowed(limit, remaining, window.end_ms()))
            }
            IncrementOutcome::Rejected => {
                // The stored record is authoritative for the window boundaries
                // and the ceiling in force.
                let record = bounded(self.config.store_timeout, self.store.get_status(&key))
                    .await
                    .map_err(|e| store_error(identity, &key, e))?;

                let (window_end, limit) = record
                    .map(|r| (r.window_end, r.limit))
                    .unwrap_or((window.end, limit));
                let retry_after = retry_after_secs(window_end, now_ms, window_size);

                tracing::info!(
                    identity = %identity,
                    key = %key,
                    limit,
                    retry_after_secs = retry_after,
                    "Rate limit exceeded"
                );

                Ok(RateLimitResult::rejected(
                    limit,
                    window_end.saturating_mul(1000),
                    retry_after,
                ))
            }
        }
    }
}

fn store_error(identity: &str, key: &RecordKey, source: StoreError) -> LimiterError {
    LimiterError::Store {
        identity: identity.to_string(),
        key: key.to_string(),
        source,
    }
}
