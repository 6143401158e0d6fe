//! Rate Limit Status Use Case

use crate::application::bounded;
use crate::application::config::RateLimitConfig;
use crate::domain::entities::RateLimitRecord;
use crate::domain::repository::CounterStore;
use crate::domain::services::derive_window_key;
use std::sync::Arc;

/// Read-only view of a caller's current window.
pub struct GetRateLimitStatusUseCase<S>
where
    S: CounterStore,
{
    store: Arc<S>,
    config: Arc<RateLimitConfig>,
}

impl<S> GetRateLimitStatusUseCase<S>
where
    S: CounterStore,
{
    pub fn new(store: Arc<S>, config: Arc<RateLimitConfig>) -> Self {
        Self { store, config }
    }

    /// Record for the window containing `now_ms`, without counting a request.
    ///
    /// Any store failure reads as "no record": status is informational and
    /// must never fail the caller.
    pub async fn execute(&self, identity: &str, now_ms: i64) -> Option<RateLimitRecord> {
        let window_key = derive_window_key(identity, now_ms, self.config.window_size_secs());

        match bounded(self.config.store_timeout, self.store.get_status(&window_key.key)).await {
            Ok(record) => record.filter(|r| !r.is_expired(now_ms)),
            Err(e) => {
                tracing::warn!(
                    identity = %identity,
                    key = %window_key.key,
                    error = %e,
                    "Rate limit status unavailable"
                );
                None
            }
        }
    }
}
