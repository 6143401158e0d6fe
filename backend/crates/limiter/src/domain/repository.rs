//! Repository Traits
//!
//! The atomic counter store interface. Implementations are in the infra
//! layer; any backend with a conditional create-or-increment primitive and
//! per-record expiry can stand behind it.

use crate::domain::entities::RateLimitRecord;
use crate::domain::value_objects::RecordKey;
use crate::error::StoreResult;
use platform::rate_limit::FixedWindow;

/// Outcome of a conditional increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// Counted. `limit` is the ceiling recorded for the window.
    Admitted { count: u32, limit: u32 },
    /// Ceiling already reached; nothing was written.
    Rejected,
}

/// Atomic counter store
#[trait_variant::make(CounterStore: Send)]
pub trait LocalCounterStore {
    /// Create-or-increment `key` in one indivisible operation.
    ///
    /// A missing record is created with `request_count = 1` and the given
    /// `limit`, window and `expires_at`. An existing record is incremented
    /// only while its count is strictly below its recorded limit.
    async fn try_increment(
        &self,
        key: &RecordKey,
        limit: u32,
        window: &FixedWindow,
        expires_at: i64,
    ) -> StoreResult<IncrementOutcome>;

    /// Non-mutating point read. Expired records read as `None`.
    async fn get_status(&self, key: &RecordKey) -> StoreResult<Option<RateLimitRecord>>;
}
