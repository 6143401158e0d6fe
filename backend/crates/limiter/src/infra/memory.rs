//! In-process Counter Store
//!
//! Single-node store for development and tests. Counters live in one
//! process, so this does not coordinate across replicas.

use crate::domain::entities::RateLimitRecord;
use crate::domain::repository::{CounterStore, IncrementOutcome};
use crate::domain::value_objects::RecordKey;
use crate::error::{StoreError, StoreResult};
use platform::clock::{Clock, SystemClock};
use platform::rate_limit::FixedWindow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// `HashMap` behind a mutex; every operation holds the lock for its whole
/// read-modify-write.
#[derive(Debug, Clone)]
pub struct MemoryCounterStore {
    records: Arc<Mutex<HashMap<RecordKey, RateLimitRecord>>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryCounterStore {
    /// Expiry is judged against `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<RecordKey, RateLimitRecord>>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("counter map lock poisoned".to_string()))
    }

    /// Drop records whose `expires_at` has passed.
    pub fn purge_expired(&self) -> StoreResult<u64> {
        let now_ms = self.clock.now_ms();
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now_ms));
        let purged = (before - records.len()) as u64;

        tracing::debug!(purged, "Purged expired in-memory rate limit records");
        Ok(purged)
    }

    /// Number of records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CounterStore for MemoryCounterStore {
    async fn try_increment(
        &self,
        key: &RecordKey,
        limit: u32,
        window: &FixedWindow,
        expires_at: i64,
    ) -> StoreResult<IncrementOutcome> {
        let now_ms = self.clock.now_ms();
        let mut records = self.lock()?;

        match records.get_mut(key) {
            Some(record) if !record.is_expired(now_ms) => {
                if record.request_count < record.limit {
                    record.request_count += 1;
                    Ok(IncrementOutcome::Admitted {
                        count: record.request_count,
                        limit: record.limit,
                    })
                } else {
                    Ok(IncrementOutcome::Rejected)
                }
            }
            _ => {
                let record = RateLimitRecord::first(key, window, limit, expires_at);
                records.insert(key.clone(), record);
                Ok(IncrementOutcome::Admitted { count: 1, limit })
            }
        }
    }

    async fn get_status(&self, key: &RecordKey) -> StoreResult<Option<RateLimitRecord>> {
        let now_ms = self.clock.now_ms();
        let records = self.lock()?;
        Ok(records
            .get(key)
            .filter(|record| !record.is_expired(now_ms))
            .cloned())
    }
}
