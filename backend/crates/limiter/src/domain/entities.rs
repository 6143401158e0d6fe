//! Domain Entities

use crate::domain::value_objects::RecordKey;
use platform::rate_limit::FixedWindow;

/// Rate limit record - one per (identity, window)
///
/// All timestamps are seconds since the epoch. `limit` is fixed when the
/// record is first written, so a policy change never alters a window that
/// is already in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub identity_key: String,
    pub window_start: i64,
    pub window_end: i64,
    pub request_count: u32,
    pub limit: u32,
    /// Instant after which the store may reclaim the record.
    pub expires_at: i64,
}

impl RateLimitRecord {
    /// Record as created by the first admitted request of a window.
    pub fn first(key: &RecordKey, window: &FixedWindow, limit: u32, expires_at: i64) -> Self {
        Self {
            identity_key: key.identity.clone(),
            window_start: window.start,
            window_end: window.end,
            request_count: 1,
            limit,
            expires_at,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.request_count)
    }

    pub fn reset_at_ms(&self) -> i64 {
        self.window_end.saturating_mul(1000)
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms.div_euclid(1000) >= self.expires_at
    }
}
