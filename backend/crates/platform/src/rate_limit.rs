//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions: fixed window arithmetic, the
//! per-request decision and the response headers that carry it.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// `RateLimit-Limit`: ceiling applied to the caller for the current window
pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
/// `RateLimit-Remaining`: requests left in the current window
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
/// `RateLimit-Reset`: epoch milliseconds at which the window ends
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// A tumbling window `[start, end)`, in seconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedWindow {
    pub start: i64,
    pub end: i64,
}

impl FixedWindow {
    /// Window of `size_secs` that contains `now_ms`.
    ///
    /// Integer flooring only, so every process whose clock reads the same
    /// second lands in the same window. `size_secs` must be positive.
    pub fn containing(now_ms: i64, size_secs: i64) -> Self {
        let now_secs = now_ms.div_euclid(1000);
        let start = now_secs.div_euclid(size_secs) * size_secs;
        Self {
            start,
            end: start.saturating_add(size_secs),
        }
    }

    pub fn size_secs(&self) -> i64 {
        self.end - self.start
    }

    pub fn end_ms(&self) -> i64 {
        self.end.saturating_mul(1000)
    }
}

/// Whole seconds until `window_end`, rounded up and clamped to
/// `[0, window_size_secs]`.
pub fn retry_after_secs(window_end: i64, now_ms: i64, window_size_secs: i64) -> u64 {
    let remaining_ms = window_end.saturating_mul(1000).saturating_sub(now_ms);
    let secs = remaining_ms.saturating_add(999).div_euclid(1000);
    secs.clamp(0, window_size_secs.max(0)) as u64
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
    /// Present only on rejection.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitResult {
    pub fn allowed(limit: u32, remaining: u32, reset_at_ms: i64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            reset_at_ms,
            retry_after_secs: None,
        }
    }

    pub fn rejected(limit: u32, reset_at_ms: i64, retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            reset_at_ms,
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Write the `RateLimit-*` headers, plus `Retry-After` on rejection.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from(self.reset_at_ms));
        match self.retry_after_secs {
            Some(secs) => {
                headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(secs));
            }
            None => {
                headers.remove(axum::http::header::RETRY_AFTER);
            }
        }
    }
}
