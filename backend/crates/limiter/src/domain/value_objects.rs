//! Domain Value Objects
//!
//! Immutable value types for the rate limit domain.

use derive_more::Display;
use platform::rate_limit::FixedWindow;

/// Identifies one counter record: a caller within one window.
///
/// Rendered as `{identity}#{window_start}`. The suffix is always an
/// integer, so splitting on the last `#` recovers both parts even when the
/// identity itself contains `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{identity}#{window_start}")]
pub struct RecordKey {
    pub identity: String,
    pub window_start: i64,
}

impl RecordKey {
    pub fn new(identity: impl Into<String>, window_start: i64) -> Self {
        Self {
            identity: identity.into(),
            window_start,
        }
    }
}

/// A derived window together with the record key addressing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowKey {
    pub window: FixedWindow,
    pub key: RecordKey,
}
