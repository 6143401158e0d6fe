//! Domain Services
//!
//! Pure rate limit logic: window key derivation and limit policy
//! selection. No I/O and no failure modes.

use crate::domain::value_objects::{RecordKey, WindowKey};
use platform::rate_limit::FixedWindow;

/// Derive the window containing `now_ms` and the record key for `identity`.
pub fn derive_window_key(identity: &str, now_ms: i64, window_size_secs: i64) -> WindowKey {
    let window = FixedWindow::containing(now_ms, window_size_secs);
    WindowKey {
        window,
        key: RecordKey::new(identity, window.start),
    }
}

/// One row of the policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTier {
    pub role: String,
    pub limit: u32,
}

/// Role to request-ceiling lookup table.
///
/// A caller gets the highest ceiling among the tiers matching any of their
/// roles; callers matching no tier (including an empty role set) get the
/// standard ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitPolicy {
    standard_limit: u32,
    tiers: Vec<RoleTier>,
}

impl LimitPolicy {
    pub fn new(standard_limit: u32) -> Self {
        Self {
            standard_limit,
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, role: impl Into<String>, limit: u32) -> Self {
        self.tiers.push(RoleTier {
            role: role.into(),
            limit,
        });
        self
    }

    /// Ceiling for a caller holding `roles`.
    pub fn limit_for<R: AsRef<str>>(&self, roles: &[R]) -> u32 {
        self.tiers
            .iter()
            .filter(|tier| {
                roles
                    .iter()
                    .any(|role| role.as_ref().eq_ignore_ascii_case(&tier.role))
            })
            .map(|tier| tier.limit)
            .max()
            .unwrap_or(self.standard_limit)
    }
}
