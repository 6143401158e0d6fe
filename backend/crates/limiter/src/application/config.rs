//! Application Configuration
//!
//! Configuration for the rate limit application layer.

use crate::domain::services::LimitPolicy;
use crate::error::{LimiterError, LimiterResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Latest wall-clock instant (epoch seconds) the window arithmetic must
/// support: the year 9999.
const MAX_EPOCH_SECS: i64 = 253_402_300_799;

/// What to do with a request whose outcome is indeterminate because the
/// counter store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreErrorPolicy {
    /// Fail open: forward the request without rate limit headers
    #[default]
    Allow,
    /// Fail closed: answer 503
    Deny,
}

impl FromStr for StoreErrorPolicy {
    type Err = LimiterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(StoreErrorPolicy::Allow),
            "deny" => Ok(StoreErrorPolicy::Deny),
            other => Err(LimiterError::InvalidConfig(format!(
                "on_store_error must be \"allow\" or \"deny\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for StoreErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorPolicy::Allow => f.write_str("allow"),
            StoreErrorPolicy::Deny => f.write_str("deny"),
        }
    }
}

/// Rate limit application configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Fixed window length
    pub window_size: Duration,
    /// Requests per window for ordinary callers
    pub standard_limit: u32,
    /// Requests per window for callers holding any of `admin_roles`
    pub admin_limit: u32,
    /// Role codes that receive `admin_limit`
    pub admin_roles: Vec<String>,
    /// Retention past the window end before a record may be reclaimed
    pub grace_period: Duration,
    /// Upper bound on a single store round-trip
    pub store_timeout: Duration,
    pub on_store_error: StoreErrorPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_size: Duration::from_secs(60),
            standard_limit: 60,
            admin_limit: 300,
            admin_roles: vec!["admin".to_string(), "super_admin".to_string()],
            grace_period: Duration::from_secs(60),
            store_timeout: Duration::from_secs(2),
            on_store_error: StoreErrorPolicy::Allow,
        }
    }
}

impl RateLimitConfig {
    /// Default limits, but deny requests while the store is unreachable.
    pub fn fail_closed() -> Self {
        Self {
            on_store_error: StoreErrorPolicy::Deny,
            ..Default::default()
        }
    }

    /// Saturates at `i64::MAX`; `validate` keeps real configs far below it.
    pub fn window_size_secs(&self) -> i64 {
        i64::try_from(self.window_size.as_secs()).unwrap_or(i64::MAX)
    }

    pub fn grace_secs(&self) -> i64 {
        i64::try_from(self.grace_period.as_secs()).unwrap_or(i64::MAX)
    }

    /// Policy table derived from the configured ceilings.
    pub fn policy(&self) -> LimitPolicy {
        self.admin_roles
            .iter()
            .fold(LimitPolicy::new(self.standard_limit), |policy, role| {
                policy.with_tier(role.clone(), self.admin_limit)
            })
    }

    /// Reject settings the limiter cannot honour.
    pub fn validate(&self) -> LimiterResult<()> {
        if self.window_size.as_secs() == 0 {
            return Err(LimiterError::InvalidConfig(
                "window_size must be at least one second".to_string(),
            ));
        }
        if self.window_size.subsec_nanos() != 0 || self.grace_period.subsec_nanos() != 0 {
            return Err(LimiterError::InvalidConfig(
                "window_size and grace_period must be whole seconds".to_string(),
            ));
        }
        // Window ends and expiry instants are epoch seconds; reset times are
        // epoch milliseconds. Both must stay representable for any clock
        // reading up to MAX_EPOCH_SECS.
        let span_ms = i64::try_from(self.window_size.as_secs())
            .ok()
            .zip(i64::try_from(self.grace_period.as_secs()).ok())
            .and_then(|(window, grace)| window.checked_add(grace))
            .and_then(|span| span.checked_add(MAX_EPOCH_SECS))
            .and_then(|end| end.checked_mul(1000));
        if span_ms.is_none() {
            return Err(LimiterError::InvalidConfig(
                "window_size plus grace_period is too large".to_string(),
            ));
        }
        for (name, limit) in [
            ("standard_limit", self.standard_limit),
            ("admin_limit", self.admin_limit),
        ] {
            if limit == 0 {
                return Err(LimiterError::InvalidConfig(format!(
                    "{name} must be greater than zero"
                )));
            }
            if i32::try_from(limit).is_err() {
                return Err(LimiterError::InvalidConfig(format!(
                    "{name} must not exceed {}",
                    i32::MAX
                )));
            }
        }
        if self.store_timeout.is_zero() {
            return Err(LimiterError::InvalidConfig(
                "store_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
