//! Server configuration from the environment

use anyhow::{Context, Result};
use limiter::{RateLimitConfig, StoreErrorPolicy, infra::postgres::DEFAULT_TABLE};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

/// Everything the binary reads at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub table: String,
    pub purge_interval: Duration,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            window_size: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                defaults.window_size.as_secs(),
            )?),
            standard_limit: parse_or(&lookup, "RATE_LIMIT_STANDARD", defaults.standard_limit)?,
            admin_limit: parse_or(&lookup, "RATE_LIMIT_ADMIN", defaults.admin_limit)?,
            grace_period: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_GRACE_SECS",
                defaults.grace_period.as_secs(),
            )?),
            store_timeout: Duration::from_millis(parse_or(
                &lookup,
                "RATE_LIMIT_STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )?),
            on_store_error: match lookup("RATE_LIMIT_ON_STORE_ERROR") {
                Some(raw) => raw
                    .parse::<StoreErrorPolicy>()
                    .context("Invalid RATE_LIMIT_ON_STORE_ERROR")?,
                None => defaults.on_store_error,
            },
            ..defaults
        };
        rate_limit
            .validate()
            .context("Invalid rate limit configuration")?;

        let purge_interval =
            Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_PURGE_INTERVAL_SECS", 300)?);
        anyhow::ensure!(
            !purge_interval.is_zero(),
            "RATE_LIMIT_PURGE_INTERVAL_SECS must be greater than zero"
        );

        Ok(Self {
            database_url,
            bind_addr: parse_or(
                &lookup,
                "BIND_ADDR",
                SocketAddr::from_str(DEFAULT_BIND_ADDR)?,
            )?,
            frontend_origins: lookup("FRONTEND_ORIGINS")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
            table: lookup("RATE_LIMIT_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            purge_interval,
            rate_limit,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {name}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap();

        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 31113)));
        assert_eq!(config.table, "rate_limit_windows");
        assert_eq!(config.purge_interval, Duration::from_secs(300));
        assert_eq!(config.frontend_origins.len(), 2);
        assert_eq!(config.rate_limit.standard_limit, 60);
        assert_eq!(config.rate_limit.admin_limit, 300);
        assert_eq!(config.rate_limit.on_store_error, StoreErrorPolicy::Allow);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("RATE_LIMIT_WINDOW_SECS", "30"),
            ("RATE_LIMIT_STANDARD", "10"),
            ("RATE_LIMIT_ADMIN", "100"),
            ("RATE_LIMIT_ON_STORE_ERROR", "deny"),
            ("RATE_LIMIT_STORE_TIMEOUT_MS", "250"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.rate_limit.window_size_secs(), 30);
        assert_eq!(config.rate_limit.standard_limit, 10);
        assert_eq!(config.rate_limit.admin_limit, 100);
        assert_eq!(config.rate_limit.on_store_error, StoreErrorPolicy::Deny);
        assert_eq!(config.rate_limit.store_timeout, Duration::from_millis(250));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ServerConfig::from_lookup(lookup(&[])).is_err());
        for (name, value) in [
            ("RATE_LIMIT_STANDARD", "many"),
            ("RATE_LIMIT_STANDARD", "0"),
            ("RATE_LIMIT_WINDOW_SECS", "0"),
            ("RATE_LIMIT_ON_STORE_ERROR", "maybe"),
            ("RATE_LIMIT_PURGE_INTERVAL_SECS", "0"),
        ] {
            let result =
                ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), (name, value)]));
            assert!(result.is_err(), "{name}={value} should be rejected");
        }
    }
}
