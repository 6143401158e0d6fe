//! PostgreSQL Counter Store
//!
//! One row per (identity, window). The conditional upsert is a single
//! statement, so PostgreSQL's row lock on the conflicting key serializes
//! concurrent increments across every API replica.

use crate::domain::entities::RateLimitRecord;
use crate::domain::repository::{CounterStore, IncrementOutcome};
use crate::domain::value_objects::RecordKey;
use crate::error::{LimiterError, LimiterResult, StoreResult};
use chrono::Utc;
use platform::rate_limit::FixedWindow;
use sqlx::PgPool;
use std::sync::Arc;

/// Table used when none is configured
pub const DEFAULT_TABLE: &str = "rate_limit_windows";

/// PostgreSQL's identifier length limit
const MAX_IDENTIFIER_LEN: usize = 63;

/// SQL rendered once for the configured table name
#[derive(Debug)]
struct Queries {
    table: String,
    increment: String,
    status: String,
    purge: String,
}

impl Queries {
    fn for_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            increment: format!(
                r#"
                INSERT INTO {table} AS t (
                    identity_key,
                    window_start,
                    window_end,
                    request_count,
                    request_limit,
                    expires_at
                ) VALUES ($1, $2, $3, 1, $4, $5)
                ON CONFLICT (identity_key, window_start)
                DO UPDATE SET request_count = t.request_count + 1
                WHERE t.request_count < t.request_limit
                RETURNING request_count, request_limit
                "#
            ),
            status: format!(
                r#"
                SELECT
                    identity_key,
                    window_start,
                    window_end,
                    request_count,
                    request_limit,
                    expires_at
                FROM {table}
                WHERE identity_key = $1 AND window_start = $2 AND expires_at > $3
                "#
            ),
            purge: format!("DELETE FROM {table} WHERE expires_at <= $1"),
        }
    }
}

/// PostgreSQL-backed counter store
#[derive(Clone)]
pub struct PgCounterStore {
    pool: PgPool,
    queries: Arc<Queries>,
}

impl PgCounterStore {
    /// Store over `table`, which must be a plain SQL identifier.
    pub fn new(pool: PgPool, table: &str) -> LimiterResult<Self> {
        validate_table_name(table)?;
        Ok(Self {
            pool,
            queries: Arc::new(Queries::for_table(table)),
        })
    }

    pub fn table(&self) -> &str {
        &self.queries.table
    }

    /// Create the table and its expiry index if they are missing.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let table = self.table();

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                identity_key  TEXT    NOT NULL,
                window_start  BIGINT  NOT NULL,
                window_end    BIGINT  NOT NULL,
                request_count INTEGER NOT NULL CHECK (request_count >= 0),
                request_limit INTEGER NOT NULL CHECK (request_limit > 0),
                expires_at    BIGINT  NOT NULL,
                PRIMARY KEY (identity_key, window_start),
                CHECK (window_end > window_start),
                CHECK (request_count <= request_limit)
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_expires_at_idx ON {table} (expires_at)"
        ))
        .execute(&self.pool)
        .await?;

        tracing::info!(table = %table, "Rate limit schema ready");
        Ok(())
    }

    /// Delete every row whose `expires_at` has passed.
    pub async fn purge_expired(&self) -> StoreResult<u64> {
        let now_secs = Utc::now().timestamp();

        let deleted = sqlx::query(&self.queries.purge)
            .bind(now_secs)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(
            table = %self.table(),
            deleted,
            "Cleaned up expired rate limit windows"
        );

        Ok(deleted)
    }
}

impl CounterStore for PgCounterStore {
    async fn try_increment(
        &self,
        key: &RecordKey,
        limit: u32,
        window: &FixedWindow,
        expires_at: i64,
    ) -> StoreResult<IncrementOutcome> {
        // Bounded by i32::MAX at config validation.
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);

        let row = sqlx::query_as::<_, (i32, i32)>(&self.queries.increment)
            .bind(&key.identity)
            .bind(key.window_start)
            .bind(window.end)
            .bind(limit)
            .bind(expires_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some((count, limit)) => IncrementOutcome::Admitted {
                count: to_u32(count),
                limit: to_u32(limit),
            },
            None => IncrementOutcome::Rejected,
        })
    }

    async fn get_status(&self, key: &RecordKey) -> StoreResult<Option<RateLimitRecord>> {
        let now_secs = Utc::now().timestamp();

        let row = sqlx::query_as::<_, RecordRow>(&self.queries.status)
            .bind(&key.identity)
            .bind(key.window_start)
            .bind(now_secs)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(RecordRow::into_record))
    }
}

/// Accept only identifiers that need no quoting.
pub fn validate_table_name(table: &str) -> LimiterResult<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_lowercase() || first == '_')
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    };

    if !valid || table.len() > MAX_IDENTIFIER_LEN {
        return Err(LimiterError::InvalidConfig(format!(
            "table name {table:?} must be a lowercase SQL identifier of at most {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    Ok(())
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct RecordRow {
    identity_key: String,
    window_start: i64,
    window_end: i64,
    request_count: i32,
    request_limit: i32,
    expires_at: i64,
}

impl RecordRow {
    fn into_record(self) -> RateLimitRecord {
        RateLimitRecord {
            identity_key: self.identity_key,
            window_start: self.window_start,
            window_end: self.window_end,
            request_count: to_u32(self.request_count),
            limit: to_u32(self.request_limit),
            expires_at: self.expires_at,
        }
    }
}
