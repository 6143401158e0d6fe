//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and the counter store.

pub mod check_rate_limit;
pub mod config;
pub mod rate_limit_status;

use crate::error::{StoreError, StoreResult};
use std::future::Future;
use std::time::Duration;

/// Run one store round-trip under `limit`. No retries.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
