//! Distributed Fixed-Window Rate Limiter
//!
//! Clean Architecture structure:
//! - `domain/` - Window keys, limit policy, records, counter store trait
//! - `application/` - Use cases and configuration
//! - `infra/` - Counter store implementations (PostgreSQL, in-memory)
//! - `presentation/` - Middleware, handlers and router
//!
//! ## Consistency Model
//! - All handler instances share one counter store; the store's
//!   conditional increment is the only point of synchronization
//! - A record's limit is fixed when its window's first request is counted
//! - Store failures leave the outcome indeterminate; the middleware's
//!   `on_store_error` policy decides between failing open and 503

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{RateLimitConfig, StoreErrorPolicy};
pub use domain::repository::{CounterStore, IncrementOutcome};
pub use error::{LimiterError, LimiterResult, StoreError};
pub use infra::memory::MemoryCounterStore;
pub use infra::postgres::PgCounterStore;
pub use presentation::handlers::RateLimitState;
pub use presentation::middleware::enforce_rate_limit;
pub use presentation::router::{rate_limit_router, with_rate_limit};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
