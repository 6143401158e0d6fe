//! Limiter Error Types
//!
//! This module provides limiter-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! A rejected request is not an error: it is an `Ok` result with
//! `allowed = false`.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Limiter-specific result type alias
pub type LimiterResult<T> = Result<T, LimiterError>;

/// Counter store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure failures reaching the counter store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The round-trip did not complete in time
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The store refused or could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Limiter error variants
#[derive(Debug, Error)]
pub enum LimiterError {
    /// The request reached the limiter without a resolved caller
    #[error("Caller identity missing from request context")]
    MissingIdentity,

    /// Outcome indeterminate: the counter store failed
    #[error("Counter store error for {key}: {source}")]
    Store {
        identity: String,
        key: String,
        #[source]
        source: StoreError,
    },

    /// Configuration rejected at startup
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),
}

impl LimiterError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LimiterError::MissingIdentity => ErrorKind::Unauthorized,
            LimiterError::Store { .. } => ErrorKind::ServiceUnavailable,
            LimiterError::InvalidConfig(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine readable code
    pub fn code(&self) -> &'static str {
        match self {
            LimiterError::MissingIdentity => "IDENTITY_MISSING",
            LimiterError::Store { .. } => "STORE_UNAVAILABLE",
            LimiterError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, LimiterError::Store { .. })
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string()).with_code(self.code());
        match self {
            LimiterError::MissingIdentity => {
                err.with_action("Route the request through the authentication layer")
            }
            // Store details stay in the logs.
            LimiterError::Store { .. } => {
                AppError::new(self.kind(), "Rate limit state unavailable")
                    .with_code(self.code())
                    .with_action("Retry shortly")
            }
            LimiterError::InvalidConfig(_) => err,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            LimiterError::Store {
                identity,
                key,
                source,
            } => {
                tracing::error!(
                    identity = %identity,
                    key = %key,
                    error = %source,
                    "Rate limit counter store failure"
                );
            }
            LimiterError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Invalid rate limit configuration");
            }
            LimiterError::MissingIdentity => {
                tracing::warn!("Request reached rate limiter without a caller identity");
            }
        }
    }
}

impl From<LimiterError> for AppError {
    fn from(err: LimiterError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for LimiterError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
