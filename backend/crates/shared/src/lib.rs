//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The unified [`AppError`](error::app_error::AppError) and result alias
//! - [`ErrorKind`](error::kind::ErrorKind), the HTTP-facing error classification
//! - RFC 7807 rendering for axum (feature `axum`)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
