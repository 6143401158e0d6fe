//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Fixed window arithmetic and rate limit response headers
//! - Wall clock abstraction
//! - Caller context extraction and middleware

pub mod client;
pub mod clock;
pub mod rate_limit;
