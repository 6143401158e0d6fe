//! Infrastructure Layer
//!
//! Counter store implementations.

pub mod memory;
pub mod postgres;
