//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (RateLimitRecord)
//! - Domain value objects (RecordKey, WindowKey)
//! - Domain services (window key derivation, limit policy)
//! - Repository traits (the atomic counter store interface)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
