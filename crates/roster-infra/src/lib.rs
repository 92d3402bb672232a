//! # Roster Infrastructure
//!
//! Concrete implementations of the ports defined in `roster-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL employee repository via SeaORM
//! - `minimal` - No external dependencies, in-memory only

pub mod database;

pub use database::{DatabaseConfig, InMemoryEmployeeRepository};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresEmployeeRepository};
