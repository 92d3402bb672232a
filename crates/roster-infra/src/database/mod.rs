//! Employee storage adapters and connection management.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_repo;

pub use connections::DatabaseConfig;
pub use memory::InMemoryEmployeeRepository;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;
#[cfg(feature = "postgres")]
pub use postgres_repo::PostgresEmployeeRepository;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
