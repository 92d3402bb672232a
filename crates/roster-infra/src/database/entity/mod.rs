//! SeaORM entities.

pub mod employee;
