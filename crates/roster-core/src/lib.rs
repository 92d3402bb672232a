//! # Roster Core
//!
//! The domain layer of the Roster employee service.
//! This crate contains the employee model, the ports infrastructure must
//! implement, and the service enforcing the business rules. It has no storage
//! or HTTP dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, ErrorKind, FieldError, RepoError, ValidationErrors};
pub use services::EmployeeService;
