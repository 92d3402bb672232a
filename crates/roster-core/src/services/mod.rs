//! Application services - the business rules built on top of the ports.

mod employee;
pub mod input;

pub use employee::{EmployeePage, EmployeeService};
pub use input::{CreateEmployeeInput, EmployeePatch, ListEmployeesInput, UpdateEmployeeInput};
