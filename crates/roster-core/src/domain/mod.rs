//! Domain entities - the core business objects.

mod employee;

pub use employee::{
    Employee, EmployeeId, EmployeeStatus, NewEmployee, UnknownStatus, mask_email,
    normalize_email,
};
