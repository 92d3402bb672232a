//! Service inputs and their validation rules.
//!
//! Inputs arrive weakly typed from the delivery layer. Each input type has an
//! explicit conversion that normalizes it, checks every rule, and returns
//! either the typed value or the full list of failing fields.

use chrono::{DateTime, Utc};
use validator::ValidateEmail;

use crate::domain::{Employee, EmployeeStatus, NewEmployee, normalize_email};
use crate::error::ValidationErrors;
use crate::ports::{ListFilter, ListPage};

pub const NAME_MAX_CHARS: usize = 100;
pub const ORG_FIELD_MAX_CHARS: usize = 120;
pub const EMAIL_MAX_CHARS: usize = 320;
pub const SALARY_MAX: f64 = 1_000_000_000.0;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 200;

/// Fields for a new employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateEmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    /// Blank means `active`.
    pub status: String,
}

impl CreateEmployeeInput {
    /// Normalize, validate, and stamp both timestamps with `now`.
    pub fn into_new_employee(self, now: DateTime<Utc>) -> Result<NewEmployee, ValidationErrors> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let email = normalize_email(&self.email);
        let department = self.department.trim().to_string();
        let position = self.position.trim().to_string();
        let status = self.status.trim();

        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "first_name", &first_name, NAME_MAX_CHARS);
        check_length(&mut errors, "last_name", &last_name, NAME_MAX_CHARS);
        check_email(&mut errors, &email);
        check_length(&mut errors, "department", &department, ORG_FIELD_MAX_CHARS);
        check_length(&mut errors, "position", &position, ORG_FIELD_MAX_CHARS);
        check_salary(&mut errors, self.salary);
        let status = if status.is_empty() {
            EmployeeStatus::Active
        } else {
            parse_status(&mut errors, status).unwrap_or_default()
        };

        errors.into_result(NewEmployee {
            first_name,
            last_name,
            email,
            department,
            position,
            salary: self.salary,
            status,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateEmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// An empty value is a no-op.
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    /// An empty value is a no-op rather than a reset to `active`.
    pub status: Option<String>,
}

impl UpdateEmployeeInput {
    /// Normalize and validate only the fields that were supplied.
    pub fn into_patch(self) -> Result<EmployeePatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = self.first_name.map(|v| v.trim().to_string());
        let last_name = self.last_name.map(|v| v.trim().to_string());
        let department = self.department.map(|v| v.trim().to_string());
        let position = self.position.map(|v| v.trim().to_string());
        let email = self
            .email
            .map(|v| normalize_email(&v))
            .filter(|v| !v.is_empty());

        if let Some(v) = &first_name {
            check_length(&mut errors, "first_name", v, NAME_MAX_CHARS);
        }
        if let Some(v) = &last_name {
            check_length(&mut errors, "last_name", v, NAME_MAX_CHARS);
        }
        if let Some(v) = &email {
            check_email(&mut errors, v);
        }
        if let Some(v) = &department {
            check_length(&mut errors, "department", v, ORG_FIELD_MAX_CHARS);
        }
        if let Some(v) = &position {
            check_length(&mut errors, "position", v, ORG_FIELD_MAX_CHARS);
        }
        if let Some(v) = self.salary {
            check_salary(&mut errors, v);
        }
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| parse_status(&mut errors, v));

        errors.into_result(EmployeePatch {
            first_name,
            last_name,
            email,
            department,
            position,
            salary: self.salary,
            status,
        })
    }
}

/// A validated partial update, ready to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeePatch {
    /// Overwrite every supplied field. Timestamps are left to the caller.
    pub fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.first_name {
            employee.first_name = v;
        }
        if let Some(v) = self.last_name {
            employee.last_name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.department {
            employee.department = v;
        }
        if let Some(v) = self.position {
            employee.position = v;
        }
        if let Some(v) = self.salary {
            employee.salary = v;
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
    }
}

/// Listing parameters as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEmployeesInput {
    pub department: Option<String>,
    pub status: Option<String>,
    pub query: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ListEmployeesInput {
    /// Clamp the window and normalize the status filter.
    ///
    /// A limit outside `1..=200` falls back to 20; a negative offset becomes 0.
    /// The status is only lower-cased: a value no employee carries simply
    /// matches nothing.
    pub fn into_query(self) -> (ListFilter, ListPage) {
        let limit = match u64::try_from(self.limit) {
            Ok(limit) if (1..=MAX_PAGE_LIMIT).contains(&limit) => limit,
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = u64::try_from(self.offset).unwrap_or(0);

        let status = self
            .status
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty());

        let filter = ListFilter {
            department: self.department,
            status,
            query: self.query,
        };
        (filter, ListPage { limit, offset })
    }
}

fn check_length(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len == 0 {
        errors.add(field, "is required");
    } else if len > max {
        errors.add(field, format!("must be at most {max} characters"));
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.add("email", "is required");
    } else if email.chars().count() > EMAIL_MAX_CHARS {
        errors.add("email", format!("must be at most {EMAIL_MAX_CHARS} characters"));
    } else if !email.validate_email() {
        errors.add("email", "must be a valid email address");
    }
}

fn check_salary(errors: &mut ValidationErrors, salary: f64) {
    // NaN fails the range check as well.
    if !(0.0..=SALARY_MAX).contains(&salary) {
        errors.add("salary", "must be between 0 and 1000000000");
    }
}

fn parse_status(errors: &mut ValidationErrors, value: &str) -> Option<EmployeeStatus> {
    match value.parse() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", "must be one of: active, inactive");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn valid() -> CreateEmployeeInput {
        CreateEmployeeInput {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "Ann.Lee@X.com".into(),
            department: "Eng".into(),
            position: "SWE".into(),
            salary: 100_000.0,
            status: String::new(),
        }
    }

    fn failing_fields(err: ValidationErrors) -> Vec<&'static str> {
        err.fields().collect()
    }

    #[test]
    fn create_normalizes_and_defaults_status() {
        let input = CreateEmployeeInput {
            first_name: "  Ann ".into(),
            email: " Ann.Lee@X.com ".into(),
            ..valid()
        };
        let employee = input.into_new_employee(now()).unwrap();

        assert_eq!(employee.first_name, "Ann");
        assert_eq!(employee.email, "ann.lee@x.com");
        assert_eq!(employee.status, EmployeeStatus::Active);
        assert_eq!(employee.created_at, employee.updated_at);
    }

    #[test]
    fn create_reports_every_failing_field() {
        let input = CreateEmployeeInput {
            first_name: "   ".into(),
            email: "not-an-email".into(),
            salary: -1.0,
            status: "retired".into(),
            ..valid()
        };
        let err = input.into_new_employee(now()).unwrap_err();

        assert_eq!(failing_fields(err), vec!["first_name", "email", "salary", "status"]);
    }

    #[test]
    fn create_enforces_length_bounds() {
        let input = CreateEmployeeInput {
            last_name: "x".repeat(NAME_MAX_CHARS + 1),
            department: "d".repeat(ORG_FIELD_MAX_CHARS),
            position: "p".repeat(ORG_FIELD_MAX_CHARS + 1),
            ..valid()
        };
        let err = input.into_new_employee(now()).unwrap_err();

        assert_eq!(failing_fields(err), vec!["last_name", "position"]);
    }

    #[test]
    fn salary_bounds_are_inclusive() {
        for salary in [0.0, SALARY_MAX] {
            let input = CreateEmployeeInput { salary, ..valid() };
            assert!(input.into_new_employee(now()).is_ok());
        }
        for salary in [SALARY_MAX + 1.0, f64::NAN] {
            let input = CreateEmployeeInput { salary, ..valid() };
            assert!(input.into_new_employee(now()).is_err());
        }
    }

    #[test]
    fn overlong_email_is_rejected() {
        let input = CreateEmployeeInput {
            email: format!("{}@x.com", "a".repeat(EMAIL_MAX_CHARS)),
            ..valid()
        };
        let err = input.into_new_employee(now()).unwrap_err();
        assert_eq!(failing_fields(err), vec!["email"]);
    }

    #[test]
    fn patch_checks_only_supplied_fields() {
        let patch = UpdateEmployeeInput {
            salary: Some(5.0),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.salary, Some(5.0));
        assert_eq!(patch.first_name, None);

        let err = UpdateEmployeeInput {
            first_name: Some(String::new()),
            salary: Some(-5.0),
            ..Default::default()
        }
        .into_patch()
        .unwrap_err();
        assert_eq!(failing_fields(err), vec!["first_name", "salary"]);
    }

    #[test]
    fn patch_treats_empty_email_and_status_as_absent() {
        let patch = UpdateEmployeeInput {
            email: Some("  ".into()),
            status: Some(String::new()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();

        assert_eq!(patch, EmployeePatch::default());
    }

    #[test]
    fn list_window_is_clamped() {
        let cases = [(0, -5, 20, 0), (500, 3, 20, 3), (200, 0, 200, 0), (-1, 10, 20, 10)];
        for (limit, offset, want_limit, want_offset) in cases {
            let (_, page) = ListEmployeesInput {
                limit,
                offset,
                ..Default::default()
            }
            .into_query();
            assert_eq!(page, ListPage { limit: want_limit, offset: want_offset });
        }
    }

    #[test]
    fn list_status_is_normalized() {
        let (filter, _) = ListEmployeesInput {
            status: Some(" Inactive ".into()),
            department: Some("Eng".into()),
            ..Default::default()
        }
        .into_query();
        assert_eq!(filter.status.as_deref(), Some("inactive"));
        assert_eq!(filter.department.as_deref(), Some("Eng"));

        let (filter, _) = ListEmployeesInput {
            status: Some("Retired".into()),
            ..Default::default()
        }
        .into_query();
        assert_eq!(filter.status.as_deref(), Some("retired"));

        let (filter, _) = ListEmployeesInput {
            status: Some("  ".into()),
            ..Default::default()
        }
        .into_query();
        assert_eq!(filter.status, None);
    }
}
