//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to create an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub salary: f64,
    /// Defaults to `active` when omitted or blank.
    #[serde(default)]
    pub status: String,
}

/// Partial update; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmployeeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Query string for listing employees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEmployeesQuery {
    pub department: Option<String>,
    pub status: Option<String>,
    /// Free-text search over first name, last name and email.
    pub q: Option<String>,
    /// Kept as text: an unparsable value falls back to the default window.
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// An employee as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub status: String,
    /// RFC 3339, UTC.
    pub created_at: String,
    /// RFC 3339, UTC.
    pub updated_at: String,
}
