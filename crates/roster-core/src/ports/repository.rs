use async_trait::async_trait;

use crate::domain::{Employee, EmployeeId, NewEmployee};
use crate::error::RepoError;

/// Generic repository trait for lookups and removal by id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its id.
    ///
    /// Returns `RepoError::InvalidId` when the id is not in the shape the
    /// backend assigns.
    async fn find_by_id(&self, id: &ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its id; `RepoError::NotFound` when nothing matched.
    async fn delete(&self, id: &ID) -> Result<(), RepoError>;
}

/// Employee repository with domain-specific methods.
///
/// Implementations must be safe for concurrent use and must enforce email
/// uniqueness themselves: the service's pre-check is only best effort.
#[async_trait]
pub trait EmployeeRepository: BaseRepository<Employee, EmployeeId> {
    /// Insert a new record and assign its id.
    ///
    /// `RepoError::Constraint` when another record already owns the email.
    async fn create(&self, employee: NewEmployee) -> Result<Employee, RepoError>;

    /// Find an employee by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RepoError>;

    /// Records matching `filter`, newest `created_at` first, windowed by
    /// `page`, together with the size of the whole filtered set.
    async fn list(
        &self,
        filter: &ListFilter,
        page: ListPage,
    ) -> Result<(Vec<Employee>, u64), RepoError>;

    /// Replace the mutable fields of the record with the same id.
    ///
    /// `RepoError::NotFound` if the id no longer exists, `RepoError::Constraint`
    /// if the email collides with a different record.
    async fn update(&self, employee: &Employee) -> Result<(), RepoError>;
}

/// Filter for listing employees. Blank strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Exact match.
    pub department: Option<String>,
    /// Exact match against the lower-case status name; an unknown name
    /// matches nothing.
    pub status: Option<String>,
    /// Case-insensitive substring of first name, last name or email.
    pub query: Option<String>,
}

impl ListFilter {
    pub fn department(&self) -> Option<&str> {
        non_blank(self.department.as_deref())
    }

    pub fn status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    pub fn query(&self) -> Option<&str> {
        non_blank(self.query.as_deref())
    }

    /// In-process evaluation of the filter, for backends without a query engine.
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(department) = self.department() {
            if employee.department != department {
                return false;
            }
        }
        if let Some(status) = self.status() {
            if employee.status.as_str() != status {
                return false;
            }
        }
        if let Some(query) = self.query() {
            let needle = query.to_lowercase();
            let hit = [&employee.first_name, &employee.last_name, &employee.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Window into a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPage {
    pub limit: u64,
    pub offset: u64,
}
