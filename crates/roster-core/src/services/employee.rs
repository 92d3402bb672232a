use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

use crate::domain::{Employee, EmployeeId, mask_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{Clock, EmployeeRepository, SystemClock};

use super::input::{CreateEmployeeInput, ListEmployeesInput, UpdateEmployeeInput};

const DUPLICATE_EMAIL: &str = "employee with this email already exists";

/// One window of a listing plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeePage {
    pub items: Vec<Employee>,
    pub total: u64,
    /// Effective limit after clamping.
    pub limit: u64,
    /// Effective offset after clamping.
    pub offset: u64,
}

/// Service for managing employees.
///
/// Holds no state besides its collaborators, so one instance can serve any
/// number of concurrent requests. Every storage call races the caller's
/// cancellation token and is abandoned as soon as it fires.
#[derive(Clone)]
pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
    clock: Arc<dyn Clock>,
}

impl EmployeeService {
    /// Creates a service on the system clock.
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: Arc<dyn EmployeeRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Validates and persists a new employee.
    ///
    /// The email pre-check catches the common duplicate; a concurrent insert
    /// that slips past it is still rejected by the repository and reported as
    /// a conflict.
    #[tracing::instrument(skip_all)]
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        input: CreateEmployeeInput,
    ) -> Result<Employee, DomainError> {
        let new_employee = input.into_new_employee(self.clock.now())?;

        let existing = guarded(
            cancel,
            "look up employee by email",
            self.repo.find_by_email(&new_employee.email),
        )
        .await?;
        if existing.is_some() {
            tracing::debug!(email = %mask_email(&new_employee.email), "duplicate email rejected");
            return Err(DomainError::conflict(DUPLICATE_EMAIL));
        }

        let employee = guarded(cancel, "create employee", self.repo.create(new_employee)).await?;
        tracing::info!(employee_id = %employee.id, "employee created");
        Ok(employee)
    }

    /// Fetches one employee.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        id: &EmployeeId,
    ) -> Result<Employee, DomainError> {
        guarded(cancel, "fetch employee", self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found(format!("employee {id} not found")))
    }

    /// Lists employees after clamping the window and normalizing the filter.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        input: ListEmployeesInput,
    ) -> Result<EmployeePage, DomainError> {
        let (filter, page) = input.into_query();
        let (items, total) =
            guarded(cancel, "list employees", self.repo.list(&filter, page)).await?;

        Ok(EmployeePage {
            items,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Applies a partial update; absent fields keep their value.
    #[tracing::instrument(skip(self, cancel, input))]
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        id: &EmployeeId,
        input: UpdateEmployeeInput,
    ) -> Result<Employee, DomainError> {
        let mut patch = input.into_patch()?;
        let mut employee = self.get(cancel, id).await?;

        if patch.email.as_deref() == Some(employee.email.as_str()) {
            patch.email = None;
        }
        if let Some(email) = patch.email.as_deref() {
            let owner = guarded(
                cancel,
                "look up employee by email",
                self.repo.find_by_email(email),
            )
            .await?;
            if owner.is_some_and(|owner| owner.id != employee.id) {
                tracing::debug!(email = %mask_email(email), "email already taken");
                return Err(DomainError::conflict(DUPLICATE_EMAIL));
            }
        }

        patch.apply(&mut employee);
        employee.updated_at = next_update_stamp(employee.updated_at, self.clock.now());

        guarded(cancel, "update employee", self.repo.update(&employee)).await?;
        tracing::info!(employee_id = %employee.id, "employee updated");
        Ok(employee)
    }

    /// Deletes an employee; a missing id is reported as not found.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete(&self, cancel: &CancellationToken, id: &EmployeeId) -> Result<(), DomainError> {
        self.get(cancel, id).await?;
        guarded(cancel, "delete employee", self.repo.delete(id)).await?;
        tracing::info!(employee_id = %id, "employee deleted");
        Ok(())
    }
}

/// `now`, or one microsecond past `previous` when the clock has not moved
/// beyond it. Every update leaves a strictly later stamp.
fn next_update_stamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

/// Run a repository call unless `cancel` fires first, classifying its failure.
async fn guarded<T>(
    cancel: &CancellationToken,
    action: &'static str,
    call: impl Future<Output = Result<T, RepoError>>,
) -> Result<T, DomainError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!(action, "operation cancelled");
            Err(DomainError::cancelled())
        }
        result = call => result.map_err(|err| classify(action, err)),
    }
}

fn classify(action: &'static str, err: RepoError) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::not_found("employee not found"),
        RepoError::Constraint(_) => DomainError::conflict(DUPLICATE_EMAIL),
        RepoError::InvalidId(_) => DomainError::invalid("id", "is not a valid employee id"),
        err @ (RepoError::Connection(_) | RepoError::Query(_)) => {
            tracing::error!(action, error = %err, "storage failure");
            DomainError::internal(format!("failed to {action}"), err)
        }
    }
}
