//! In-memory employee repository - used by tests and as the fallback when no
//! database is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use roster_core::domain::{Employee, EmployeeId, NewEmployee, normalize_email};
use roster_core::error::RepoError;
use roster_core::ports::{BaseRepository, EmployeeRepository, ListFilter, ListPage};

/// Employee store backed by a vector in insertion order.
///
/// Email uniqueness is checked under the write lock, so concurrent creators
/// cannot both succeed.
/// Note: Data is lost on process restart.
pub struct InMemoryEmployeeRepository {
    store: RwLock<Vec<Employee>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Vec::new()),
        }
    }

    /// Ids are UUIDs, matching the SQL adapter.
    fn parse_id(id: &EmployeeId) -> Result<Uuid, RepoError> {
        Uuid::parse_str(id.as_str().trim()).map_err(|_| RepoError::InvalidId(id.to_string()))
    }

    fn email_taken(store: &[Employee], email: &str, except: Option<&EmployeeId>) -> bool {
        store
            .iter()
            .any(|e| e.email == email && Some(&e.id) != except)
    }
}

impl Default for InMemoryEmployeeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Employee, EmployeeId> for InMemoryEmployeeRepository {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>, RepoError> {
        let uuid = Self::parse_id(id)?.to_string();
        let store = self.store.read().await;
        Ok(store.iter().find(|e| e.id.as_str() == uuid).cloned())
    }

    async fn delete(&self, id: &EmployeeId) -> Result<(), RepoError> {
        let uuid = Self::parse_id(id)?.to_string();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|e| e.id.as_str() != uuid);

        if store.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn create(&self, employee: NewEmployee) -> Result<Employee, RepoError> {
        let mut employee = employee;
        employee.email = normalize_email(&employee.email);

        let mut store = self.store.write().await;
        if Self::email_taken(&store, &employee.email, None) {
            return Err(RepoError::Constraint("uniq_email".to_string()));
        }

        let employee = employee.with_id(EmployeeId::new(Uuid::new_v4().to_string()));
        store.push(employee.clone());
        Ok(employee)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RepoError> {
        let email = normalize_email(email);
        let store = self.store.read().await;
        Ok(store.iter().find(|e| e.email == email).cloned())
    }

    async fn list(
        &self,
        filter: &ListFilter,
        page: ListPage,
    ) -> Result<(Vec<Employee>, u64), RepoError> {
        let store = self.store.read().await;

        // Newest insert first, then a stable sort keeps that order on ties.
        let mut matched: Vec<&Employee> = store.iter().rev().filter(|e| filter.matches(e)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn update(&self, employee: &Employee) -> Result<(), RepoError> {
        let uuid = Self::parse_id(&employee.id)?.to_string();
        let email = normalize_email(&employee.email);

        let mut store = self.store.write().await;
        let index = store
            .iter()
            .position(|e| e.id.as_str() == uuid)
            .ok_or(RepoError::NotFound)?;
        if Self::email_taken(&store, &email, Some(&store[index].id)) {
            return Err(RepoError::Constraint("uniq_email".to_string()));
        }

        // created_at is immutable once stored.
        let current = &mut store[index];
        *current = Employee {
            id: current.id.clone(),
            email,
            created_at: current.created_at,
            ..employee.clone()
        };
        Ok(())
    }
}
