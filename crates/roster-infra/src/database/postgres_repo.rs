//! PostgreSQL employee repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, Index};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, SqlErr,
};
use uuid::Uuid;

use roster_core::domain::{Employee, EmployeeId, NewEmployee, mask_email, normalize_email};
use roster_core::error::RepoError;
use roster_core::ports::{BaseRepository, EmployeeRepository, ListFilter, ListPage};

use super::entity::employee::{self as employee_entity, Column, Entity as EmployeeEntity};

const DEPARTMENT_STATUS_INDEX: &str = "idx_employees_department_status";

/// PostgreSQL employee repository.
///
/// The `UNIQUE` constraint on `email` is the authoritative guard against
/// concurrent duplicate inserts.
pub struct PostgresEmployeeRepository {
    db: Arc<DbConn>,
}

impl PostgresEmployeeRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    /// Create the `employees` table, its unique email constraint, and the
    /// `(department, status)` index if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);

        let table = schema
            .create_table_from_entity(EmployeeEntity)
            .if_not_exists()
            .to_owned();
        self.db
            .execute(backend.build(&table))
            .await
            .map_err(query_error)?;

        let index = Index::create()
            .if_not_exists()
            .name(DEPARTMENT_STATUS_INDEX)
            .table(EmployeeEntity)
            .col(Column::Department)
            .col(Column::Status)
            .to_owned();
        self.db
            .execute(backend.build(&index))
            .await
            .map_err(query_error)?;

        tracing::info!("Employee schema ensured");
        Ok(())
    }

    fn parse_id(id: &EmployeeId) -> Result<Uuid, RepoError> {
        Uuid::parse_str(id.as_str().trim()).map_err(|_| RepoError::InvalidId(id.to_string()))
    }

    fn condition(filter: &ListFilter) -> Condition {
        let mut condition = Condition::all();
        if let Some(department) = filter.department() {
            condition = condition.add(Column::Department.eq(department));
        }
        if let Some(status) = filter.status() {
            condition = condition.add(Column::Status.eq(status));
        }
        if let Some(query) = filter.query() {
            let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
            let any = [Column::FirstName, Column::LastName, Column::Email]
                .into_iter()
                .fold(Condition::any(), |any, column| {
                    any.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
                });
            condition = condition.add(any);
        }
        condition
    }
}

/// Escape `LIKE` wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn query_error(err: DbErr) -> RepoError {
    RepoError::Query(err.to_string())
}

/// Map write errors, recognising unique violations.
fn write_error(err: DbErr) -> RepoError {
    if let Some(mapped) = err.sql_err().and_then(constraint_error) {
        return mapped;
    }
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        other => query_error(other),
    }
}

fn constraint_error(err: SqlErr) -> Option<RepoError> {
    match err {
        SqlErr::UniqueConstraintViolation(detail) => Some(RepoError::Constraint(detail)),
        _ => None,
    }
}

#[async_trait]
impl BaseRepository<Employee, EmployeeId> for PostgresEmployeeRepository {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>, RepoError> {
        let uuid = Self::parse_id(id)?;
        let result = EmployeeEntity::find_by_id(uuid)
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        result.map(Employee::try_from).transpose()
    }

    async fn delete(&self, id: &EmployeeId) -> Result<(), RepoError> {
        let uuid = Self::parse_id(id)?;
        let result = EmployeeEntity::delete_by_id(uuid)
            .exec(self.db.as_ref())
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for PostgresEmployeeRepository {
    async fn create(&self, employee: NewEmployee) -> Result<Employee, RepoError> {
        let mut employee = employee;
        employee.email = normalize_email(&employee.email);

        let model = employee_entity::insert_model(Uuid::new_v4(), employee)
            .insert(self.db.as_ref())
            .await
            .map_err(write_error)?;

        Employee::try_from(model)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RepoError> {
        let email = normalize_email(email);
        tracing::debug!(employee_email = %mask_email(&email), "Finding employee by email");

        let result = EmployeeEntity::find()
            .filter(Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        result.map(Employee::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &ListFilter,
        page: ListPage,
    ) -> Result<(Vec<Employee>, u64), RepoError> {
        let condition = Self::condition(filter);

        let total = EmployeeEntity::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(query_error)?;

        let models = EmployeeEntity::find()
            .filter(condition)
            .order_by_desc(Column::CreatedAt)
            .limit(page.limit)
            .offset(page.offset)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        let items = models
            .into_iter()
            .map(Employee::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((items, total))
    }

    async fn update(&self, employee: &Employee) -> Result<(), RepoError> {
        let uuid = Self::parse_id(&employee.id)?;
        let mut model = employee_entity::update_model(employee);
        model.email = sea_orm::Set(normalize_email(&employee.email));

        let result = EmployeeEntity::update_many()
            .set(model)
            .filter(Column::Id.eq(uuid))
            .exec(self.db.as_ref())
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("joe"), "joe");
    }

    #[test]
    fn unique_violation_becomes_constraint() {
        let mapped = constraint_error(SqlErr::UniqueConstraintViolation(
            "duplicate key value violates unique constraint".into(),
        ));
        assert!(matches!(mapped, Some(RepoError::Constraint(detail)) if detail.contains("duplicate")));

        let other = constraint_error(SqlErr::ForeignKeyConstraintViolation("fk".into()));
        assert!(other.is_none());
    }

    #[test]
    fn connection_failures_stay_connection_errors() {
        let err = write_error(DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".into())));
        assert!(matches!(err, RepoError::Connection(_)));

        let err = write_error(DbErr::Custom("boom".into()));
        assert!(matches!(err, RepoError::Query(_)));
    }
}
