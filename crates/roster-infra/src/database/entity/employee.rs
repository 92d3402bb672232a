//! Employee entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use roster_core::domain::{Employee, EmployeeId, NewEmployee};
use roster_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Employee.
impl TryFrom<Model> for Employee {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|e| RepoError::Query(format!("row {}: {e}", model.id)))?;

        Ok(Self {
            id: EmployeeId::new(model.id.to_string()),
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            department: model.department,
            position: model.position,
            salary: model.salary,
            status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Active model for inserting a new employee under `id`.
pub fn insert_model(id: Uuid, employee: NewEmployee) -> ActiveModel {
    ActiveModel {
        id: Set(id),
        first_name: Set(employee.first_name),
        last_name: Set(employee.last_name),
        email: Set(employee.email),
        department: Set(employee.department),
        position: Set(employee.position),
        salary: Set(employee.salary),
        status: Set(employee.status.as_str().to_string()),
        created_at: Set(employee.created_at.into()),
        updated_at: Set(employee.updated_at.into()),
    }
}

/// Active model carrying only the mutable columns.
pub fn update_model(employee: &Employee) -> ActiveModel {
    ActiveModel {
        first_name: Set(employee.first_name.clone()),
        last_name: Set(employee.last_name.clone()),
        email: Set(employee.email.clone()),
        department: Set(employee.department.clone()),
        position: Set(employee.position.clone()),
        salary: Set(employee.salary),
        status: Set(employee.status.as_str().to_string()),
        updated_at: Set(employee.updated_at.into()),
        ..Default::default()
    }
}
