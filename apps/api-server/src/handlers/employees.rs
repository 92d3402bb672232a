//! Employee handlers.

use actix_web::{HttpResponse, web};

use roster_core::domain::{Employee, EmployeeId};
use roster_core::services::{CreateEmployeeInput, ListEmployeesInput, UpdateEmployeeInput};
use roster_shared::dto::{
    CreateEmployeeRequest, EmployeeResponse, ListEmployeesQuery, UpdateEmployeeRequest,
};
use roster_shared::{ApiResponse, PageMeta, PagedResponse};

use crate::deadline::Deadline;
use crate::middleware::error::{AppResult, ScopedResult};
use crate::observability::RequestId;
use crate::state::AppState;

fn to_response(employee: &Employee) -> EmployeeResponse {
    EmployeeResponse {
        id: employee.id.to_string(),
        first_name: employee.first_name.clone(),
        last_name: employee.last_name.clone(),
        email: employee.email.clone(),
        department: employee.department.clone(),
        position: employee.position.clone(),
        salary: employee.salary,
        status: employee.status.to_string(),
        created_at: employee.created_at.to_rfc3339(),
        updated_at: employee.updated_at.to_rfc3339(),
    }
}

/// Absent or unparsable numbers read as 0, which the service clamps to its
/// defaults.
fn lenient_int(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// POST /api/v1/employees
pub async fn create_employee(
    state: web::Data<AppState>,
    request_id: RequestId,
    body: web::Json<CreateEmployeeRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let deadline = Deadline::after(state.request_timeout);

    let input = CreateEmployeeInput {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        department: req.department,
        position: req.position,
        salary: req.salary,
        status: req.status,
    };
    let employee = state
        .employees
        .create(deadline.token(), input)
        .await
        .scoped(&request_id)?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(to_response(&employee))))
}

/// GET /api/v1/employees
pub async fn list_employees(
    state: web::Data<AppState>,
    request_id: RequestId,
    query: web::Query<ListEmployeesQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let deadline = Deadline::after(state.request_timeout);

    let input = ListEmployeesInput {
        department: query.department.map(|v| v.trim().to_string()),
        status: query.status,
        query: query.q.map(|v| v.trim().to_string()),
        limit: lenient_int(query.limit.as_deref()),
        offset: lenient_int(query.offset.as_deref()),
    };
    let page = state
        .employees
        .list(deadline.token(), input)
        .await
        .scoped(&request_id)?;

    let data = page.items.iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(PagedResponse::new(
        data,
        PageMeta {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        },
    )))
}

/// GET /api/v1/employees/{id}
pub async fn get_employee(
    state: web::Data<AppState>,
    request_id: RequestId,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = EmployeeId::new(path.into_inner());
    let deadline = Deadline::after(state.request_timeout);

    let employee = state
        .employees
        .get(deadline.token(), &id)
        .await
        .scoped(&request_id)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(&employee))))
}

/// PATCH /api/v1/employees/{id}
pub async fn update_employee(
    state: web::Data<AppState>,
    request_id: RequestId,
    path: web::Path<String>,
    body: web::Json<UpdateEmployeeRequest>,
) -> AppResult<HttpResponse> {
    let id = EmployeeId::new(path.into_inner());
    let req = body.into_inner();
    let deadline = Deadline::after(state.request_timeout);

    let input = UpdateEmployeeInput {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        department: req.department,
        position: req.position,
        salary: req.salary,
        status: req.status,
    };
    let employee = state
        .employees
        .update(deadline.token(), &id, input)
        .await
        .scoped(&request_id)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(&employee))))
}

/// DELETE /api/v1/employees/{id}
pub async fn delete_employee(
    state: web::Data<AppState>,
    request_id: RequestId,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = EmployeeId::new(path.into_inner());
    let deadline = Deadline::after(state.request_timeout);

    state
        .employees
        .delete(deadline.token(), &id)
        .await
        .scoped(&request_id)?;

    Ok(HttpResponse::NoContent().finish())
}
