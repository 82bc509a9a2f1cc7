//! Employee API endpoints

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use sqlx::SqlitePool;

use crate::api::auth::SessionMember;
use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PaginatedResponse};
use crate::data::sqlite::repositories::activity::record_activity_best_effort;
use crate::data::sqlite::repositories::employee::{
    EmployeePatch, NewEmployee, create_employee, delete_employee, get_employee, list_employees,
    update_employee,
};

use types::{CreateEmployeeRequest, EmployeeDto, ListEmployeesQuery, UpdateEmployeeRequest};

/// Shared state for Employee API endpoints
#[derive(Clone)]
pub struct EmployeesApiState {
    pub pool: SqlitePool,
}

/// Build Employee API routes
pub fn routes(pool: SqlitePool) -> Router<()> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .with_state(EmployeesApiState { pool })
}

fn employee_not_found(id: &str) -> ApiError {
    ApiError::not_found("EMPLOYEE_NOT_FOUND", format!("Employee not found: {}", id))
}

/// List employees by name
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "employees",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of employees with pagination metadata")
    )
)]
pub async fn list(
    State(state): State<EmployeesApiState>,
    ValidatedQuery(query): ValidatedQuery<ListEmployeesQuery>,
) -> Result<Json<PaginatedResponse<EmployeeDto>>, ApiError> {
    let (rows, total) = list_employees(&state.pool, query.page, query.limit)
        .await
        .map_err(ApiError::from_sqlite)?;

    let data: Vec<EmployeeDto> = rows.into_iter().map(EmployeeDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create an employee record
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeDto),
        (status = 400, description = "Duplicate email")
    )
)]
pub async fn create(
    State(state): State<EmployeesApiState>,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeDto>), ApiError> {
    let employee = create_employee(
        &state.pool,
        &NewEmployee {
            name: body.name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            department: body.department,
            start_date: body.start_date,
            onboarding_status: body.onboarding_status,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?;

    record_activity_best_effort(
        &state.pool,
        "employee",
        Some(&employee.id),
        "created",
        Some(&employee.name),
        Some(&member.0),
    )
    .await;

    Ok((StatusCode::CREATED, Json(EmployeeDto::from(employee))))
}

/// Get a single employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee details", body = EmployeeDto),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_one(
    State(state): State<EmployeesApiState>,
    path: IdPath,
) -> Result<Json<EmployeeDto>, ApiError> {
    let employee = get_employee(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .ok_or_else(|| employee_not_found(&path.id))?;
    Ok(Json(EmployeeDto::from(employee)))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeDto),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn update(
    State(state): State<EmployeesApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
    ValidatedJson(body): ValidatedJson<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeDto>, ApiError> {
    let employee = update_employee(
        &state.pool,
        &path.id,
        &EmployeePatch {
            name: body.name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            department: body.department,
            start_date: body.start_date,
            onboarding_status: body.onboarding_status,
        },
    )
    .await
    .map_err(ApiError::from_sqlite)?
    .ok_or_else(|| employee_not_found(&path.id))?;

    record_activity_best_effort(
        &state.pool,
        "employee",
        Some(&employee.id),
        "updated",
        None,
        Some(&member.0),
    )
    .await;

    Ok(Json(EmployeeDto::from(employee)))
}

/// Delete an employee record
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn delete(
    State(state): State<EmployeesApiState>,
    path: IdPath,
    Extension(member): Extension<SessionMember>,
) -> Result<StatusCode, ApiError> {
    let deleted = delete_employee(&state.pool, &path.id)
        .await
        .map_err(ApiError::from_sqlite)?;
    if !deleted {
        return Err(employee_not_found(&path.id));
    }

    record_activity_best_effort(
        &state.pool,
        "employee",
        Some(&path.id),
        "deleted",
        None,
        Some(&member.0),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
