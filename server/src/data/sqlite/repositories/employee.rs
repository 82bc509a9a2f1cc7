//! Employee repository

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::EmployeeRow;

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<i64>,
    pub onboarding_status: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<i64>,
    pub onboarding_status: Option<String>,
}

const EMPLOYEE_COLUMNS: &str =
    "id, name, email, phone, role, department, start_date, onboarding_status, created_at, updated_at";

pub async fn create_employee(
    pool: &SqlitePool,
    new: &NewEmployee,
) -> Result<EmployeeRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let onboarding = new.onboarding_status.as_deref().unwrap_or("invited");

    sqlx::query(
        "INSERT INTO employees (id, name, email, phone, role, department, start_date, onboarding_status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.role)
    .bind(&new.department)
    .bind(new.start_date)
    .bind(onboarding)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_employee(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_employee(pool: &SqlitePool, id: &str) -> Result<Option<EmployeeRow>, SqliteError> {
    let row = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_employees(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
) -> Result<(Vec<EmployeeRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name ASC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;

    Ok((rows, total.0 as u64))
}

pub async fn update_employee(
    pool: &SqlitePool,
    id: &str,
    patch: &EmployeePatch,
) -> Result<Option<EmployeeRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE employees SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            role = COALESCE(?, role),
            department = COALESCE(?, department),
            start_date = COALESCE(?, start_date),
            onboarding_status = COALESCE(?, onboarding_status),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(&patch.role)
    .bind(&patch.department)
    .bind(patch.start_date)
    .bind(&patch.onboarding_status)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_employee(pool, id).await
}

pub async fn delete_employee(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    #[tokio::test]
    async fn test_employee_crud() {
        let pool = test_pool().await;

        let employee = create_employee(
            &pool,
            &NewEmployee {
                name: "Jordan".to_string(),
                email: Some("jordan@acme.test".to_string()),
                department: Some("Design".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(employee.onboarding_status, "invited");

        let updated = update_employee(
            &pool,
            &employee.id,
            &EmployeePatch {
                onboarding_status: Some("active".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.onboarding_status, "active");

        let (_, total) = list_employees(&pool, 1, 10).await.unwrap();
        assert_eq!(total, 1);

        assert!(delete_employee(&pool, &employee.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        create_employee(
            &pool,
            &NewEmployee {
                name: "A".to_string(),
                email: Some("dup@acme.test".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = create_employee(
            &pool,
            &NewEmployee {
                name: "B".to_string(),
                email: Some("dup@acme.test".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_unique_violation());
    }
}
