//! Project repository
//!
//! `progress` and `tasks` are derived columns, recomputed over the union of
//! `tasks` and `project_tasks` after every mutation that touches a project's
//! task set. A project with no tasks reports 100.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ProjectRow, ProjectTaskRow};

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewProject {
    pub name: String,
    pub client: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub client: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct NewProjectTask {
    pub title: String,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct ProjectTaskPatch {
    pub title: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

const PROJECT_COLUMNS: &str =
    "id, name, client, description, status, start_date, progress, tasks, created_at, updated_at";

const PROJECT_TASK_COLUMNS: &str =
    "id, project_id, title, status, assignee, due_date, created_at, updated_at";

pub async fn create_project(pool: &SqlitePool, new: &NewProject) -> Result<ProjectRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let status = new.status.as_deref().unwrap_or("active");

    sqlx::query(
        "INSERT INTO projects (id, name, client, description, status, start_date, progress, tasks, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, 100, 0, ?, ?)",
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.client)
    .bind(&new.description)
    .bind(status)
    .bind(new.start_date)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_project(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_project(pool: &SqlitePool, id: &str) -> Result<Option<ProjectRow>, SqliteError> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_projects(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
    status: Option<&str>,
) -> Result<(Vec<ProjectRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let (rows, total) = match status {
        Some(status) => {
            let rows = sqlx::query_as::<_, ProjectRow>(&format!(
                "SELECT {PROJECT_COLUMNS} FROM projects WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE status = ?")
                .bind(status)
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
        None => {
            let rows = sqlx::query_as::<_, ProjectRow>(&format!(
                "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
    };

    Ok((rows, total as u64))
}

/// Update a project's own fields. Derived columns are not writable here.
pub async fn update_project(
    pool: &SqlitePool,
    id: &str,
    patch: &ProjectPatch,
) -> Result<Option<ProjectRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE projects SET
            name = COALESCE(?, name),
            client = COALESCE(?, client),
            description = COALESCE(?, description),
            status = COALESCE(?, status),
            start_date = COALESCE(?, start_date),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(&patch.client)
    .bind(&patch.description)
    .bind(&patch.status)
    .bind(patch.start_date)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_project(pool, id).await
}

pub async fn delete_project(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Recompute the derived `tasks` / `progress` columns over the union of both
/// task tables. Zero tasks counts as fully complete.
pub async fn recompute_progress(pool: &SqlitePool, project_id: &str) -> Result<(), SqliteError> {
    let (completed, total): (i64, i64) = sqlx::query_as(
        "SELECT
            (SELECT COUNT(*) FROM tasks WHERE project_id = ? AND status = 'done')
          + (SELECT COUNT(*) FROM project_tasks WHERE project_id = ? AND status = 'done'),
            (SELECT COUNT(*) FROM tasks WHERE project_id = ?)
          + (SELECT COUNT(*) FROM project_tasks WHERE project_id = ?)",
    )
    .bind(project_id)
    .bind(project_id)
    .bind(project_id)
    .bind(project_id)
    .fetch_one(pool)
    .await?;

    let progress = if total == 0 {
        100
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as i64
    };

    sqlx::query("UPDATE projects SET tasks = ?, progress = ?, updated_at = ? WHERE id = ?")
        .bind(total)
        .bind(progress)
        .bind(now())
        .bind(project_id)
        .execute(pool)
        .await?;

    tracing::trace!(%project_id, total, completed, progress, "Recomputed project progress");
    Ok(())
}

// =============================================================================
// Project tasks (checklist rows owned by a project)
// =============================================================================

pub async fn create_project_task(
    pool: &SqlitePool,
    project_id: &str,
    new: &NewProjectTask,
) -> Result<ProjectTaskRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let status = new.status.as_deref().unwrap_or("pending");

    sqlx::query(
        "INSERT INTO project_tasks (id, project_id, title, status, assignee, due_date, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(project_id)
    .bind(&new.title)
    .bind(status)
    .bind(&new.assignee)
    .bind(new.due_date)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    recompute_progress(pool, project_id).await?;

    get_project_task(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_project_task(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<ProjectTaskRow>, SqliteError> {
    let row = sqlx::query_as::<_, ProjectTaskRow>(&format!(
        "SELECT {PROJECT_TASK_COLUMNS} FROM project_tasks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_project_tasks(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<ProjectTaskRow>, SqliteError> {
    let rows = sqlx::query_as::<_, ProjectTaskRow>(&format!(
        "SELECT {PROJECT_TASK_COLUMNS} FROM project_tasks WHERE project_id = ? ORDER BY created_at ASC"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update_project_task(
    pool: &SqlitePool,
    project_id: &str,
    task_id: &str,
    patch: &ProjectTaskPatch,
) -> Result<Option<ProjectTaskRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE project_tasks SET
            title = COALESCE(?, title),
            status = COALESCE(?, status),
            assignee = COALESCE(?, assignee),
            due_date = COALESCE(?, due_date),
            updated_at = ?
         WHERE id = ? AND project_id = ?",
    )
    .bind(&patch.title)
    .bind(&patch.status)
    .bind(&patch.assignee)
    .bind(patch.due_date)
    .bind(now())
    .bind(task_id)
    .bind(project_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    recompute_progress(pool, project_id).await?;
    get_project_task(pool, task_id).await
}

pub async fn delete_project_task(
    pool: &SqlitePool,
    project_id: &str,
    task_id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM project_tasks WHERE id = ? AND project_id = ?")
        .bind(task_id)
        .bind(project_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    recompute_progress(pool, project_id).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    async fn make_project(pool: &SqlitePool) -> ProjectRow {
        create_project(
            pool,
            &NewProject {
                name: "Launch".to_string(),
                client: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_project_is_fully_complete() {
        let pool = test_pool().await;
        let project = make_project(&pool).await;
        assert_eq!(project.progress, 100);
        assert_eq!(project.tasks, 0);
    }

    #[tokio::test]
    async fn test_checklist_task_updates_progress() {
        let pool = test_pool().await;
        let project = make_project(&pool).await;

        let t1 = create_project_task(
            &pool,
            &project.id,
            &NewProjectTask {
                title: "Draft copy".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        create_project_task(
            &pool,
            &project.id,
            &NewProjectTask {
                title: "Review".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let project_row = get_project(&pool, &project.id).await.unwrap().unwrap();
        assert_eq!(project_row.tasks, 2);
        assert_eq!(project_row.progress, 0);

        update_project_task(
            &pool,
            &project.id,
            &t1.id,
            &ProjectTaskPatch {
                status: Some("done".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        let project_row = get_project(&pool, &project.id).await.unwrap().unwrap();
        assert_eq!(project_row.progress, 50);
    }

    #[tokio::test]
    async fn test_deleting_last_task_returns_to_complete() {
        let pool = test_pool().await;
        let project = make_project(&pool).await;
        let task = create_project_task(
            &pool,
            &project.id,
            &NewProjectTask {
                title: "Only one".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(
            delete_project_task(&pool, &project.id, &task.id)
                .await
                .unwrap()
        );

        let project_row = get_project(&pool, &project.id).await.unwrap().unwrap();
        assert_eq!(project_row.tasks, 0);
        assert_eq!(project_row.progress, 100);
    }

    #[tokio::test]
    async fn test_progress_rounds() {
        let pool = test_pool().await;
        let project = make_project(&pool).await;

        for i in 0..3 {
            let task = create_project_task(
                &pool,
                &project.id,
                &NewProjectTask {
                    title: format!("Task {}", i),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            if i == 0 {
                update_project_task(
                    &pool,
                    &project.id,
                    &task.id,
                    &ProjectTaskPatch {
                        status: Some("done".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            }
        }

        // 1 of 3 done: 33.33 rounds to 33
        let project_row = get_project(&pool, &project.id).await.unwrap().unwrap();
        assert_eq!(project_row.progress, 33);
    }

    #[tokio::test]
    async fn test_update_project_fields() {
        let pool = test_pool().await;
        let project = make_project(&pool).await;

        let updated = update_project(
            &pool,
            &project.id,
            &ProjectPatch {
                status: Some("on_hold".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status, "on_hold");
        assert_eq!(updated.name, "Launch");
    }

    #[tokio::test]
    async fn test_delete_project_cascades_checklist() {
        let pool = test_pool().await;
        let project = make_project(&pool).await;
        create_project_task(
            &pool,
            &project.id,
            &NewProjectTask {
                title: "Orphan-to-be".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(delete_project(&pool, &project.id).await.unwrap());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM project_tasks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_project_task_scoped_to_project() {
        let pool = test_pool().await;
        let a = make_project(&pool).await;
        let b = make_project(&pool).await;
        let task = create_project_task(
            &pool,
            &a.id,
            &NewProjectTask {
                title: "In A".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Wrong parent project: no match
        assert!(!delete_project_task(&pool, &b.id, &task.id).await.unwrap());
        assert!(
            update_project_task(&pool, &b.id, &task.id, &ProjectTaskPatch::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}
