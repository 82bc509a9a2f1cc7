//! Task repository (board tasks, subtasks, comments)
//!
//! Tasks optionally attach to a project; any mutation that changes a task's
//! project attachment or completion recomputes the affected projects'
//! derived progress, including both sides of a move.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{SubtaskRow, TaskCommentRow, TaskRow};

use super::now;
use super::project::recompute_progress;

#[derive(Debug, Default, Clone)]
pub struct NewTask {
    pub project_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    /// `Some(None)` detaches the task from its project
    pub project_id: Option<Option<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub project_id: Option<String>,
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, assignee, due_date, created_at, updated_at";

pub async fn create_task(pool: &SqlitePool, new: &NewTask) -> Result<TaskRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let status = new.status.as_deref().unwrap_or("todo");
    let priority = new.priority.as_deref().unwrap_or("medium");

    sqlx::query(
        "INSERT INTO tasks (id, project_id, title, description, status, priority, assignee, due_date, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.project_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(status)
    .bind(priority)
    .bind(&new.assignee)
    .bind(new.due_date)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    if let Some(project_id) = &new.project_id {
        recompute_progress(pool, project_id).await?;
    }

    get_task(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_task(pool: &SqlitePool, id: &str) -> Result<Option<TaskRow>, SqliteError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_tasks(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
    filter: &TaskFilter,
) -> Result<(Vec<TaskRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let mut conditions: Vec<&str> = Vec::new();
    if filter.status.is_some() {
        conditions.push("status = ?");
    }
    if filter.project_id.is_some() {
        conditions.push("project_id = ?");
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks{where_clause} ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );
    let mut query = sqlx::query_as::<_, TaskRow>(&sql);
    if let Some(status) = &filter.status {
        query = query.bind(status.clone());
    }
    if let Some(project_id) = &filter.project_id {
        query = query.bind(project_id.clone());
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    let count_sql = format!("SELECT COUNT(*) FROM tasks{where_clause}");
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
    if let Some(status) = &filter.status {
        count_query = count_query.bind(status.clone());
    }
    if let Some(project_id) = &filter.project_id {
        count_query = count_query.bind(project_id.clone());
    }
    let total = count_query.fetch_one(pool).await?;

    Ok((rows, total.0 as u64))
}

pub async fn update_task(
    pool: &SqlitePool,
    id: &str,
    patch: &TaskPatch,
) -> Result<Option<TaskRow>, SqliteError> {
    let Some(current) = get_task(pool, id).await? else {
        return Ok(None);
    };

    let new_project = match &patch.project_id {
        Some(value) => value.clone(),
        None => current.project_id.clone(),
    };

    sqlx::query(
        "UPDATE tasks SET
            project_id = ?,
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            status = COALESCE(?, status),
            priority = COALESCE(?, priority),
            assignee = COALESCE(?, assignee),
            due_date = COALESCE(?, due_date),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&new_project)
    .bind(&patch.title)
    .bind(&patch.description)
    .bind(&patch.status)
    .bind(&patch.priority)
    .bind(&patch.assignee)
    .bind(patch.due_date)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    // Recompute both sides of a project move
    if let Some(old) = &current.project_id {
        recompute_progress(pool, old).await?;
    }
    if let Some(new) = &new_project
        && current.project_id.as_deref() != Some(new.as_str())
    {
        recompute_progress(pool, new).await?;
    }

    get_task(pool, id).await
}

pub async fn delete_task(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let Some(current) = get_task(pool, id).await? else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if let Some(project_id) = &current.project_id {
        recompute_progress(pool, project_id).await?;
    }
    Ok(true)
}

// =============================================================================
// Subtasks
// =============================================================================

pub async fn create_subtask(
    pool: &SqlitePool,
    task_id: &str,
    title: &str,
) -> Result<SubtaskRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();

    sqlx::query(
        "INSERT INTO subtasks (id, task_id, title, done, created_at, updated_at) VALUES (?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(task_id)
    .bind(title)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_subtask(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_subtask(pool: &SqlitePool, id: &str) -> Result<Option<SubtaskRow>, SqliteError> {
    let row = sqlx::query_as::<_, SubtaskRow>(
        "SELECT id, task_id, title, done, created_at, updated_at FROM subtasks WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_subtasks(
    pool: &SqlitePool,
    task_id: &str,
) -> Result<Vec<SubtaskRow>, SqliteError> {
    let rows = sqlx::query_as::<_, SubtaskRow>(
        "SELECT id, task_id, title, done, created_at, updated_at FROM subtasks WHERE task_id = ? ORDER BY created_at ASC",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update_subtask(
    pool: &SqlitePool,
    task_id: &str,
    subtask_id: &str,
    title: Option<&str>,
    done: Option<bool>,
) -> Result<Option<SubtaskRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE subtasks SET
            title = COALESCE(?, title),
            done = COALESCE(?, done),
            updated_at = ?
         WHERE id = ? AND task_id = ?",
    )
    .bind(title)
    .bind(done)
    .bind(now())
    .bind(subtask_id)
    .bind(task_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_subtask(pool, subtask_id).await
}

pub async fn delete_subtask(
    pool: &SqlitePool,
    task_id: &str,
    subtask_id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM subtasks WHERE id = ? AND task_id = ?")
        .bind(subtask_id)
        .bind(task_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Comments
// =============================================================================

pub async fn create_comment(
    pool: &SqlitePool,
    task_id: &str,
    author: &str,
    body: &str,
) -> Result<TaskCommentRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();

    sqlx::query(
        "INSERT INTO task_comments (id, task_id, author, body, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(task_id)
    .bind(author)
    .bind(body)
    .bind(ts)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, TaskCommentRow>(
        "SELECT id, task_id, author, body, created_at FROM task_comments WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_comments(
    pool: &SqlitePool,
    task_id: &str,
) -> Result<Vec<TaskCommentRow>, SqliteError> {
    let rows = sqlx::query_as::<_, TaskCommentRow>(
        "SELECT id, task_id, author, body, created_at FROM task_comments WHERE task_id = ? ORDER BY created_at ASC",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn delete_comment(
    pool: &SqlitePool,
    task_id: &str,
    comment_id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM task_comments WHERE id = ? AND task_id = ?")
        .bind(comment_id)
        .bind(task_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::super::project::{NewProject, create_project, get_project};
    use super::super::test_support::test_pool;
    use super::*;

    async fn make_project(pool: &SqlitePool) -> String {
        create_project(
            pool,
            &NewProject {
                name: "Board".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let pool = test_pool().await;
        let task = create_task(
            &pool,
            &NewTask {
                title: "Ship it".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(task.status, "todo");
        assert_eq!(task.priority, "medium");
        assert!(task.project_id.is_none());
    }

    #[tokio::test]
    async fn test_attached_task_drives_progress() {
        let pool = test_pool().await;
        let project_id = make_project(&pool).await;

        let task = create_task(
            &pool,
            &NewTask {
                project_id: Some(project_id.clone()),
                title: "Build".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let project = get_project(&pool, &project_id).await.unwrap().unwrap();
        assert_eq!(project.tasks, 1);
        assert_eq!(project.progress, 0);

        update_task(
            &pool,
            &task.id,
            &TaskPatch {
                status: Some("done".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let project = get_project(&pool, &project_id).await.unwrap().unwrap();
        assert_eq!(project.progress, 100);
    }

    #[tokio::test]
    async fn test_mixed_task_sources_aggregate() {
        let pool = test_pool().await;
        let project_id = make_project(&pool).await;

        // One done board task plus one pending checklist row: 1 of 2
        create_task(
            &pool,
            &NewTask {
                project_id: Some(project_id.clone()),
                title: "Done one".to_string(),
                status: Some("done".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        super::super::project::create_project_task(
            &pool,
            &project_id,
            &super::super::project::NewProjectTask {
                title: "Pending one".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let project = get_project(&pool, &project_id).await.unwrap().unwrap();
        assert_eq!(project.tasks, 2);
        assert_eq!(project.progress, 50);
    }

    #[tokio::test]
    async fn test_moving_task_recomputes_both_projects() {
        let pool = test_pool().await;
        let a = make_project(&pool).await;
        let b = make_project(&pool).await;

        let task = create_task(
            &pool,
            &NewTask {
                project_id: Some(a.clone()),
                title: "Mover".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        update_task(
            &pool,
            &task.id,
            &TaskPatch {
                project_id: Some(Some(b.clone())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let project_a = get_project(&pool, &a).await.unwrap().unwrap();
        let project_b = get_project(&pool, &b).await.unwrap().unwrap();
        assert_eq!(project_a.tasks, 0);
        assert_eq!(project_a.progress, 100);
        assert_eq!(project_b.tasks, 1);
        assert_eq!(project_b.progress, 0);
    }

    #[tokio::test]
    async fn test_detach_task_from_project() {
        let pool = test_pool().await;
        let project_id = make_project(&pool).await;
        let task = create_task(
            &pool,
            &NewTask {
                project_id: Some(project_id.clone()),
                title: "Detach me".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_task(
            &pool,
            &task.id,
            &TaskPatch {
                project_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert!(updated.project_id.is_none());
        let project = get_project(&pool, &project_id).await.unwrap().unwrap();
        assert_eq!(project.tasks, 0);
        assert_eq!(project.progress, 100);
    }

    #[tokio::test]
    async fn test_delete_task_recomputes() {
        let pool = test_pool().await;
        let project_id = make_project(&pool).await;
        let task = create_task(
            &pool,
            &NewTask {
                project_id: Some(project_id.clone()),
                title: "Short lived".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(delete_task(&pool, &task.id).await.unwrap());
        let project = get_project(&pool, &project_id).await.unwrap().unwrap();
        assert_eq!(project.progress, 100);
    }

    #[tokio::test]
    async fn test_list_tasks_filters() {
        let pool = test_pool().await;
        let project_id = make_project(&pool).await;
        create_task(
            &pool,
            &NewTask {
                project_id: Some(project_id.clone()),
                title: "A".to_string(),
                status: Some("done".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        create_task(
            &pool,
            &NewTask {
                title: "B".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (_, total) = list_tasks(
            &pool,
            1,
            10,
            &TaskFilter {
                status: Some("done".to_string()),
                project_id: Some(project_id.clone()),
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 1);

        let (_, all) = list_tasks(&pool, 1, 10, &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(all, 2);
    }

    #[tokio::test]
    async fn test_subtasks_and_comments() {
        let pool = test_pool().await;
        let task = create_task(
            &pool,
            &NewTask {
                title: "Parent".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let sub = create_subtask(&pool, &task.id, "Step 1").await.unwrap();
        assert!(!sub.done);

        let updated = update_subtask(&pool, &task.id, &sub.id, None, Some(true))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.done);

        let comment = create_comment(&pool, &task.id, "sam", "Looks good")
            .await
            .unwrap();
        assert_eq!(list_comments(&pool, &task.id).await.unwrap().len(), 1);

        assert!(delete_comment(&pool, &task.id, &comment.id).await.unwrap());
        assert!(delete_subtask(&pool, &task.id, &sub.id).await.unwrap());

        // Wrong parent: no match
        assert!(
            update_subtask(&pool, "other", &sub.id, None, Some(false))
                .await
                .unwrap()
                .is_none()
        );
    }
}
