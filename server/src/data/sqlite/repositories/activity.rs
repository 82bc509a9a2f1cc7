//! Activity log repository
//!
//! Append-only. Mutating handlers log through the best-effort variant so a
//! logging failure never fails the request.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ActivityRow;

use super::now;

const ACTIVITY_COLUMNS: &str = "id, entity_type, entity_id, action, detail, actor, created_at";

pub async fn record_activity(
    pool: &SqlitePool,
    entity_type: &str,
    entity_id: Option<&str>,
    action: &str,
    detail: Option<&str>,
    actor: Option<&str>,
) -> Result<ActivityRow, SqliteError> {
    let ts = now();

    let result = sqlx::query(
        "INSERT INTO activity_log (entity_type, entity_id, action, detail, actor, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(action)
    .bind(detail)
    .bind(actor)
    .bind(ts)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let row = sqlx::query_as::<_, ActivityRow>(&format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activity_log WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Record an activity entry, logging instead of propagating failures
pub async fn record_activity_best_effort(
    pool: &SqlitePool,
    entity_type: &str,
    entity_id: Option<&str>,
    action: &str,
    detail: Option<&str>,
    actor: Option<&str>,
) {
    if let Err(e) = record_activity(pool, entity_type, entity_id, action, detail, actor).await {
        tracing::warn!(entity_type, action, error = %e, "Failed to record activity");
    }
}

pub async fn list_activity(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
    entity_type: Option<&str>,
    entity_id: Option<&str>,
) -> Result<(Vec<ActivityRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let mut conditions: Vec<&str> = Vec::new();
    if entity_type.is_some() {
        conditions.push("entity_type = ?");
    }
    if entity_id.is_some() {
        conditions.push("entity_id = ?");
    }
    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activity_log{where_clause} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    let mut query = sqlx::query_as::<_, ActivityRow>(&sql);
    if let Some(entity_type) = entity_type {
        query = query.bind(entity_type.to_string());
    }
    if let Some(entity_id) = entity_id {
        query = query.bind(entity_id.to_string());
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    let count_sql = format!("SELECT COUNT(*) FROM activity_log{where_clause}");
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
    if let Some(entity_type) = entity_type {
        count_query = count_query.bind(entity_type.to_string());
    }
    if let Some(entity_id) = entity_id {
        count_query = count_query.bind(entity_id.to_string());
    }
    let total = count_query.fetch_one(pool).await?;

    Ok((rows, total.0 as u64))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    #[tokio::test]
    async fn test_record_and_list() {
        let pool = test_pool().await;

        record_activity(&pool, "lead", Some("l1"), "created", None, Some("sam"))
            .await
            .unwrap();
        record_activity(&pool, "lead", Some("l1"), "updated", Some("status"), None)
            .await
            .unwrap();
        record_activity(&pool, "task", Some("t1"), "created", None, None)
            .await
            .unwrap();

        let (rows, total) = list_activity(&pool, 1, 10, None, None).await.unwrap();
        assert_eq!(total, 3);
        // Newest first
        assert_eq!(rows[0].entity_type, "task");

        let (rows, total) = list_activity(&pool, 1, 10, Some("lead"), Some("l1"))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(rows.iter().all(|r| r.entity_id.as_deref() == Some("l1")));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let pool = test_pool().await;
        pool.close().await;
        // Closed pool: the insert fails but the call does not panic or return
        record_activity_best_effort(&pool, "lead", None, "created", None, None).await;
    }

    #[tokio::test]
    async fn test_pagination() {
        let pool = test_pool().await;
        for i in 0..5 {
            record_activity(&pool, "link", None, &format!("action{}", i), None, None)
                .await
                .unwrap();
        }

        let (rows, total) = list_activity(&pool, 2, 2, None, None).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(rows.len(), 2);
    }
}
