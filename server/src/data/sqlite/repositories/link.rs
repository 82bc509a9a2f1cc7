//! Shared link repository

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::LinkRow;

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub category: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
}

const LINK_COLUMNS: &str = "id, title, url, category, created_at, updated_at";

pub async fn create_link(pool: &SqlitePool, new: &NewLink) -> Result<LinkRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();

    sqlx::query(
        "INSERT INTO links (id, title, url, category, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.url)
    .bind(&new.category)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_link(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_link(pool: &SqlitePool, id: &str) -> Result<Option<LinkRow>, SqliteError> {
    let row = sqlx::query_as::<_, LinkRow>(&format!(
        "SELECT {LINK_COLUMNS} FROM links WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_links(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
) -> Result<(Vec<LinkRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, LinkRow>(&format!(
        "SELECT {LINK_COLUMNS} FROM links ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    Ok((rows, total.0 as u64))
}

pub async fn update_link(
    pool: &SqlitePool,
    id: &str,
    patch: &LinkPatch,
) -> Result<Option<LinkRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE links SET
            title = COALESCE(?, title),
            url = COALESCE(?, url),
            category = COALESCE(?, category),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.title)
    .bind(&patch.url)
    .bind(&patch.category)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_link(pool, id).await
}

pub async fn delete_link(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM links WHERE id = ?")
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
    async fn test_link_crud() {
        let pool = test_pool().await;

        let link = create_link(
            &pool,
            &NewLink {
                title: "Staging".to_string(),
                url: "https://staging.acme.test".to_string(),
                category: Some("environments".to_string()),
            },
        )
        .await
        .unwrap();

        let updated = update_link(
            &pool,
            &link.id,
            &LinkPatch {
                title: Some("Staging (new)".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.title, "Staging (new)");
        assert_eq!(updated.url, "https://staging.acme.test");

        assert!(delete_link(&pool, &link.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_url_rejected() {
        let pool = test_pool().await;
        create_link(
            &pool,
            &NewLink {
                title: "One".to_string(),
                url: "https://same.test".to_string(),
                category: None,
            },
        )
        .await
        .unwrap();

        let err = create_link(
            &pool,
            &NewLink {
                title: "Two".to_string(),
                url: "https://same.test".to_string(),
                category: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_unique_violation());
    }
}
