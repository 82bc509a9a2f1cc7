//! Infrastructure asset repository
//!
//! Assets (domains, servers, mailboxes) carry a free-form JSON `metadata`
//! object whose shape depends on the asset type. Project links live in the
//! `project_infra` join table.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::InfraAssetRow;

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: String,
    pub provider: Option<String>,
    pub status: Option<String>,
    pub metadata: Option<String>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub status: Option<String>,
    pub metadata: Option<String>,
    pub expires_at: Option<i64>,
}

const ASSET_COLUMNS: &str =
    "id, name, type, provider, status, metadata, expires_at, created_at, updated_at";

pub async fn create_asset(pool: &SqlitePool, new: &NewAsset) -> Result<InfraAssetRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let status = new.status.as_deref().unwrap_or("active");
    let metadata = new.metadata.as_deref().unwrap_or("{}");

    sqlx::query(
        "INSERT INTO infra_assets (id, name, type, provider, status, metadata, expires_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.asset_type)
    .bind(&new.provider)
    .bind(status)
    .bind(metadata)
    .bind(new.expires_at)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_asset(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_asset(pool: &SqlitePool, id: &str) -> Result<Option<InfraAssetRow>, SqliteError> {
    let row = sqlx::query_as::<_, InfraAssetRow>(&format!(
        "SELECT {ASSET_COLUMNS} FROM infra_assets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_assets(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
    asset_type: Option<&str>,
) -> Result<(Vec<InfraAssetRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let (rows, total) = match asset_type {
        Some(asset_type) => {
            let rows = sqlx::query_as::<_, InfraAssetRow>(&format!(
                "SELECT {ASSET_COLUMNS} FROM infra_assets WHERE type = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(asset_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM infra_assets WHERE type = ?")
                .bind(asset_type)
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
        None => {
            let rows = sqlx::query_as::<_, InfraAssetRow>(&format!(
                "SELECT {ASSET_COLUMNS} FROM infra_assets ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM infra_assets")
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
    };

    Ok((rows, total as u64))
}

/// Update an asset. `type` is immutable after creation.
pub async fn update_asset(
    pool: &SqlitePool,
    id: &str,
    patch: &AssetPatch,
) -> Result<Option<InfraAssetRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE infra_assets SET
            name = COALESCE(?, name),
            provider = COALESCE(?, provider),
            status = COALESCE(?, status),
            metadata = COALESCE(?, metadata),
            expires_at = COALESCE(?, expires_at),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(&patch.provider)
    .bind(&patch.status)
    .bind(&patch.metadata)
    .bind(patch.expires_at)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_asset(pool, id).await
}

pub async fn delete_asset(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM infra_assets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Link an asset to a project. Idempotent; returns false if already linked.
pub async fn link_asset(
    pool: &SqlitePool,
    project_id: &str,
    asset_id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO project_infra (project_id, asset_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(project_id)
    .bind(asset_id)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn unlink_asset(
    pool: &SqlitePool,
    project_id: &str,
    asset_id: &str,
) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM project_infra WHERE project_id = ? AND asset_id = ?")
        .bind(project_id)
        .bind(asset_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_assets_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<InfraAssetRow>, SqliteError> {
    let rows = sqlx::query_as::<_, InfraAssetRow>(
        "SELECT a.id, a.name, a.type, a.provider, a.status, a.metadata, a.expires_at, a.created_at, a.updated_at
         FROM infra_assets a
         JOIN project_infra pi ON pi.asset_id = a.id
         WHERE pi.project_id = ?
         ORDER BY pi.created_at ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::super::project::{NewProject, create_project};
    use super::super::test_support::test_pool;
    use super::*;

    fn domain_asset() -> NewAsset {
        NewAsset {
            name: "acme.com".to_string(),
            asset_type: "domain".to_string(),
            provider: Some("Namecheap".to_string()),
            metadata: Some(r#"{"registrar":"namecheap","auto_renew":true}"#.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_asset_defaults() {
        let pool = test_pool().await;
        let asset = create_asset(&pool, &domain_asset()).await.unwrap();
        assert_eq!(asset.status, "active");
        assert_eq!(asset.asset_type, "domain");
        assert!(asset.metadata.contains("auto_renew"));
    }

    #[tokio::test]
    async fn test_invalid_type_rejected() {
        let pool = test_pool().await;
        let result = create_asset(
            &pool,
            &NewAsset {
                name: "thing".to_string(),
                asset_type: "printer".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_filter_by_type() {
        let pool = test_pool().await;
        create_asset(&pool, &domain_asset()).await.unwrap();
        create_asset(
            &pool,
            &NewAsset {
                name: "web-01".to_string(),
                asset_type: "server".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (rows, total) = list_assets(&pool, 1, 10, Some("server")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].name, "web-01");
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let pool = test_pool().await;
        let project = create_project(
            &pool,
            &NewProject {
                name: "Site".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let asset = create_asset(&pool, &domain_asset()).await.unwrap();

        assert!(link_asset(&pool, &project.id, &asset.id).await.unwrap());
        assert!(!link_asset(&pool, &project.id, &asset.id).await.unwrap());

        let linked = list_assets_for_project(&pool, &project.id).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, asset.id);
    }

    #[tokio::test]
    async fn test_unlink_and_cascade() {
        let pool = test_pool().await;
        let project = create_project(
            &pool,
            &NewProject {
                name: "Site".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let asset = create_asset(&pool, &domain_asset()).await.unwrap();
        link_asset(&pool, &project.id, &asset.id).await.unwrap();

        assert!(unlink_asset(&pool, &project.id, &asset.id).await.unwrap());
        assert!(!unlink_asset(&pool, &project.id, &asset.id).await.unwrap());

        // Deleting the asset removes any remaining join rows
        link_asset(&pool, &project.id, &asset.id).await.unwrap();
        delete_asset(&pool, &asset.id).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM project_infra")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
