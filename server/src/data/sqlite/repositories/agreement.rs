//! Agreement repository

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::AgreementRow;

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewAgreement {
    pub title: String,
    pub party: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub body: Option<String>,
    pub signed_at: Option<i64>,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct AgreementPatch {
    pub title: Option<String>,
    pub party: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub body: Option<String>,
    pub signed_at: Option<i64>,
    pub expires_at: Option<i64>,
}

const AGREEMENT_COLUMNS: &str =
    "id, title, party, kind, status, body, signed_at, expires_at, created_at, updated_at";

pub async fn create_agreement(
    pool: &SqlitePool,
    new: &NewAgreement,
) -> Result<AgreementRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let status = new.status.as_deref().unwrap_or("draft");

    sqlx::query(
        "INSERT INTO agreements (id, title, party, kind, status, body, signed_at, expires_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.title)
    .bind(&new.party)
    .bind(&new.kind)
    .bind(status)
    .bind(&new.body)
    .bind(new.signed_at)
    .bind(new.expires_at)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_agreement(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_agreement(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<AgreementRow>, SqliteError> {
    let row = sqlx::query_as::<_, AgreementRow>(&format!(
        "SELECT {AGREEMENT_COLUMNS} FROM agreements WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_agreements(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
) -> Result<(Vec<AgreementRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, AgreementRow>(&format!(
        "SELECT {AGREEMENT_COLUMNS} FROM agreements ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agreements")
        .fetch_one(pool)
        .await?;

    Ok((rows, total.0 as u64))
}

pub async fn update_agreement(
    pool: &SqlitePool,
    id: &str,
    patch: &AgreementPatch,
) -> Result<Option<AgreementRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE agreements SET
            title = COALESCE(?, title),
            party = COALESCE(?, party),
            kind = COALESCE(?, kind),
            status = COALESCE(?, status),
            body = COALESCE(?, body),
            signed_at = COALESCE(?, signed_at),
            expires_at = COALESCE(?, expires_at),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.title)
    .bind(&patch.party)
    .bind(&patch.kind)
    .bind(&patch.status)
    .bind(&patch.body)
    .bind(patch.signed_at)
    .bind(patch.expires_at)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_agreement(pool, id).await
}

pub async fn delete_agreement(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM agreements WHERE id = ?")
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
    async fn test_agreement_crud() {
        let pool = test_pool().await;

        let agreement = create_agreement(
            &pool,
            &NewAgreement {
                title: "Retainer 2026".to_string(),
                party: Some("Acme".to_string()),
                kind: Some("retainer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(agreement.status, "draft");

        let updated = update_agreement(
            &pool,
            &agreement.id,
            &AgreementPatch {
                status: Some("signed".to_string()),
                signed_at: Some(1_760_000_000),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, "signed");
        assert_eq!(updated.signed_at, Some(1_760_000_000));

        let (rows, total) = list_agreements(&pool, 1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, agreement.id);

        assert!(delete_agreement(&pool, &agreement.id).await.unwrap());
        assert!(get_agreement(&pool, &agreement.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_status_rejected() {
        let pool = test_pool().await;
        let result = create_agreement(
            &pool,
            &NewAgreement {
                title: "Bad".to_string(),
                status: Some("void".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_err());
    }
}
