//! Proposal repository
//!
//! Generic updates never touch `status`; `set_proposal_status` is the only
//! transition path and performs the lead synchronization.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ProposalRow, ProposalStatus};

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewProposal {
    pub lead_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub value: Option<f64>,
    pub scope: Option<String>,
    pub exclusions: Option<String>,
    pub terms: Option<String>,
    pub assumptions: Option<String>,
    pub valid_until: Option<i64>,
}

/// Partial update. Status is deliberately absent.
#[derive(Debug, Default, Clone)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub scope: Option<String>,
    pub exclusions: Option<String>,
    pub terms: Option<String>,
    pub assumptions: Option<String>,
    pub valid_until: Option<i64>,
}

const PROPOSAL_COLUMNS: &str = "id, lead_id, project_id, title, value, scope, exclusions, terms, assumptions, status, valid_until, created_at, updated_at";

pub async fn create_proposal(
    pool: &SqlitePool,
    new: &NewProposal,
) -> Result<ProposalRow, SqliteError> {
    if new.lead_id.is_some() && new.project_id.is_some() {
        return Err(SqliteError::Conflict(
            "a proposal links to a lead or a project, not both".to_string(),
        ));
    }

    let id = cuid2::create_id();
    let ts = now();

    sqlx::query(
        "INSERT INTO proposals (id, lead_id, project_id, title, value, scope, exclusions, terms, assumptions, status, valid_until, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.lead_id)
    .bind(&new.project_id)
    .bind(&new.title)
    .bind(new.value)
    .bind(&new.scope)
    .bind(&new.exclusions)
    .bind(&new.terms)
    .bind(&new.assumptions)
    .bind(new.valid_until)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_proposal(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_proposal(pool: &SqlitePool, id: &str) -> Result<Option<ProposalRow>, SqliteError> {
    let row = sqlx::query_as::<_, ProposalRow>(&format!(
        "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_proposals(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
    status: Option<ProposalStatus>,
) -> Result<(Vec<ProposalRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let (rows, total) = match status {
        Some(status) => {
            let rows = sqlx::query_as::<_, ProposalRow>(&format!(
                "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM proposals WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
        None => {
            let rows = sqlx::query_as::<_, ProposalRow>(&format!(
                "SELECT {PROPOSAL_COLUMNS} FROM proposals ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM proposals")
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
    };

    Ok((rows, total as u64))
}

pub async fn update_proposal(
    pool: &SqlitePool,
    id: &str,
    patch: &ProposalPatch,
) -> Result<Option<ProposalRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE proposals SET
            title = COALESCE(?, title),
            value = COALESCE(?, value),
            scope = COALESCE(?, scope),
            exclusions = COALESCE(?, exclusions),
            terms = COALESCE(?, terms),
            assumptions = COALESCE(?, assumptions),
            valid_until = COALESCE(?, valid_until),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.title)
    .bind(patch.value)
    .bind(&patch.scope)
    .bind(&patch.exclusions)
    .bind(&patch.terms)
    .bind(&patch.assumptions)
    .bind(patch.valid_until)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_proposal(pool, id).await
}

pub async fn delete_proposal(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM proposals WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Transition a proposal's status and sync the linked lead in one
/// transaction. Draft leaves the lead untouched.
pub async fn set_proposal_status(
    pool: &SqlitePool,
    id: &str,
    status: ProposalStatus,
) -> Result<Option<ProposalRow>, SqliteError> {
    let Some(proposal) = get_proposal(pool, id).await? else {
        return Ok(None);
    };

    let ts = now();
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE proposals SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(ts)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if let Some(lead_id) = &proposal.lead_id
        && let Some(lead_status) = status.lead_status()
    {
        sqlx::query("UPDATE leads SET status = ?, updated_at = ? WHERE id = ?")
            .bind(lead_status.as_str())
            .bind(ts)
            .bind(lead_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    get_proposal(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::super::lead::{NewLead, create_lead, get_lead};
    use super::super::test_support::test_pool;
    use super::*;

    fn sample(lead_id: Option<String>) -> NewProposal {
        NewProposal {
            lead_id,
            title: "Website redesign".to_string(),
            value: Some(12_500.0),
            ..Default::default()
        }
    }

    async fn lead_id(pool: &SqlitePool) -> String {
        create_lead(
            pool,
            &NewLead {
                name: "Acme".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_defaults_to_draft() {
        let pool = test_pool().await;
        let proposal = create_proposal(&pool, &sample(None)).await.unwrap();
        assert_eq!(proposal.status, "draft");
        assert_eq!(proposal.value, Some(12_500.0));
    }

    #[tokio::test]
    async fn test_create_with_both_links_rejected() {
        let pool = test_pool().await;
        let lead = lead_id(&pool).await;
        let err = create_proposal(
            &pool,
            &NewProposal {
                lead_id: Some(lead),
                project_id: Some("p1".to_string()),
                title: "Bad".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_generic_update_cannot_change_status() {
        let pool = test_pool().await;
        let proposal = create_proposal(&pool, &sample(None)).await.unwrap();

        let updated = update_proposal(
            &pool,
            &proposal.id,
            &ProposalPatch {
                title: Some("Bigger redesign".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "Bigger redesign");
        assert_eq!(updated.status, "draft");
    }

    #[tokio::test]
    async fn test_status_transition_syncs_lead() {
        let pool = test_pool().await;
        let lead = lead_id(&pool).await;
        let proposal = create_proposal(&pool, &sample(Some(lead.clone())))
            .await
            .unwrap();

        let updated = set_proposal_status(&pool, &proposal.id, ProposalStatus::Sent)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "sent");
        assert_eq!(
            get_lead(&pool, &lead).await.unwrap().unwrap().status,
            "proposal_sent"
        );

        set_proposal_status(&pool, &proposal.id, ProposalStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(
            get_lead(&pool, &lead).await.unwrap().unwrap().status,
            "closed_won"
        );
    }

    #[tokio::test]
    async fn test_draft_transition_leaves_lead() {
        let pool = test_pool().await;
        let lead = lead_id(&pool).await;
        let proposal = create_proposal(&pool, &sample(Some(lead.clone())))
            .await
            .unwrap();

        set_proposal_status(&pool, &proposal.id, ProposalStatus::Sent)
            .await
            .unwrap();
        set_proposal_status(&pool, &proposal.id, ProposalStatus::Draft)
            .await
            .unwrap();

        assert_eq!(
            get_lead(&pool, &lead).await.unwrap().unwrap().status,
            "proposal_sent"
        );
    }

    #[tokio::test]
    async fn test_status_transition_unknown_id() {
        let pool = test_pool().await;
        let result = set_proposal_status(&pool, "missing", ProposalStatus::Sent)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_proposal_clears_lead_link() {
        let pool = test_pool().await;
        let lead = lead_id(&pool).await;
        let proposal = create_proposal(&pool, &sample(Some(lead.clone())))
            .await
            .unwrap();

        sqlx::query("UPDATE leads SET proposal_id = ? WHERE id = ?")
            .bind(&proposal.id)
            .bind(&lead)
            .execute(&pool)
            .await
            .unwrap();

        assert!(delete_proposal(&pool, &proposal.id).await.unwrap());
        // ON DELETE SET NULL
        let lead_row = get_lead(&pool, &lead).await.unwrap().unwrap();
        assert!(lead_row.proposal_id.is_none());
    }
}
