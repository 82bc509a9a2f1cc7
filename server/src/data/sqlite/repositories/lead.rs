//! Lead repository
//!
//! Leads carry the sales pipeline status. Terminal transitions and the
//! dedicated conversion flow are the only places that touch a linked
//! proposal; plain field updates never do.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{LeadRow, LeadStatus};

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
    pub loss_reason: Option<String>,
}

/// Conversion target for the dedicated lead conversion flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertTarget {
    Proposal,
    Project,
}

const LEAD_COLUMNS: &str = "id, name, email, phone, company, source, notes, status, loss_reason, proposal_id, project_id, created_at, updated_at";

/// Create a new lead with a generated CUID2 ID
pub async fn create_lead(pool: &SqlitePool, new: &NewLead) -> Result<LeadRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let status = new.status.unwrap_or(LeadStatus::New);

    sqlx::query(
        "INSERT INTO leads (id, name, email, phone, company, source, notes, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.company)
    .bind(&new.source)
    .bind(&new.notes)
    .bind(status.as_str())
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_lead(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_lead(pool: &SqlitePool, id: &str) -> Result<Option<LeadRow>, SqliteError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List leads with pagination, newest first, optionally filtered by status
pub async fn list_leads(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
    status: Option<LeadStatus>,
) -> Result<(Vec<LeadRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let (rows, total) = match status {
        Some(status) => {
            let rows = sqlx::query_as::<_, LeadRow>(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
        None => {
            let rows = sqlx::query_as::<_, LeadRow>(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads")
                .fetch_one(pool)
                .await?;
            (rows, total.0)
        }
    };

    Ok((rows, total as u64))
}

/// Update a lead. A terminal status transition (closed_won / closed_lost)
/// syncs the linked proposal, if any.
pub async fn update_lead(
    pool: &SqlitePool,
    id: &str,
    patch: &LeadPatch,
) -> Result<Option<LeadRow>, SqliteError> {
    let Some(current) = get_lead(pool, id).await? else {
        return Ok(None);
    };

    let mut tx = pool.begin().await?;
    let ts = now();

    sqlx::query(
        "UPDATE leads SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            company = COALESCE(?, company),
            source = COALESCE(?, source),
            notes = COALESCE(?, notes),
            status = COALESCE(?, status),
            loss_reason = COALESCE(?, loss_reason),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(&patch.company)
    .bind(&patch.source)
    .bind(&patch.notes)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(&patch.loss_reason)
    .bind(ts)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // Terminal transitions sync the linked proposal
    if let Some(status) = patch.status
        && let Some(proposal_status) = status.terminal_proposal_status()
        && let Some(proposal_id) = &current.proposal_id
    {
        sqlx::query("UPDATE proposals SET status = ?, updated_at = ? WHERE id = ?")
            .bind(proposal_status.as_str())
            .bind(ts)
            .bind(proposal_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    get_lead(pool, id).await
}

pub async fn delete_lead(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Dedicated conversion flow.
///
/// To proposal: creates a draft proposal for the lead and stores the link.
/// To project: creates a project from the lead, stores the link, and closes
/// the lead as won (which syncs a linked proposal to accepted).
pub async fn convert_lead(
    pool: &SqlitePool,
    id: &str,
    target: ConvertTarget,
) -> Result<Option<LeadRow>, SqliteError> {
    let Some(lead) = get_lead(pool, id).await? else {
        return Ok(None);
    };

    let ts = now();
    let mut tx = pool.begin().await?;

    match target {
        ConvertTarget::Proposal => {
            if lead.proposal_id.is_some() {
                return Err(SqliteError::Conflict(
                    "lead already has a proposal".to_string(),
                ));
            }

            let proposal_id = cuid2::create_id();
            sqlx::query(
                "INSERT INTO proposals (id, lead_id, title, status, created_at, updated_at)
                 VALUES (?, ?, ?, 'draft', ?, ?)",
            )
            .bind(&proposal_id)
            .bind(&lead.id)
            .bind(format!("Proposal for {}", lead.name))
            .bind(ts)
            .bind(ts)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE leads SET proposal_id = ?, updated_at = ? WHERE id = ?")
                .bind(&proposal_id)
                .bind(ts)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        ConvertTarget::Project => {
            if lead.project_id.is_some() {
                return Err(SqliteError::Conflict(
                    "lead already converted to a project".to_string(),
                ));
            }

            let project_id = cuid2::create_id();
            let project_name = lead.company.clone().unwrap_or_else(|| lead.name.clone());
            sqlx::query(
                "INSERT INTO projects (id, name, client, status, progress, tasks, created_at, updated_at)
                 VALUES (?, ?, ?, 'active', 100, 0, ?, ?)",
            )
            .bind(&project_id)
            .bind(&project_name)
            .bind(&lead.name)
            .bind(ts)
            .bind(ts)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE leads SET project_id = ?, status = 'closed_won', updated_at = ? WHERE id = ?",
            )
            .bind(&project_id)
            .bind(ts)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            // Winning the lead syncs a linked proposal
            if let Some(proposal_id) = &lead.proposal_id {
                sqlx::query("UPDATE proposals SET status = 'accepted', updated_at = ? WHERE id = ?")
                    .bind(ts)
                    .bind(proposal_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    tx.commit().await?;
    get_lead(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;
    use crate::data::sqlite::repositories::proposal::get_proposal;

    fn sample_lead() -> NewLead {
        NewLead {
            name: "Acme Corp".to_string(),
            email: Some("hello@acme.test".to_string()),
            company: Some("Acme".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_lead() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();

        assert_eq!(lead.status, "new");
        let fetched = get_lead(&pool, &lead.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_list_leads_filter_by_status() {
        let pool = test_pool().await;
        create_lead(&pool, &sample_lead()).await.unwrap();
        let contacted = create_lead(
            &pool,
            &NewLead {
                name: "Beta".to_string(),
                status: Some(LeadStatus::Contacted),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (rows, total) = list_leads(&pool, 1, 10, Some(LeadStatus::Contacted))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, contacted.id);

        let (_, all) = list_leads(&pool, 1, 10, None).await.unwrap();
        assert_eq!(all, 2);
    }

    #[tokio::test]
    async fn test_update_lead_partial() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();

        let updated = update_lead(
            &pool,
            &lead.id,
            &LeadPatch {
                notes: Some("Called twice".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.notes.as_deref(), Some("Called twice"));
        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.status, "new");
    }

    #[tokio::test]
    async fn test_convert_to_proposal_links_draft() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();

        let converted = convert_lead(&pool, &lead.id, ConvertTarget::Proposal)
            .await
            .unwrap()
            .unwrap();

        let proposal_id = converted.proposal_id.unwrap();
        let proposal = get_proposal(&pool, &proposal_id).await.unwrap().unwrap();
        assert_eq!(proposal.status, "draft");
        assert_eq!(proposal.lead_id.as_deref(), Some(lead.id.as_str()));
        // Conversion to proposal does not close the lead
        assert_eq!(converted.status, "new");
    }

    #[tokio::test]
    async fn test_convert_to_proposal_twice_conflicts() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();

        convert_lead(&pool, &lead.id, ConvertTarget::Proposal)
            .await
            .unwrap();
        let err = convert_lead(&pool, &lead.id, ConvertTarget::Proposal)
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_convert_to_project_closes_won_and_syncs_proposal() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();

        let with_proposal = convert_lead(&pool, &lead.id, ConvertTarget::Proposal)
            .await
            .unwrap()
            .unwrap();
        let converted = convert_lead(&pool, &lead.id, ConvertTarget::Project)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(converted.status, "closed_won");
        assert!(converted.project_id.is_some());

        let proposal = get_proposal(&pool, with_proposal.proposal_id.as_ref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(proposal.status, "accepted");
    }

    #[tokio::test]
    async fn test_closed_lost_syncs_proposal_rejected() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();
        let with_proposal = convert_lead(&pool, &lead.id, ConvertTarget::Proposal)
            .await
            .unwrap()
            .unwrap();

        let updated = update_lead(
            &pool,
            &lead.id,
            &LeadPatch {
                status: Some(LeadStatus::ClosedLost),
                loss_reason: Some("budget".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status, "closed_lost");
        assert_eq!(updated.loss_reason.as_deref(), Some("budget"));

        let proposal = get_proposal(&pool, with_proposal.proposal_id.as_ref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(proposal.status, "rejected");
    }

    #[tokio::test]
    async fn test_non_terminal_update_leaves_proposal_alone() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();
        let with_proposal = convert_lead(&pool, &lead.id, ConvertTarget::Proposal)
            .await
            .unwrap()
            .unwrap();

        update_lead(
            &pool,
            &lead.id,
            &LeadPatch {
                status: Some(LeadStatus::Negotiation),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let proposal = get_proposal(&pool, with_proposal.proposal_id.as_ref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(proposal.status, "draft");
    }

    #[tokio::test]
    async fn test_delete_lead() {
        let pool = test_pool().await;
        let lead = create_lead(&pool, &sample_lead()).await.unwrap();
        assert!(delete_lead(&pool, &lead.id).await.unwrap());
        assert!(!delete_lead(&pool, &lead.id).await.unwrap());
    }
}
