//! Row types shared between repositories and the API layer
//!
//! Status columns are stored as TEXT and constrained by CHECK clauses in the
//! schema; the enums here are the typed view used by status transition logic.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// =============================================================================
// Status enums
// =============================================================================

/// Lead pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    ProposalSent,
    Negotiation,
    FollowUp,
    ClosedWon,
    ClosedLost,
}

impl LeadStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::ProposalSent => "proposal_sent",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::FollowUp => "follow_up",
            LeadStatus::ClosedWon => "closed_won",
            LeadStatus::ClosedLost => "closed_lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "new" => LeadStatus::New,
            "contacted" => LeadStatus::Contacted,
            "qualified" => LeadStatus::Qualified,
            "proposal_sent" => LeadStatus::ProposalSent,
            "negotiation" => LeadStatus::Negotiation,
            "follow_up" => LeadStatus::FollowUp,
            "closed_won" => LeadStatus::ClosedWon,
            "closed_lost" => LeadStatus::ClosedLost,
            _ => return None,
        })
    }

    /// Proposal status a linked proposal should take when the lead reaches a
    /// terminal status. Non-terminal lead transitions never touch proposals.
    pub fn terminal_proposal_status(&self) -> Option<ProposalStatus> {
        match self {
            LeadStatus::ClosedWon => Some(ProposalStatus::Accepted),
            LeadStatus::ClosedLost => Some(ProposalStatus::Rejected),
            _ => None,
        }
    }
}

/// Proposal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Negotiation,
    FollowUp,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Sent => "sent",
            ProposalStatus::Negotiation => "negotiation",
            ProposalStatus::FollowUp => "follow_up",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "draft" => ProposalStatus::Draft,
            "sent" => ProposalStatus::Sent,
            "negotiation" => ProposalStatus::Negotiation,
            "follow_up" => ProposalStatus::FollowUp,
            "accepted" => ProposalStatus::Accepted,
            "rejected" => ProposalStatus::Rejected,
            _ => return None,
        })
    }

    /// Lead status a linked lead should take when the proposal moves to this
    /// status. `Draft` leaves the lead untouched.
    pub fn lead_status(&self) -> Option<LeadStatus> {
        match self {
            ProposalStatus::Draft => None,
            ProposalStatus::Sent => Some(LeadStatus::ProposalSent),
            ProposalStatus::Negotiation => Some(LeadStatus::Negotiation),
            ProposalStatus::FollowUp => Some(LeadStatus::FollowUp),
            ProposalStatus::Accepted => Some(LeadStatus::ClosedWon),
            ProposalStatus::Rejected => Some(LeadStatus::ClosedLost),
        }
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub loss_reason: Option<String>,
    pub proposal_id: Option<String>,
    pub project_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProposalRow {
    pub id: String,
    pub lead_id: Option<String>,
    pub project_id: Option<String>,
    pub title: String,
    pub value: Option<f64>,
    pub scope: Option<String>,
    pub exclusions: Option<String>,
    pub terms: Option<String>,
    pub assumptions: Option<String>,
    pub status: String,
    pub valid_until: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub client: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub start_date: Option<i64>,
    /// Derived: rounded completion percentage over all attached tasks
    pub progress: i64,
    /// Derived: total attached task count
    pub tasks: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectTaskRow {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: String,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubtaskRow {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub done: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskCommentRow {
    pub id: String,
    pub task_id: String,
    pub author: String,
    pub body: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct InfraAssetRow {
    pub id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub asset_type: String,
    pub provider: Option<String>,
    pub status: String,
    /// JSON object, shape depends on `asset_type`
    pub metadata: String,
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub password_hash: Option<String>,
    pub status: String,
    pub last_active: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkSessionRow {
    pub id: String,
    pub member_id: String,
    pub started_at: i64,
    pub ended_at: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AgreementRow {
    pub id: String,
    pub title: String,
    pub party: Option<String>,
    pub kind: Option<String>,
    pub status: String,
    pub body: Option<String>,
    pub signed_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<i64>,
    pub onboarding_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct LinkRow {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub action: String,
    pub detail: Option<String>,
    pub actor: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct OtpRow {
    pub id: i64,
    pub phone: String,
    pub code: String,
    pub expires_at: i64,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_round_trip() {
        for s in [
            "new",
            "contacted",
            "qualified",
            "proposal_sent",
            "negotiation",
            "follow_up",
            "closed_won",
            "closed_lost",
        ] {
            assert_eq!(LeadStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(LeadStatus::parse("won").is_none());
    }

    #[test]
    fn test_proposal_status_round_trip() {
        for s in [
            "draft",
            "sent",
            "negotiation",
            "follow_up",
            "accepted",
            "rejected",
        ] {
            assert_eq!(ProposalStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ProposalStatus::parse("open").is_none());
    }

    #[test]
    fn test_proposal_to_lead_sync_mapping() {
        assert_eq!(ProposalStatus::Draft.lead_status(), None);
        assert_eq!(
            ProposalStatus::Sent.lead_status(),
            Some(LeadStatus::ProposalSent)
        );
        assert_eq!(
            ProposalStatus::Accepted.lead_status(),
            Some(LeadStatus::ClosedWon)
        );
        assert_eq!(
            ProposalStatus::Rejected.lead_status(),
            Some(LeadStatus::ClosedLost)
        );
    }

    #[test]
    fn test_lead_terminal_sync_mapping() {
        assert_eq!(
            LeadStatus::ClosedWon.terminal_proposal_status(),
            Some(ProposalStatus::Accepted)
        );
        assert_eq!(
            LeadStatus::ClosedLost.terminal_proposal_status(),
            Some(ProposalStatus::Rejected)
        );
        assert_eq!(LeadStatus::Negotiation.terminal_proposal_status(), None);
    }
}
