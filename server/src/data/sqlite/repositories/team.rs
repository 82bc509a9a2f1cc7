//! Team member repository (presence + work sessions)
//!
//! Presence is swept lazily: callers run `sweep_stale_members` before listing.
//! Work sessions never overlap per member; a login supersedes any open one.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{TeamMemberRow, WorkSessionRow};
use crate::utils::crypto::sha256_hex;

use super::now;

#[derive(Debug, Default, Clone)]
pub struct NewMember {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

const MEMBER_COLUMNS: &str =
    "id, name, email, phone, role, password_hash, status, last_active, created_at, updated_at";

pub async fn create_member(pool: &SqlitePool, new: &NewMember) -> Result<TeamMemberRow, SqliteError> {
    let id = cuid2::create_id();
    let ts = now();
    let password_hash = new.password.as_deref().map(sha256_hex);

    sqlx::query(
        "INSERT INTO team_members (id, name, email, phone, role, password_hash, status, last_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, 'offline', 0, ?, ?)",
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.role)
    .bind(&password_hash)
    .bind(ts)
    .bind(ts)
    .execute(pool)
    .await?;

    get_member(pool, &id)
        .await?
        .ok_or_else(|| SqliteError::Database(sqlx::Error::RowNotFound))
}

pub async fn get_member(pool: &SqlitePool, id: &str) -> Result<Option<TeamMemberRow>, SqliteError> {
    let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM team_members WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_member_by_phone(
    pool: &SqlitePool,
    phone: &str,
) -> Result<Option<TeamMemberRow>, SqliteError> {
    let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM team_members WHERE phone = ?"
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_member_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<TeamMemberRow>, SqliteError> {
    let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM team_members WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_members(
    pool: &SqlitePool,
    page: u32,
    limit: u32,
) -> Result<(Vec<TeamMemberRow>, u64), SqliteError> {
    let offset = (page.saturating_sub(1)) * limit;

    let rows = sqlx::query_as::<_, TeamMemberRow>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM team_members ORDER BY name ASC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_members")
        .fetch_one(pool)
        .await?;

    Ok((rows, total.0 as u64))
}

pub async fn update_member(
    pool: &SqlitePool,
    id: &str,
    patch: &MemberPatch,
) -> Result<Option<TeamMemberRow>, SqliteError> {
    let password_hash = patch.password.as_deref().map(sha256_hex);

    let result = sqlx::query(
        "UPDATE team_members SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            role = COALESCE(?, role),
            password_hash = COALESCE(?, password_hash),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(&patch.email)
    .bind(&patch.phone)
    .bind(&patch.role)
    .bind(&password_hash)
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_member(pool, id).await
}

pub async fn delete_member(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM team_members WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Flip active members whose last heartbeat is older than `stale_secs` to
/// offline. Returns the number of members swept.
pub async fn sweep_stale_members(
    pool: &SqlitePool,
    stale_secs: i64,
) -> Result<u64, SqliteError> {
    let cutoff = now() - stale_secs;
    let result = sqlx::query(
        "UPDATE team_members SET status = 'offline' WHERE status = 'active' AND last_active < ?",
    )
    .bind(cutoff)
    .execute(pool)
    .await?;

    let swept = result.rows_affected();
    if swept > 0 {
        tracing::debug!(swept, "Swept stale members to offline");
    }
    Ok(swept)
}

/// Mark a member active and bump their heartbeat timestamp
pub async fn heartbeat(pool: &SqlitePool, id: &str) -> Result<Option<TeamMemberRow>, SqliteError> {
    let result = sqlx::query(
        "UPDATE team_members SET status = 'active', last_active = ? WHERE id = ?",
    )
    .bind(now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_member(pool, id).await
}

/// Set presence explicitly (login marks active, logout marks offline)
pub async fn set_presence(
    pool: &SqlitePool,
    id: &str,
    active: bool,
) -> Result<(), SqliteError> {
    let status = if active { "active" } else { "offline" };
    sqlx::query("UPDATE team_members SET status = ?, last_active = ? WHERE id = ?")
        .bind(status)
        .bind(now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// =============================================================================
// Work sessions
// =============================================================================

/// Open a fresh work session, closing any session still open for the member
pub async fn start_work_session(
    pool: &SqlitePool,
    member_id: &str,
) -> Result<WorkSessionRow, SqliteError> {
    let ts = now();
    let id = cuid2::create_id();

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE work_sessions SET ended_at = ? WHERE member_id = ? AND ended_at IS NULL")
        .bind(ts)
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO work_sessions (id, member_id, started_at) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(member_id)
        .bind(ts)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(WorkSessionRow {
        id,
        member_id: member_id.to_string(),
        started_at: ts,
        ended_at: None,
    })
}

/// Close the member's open work session, if any. Returns whether one closed.
pub async fn end_work_session(pool: &SqlitePool, member_id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query(
        "UPDATE work_sessions SET ended_at = ? WHERE member_id = ? AND ended_at IS NULL",
    )
    .bind(now())
    .bind(member_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_work_sessions(
    pool: &SqlitePool,
    member_id: &str,
) -> Result<Vec<WorkSessionRow>, SqliteError> {
    let rows = sqlx::query_as::<_, WorkSessionRow>(
        "SELECT id, member_id, started_at, ended_at FROM work_sessions WHERE member_id = ? ORDER BY started_at DESC",
    )
    .bind(member_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    fn sam() -> NewMember {
        NewMember {
            name: "Sam".to_string(),
            email: Some("sam@acme.test".to_string()),
            phone: Some("+15550001".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_member_hashes_password() {
        let pool = test_pool().await;
        let member = create_member(&pool, &sam()).await.unwrap();

        assert_eq!(member.status, "offline");
        let hash = member.password_hash.unwrap();
        assert_eq!(hash, sha256_hex("hunter2"));
        assert_ne!(hash, "hunter2");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let pool = test_pool().await;
        create_member(&pool, &sam()).await.unwrap();

        let err = create_member(
            &pool,
            &NewMember {
                name: "Other".to_string(),
                email: Some("sam@acme.test".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_find_by_phone_and_email() {
        let pool = test_pool().await;
        let member = create_member(&pool, &sam()).await.unwrap();

        let by_phone = find_member_by_phone(&pool, "+15550001").await.unwrap();
        assert_eq!(by_phone.unwrap().id, member.id);

        let by_email = find_member_by_email(&pool, "sam@acme.test").await.unwrap();
        assert_eq!(by_email.unwrap().id, member.id);

        assert!(find_member_by_phone(&pool, "+19999999")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_sweep_flips_only_stale_active() {
        let pool = test_pool().await;
        let fresh = create_member(&pool, &sam()).await.unwrap();
        let stale = create_member(
            &pool,
            &NewMember {
                name: "Stale".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        heartbeat(&pool, &fresh.id).await.unwrap();
        // Stale member last seen 10 minutes ago
        sqlx::query("UPDATE team_members SET status = 'active', last_active = ? WHERE id = ?")
            .bind(now() - 600)
            .bind(&stale.id)
            .execute(&pool)
            .await
            .unwrap();

        let swept = sweep_stale_members(&pool, 300).await.unwrap();
        assert_eq!(swept, 1);

        assert_eq!(
            get_member(&pool, &fresh.id).await.unwrap().unwrap().status,
            "active"
        );
        assert_eq!(
            get_member(&pool, &stale.id).await.unwrap().unwrap().status,
            "offline"
        );
    }

    #[tokio::test]
    async fn test_login_supersedes_open_session() {
        let pool = test_pool().await;
        let member = create_member(&pool, &sam()).await.unwrap();

        start_work_session(&pool, &member.id).await.unwrap();
        start_work_session(&pool, &member.id).await.unwrap();

        let sessions = list_work_sessions(&pool, &member.id).await.unwrap();
        assert_eq!(sessions.len(), 2);

        let open: Vec<_> = sessions.iter().filter(|s| s.ended_at.is_none()).collect();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn test_end_work_session() {
        let pool = test_pool().await;
        let member = create_member(&pool, &sam()).await.unwrap();

        assert!(!end_work_session(&pool, &member.id).await.unwrap());
        start_work_session(&pool, &member.id).await.unwrap();
        assert!(end_work_session(&pool, &member.id).await.unwrap());

        let sessions = list_work_sessions(&pool, &member.id).await.unwrap();
        assert!(sessions.iter().all(|s| s.ended_at.is_some()));
    }

    #[tokio::test]
    async fn test_update_member_rehashes_password() {
        let pool = test_pool().await;
        let member = create_member(&pool, &sam()).await.unwrap();

        let updated = update_member(
            &pool,
            &member.id,
            &MemberPatch {
                password: Some("correct horse".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            updated.password_hash.as_deref(),
            Some(sha256_hex("correct horse").as_str())
        );
        assert_eq!(updated.name, "Sam");
    }

    #[tokio::test]
    async fn test_delete_member_cascades_sessions() {
        let pool = test_pool().await;
        let member = create_member(&pool, &sam()).await.unwrap();
        start_work_session(&pool, &member.id).await.unwrap();

        assert!(delete_member(&pool, &member.id).await.unwrap());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM work_sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
