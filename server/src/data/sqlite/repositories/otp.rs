//! One-time code repository
//!
//! Codes are short-lived and single-use. Verification compares in constant
//! time and deletes every code for the phone on success.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::OtpRow;
use crate::utils::crypto::constant_time_eq;

use super::now;

/// Store a fresh code for a phone, purging that phone's expired codes first
pub async fn issue_otp(
    pool: &SqlitePool,
    phone: &str,
    code: &str,
    ttl_secs: i64,
) -> Result<OtpRow, SqliteError> {
    let ts = now();

    sqlx::query("DELETE FROM otps WHERE phone = ? AND expires_at < ?")
        .bind(phone)
        .bind(ts)
        .execute(pool)
        .await?;

    let result = sqlx::query(
        "INSERT INTO otps (phone, code, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(phone)
    .bind(code)
    .bind(ts + ttl_secs)
    .bind(ts)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, OtpRow>(
        "SELECT id, phone, code, expires_at, created_at FROM otps WHERE id = ?",
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Check a code against the phone's unexpired codes. A match deletes all of
/// the phone's codes; a mismatch has no side effects.
pub async fn verify_and_consume_otp(
    pool: &SqlitePool,
    phone: &str,
    code: &str,
) -> Result<bool, SqliteError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT code FROM otps WHERE phone = ? AND expires_at >= ?")
            .bind(phone)
            .bind(now())
            .fetch_all(pool)
            .await?;

    // Scan all candidates so timing does not reveal which one matched
    let mut matched = false;
    for (stored,) in &rows {
        if constant_time_eq(stored, code) {
            matched = true;
        }
    }

    if matched {
        sqlx::query("DELETE FROM otps WHERE phone = ?")
            .bind(phone)
            .execute(pool)
            .await?;
    }

    Ok(matched)
}

/// Drop expired codes across all phones
pub async fn purge_expired_otps(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let result = sqlx::query("DELETE FROM otps WHERE expires_at < ?")
        .bind(now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    #[tokio::test]
    async fn test_matching_code_succeeds_once() {
        let pool = test_pool().await;
        issue_otp(&pool, "+15550001", "123456", 300).await.unwrap();

        assert!(verify_and_consume_otp(&pool, "+15550001", "123456")
            .await
            .unwrap());
        // Consumed: the same code no longer works
        assert!(!verify_and_consume_otp(&pool, "+15550001", "123456")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_mismatched_code_rejected_without_side_effects() {
        let pool = test_pool().await;
        issue_otp(&pool, "+15550001", "123456", 300).await.unwrap();

        assert!(!verify_and_consume_otp(&pool, "+15550001", "654321")
            .await
            .unwrap());
        // The right code still works afterwards
        assert!(verify_and_consume_otp(&pool, "+15550001", "123456")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_expired_code_rejected() {
        let pool = test_pool().await;
        issue_otp(&pool, "+15550001", "123456", -1).await.unwrap();

        assert!(!verify_and_consume_otp(&pool, "+15550001", "123456")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_success_clears_all_codes_for_phone() {
        let pool = test_pool().await;
        issue_otp(&pool, "+15550001", "111111", 300).await.unwrap();
        issue_otp(&pool, "+15550001", "222222", 300).await.unwrap();
        issue_otp(&pool, "+15550002", "333333", 300).await.unwrap();

        assert!(verify_and_consume_otp(&pool, "+15550001", "222222")
            .await
            .unwrap());

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM otps WHERE phone = '+15550001'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0);

        // Other phones unaffected
        assert!(verify_and_consume_otp(&pool, "+15550002", "333333")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let pool = test_pool().await;
        issue_otp(&pool, "+15550001", "111111", -10).await.unwrap();
        issue_otp(&pool, "+15550002", "222222", 300).await.unwrap();

        let purged = purge_expired_otps(&pool).await.unwrap();
        assert_eq!(purged, 1);
    }

    #[tokio::test]
    async fn test_issue_purges_stale_codes_for_phone() {
        let pool = test_pool().await;
        issue_otp(&pool, "+15550001", "111111", -10).await.unwrap();
        issue_otp(&pool, "+15550001", "222222", 300).await.unwrap();

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM otps WHERE phone = '+15550001'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
