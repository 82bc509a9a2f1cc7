//! SQLite repositories
//!
//! Standalone async functions over the shared pool. Row types live in
//! `crate::data::types`.

pub mod activity;
pub mod agreement;
pub mod employee;
pub mod infra;
pub mod lead;
pub mod link;
pub mod otp;
pub mod project;
pub mod proposal;
pub mod task;
pub mod team;

/// Current unix timestamp in seconds
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::data::sqlite::schema::SCHEMA;

    /// In-memory pool with the full schema applied.
    ///
    /// Single connection so every query sees the same in-memory database.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();
        pool
    }
}
