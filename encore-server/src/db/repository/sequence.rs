//! Sequence Repository
//!
//! Named atomic counters backing `member_number` and `task_number`
//! allocation. The upsert-and-return runs as a single statement, so two
//! concurrent creates can never observe the same value.

use super::RepoResult;
use sqlx::SqlitePool;

pub const MEMBER_NUMBER: &str = "member_number";
pub const TASK_NUMBER: &str = "task_number";

/// Allocate the next value of a named sequence (first call returns 1)
pub async fn next(pool: &SqlitePool, name: &str) -> RepoResult<i64> {
    let value: i64 = sqlx::query_scalar(
        "INSERT INTO sequence (name, value) VALUES (?1, 1) \
         ON CONFLICT(name) DO UPDATE SET value = value + 1 \
         RETURNING value",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(value)
}
