//! Member Repository

use super::{RepoError, RepoResult, sequence};
use shared::models::{Member, MemberCreate, MemberUpdate};
use sqlx::SqlitePool;

const MEMBER_SELECT: &str = "SELECT id, member_number, name, artist_name, email, phone, category, tier, talent_role, genre, source, spoc, bank_name, account_number, ifsc_code, pan_number, aadhar_number, status, membership_type, created_at, updated_at FROM member";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let sql = format!("{} ORDER BY created_at DESC", MEMBER_SELECT);
    let rows = sqlx::query_as::<_, Member>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{} WHERE id = ?", MEMBER_SELECT);
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: MemberCreate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    // member_number comes from the atomic sequence, so a unique violation
    // here can only mean a duplicate email
    let member_number = sequence::next(pool, sequence::MEMBER_NUMBER).await?;
    let status = data.status.unwrap_or_default();
    sqlx::query(
        "INSERT INTO member (id, member_number, name, artist_name, email, phone, category, tier, talent_role, genre, source, spoc, bank_name, account_number, ifsc_code, pan_number, aadhar_number, status, membership_type, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20)",
    )
    .bind(id)
    .bind(member_number)
    .bind(&data.name)
    .bind(&data.artist_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.category)
    .bind(&data.tier)
    .bind(&data.talent_role)
    .bind(&data.genre)
    .bind(&data.source)
    .bind(&data.spoc)
    .bind(&data.bank_name)
    .bind(&data.account_number)
    .bind(&data.ifsc_code)
    .bind(&data.pan_number)
    .bind(&data.aadhar_number)
    .bind(status)
    .bind(data.membership_type)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate("Member with this email already exists".into())
        }
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MemberUpdate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET \
            name = COALESCE(?1, name), \
            artist_name = COALESCE(?2, artist_name), \
            email = COALESCE(?3, email), \
            phone = COALESCE(?4, phone), \
            category = COALESCE(?5, category), \
            tier = COALESCE(?6, tier), \
            talent_role = COALESCE(?7, talent_role), \
            genre = COALESCE(?8, genre), \
            source = COALESCE(?9, source), \
            spoc = COALESCE(?10, spoc), \
            bank_name = COALESCE(?11, bank_name), \
            account_number = COALESCE(?12, account_number), \
            ifsc_code = COALESCE(?13, ifsc_code), \
            pan_number = COALESCE(?14, pan_number), \
            aadhar_number = COALESCE(?15, aadhar_number), \
            status = COALESCE(?16, status), \
            membership_type = COALESCE(?17, membership_type), \
            updated_at = ?18 \
         WHERE id = ?19",
    )
    .bind(&data.name)
    .bind(&data.artist_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.category)
    .bind(&data.tier)
    .bind(&data.talent_role)
    .bind(&data.genre)
    .bind(&data.source)
    .bind(&data.spoc)
    .bind(&data.bank_name)
    .bind(&data.account_number)
    .bind(&data.ifsc_code)
    .bind(&data.pan_number)
    .bind(&data.aadhar_number)
    .bind(data.status)
    .bind(data.membership_type)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate("Member with this email already exists".into())
        }
        other => other,
    })?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

/// Hard delete. Linked onboarding records are intentionally left in place.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM member WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
