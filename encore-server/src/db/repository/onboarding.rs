//! Onboarding Repository
//!
//! The staged-workflow aggregate. Stage payloads live in JSON text columns;
//! this module owns their (de)serialization plus the stage-transition
//! semantics:
//!
//! - step1 advance forces `spoc-assigned`
//! - l1-questionnaire advance forces `review-l2` and cascades the KYC
//!   fields onto the linked member in the same transaction
//! - l2-review advance merges, preserving previously attached documents

use super::{RepoError, RepoResult, sequence};
use shared::models::{
    DocumentMeta, Heat, L1QuestionnaireData, L2ReviewData, Onboarding, OnboardingCreate,
    OnboardingStatus, OnboardingUpdate, StatusField, Step1Data, parse_status_field,
};
use sqlx::SqlitePool;

const ONBOARDING_SELECT: &str = "SELECT id, task_number, member_id, artist_name, spoc, description, notes, eta_closure, status, heat, step1_data, l1_questionnaire_data, l2_review_data, created_by, created_at, updated_at FROM onboarding";

/// Raw row; JSON columns and status strings are decoded in [`TryFrom`]
#[derive(sqlx::FromRow)]
struct OnboardingRow {
    id: i64,
    task_number: i64,
    member_id: i64,
    artist_name: String,
    spoc: Option<String>,
    description: Option<String>,
    notes: Option<String>,
    eta_closure: Option<i64>,
    status: String,
    heat: Option<String>,
    step1_data: Option<String>,
    l1_questionnaire_data: Option<String>,
    l2_review_data: Option<String>,
    created_by: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OnboardingRow> for Onboarding {
    type Error = RepoError;

    fn try_from(row: OnboardingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OnboardingStatus>()
            .map_err(RepoError::Database)?;
        let heat = row
            .heat
            .as_deref()
            .map(|h| h.parse::<Heat>().map_err(RepoError::Database))
            .transpose()?;
        let step1_data: Option<Step1Data> =
            row.step1_data.as_deref().map(serde_json::from_str).transpose()?;
        let l1_questionnaire_data: Option<L1QuestionnaireData> = row
            .l1_questionnaire_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let l2_review_data: Option<L2ReviewData> = row
            .l2_review_data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Onboarding {
            id: row.id,
            task_number: row.task_number,
            member_id: row.member_id,
            artist_name: row.artist_name,
            spoc: row.spoc,
            description: row.description,
            notes: row.notes,
            eta_closure: row.eta_closure,
            status,
            heat,
            step1_data,
            l1_questionnaire_data,
            l2_review_data,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// List onboardings, newest first. A filter carrying a legacy heat token
/// (via [`parse_status_field`]) matches on the `heat` column instead of
/// the formal status.
pub async fn find_all(
    pool: &SqlitePool,
    filter: Option<StatusField>,
) -> RepoResult<Vec<Onboarding>> {
    let rows = match filter {
        Some(StatusField::Status(s)) => {
            let sql = format!("{} WHERE status = ? ORDER BY created_at DESC", ONBOARDING_SELECT);
            sqlx::query_as::<_, OnboardingRow>(&sql)
                .bind(s.as_str())
                .fetch_all(pool)
                .await?
        }
        Some(StatusField::Heat(h)) => {
            let sql = format!("{} WHERE heat = ? ORDER BY created_at DESC", ONBOARDING_SELECT);
            sqlx::query_as::<_, OnboardingRow>(&sql)
                .bind(h.as_str())
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{} ORDER BY created_at DESC", ONBOARDING_SELECT);
            sqlx::query_as::<_, OnboardingRow>(&sql).fetch_all(pool).await?
        }
    };
    rows.into_iter().map(Onboarding::try_from).collect()
}

pub async fn find_by_id(
    db: impl sqlx::SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Onboarding>> {
    let sql = format!("{} WHERE id = ?", ONBOARDING_SELECT);
    let row = sqlx::query_as::<_, OnboardingRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    row.map(Onboarding::try_from).transpose()
}

pub async fn create(
    pool: &SqlitePool,
    data: OnboardingCreate,
    created_by: Option<&str>,
) -> RepoResult<Onboarding> {
    // The member reference is required and must resolve
    let member: Option<(String, Option<String>)> =
        sqlx::query_as("SELECT name, artist_name FROM member WHERE id = ?")
            .bind(data.member_id)
            .fetch_optional(pool)
            .await?;
    let (member_name, member_artist_name) = member.ok_or_else(|| {
        RepoError::Validation(format!("Member {} does not exist", data.member_id))
    })?;

    // Compat shim: a legacy heat token in the status field becomes heat
    let (status, heat) = match data.status.as_deref() {
        None => (OnboardingStatus::default(), None),
        Some(raw) => match parse_status_field(raw).map_err(RepoError::Validation)? {
            StatusField::Status(s) => (s, None),
            StatusField::Heat(h) => (OnboardingStatus::default(), Some(h)),
        },
    };

    let artist_name = data
        .artist_name
        .or(member_artist_name)
        .unwrap_or(member_name);

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let task_number = sequence::next(pool, sequence::TASK_NUMBER).await?;

    sqlx::query(
        "INSERT INTO onboarding (id, task_number, member_id, artist_name, spoc, description, notes, eta_closure, status, heat, created_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(task_number)
    .bind(data.member_id)
    .bind(&artist_name)
    .bind(&data.spoc)
    .bind(&data.description)
    .bind(&data.notes)
    .bind(data.eta_closure)
    .bind(status.as_str())
    .bind(heat.map(|h| h.as_str()))
    .bind(created_by)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create onboarding".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: OnboardingUpdate) -> RepoResult<Onboarding> {
    // IMMEDIATE: the status/heat resolution below reads the current row,
    // so the write lock must be held across read and write
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let existing = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;

    let (status, mut heat) = match data.status.as_deref() {
        None => (existing.status, existing.heat),
        Some(raw) => match parse_status_field(raw).map_err(RepoError::Validation)? {
            StatusField::Status(s) => (s, existing.heat),
            StatusField::Heat(h) => (existing.status, Some(h)),
        },
    };
    if let Some(h) = data.heat {
        heat = Some(h);
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE onboarding SET \
            artist_name = COALESCE(?1, artist_name), \
            spoc = COALESCE(?2, spoc), \
            description = COALESCE(?3, description), \
            notes = COALESCE(?4, notes), \
            eta_closure = COALESCE(?5, eta_closure), \
            status = ?6, \
            heat = ?7, \
            updated_at = ?8 \
         WHERE id = ?9",
    )
    .bind(&data.artist_name)
    .bind(&data.spoc)
    .bind(&data.description)
    .bind(&data.notes)
    .bind(data.eta_closure)
    .bind(status.as_str())
    .bind(heat.map(|h| h.as_str()))
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let updated = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;
    tx.commit().await?;
    Ok(updated)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM onboarding WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Stage 1 advance: replace `step1_data`, force `spoc-assigned`
pub async fn advance_step1(
    pool: &SqlitePool,
    id: i64,
    payload: Step1Data,
) -> RepoResult<Onboarding> {
    let json = serde_json::to_string(&payload)?;
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE onboarding SET step1_data = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(&json)
    .bind(OnboardingStatus::SpocAssigned.as_str())
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Onboarding {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))
}

/// L1 questionnaire advance: replace the payload, force `review-l2`, and
/// copy the KYC fields onto the linked member.
///
/// The onboarding write and the member write commit atomically; a partial
/// cascade is not possible.
pub async fn advance_l1_questionnaire(
    pool: &SqlitePool,
    id: i64,
    payload: L1QuestionnaireData,
) -> RepoResult<Onboarding> {
    let json = serde_json::to_string(&payload)?;
    let now = shared::util::now_millis();

    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let member_id: Option<i64> = sqlx::query_scalar("SELECT member_id FROM onboarding WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let member_id =
        member_id.ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;

    sqlx::query(
        "UPDATE onboarding SET l1_questionnaire_data = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(&json)
    .bind(OnboardingStatus::ReviewL2.as_str())
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // KYC cascade: only fields the questionnaire actually carries
    let cascaded = sqlx::query(
        "UPDATE member SET \
            bank_name = COALESCE(?1, bank_name), \
            account_number = COALESCE(?2, account_number), \
            ifsc_code = COALESCE(?3, ifsc_code), \
            pan_number = COALESCE(?4, pan_number), \
            aadhar_number = COALESCE(?5, aadhar_number), \
            updated_at = ?6 \
         WHERE id = ?7",
    )
    .bind(&payload.bank_name)
    .bind(&payload.account_number)
    .bind(&payload.ifsc_code)
    .bind(&payload.pan_number)
    .bind(&payload.aadhar_number)
    .bind(now)
    .bind(member_id)
    .execute(&mut *tx)
    .await?;

    if cascaded.rows_affected() == 0 {
        // Orphaned onboarding (member deleted): stage data still advances
        tracing::warn!(
            onboarding_id = id,
            member_id,
            "KYC cascade skipped: linked member no longer exists"
        );
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))
}

/// L2 review advance: merge the payload into `l2_review_data`.
///
/// A payload without documents never erases previously attached documents;
/// `status_field` is the caller's (compat-parsed) choice, defaulting to
/// keeping the record in `review-l2`. The read-merge-write runs under an
/// IMMEDIATE transaction so a concurrent upload cannot slip between the
/// read and the write.
pub async fn advance_l2_review(
    pool: &SqlitePool,
    id: i64,
    mut payload: L2ReviewData,
    status_field: Option<StatusField>,
) -> RepoResult<Onboarding> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let existing = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;

    if payload.documents.is_empty()
        && let Some(prev) = &existing.l2_review_data
    {
        payload.documents = prev.documents.clone();
    }

    let (status, heat) = match status_field {
        None => (OnboardingStatus::ReviewL2, existing.heat),
        Some(StatusField::Status(s)) => (s, existing.heat),
        Some(StatusField::Heat(h)) => (OnboardingStatus::ReviewL2, Some(h)),
    };

    let json = serde_json::to_string(&payload)?;
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE onboarding SET l2_review_data = ?1, status = ?2, heat = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(&json)
    .bind(status.as_str())
    .bind(heat.map(|h| h.as_str()))
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let updated = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;
    tx.commit().await?;
    Ok(updated)
}

/// Append an uploaded document's metadata to `l2_review_data.documents`.
///
/// The append is a single `json_insert` statement, so concurrent uploads
/// against the same record can never overwrite each other's metadata.
pub async fn attach_document(
    pool: &SqlitePool,
    id: i64,
    doc: DocumentMeta,
) -> RepoResult<Onboarding> {
    let json = serde_json::to_string(&doc)?;
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE onboarding SET \
            l2_review_data = json_set( \
                COALESCE(l2_review_data, '{}'), \
                '$.documents', \
                json_insert( \
                    COALESCE(json_extract(l2_review_data, '$.documents'), '[]'), \
                    '$[#]', \
                    json(?1) \
                ) \
            ), \
            updated_at = ?2 \
         WHERE id = ?3",
    )
    .bind(&json)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Onboarding {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))
}

/// Remove a document by positional index.
///
/// Out-of-range indices are a validation error, distinct from a missing
/// onboarding, and leave the stored list untouched. Returns the removed
/// metadata so the caller can clean up the blob.
pub async fn remove_document(
    pool: &SqlitePool,
    id: i64,
    index: usize,
) -> RepoResult<(Onboarding, DocumentMeta)> {
    // IMMEDIATE: bounds check and removal must see the same list
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let existing = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;

    let mut l2 = existing.l2_review_data.unwrap_or_default();
    if index >= l2.documents.len() {
        return Err(RepoError::Validation(format!(
            "Document index {index} out of range (have {})",
            l2.documents.len()
        )));
    }
    let removed = l2.documents.remove(index);

    let json = serde_json::to_string(&l2)?;
    let now = shared::util::now_millis();
    sqlx::query("UPDATE onboarding SET l2_review_data = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(&json)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let updated = find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Onboarding {id} not found")))?;
    tx.commit().await?;
    Ok((updated, removed))
}

/// Source row for the onboarding-status report (onboarding + member tier)
#[derive(Debug, sqlx::FromRow)]
pub struct ReportSource {
    pub id: i64,
    pub task_number: i64,
    pub member_id: i64,
    pub artist_name: String,
    pub spoc: Option<String>,
    pub status: String,
    pub heat: Option<String>,
    pub eta_closure: Option<i64>,
    /// Free-text tier from the member; None for orphaned records
    pub tier: Option<String>,
}

pub async fn report_sources(pool: &SqlitePool) -> RepoResult<Vec<ReportSource>> {
    let rows = sqlx::query_as::<_, ReportSource>(
        "SELECT o.id, o.task_number, o.member_id, o.artist_name, o.spoc, o.status, o.heat, o.eta_closure, m.tier \
         FROM onboarding o LEFT JOIN member m ON o.member_id = m.id \
         ORDER BY o.task_number",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Onboardings carrying a non-empty closure checklist (daily email contract)
pub async fn find_with_closure_checklist(pool: &SqlitePool) -> RepoResult<Vec<Onboarding>> {
    let sql = format!(
        "{} WHERE l2_review_data IS NOT NULL ORDER BY task_number",
        ONBOARDING_SELECT
    );
    let rows = sqlx::query_as::<_, OnboardingRow>(&sql).fetch_all(pool).await?;
    let records: RepoResult<Vec<Onboarding>> =
        rows.into_iter().map(Onboarding::try_from).collect();
    Ok(records?
        .into_iter()
        .filter(|o| {
            o.l2_review_data
                .as_ref()
                .is_some_and(|l2| !l2.closure_checklist.is_empty())
        })
        .collect())
}
