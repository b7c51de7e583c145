//! Picklist Repository
//!
//! Items are a JSON list column; mutation is read-modify-write inside an
//! IMMEDIATE transaction so concurrent appends cannot drop each other's
//! items. Deletion is always a soft flip of `is_active` so values
//! referenced by historical member/onboarding data stay resolvable.

use super::{RepoError, RepoResult};
use shared::models::{Picklist, PicklistCreate, PicklistItem, PicklistItemCreate};
use sqlx::SqlitePool;
use uuid::Uuid;

const PICKLIST_SELECT: &str =
    "SELECT id, name, label, items, created_at, updated_at FROM picklist";

#[derive(sqlx::FromRow)]
struct PicklistRow {
    id: i64,
    name: String,
    label: String,
    items: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PicklistRow> for Picklist {
    type Error = RepoError;

    fn try_from(row: PicklistRow) -> Result<Self, Self::Error> {
        let items: Vec<PicklistItem> = serde_json::from_str(&row.items)?;
        Ok(Picklist {
            id: row.id,
            name: row.name,
            label: row.label,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Picklist>> {
    let sql = format!("{} ORDER BY name", PICKLIST_SELECT);
    let rows = sqlx::query_as::<_, PicklistRow>(&sql).fetch_all(pool).await?;
    rows.into_iter().map(Picklist::try_from).collect()
}

pub async fn find_by_name(
    db: impl sqlx::SqliteExecutor<'_>,
    name: &str,
) -> RepoResult<Option<Picklist>> {
    let sql = format!("{} WHERE name = ?", PICKLIST_SELECT);
    let row = sqlx::query_as::<_, PicklistRow>(&sql)
        .bind(name)
        .fetch_optional(db)
        .await?;
    row.map(Picklist::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, data: PicklistCreate) -> RepoResult<Picklist> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO picklist (id, name, label, items, created_at, updated_at) \
         VALUES (?1, ?2, ?3, '[]', ?4, ?4)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.label)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Picklist '{}' already exists", data.name))
        }
        other => other,
    })?;

    find_by_name(pool, &data.name)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create picklist".into()))
}

/// Append an item.
///
/// Rejects a value already carried by an *active* item (case-insensitive);
/// re-adding a value whose item was soft-deleted is allowed and creates a
/// fresh item. `order` continues past every item ever added, active or not.
pub async fn add_item(
    pool: &SqlitePool,
    name: &str,
    data: PicklistItemCreate,
) -> RepoResult<Picklist> {
    // IMMEDIATE: duplicate check, order assignment and write must be
    // serialized against other mutations of the same list
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let mut picklist = find_by_name(&mut *tx, name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Picklist '{name}' not found")))?;

    let value = data.value.trim().to_string();
    if value.is_empty() {
        return Err(RepoError::Validation("Item value must not be empty".into()));
    }

    let lowered = value.to_lowercase();
    if picklist
        .active_items()
        .any(|i| i.value.to_lowercase() == lowered)
    {
        return Err(RepoError::Duplicate(format!(
            "Value '{value}' already exists in picklist '{name}'"
        )));
    }

    let order = picklist.items.iter().map(|i| i.order).max().unwrap_or(0) + 1;
    picklist.items.push(PicklistItem {
        id: Uuid::new_v4(),
        label: data.label.unwrap_or_else(|| value.clone()),
        value,
        order,
        is_active: true,
    });

    save_items(&mut *tx, &picklist).await?;
    let updated = find_by_name(&mut *tx, name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Picklist '{name}' not found")))?;
    tx.commit().await?;
    Ok(updated)
}

/// Soft-delete an item (admin operation). The item stays in the list with
/// `is_active = false`.
pub async fn remove_item(pool: &SqlitePool, name: &str, item_id: Uuid) -> RepoResult<Picklist> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let mut picklist = find_by_name(&mut *tx, name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Picklist '{name}' not found")))?;

    let item = picklist
        .items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or_else(|| {
            RepoError::NotFound(format!("Item {item_id} not found in picklist '{name}'"))
        })?;
    item.is_active = false;

    save_items(&mut *tx, &picklist).await?;
    let updated = find_by_name(&mut *tx, name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Picklist '{name}' not found")))?;
    tx.commit().await?;
    Ok(updated)
}

async fn save_items(db: impl sqlx::SqliteExecutor<'_>, picklist: &Picklist) -> RepoResult<()> {
    let json = serde_json::to_string(&picklist.items)?;
    let now = shared::util::now_millis();
    sqlx::query("UPDATE picklist SET items = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(&json)
        .bind(now)
        .bind(picklist.id)
        .execute(db)
        .await?;
    Ok(())
}
