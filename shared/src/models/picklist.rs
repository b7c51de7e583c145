//! Picklist Model
//!
//! Named, ordered vocabularies backing dropdown fields (source, tier,
//! category, ...). Items are soft-deleted only so historical member and
//! onboarding data chosen from retired items stays resolvable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One selectable value inside a picklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistItem {
    /// Item identity, needed for soft deletion
    pub id: Uuid,
    pub value: String,
    pub label: String,
    /// Display sequence; assigned as max existing + 1 on append
    pub order: i64,
    pub is_active: bool,
}

/// Picklist entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picklist {
    pub id: i64,
    pub name: String,
    pub label: String,
    pub items: Vec<PicklistItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Picklist {
    /// Active items in display order
    pub fn active_items(&self) -> impl Iterator<Item = &PicklistItem> {
        self.items.iter().filter(|i| i.is_active)
    }
}

/// Create picklist payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistCreate {
    pub name: String,
    pub label: String,
}

/// Append item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistItemCreate {
    pub value: String,
    pub label: Option<String>,
}
