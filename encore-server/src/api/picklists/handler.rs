//! Picklist API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::core::ServerState;
use crate::db::repository::picklist;
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};
use shared::models::{Picklist, PicklistCreate, PicklistItemCreate};

/// GET /api/picklists - 获取所有词表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Picklist>>>> {
    let picklists = picklist::find_all(state.pool()).await?;
    Ok(ok(picklists))
}

/// GET /api/picklists/:name - 按名称获取词表 (含软删除条目)
pub async fn get_by_name(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Picklist>>> {
    let p = picklist::find_by_name(state.pool(), &name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Picklist '{name}' not found")))?;
    Ok(ok(p))
}

/// POST /api/picklists - 创建词表
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PicklistCreate>,
) -> AppResult<Json<ApiResponse<Picklist>>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Picklist name is required"));
    }
    let p = picklist::create(state.pool(), payload).await?;
    Ok(ok(p))
}

/// POST /api/picklists/:name/items - 追加条目
///
/// 与现存活跃条目忽略大小写重复时返回 400
pub async fn add_item(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<PicklistItemCreate>,
) -> AppResult<Json<ApiResponse<Picklist>>> {
    let p = picklist::add_item(state.pool(), &name, payload).await?;
    Ok(ok(p))
}

/// DELETE /api/picklists/:name/items/:item_id - 软删除条目 (仅管理员)
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((name, item_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<Picklist>>> {
    let p = picklist::remove_item(state.pool(), &name, item_id).await?;
    Ok(ok_with_message(p, "Item deactivated"))
}
