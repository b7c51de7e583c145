//! Member API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::member;
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};
use shared::models::{Member, MemberCreate, MemberUpdate};

/// GET /api/members - 获取所有会员
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Member>>>> {
    let members = member::find_all(state.pool()).await?;
    Ok(ok(members))
}

/// GET /api/members/:id - 获取单个会员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Member>>> {
    let m = member::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;
    Ok(ok(m))
}

/// POST /api/members - 创建会员 (自动分配 member_number)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<ApiResponse<Member>>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Member name is required"));
    }
    let m = member::create(state.pool(), payload).await?;
    tracing::info!(member_id = m.id, member_number = m.member_number, "Member created");
    Ok(ok(m))
}

/// PUT /api/members/:id - 更新会员
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<ApiResponse<Member>>> {
    let m = member::update(state.pool(), id, payload).await?;
    Ok(ok(m))
}

/// DELETE /api/members/:id - 删除会员 (关联 onboarding 记录保留)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let removed = member::delete(state.pool(), id).await?;
    if !removed {
        return Err(AppError::not_found(format!("Member {id} not found")));
    }
    Ok(ok_with_message(removed, "Member deleted"))
}
