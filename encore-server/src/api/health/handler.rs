//! Health Handler

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
}

/// GET /api/health - 存活探针 (无需认证)
pub async fn health(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<HealthStatus>>> {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .is_ok();

    Ok(ok(HealthStatus {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
