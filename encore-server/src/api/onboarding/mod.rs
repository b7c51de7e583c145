//! Onboarding API 模块
//!
//! CRUD + 阶段推进 (step1 / l1-questionnaire / l2-review) + 文档管理 + 报表。

mod handler;
pub mod report;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

/// 上传路由的请求体上限, 给 multipart 边界留出余量
const UPLOAD_BODY_LIMIT: usize = handler::MAX_DOCUMENT_SIZE + 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/onboarding", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 报表路由注册在 /{id} 之前 (静态段优先于路径参数)
        .route(
            "/reports/onboarding-status",
            get(handler::onboarding_status_report),
        )
        .route(
            "/reports/closure-checklist",
            get(handler::closure_checklist),
        )
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/step1", patch(handler::advance_step1))
        .route(
            "/{id}/l1-questionnaire",
            patch(handler::advance_l1_questionnaire),
        )
        .route("/{id}/l2-review", patch(handler::advance_l2_review))
        .route(
            "/{id}/l2-review/documents",
            post(handler::upload_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/{id}/l2-review/documents/{index}",
            delete(handler::delete_document),
        )
}
