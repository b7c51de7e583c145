//! Onboarding API Handlers

use axum::{
    Json,
    extract::{Extension, Multipart, Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::onboarding;
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_with_message};
use shared::models::{
    DocumentMeta, L1QuestionnaireData, L2ReviewData, Onboarding, OnboardingCreate,
    OnboardingStatusRow, OnboardingUpdate, Step1Data, parse_status_field,
};

/// Maximum uploaded document size (25MB)
pub(super) const MAX_DOCUMENT_SIZE: usize = 25 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// GET /api/onboarding?status=... - 获取 onboarding 列表
///
/// 过滤值同样走兼容解析: 传 heat 词 (hot/warm/...) 时按 heat 过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Onboarding>>>> {
    let filter = query
        .status
        .as_deref()
        .map(|s| parse_status_field(s).map_err(AppError::Validation))
        .transpose()?;
    let records = onboarding::find_all(state.pool(), filter).await?;
    Ok(ok(records))
}

/// GET /api/onboarding/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let record = onboarding::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Onboarding {id} not found")))?;
    Ok(ok(record))
}

/// POST /api/onboarding - 创建 onboarding (自动分配 task_number)
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<OnboardingCreate>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let record =
        onboarding::create(state.pool(), payload, Some(&current_user.display_name)).await?;
    tracing::info!(
        onboarding_id = record.id,
        task_number = record.task_number,
        "Onboarding created"
    );
    Ok(ok(record))
}

/// PUT /api/onboarding/:id - 更新通用字段
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OnboardingUpdate>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let record = onboarding::update(state.pool(), id, payload).await?;
    Ok(ok(record))
}

/// DELETE /api/onboarding/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let removed = onboarding::delete(state.pool(), id).await?;
    if !removed {
        return Err(AppError::not_found(format!("Onboarding {id} not found")));
    }
    Ok(ok_with_message(removed, "Onboarding deleted"))
}

/// PATCH /api/onboarding/:id/step1 - 推进第一阶段
///
/// 整体替换 step1_data 并强制 status = spoc-assigned
pub async fn advance_step1(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<Step1Data>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let record = onboarding::advance_step1(state.pool(), id, payload).await?;
    Ok(ok(record))
}

/// PATCH /api/onboarding/:id/l1-questionnaire - 推进 L1 问卷
///
/// 整体替换问卷数据, 强制 status = review-l2, 并在同一事务内把 KYC
/// 字段级联到关联会员
pub async fn advance_l1_questionnaire(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<L1QuestionnaireData>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let record = onboarding::advance_l1_questionnaire(state.pool(), id, payload).await?;
    Ok(ok(record))
}

/// L2 review PATCH payload: review 数据 + 可选目标状态
#[derive(Debug, Deserialize)]
pub struct L2ReviewPatch {
    pub status: Option<String>,
    #[serde(flatten)]
    pub review: L2ReviewData,
}

/// PATCH /api/onboarding/:id/l2-review - 推进 L2 审核
///
/// 合并写入 (保留已附加的 documents); status 为调用方指定值或 review-l2
pub async fn advance_l2_review(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<L2ReviewPatch>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let status_field = payload
        .status
        .as_deref()
        .map(|s| parse_status_field(s).map_err(AppError::Validation))
        .transpose()?;
    let record =
        onboarding::advance_l2_review(state.pool(), id, payload.review, status_field).await?;
    Ok(ok(record))
}

/// POST /api/onboarding/:id/l2-review/documents - 上传文档 (multipart)
///
/// 字段: `file` (必须), `title`, `description`
pub async fn upload_document(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    // 先确认记录存在, 避免为失败请求落盘文件
    if onboarding::find_by_id(state.pool(), id).await?.is_none() {
        return Err(AppError::not_found(format!("Onboarding {id} not found")));
    }

    let mut file_data: Option<Vec<u8>> = None;
    let mut original_filename = String::new();
    let mut content_type: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                original_filename = field
                    .file_name()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "document".to_string());
                content_type = field.content_type().map(|c| c.to_string());
                let data = field.bytes().await?;
                if data.len() > MAX_DOCUMENT_SIZE {
                    return Err(AppError::validation(format!(
                        "File too large. Maximum size is {}MB",
                        MAX_DOCUMENT_SIZE / 1024 / 1024
                    )));
                }
                file_data = Some(data.to_vec());
            }
            Some("title") => title = Some(field.text().await?),
            Some("description") => description = Some(field.text().await?),
            _ => {}
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::validation("Missing 'file' field in upload"))?;
    if file_data.is_empty() {
        return Err(AppError::validation("Uploaded file is empty"));
    }

    let content_type = content_type.unwrap_or_else(|| {
        mime_guess::from_path(&original_filename)
            .first_or_octet_stream()
            .to_string()
    });

    let locator = state.documents.save(&original_filename, &file_data).await?;

    let meta = DocumentMeta {
        title: title.unwrap_or_else(|| original_filename.clone()),
        description,
        path: locator.clone(),
        content_type,
        size: file_data.len() as u64,
        uploaded_at: shared::util::now_millis(),
    };

    match onboarding::attach_document(state.pool(), id, meta).await {
        Ok(record) => Ok(ok(record)),
        Err(e) => {
            // 元数据写入失败时清理刚落盘的文件
            state.documents.delete_best_effort(&locator).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/onboarding/:id/l2-review/documents/:index - 按位置删除文档
///
/// 越界下标返回 400 (与记录不存在的 404 区分); 文件删除尽力而为
pub async fn delete_document(
    State(state): State<ServerState>,
    Path((id, index)): Path<(i64, usize)>,
) -> AppResult<Json<ApiResponse<Onboarding>>> {
    let (record, removed) = onboarding::remove_document(state.pool(), id, index).await?;
    state.documents.delete_best_effort(&removed.path).await;
    Ok(ok_with_message(record, "Document removed"))
}

/// GET /api/onboarding/reports/onboarding-status - 状态报表
pub async fn onboarding_status_report(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<OnboardingStatusRow>>>> {
    let sources = onboarding::report_sources(state.pool()).await?;
    let now = shared::util::now_millis();
    let rows = sources
        .into_iter()
        .map(|src| super::report::build_row(src, now).map_err(AppError::Database))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ok(rows))
}

/// GET /api/onboarding/reports/closure-checklist - 日报数据源
///
/// 返回 closure_checklist 非空的 onboarding (外部邮件任务消费)
pub async fn closure_checklist(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Onboarding>>>> {
    let records = onboarding::find_with_closure_checklist(state.pool()).await?;
    Ok(ok(records))
}
