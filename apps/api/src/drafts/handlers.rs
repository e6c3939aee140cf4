use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::assembler::{self, RenderMode};
use crate::drafts::store::{self, DraftPatch, NewDraft};
use crate::errors::AppError;
use crate::layout::LayoutConfig;
use crate::models::draft::{DraftDetail, DraftRow, STATUS_DRAFT, STATUS_FINAL};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateDraftRequest {
    pub user_id: Uuid,
    pub business_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    #[serde(default)]
    pub ref_no: String,
    pub date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
    pub status: Option<String>,
    #[serde(default)]
    pub include_seal: bool,
    pub layout: Option<LayoutConfig>,
}

#[derive(Deserialize)]
pub struct UpdateDraftRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub patch: DraftPatch,
}

/// POST /drafts
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<DraftRow>), AppError> {
    let status = req.status.unwrap_or_else(|| STATUS_DRAFT.to_string());
    if status != STATUS_DRAFT && status != STATUS_FINAL {
        return Err(AppError::Validation(format!(
            "status must be {STATUS_DRAFT} or {STATUS_FINAL}"
        )));
    }
    let row = store::insert_draft(
        &state.db,
        NewDraft {
            user_id: req.user_id,
            business_id: req.business_id,
            recipient_id: req.recipient_id,
            ref_no: req.ref_no,
            date: req.date,
            subject: req.subject,
            content: req.content,
            status,
            include_seal: req.include_seal,
            layout: req.layout,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /drafts
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<DraftDetail>>, AppError> {
    Ok(Json(store::list_drafts(&state.db, params.user_id).await?))
}

/// GET /drafts/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DraftDetail>, AppError> {
    let row = store::fetch_draft(&state.db, id, params.user_id).await?;
    Ok(Json(store::populate(&state.db, row).await?))
}

/// PATCH /drafts/:id
///
/// Accepts any subset of draft fields plus `layout` and `status`. Saving a
/// customized layout and finalizing both come through here; the FINAL guard
/// lives in `store::validate_patch`.
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDraftRequest>,
) -> Result<Json<DraftDetail>, AppError> {
    let existing = store::fetch_draft(&state.db, id, req.user_id).await?;
    store::validate_patch(&existing, &req.patch)?;
    let updated = store::apply_patch(&state.db, &existing, req.patch).await?;
    Ok(Json(store::populate(&state.db, updated).await?))
}

/// DELETE /drafts/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete_draft(&state.db, id, params.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /drafts/:id/clone
pub async fn handle_clone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<(StatusCode, Json<DraftRow>), AppError> {
    let row = store::clone_draft(&state.db, id, params.user_id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub mode: PreviewMode,
}

#[derive(Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    #[default]
    Normal,
    Customize,
}

/// GET /drafts/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<assembler::PreviewDocument>, AppError> {
    let detail = fetch_detail(&state, id, params.user_id).await?;
    let layout = effective_layout(&state, &detail);
    let mode = match params.mode {
        PreviewMode::Normal => RenderMode::Normal,
        PreviewMode::Customize => RenderMode::Customize,
    };
    let preview = assembler::assemble_preview(
        &detail,
        &layout,
        &state.config.upload_base_url,
        &state.page_metrics,
        mode,
    )?;
    Ok(Json(preview))
}

/// GET /drafts/:id/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let detail = fetch_detail(&state, id, params.user_id).await?;
    let layout = effective_layout(&state, &detail);
    let bytes = assembler::assemble_pdf(
        &detail,
        &layout,
        &state.config.upload_base_url,
        &state.page_metrics,
        state.images.clone(),
    )
    .await?;

    let filename = export_filename(&detail.draft.subject, "pdf");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}

/// GET /drafts/:id/export/doc
///
/// Best-effort single-pass document; the warning header tells the client
/// that custom layouts may not translate exactly.
pub async fn handle_export_doc(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let detail = fetch_detail(&state, id, params.user_id).await?;
    let layout = effective_layout(&state, &detail);
    let bytes = assembler::assemble_doc(&detail, &layout, &state.config.upload_base_url)?;

    let filename = export_filename(&detail.draft.subject, "doc");
    Ok((
        [
            (header::CONTENT_TYPE, "application/msword".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (
                header::HeaderName::from_static("x-export-warning"),
                assembler::doc::LAYOUT_WARNING.to_string(),
            ),
        ],
        bytes,
    ))
}

async fn fetch_detail(state: &AppState, id: Uuid, user_id: Uuid) -> Result<DraftDetail, AppError> {
    let row = store::fetch_draft(&state.db, id, user_id).await?;
    store::populate(&state.db, row).await
}

/// The draft's saved layout, or the injected process default.
fn effective_layout(state: &AppState, detail: &DraftDetail) -> LayoutConfig {
    detail
        .draft
        .layout
        .as_ref()
        .map(|j| j.0.clone())
        .unwrap_or_else(|| state.default_layout.clone())
}

fn export_filename(subject: &str, ext: &str) -> String {
    let stem: String = subject
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        format!("letter.{ext}")
    } else {
        format!("{stem}.{ext}")
    }
}
