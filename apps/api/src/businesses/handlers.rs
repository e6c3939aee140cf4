//! Business CRUD. Letterhead identities are plain user-scoped records; the
//! image fields hold URLs produced by the external upload host.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::business::BusinessRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateBusinessRequest {
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    pub header_image: Option<String>,
    pub footer_image: Option<String>,
    pub seal_url: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBusinessRequest {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub header_image: Option<String>,
    pub footer_image: Option<String>,
    pub seal_url: Option<String>,
}

/// POST /businesses
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<BusinessRow>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("business name is required".to_string()));
    }
    let row: BusinessRow = sqlx::query_as(
        r#"
        INSERT INTO businesses
            (user_id, name, address, phone, email, website,
             header_image, footer_image, seal_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(req.user_id)
    .bind(req.name)
    .bind(req.address)
    .bind(req.phone)
    .bind(req.email)
    .bind(req.website)
    .bind(req.header_image)
    .bind(req.footer_image)
    .bind(req.seal_url)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /businesses
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<BusinessRow>>, AppError> {
    let rows: Vec<BusinessRow> =
        sqlx::query_as("SELECT * FROM businesses WHERE user_id = $1 ORDER BY name")
            .bind(params.user_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}

/// GET /businesses/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<BusinessRow>, AppError> {
    let row: Option<BusinessRow> =
        sqlx::query_as("SELECT * FROM businesses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(params.user_id)
            .fetch_optional(&state.db)
            .await?;
    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Business {id} not found")))
}

/// PATCH /businesses/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBusinessRequest>,
) -> Result<Json<BusinessRow>, AppError> {
    let row: Option<BusinessRow> = sqlx::query_as(
        r#"
        UPDATE businesses SET
            name         = COALESCE($3, name),
            address      = COALESCE($4, address),
            phone        = COALESCE($5, phone),
            email        = COALESCE($6, email),
            website      = COALESCE($7, website),
            header_image = COALESCE($8, header_image),
            footer_image = COALESCE($9, footer_image),
            seal_url     = COALESCE($10, seal_url),
            updated_at   = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.user_id)
    .bind(req.name)
    .bind(req.address)
    .bind(req.phone)
    .bind(req.email)
    .bind(req.website)
    .bind(req.header_image)
    .bind(req.footer_image)
    .bind(req.seal_url)
    .fetch_optional(&state.db)
    .await?;
    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Business {id} not found")))
}

/// DELETE /businesses/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM businesses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Business {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
