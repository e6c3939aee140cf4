//! Recipient CRUD: user-scoped addressee records.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::recipient::RecipientRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateRecipientRequest {
    pub user_id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    #[serde(default)]
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRecipientRequest {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// POST /recipients
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<RecipientRow>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("recipient name is required".to_string()));
    }
    let row: RecipientRow = sqlx::query_as(
        r#"
        INSERT INTO recipients (user_id, name, contact_person, address, email, phone)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(req.user_id)
    .bind(req.name)
    .bind(req.contact_person)
    .bind(req.address)
    .bind(req.email)
    .bind(req.phone)
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /recipients
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<RecipientRow>>, AppError> {
    let rows: Vec<RecipientRow> =
        sqlx::query_as("SELECT * FROM recipients WHERE user_id = $1 ORDER BY name")
            .bind(params.user_id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(rows))
}

/// GET /recipients/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<RecipientRow>, AppError> {
    let row: Option<RecipientRow> =
        sqlx::query_as("SELECT * FROM recipients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(params.user_id)
            .fetch_optional(&state.db)
            .await?;
    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Recipient {id} not found")))
}

/// PATCH /recipients/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRecipientRequest>,
) -> Result<Json<RecipientRow>, AppError> {
    let row: Option<RecipientRow> = sqlx::query_as(
        r#"
        UPDATE recipients SET
            name           = COALESCE($3, name),
            contact_person = COALESCE($4, contact_person),
            address        = COALESCE($5, address),
            email          = COALESCE($6, email),
            phone          = COALESCE($7, phone),
            updated_at     = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.user_id)
    .bind(req.name)
    .bind(req.contact_person)
    .bind(req.address)
    .bind(req.email)
    .bind(req.phone)
    .fetch_optional(&state.db)
    .await?;
    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Recipient {id} not found")))
}

/// DELETE /recipients/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM recipients WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(params.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Recipient {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
