use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An addressee record owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipientRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
