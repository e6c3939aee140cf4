use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A letterhead identity owned by a user. Image fields hold URLs, either
/// absolute (external host) or relative upload paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub header_image: Option<String>,
    pub footer_image: Option<String>,
    pub seal_url: Option<String>,
    /// Pre-rename column; records created before the header/footer split
    /// stored their banner here.
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessRow {
    /// The effective header banner, falling back to the legacy logo column.
    pub fn header_image(&self) -> Option<&str> {
        self.header_image
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.logo_url.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn footer_image(&self) -> Option<&str> {
        self.footer_image.as_deref().filter(|s| !s.is_empty())
    }

    pub fn seal_url(&self) -> Option<&str> {
        self.seal_url.as_deref().filter(|s| !s.is_empty())
    }
}
