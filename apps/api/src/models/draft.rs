use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::layout::LayoutConfig;
use crate::models::business::BusinessRow;
use crate::models::recipient::RecipientRow;

pub const STATUS_DRAFT: &str = "DRAFT";
pub const STATUS_FINAL: &str = "FINAL";

/// A letter record: metadata, rich-text HTML body, status, and the optional
/// saved layout. `layout = None` means the process-default layout applies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DraftRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub ref_no: String,
    pub date: Option<NaiveDate>,
    pub subject: String,
    pub content: String,
    /// "DRAFT" or "FINAL". The transition to FINAL is one-way.
    pub status: String,
    pub include_seal: bool,
    pub layout: Option<Json<LayoutConfig>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftRow {
    pub fn is_final(&self) -> bool {
        self.status == STATUS_FINAL
    }
}

/// A draft with its references populated, as returned by read endpoints.
/// Preview and export require both `business` and `recipient` resolved.
#[derive(Debug, Clone, Serialize)]
pub struct DraftDetail {
    #[serde(flatten)]
    pub draft: DraftRow,
    pub business: Option<BusinessRow>,
    pub recipient: Option<RecipientRow>,
}
