//! Draft persistence: user-scoped queries, the FINAL-status guard, and
//! cloning. Every query filters by `user_id`; a draft belonging to another
//! user is indistinguishable from one that does not exist.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::LayoutConfig;
use crate::models::business::BusinessRow;
use crate::models::draft::{DraftDetail, DraftRow, STATUS_DRAFT, STATUS_FINAL};
use crate::models::recipient::RecipientRow;

/// Partial update payload for `PATCH /drafts/:id`. Absent fields keep their
/// stored values. The nullable columns use a double `Option` so an explicit
/// JSON `null` clears the field (e.g. `{"layout": null}` reverts the draft
/// to the default layout) while an absent key leaves it alone.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DraftPatch {
    #[serde(default, deserialize_with = "some_or_null")]
    pub business_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub recipient_id: Option<Option<Uuid>>,
    pub ref_no: Option<String>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub date: Option<Option<chrono::NaiveDate>>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub include_seal: Option<bool>,
    #[serde(default, deserialize_with = "some_or_null")]
    pub layout: Option<Option<LayoutConfig>>,
}

/// Wraps a present value (including `null`) in `Some`, so the outer `Option`
/// tracks key presence and the inner one the value.
fn some_or_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl DraftPatch {
    fn touches_anything_but_status(&self) -> bool {
        self.business_id.is_some()
            || self.recipient_id.is_some()
            || self.ref_no.is_some()
            || self.date.is_some()
            || self.subject.is_some()
            || self.content.is_some()
            || self.include_seal.is_some()
            || self.layout.is_some()
    }
}

/// Checks a patch against the draft lifecycle before it reaches the database.
///
/// FINAL drafts are immutable: the transition is one-way and locks every
/// field. Cloning is the only way to derive an editable copy.
pub fn validate_patch(existing: &DraftRow, patch: &DraftPatch) -> Result<(), AppError> {
    if let Some(status) = patch.status.as_deref() {
        if status != STATUS_DRAFT && status != STATUS_FINAL {
            return Err(AppError::Validation(format!(
                "status must be {STATUS_DRAFT} or {STATUS_FINAL}"
            )));
        }
        if existing.is_final() && status == STATUS_DRAFT {
            return Err(AppError::UnprocessableEntity(
                "a finalized letter cannot return to draft".to_string(),
            ));
        }
    }
    if existing.is_final() && patch.touches_anything_but_status() {
        return Err(AppError::UnprocessableEntity(
            "draft is finalized and can no longer be edited".to_string(),
        ));
    }
    Ok(())
}

pub async fn fetch_draft(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<DraftRow, AppError> {
    let row: Option<DraftRow> =
        sqlx::query_as("SELECT * FROM drafts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    row.ok_or_else(|| AppError::NotFound(format!("Draft {id} not found")))
}

/// Resolves the business and recipient references, still user-scoped.
pub async fn populate(pool: &PgPool, draft: DraftRow) -> Result<DraftDetail, AppError> {
    let business: Option<BusinessRow> = match draft.business_id {
        Some(bid) => {
            sqlx::query_as("SELECT * FROM businesses WHERE id = $1 AND user_id = $2")
                .bind(bid)
                .bind(draft.user_id)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };
    let recipient: Option<RecipientRow> = match draft.recipient_id {
        Some(rid) => {
            sqlx::query_as("SELECT * FROM recipients WHERE id = $1 AND user_id = $2")
                .bind(rid)
                .bind(draft.user_id)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };
    Ok(DraftDetail {
        draft,
        business,
        recipient,
    })
}

/// All of a user's drafts, most recently updated first, references resolved.
pub async fn list_drafts(pool: &PgPool, user_id: Uuid) -> Result<Vec<DraftDetail>, AppError> {
    let rows: Vec<DraftRow> =
        sqlx::query_as("SELECT * FROM drafts WHERE user_id = $1 ORDER BY updated_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let businesses: Vec<BusinessRow> =
        sqlx::query_as("SELECT * FROM businesses WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    let recipients: Vec<RecipientRow> =
        sqlx::query_as("SELECT * FROM recipients WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let details = rows
        .into_iter()
        .map(|draft| {
            let business = draft
                .business_id
                .and_then(|bid| businesses.iter().find(|b| b.id == bid).cloned());
            let recipient = draft
                .recipient_id
                .and_then(|rid| recipients.iter().find(|r| r.id == rid).cloned());
            DraftDetail {
                draft,
                business,
                recipient,
            }
        })
        .collect();
    Ok(details)
}

pub struct NewDraft {
    pub user_id: Uuid,
    pub business_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub ref_no: String,
    pub date: Option<chrono::NaiveDate>,
    pub subject: String,
    pub content: String,
    pub status: String,
    pub include_seal: bool,
    pub layout: Option<LayoutConfig>,
}

pub async fn insert_draft(pool: &PgPool, new: NewDraft) -> Result<DraftRow, AppError> {
    let row: DraftRow = sqlx::query_as(
        r#"
        INSERT INTO drafts
            (user_id, business_id, recipient_id, ref_no, date, subject,
             content, status, include_seal, layout)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(new.user_id)
    .bind(new.business_id)
    .bind(new.recipient_id)
    .bind(new.ref_no)
    .bind(new.date)
    .bind(new.subject)
    .bind(new.content)
    .bind(new.status)
    .bind(new.include_seal)
    .bind(new.layout.map(Json))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Applies a validated patch. Absent fields fall back to the stored value;
/// the nullable columns take a present/value flag pair so an explicit null
/// clears them (COALESCE alone cannot).
pub async fn apply_patch(
    pool: &PgPool,
    existing: &DraftRow,
    patch: DraftPatch,
) -> Result<DraftRow, AppError> {
    let row: DraftRow = sqlx::query_as(
        r#"
        UPDATE drafts SET
            business_id  = CASE WHEN $3 THEN $4 ELSE business_id END,
            recipient_id = CASE WHEN $5 THEN $6 ELSE recipient_id END,
            ref_no       = COALESCE($7, ref_no),
            date         = CASE WHEN $8 THEN $9 ELSE date END,
            subject      = COALESCE($10, subject),
            content      = COALESCE($11, content),
            status       = COALESCE($12, status),
            include_seal = COALESCE($13, include_seal),
            layout       = CASE WHEN $14 THEN $15 ELSE layout END,
            updated_at   = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(existing.user_id)
    .bind(patch.business_id.is_some())
    .bind(patch.business_id.flatten())
    .bind(patch.recipient_id.is_some())
    .bind(patch.recipient_id.flatten())
    .bind(patch.ref_no)
    .bind(patch.date.is_some())
    .bind(patch.date.flatten())
    .bind(patch.subject)
    .bind(patch.content)
    .bind(patch.status)
    .bind(patch.include_seal)
    .bind(patch.layout.is_some())
    .bind(patch.layout.flatten().map(Json))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn delete_draft(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM drafts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Draft {id} not found")));
    }
    Ok(())
}

/// Builds the insert payload for a clone: new record, status forced back to
/// DRAFT, layout carried over verbatim.
pub fn clone_payload(source: &DraftRow) -> NewDraft {
    NewDraft {
        user_id: source.user_id,
        business_id: source.business_id,
        recipient_id: source.recipient_id,
        ref_no: source.ref_no.clone(),
        date: source.date,
        subject: source.subject.clone(),
        content: source.content.clone(),
        status: STATUS_DRAFT.to_string(),
        include_seal: source.include_seal,
        layout: source.layout.as_ref().map(|j| j.0.clone()),
    }
}

pub async fn clone_draft(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<DraftRow, AppError> {
    let source = fetch_draft(pool, id, user_id).await?;
    insert_draft(pool, clone_payload(&source)).await
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{default_layout, LayoutSlot};
    use chrono::Utc;

    fn draft(status: &str) -> DraftRow {
        DraftRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_id: Some(Uuid::new_v4()),
            recipient_id: None,
            ref_no: "REF/9".to_string(),
            date: None,
            subject: "Subject".to_string(),
            content: "<p>Body</p>".to_string(),
            status: status.to_string(),
            include_seal: true,
            layout: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_on_draft_is_allowed() {
        let patch = DraftPatch {
            subject: Some("New".to_string()),
            ..Default::default()
        };
        assert!(validate_patch(&draft(STATUS_DRAFT), &patch).is_ok());
    }

    #[test]
    fn test_finalize_is_allowed_once() {
        let patch = DraftPatch {
            status: Some(STATUS_FINAL.to_string()),
            ..Default::default()
        };
        assert!(validate_patch(&draft(STATUS_DRAFT), &patch).is_ok());
    }

    #[test]
    fn test_final_draft_rejects_edits() {
        let patch = DraftPatch {
            content: Some("<p>tamper</p>".to_string()),
            ..Default::default()
        };
        let err = validate_patch(&draft(STATUS_FINAL), &patch).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_final_cannot_return_to_draft() {
        let patch = DraftPatch {
            status: Some(STATUS_DRAFT.to_string()),
            ..Default::default()
        };
        let err = validate_patch(&draft(STATUS_FINAL), &patch).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let patch = DraftPatch {
            status: Some("ARCHIVED".to_string()),
            ..Default::default()
        };
        let err = validate_patch(&draft(STATUS_DRAFT), &patch).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        // Absent key: field untouched.
        let patch: DraftPatch = serde_json::from_str(r#"{"subject":"S"}"#).unwrap();
        assert!(patch.date.is_none());
        assert!(patch.layout.is_none());
        assert!(patch.business_id.is_none());

        // Explicit null: field cleared.
        let patch: DraftPatch =
            serde_json::from_str(r#"{"date":null,"business_id":null,"layout":null}"#).unwrap();
        assert_eq!(patch.date, Some(None));
        assert_eq!(patch.business_id, Some(None));
        assert_eq!(patch.layout, Some(None));

        // A value still comes through as a value.
        let patch: DraftPatch = serde_json::from_str(r#"{"date":"2026-03-05"}"#).unwrap();
        assert_eq!(
            patch.date,
            Some(chrono::NaiveDate::from_ymd_opt(2026, 3, 5))
        );
    }

    #[test]
    fn test_clearing_a_field_counts_as_an_edit_on_final() {
        let patch: DraftPatch = serde_json::from_str(r#"{"layout":null}"#).unwrap();
        let err = validate_patch(&draft(STATUS_FINAL), &patch).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_clone_forces_draft_status_and_keeps_layout_verbatim() {
        let mut source = draft(STATUS_FINAL);
        let mut layout = default_layout();
        layout.get_mut(LayoutSlot::Seal).x = -3.25;
        layout.toggle_hidden(LayoutSlot::Date);
        source.layout = Some(Json(layout.clone()));

        let cloned = clone_payload(&source);
        assert_eq!(cloned.status, STATUS_DRAFT);
        assert_eq!(cloned.layout, Some(layout));
        assert_eq!(cloned.subject, source.subject);
        assert_eq!(cloned.include_seal, source.include_seal);
    }
}
