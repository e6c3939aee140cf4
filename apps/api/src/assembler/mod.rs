// Document assembler: binds layout slots to draft data, paginates the body,
// and drives the PDF/DOC export pipelines.

pub mod bindings;
pub mod doc;
pub mod images;
pub mod paginate;
pub mod pdf;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::errors::AppError;
use crate::layout::{LayoutConfig, LayoutSlot};
use crate::models::draft::DraftDetail;

pub use bindings::{bind_slots, PlacedSlot, RenderMode, SlotContent};
pub use images::{HttpImageSource, ImageSource, LoadedImage};
pub use paginate::{default_page_metrics, PageMetrics};

/// On-screen preview model: placed slots plus the page count the body flows
/// into. Coordinates stay in mm; the client applies its own fit scale.
#[derive(Debug, Serialize)]
pub struct PreviewDocument {
    pub mode: RenderMode,
    pub page_count: usize,
    pub slots: Vec<PlacedSlot>,
}

/// Resolves the draft into the preview model. Refuses (422) when the
/// business or recipient reference is missing.
pub fn assemble_preview(
    detail: &DraftDetail,
    layout: &LayoutConfig,
    upload_base: &str,
    metrics: &PageMetrics,
    mode: RenderMode,
) -> Result<PreviewDocument, AppError> {
    let slots = bind_slots(detail, layout, upload_base, mode)?;
    let pages = paginate::paginate_body(&detail.draft.content, layout.get(LayoutSlot::Content), metrics);
    Ok(PreviewDocument {
        mode,
        page_count: pages.len(),
        slots,
    })
}

/// Full PDF export pipeline: bind, paginate, prefetch images, then compose
/// and write inside `spawn_blocking` (PDF assembly is CPU-bound).
///
/// A slot image that fails to fetch or decode is logged and skipped; a
/// partial document beats no document.
pub async fn assemble_pdf(
    detail: &DraftDetail,
    layout: &LayoutConfig,
    upload_base: &str,
    metrics: &PageMetrics,
    source: Arc<dyn ImageSource>,
) -> Result<Vec<u8>, AppError> {
    let slots = bind_slots(detail, layout, upload_base, RenderMode::Normal)?;
    let body_pages =
        paginate::paginate_body(&detail.draft.content, layout.get(LayoutSlot::Content), metrics);

    let images = fetch_slot_images(&slots, source).await;

    let title = if detail.draft.subject.is_empty() {
        "letter".to_string()
    } else {
        detail.draft.subject.clone()
    };
    let metrics = metrics.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        let plan = pdf::build_document_plan(&slots, &body_pages, &images, &metrics);
        pdf::write_pdf(&plan, &images, &title)
    })
    .await
    .map_err(|e| AppError::Export(format!("export task failed: {e}")))??;

    Ok(bytes)
}

/// DOC export: serialize the bound slots to a Word-compatible HTML document.
pub fn assemble_doc(
    detail: &DraftDetail,
    layout: &LayoutConfig,
    upload_base: &str,
) -> Result<Vec<u8>, AppError> {
    let slots = bind_slots(detail, layout, upload_base, RenderMode::Normal)?;
    let title = if detail.draft.subject.is_empty() {
        "letter"
    } else {
        detail.draft.subject.as_str()
    };
    Ok(doc::render_doc_html(&slots, title).into_bytes())
}

/// Fetches every image-bearing slot, dropping failures with a logged error
/// so the export can degrade instead of aborting.
async fn fetch_slot_images(
    slots: &[PlacedSlot],
    source: Arc<dyn ImageSource>,
) -> HashMap<LayoutSlot, LoadedImage> {
    let mut images = HashMap::new();
    for placed in slots {
        let SlotContent::Image { url } = &placed.content else {
            continue;
        };
        match source.fetch(url).await {
            Ok(img) => {
                images.insert(placed.slot, img);
            }
            Err(e) => {
                error!(slot = ?placed.slot, %url, "image load failed, skipping: {e:#}");
            }
        }
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_layout;
    use crate::models::business::BusinessRow;
    use crate::models::draft::DraftRow;
    use crate::models::recipient::RecipientRow;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    /// Deterministic in-memory image source: serves fixed-size banners and
    /// fails on demand to exercise the degrade path.
    struct StubImages {
        fail_footer: bool,
    }

    #[async_trait]
    impl ImageSource for StubImages {
        async fn fetch(&self, url: &str) -> Result<LoadedImage> {
            if self.fail_footer && url.contains("footer") {
                return Err(anyhow!("connection refused"));
            }
            Ok(LoadedImage {
                width_px: 400,
                height_px: 100,
                rgb: vec![255; 400 * 100 * 3],
            })
        }
    }

    fn detail(paragraphs: usize) -> DraftDetail {
        let user_id = Uuid::new_v4();
        let biz = BusinessRow {
            id: Uuid::new_v4(),
            user_id,
            name: "Acme Traders".to_string(),
            address: "12 Dock Road".to_string(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            header_image: Some("/uploads/header.png".to_string()),
            footer_image: Some("/uploads/footer.png".to_string()),
            seal_url: None,
            logo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let rec = RecipientRow {
            id: Uuid::new_v4(),
            user_id,
            name: "Harbor Council".to_string(),
            contact_person: None,
            address: "1 Quay Street".to_string(),
            email: None,
            phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        DraftDetail {
            draft: DraftRow {
                id: Uuid::new_v4(),
                user_id,
                business_id: Some(biz.id),
                recipient_id: Some(rec.id),
                ref_no: "REF/1".to_string(),
                date: None,
                subject: "Berth allocation".to_string(),
                content: "<p>A line of letter body text.</p>".repeat(paragraphs),
                status: "DRAFT".to_string(),
                include_seal: false,
                layout: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            business: Some(biz),
            recipient: Some(rec),
        }
    }

    const BASE: &str = "http://localhost:3000";

    #[tokio::test]
    async fn test_pdf_export_end_to_end() {
        let d = detail(80); // enough body to force several pages
        let layout = default_layout();
        let bytes = assemble_pdf(
            &d,
            &layout,
            BASE,
            &default_page_metrics(),
            Arc::new(StubImages { fail_footer: false }),
        )
        .await
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_failed_image_does_not_abort_export() {
        let d = detail(10);
        let layout = default_layout();
        let bytes = assemble_pdf(
            &d,
            &layout,
            BASE,
            &default_page_metrics(),
            Arc::new(StubImages { fail_footer: true }),
        )
        .await
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_preview_reports_page_count() {
        let d = detail(80);
        let layout = default_layout();
        let preview = assemble_preview(
            &d,
            &layout,
            BASE,
            &default_page_metrics(),
            RenderMode::Normal,
        )
        .unwrap();
        assert!(preview.page_count > 1);
        assert!(!preview.slots.is_empty());
    }

    #[test]
    fn test_preview_refuses_unresolved_references() {
        let mut d = detail(1);
        d.business = None;
        let err = assemble_preview(
            &d,
            &default_layout(),
            BASE,
            &default_page_metrics(),
            RenderMode::Normal,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
