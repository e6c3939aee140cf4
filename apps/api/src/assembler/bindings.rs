//! Slot binding: resolves the nine layout slots against live draft, business,
//! and recipient data into renderable, positioned content.

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::AppError;
use crate::layout::{LayoutConfig, LayoutSlot};
use crate::models::business::BusinessRow;
use crate::models::draft::DraftDetail;
use crate::models::recipient::RecipientRow;

use super::images::resolve_image_url;

/// Normal rendering omits hidden slots entirely; customization mode keeps
/// them (marked) so the user can still select and unhide them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Normal,
    Customize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub bold: bool,
    pub underline: bool,
}

impl TextLine {
    pub fn plain(text: impl Into<String>) -> Self {
        TextLine {
            text: text.into(),
            bold: false,
            underline: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        TextLine {
            text: text.into(),
            bold: true,
            underline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlotContent {
    /// A resolved image URL (header banner, footer banner, seal).
    Image { url: String },
    /// Box drawn where the header banner would go when the business has none.
    Placeholder { label: String },
    Text { lines: Vec<TextLine> },
    /// The draft's rich-text body, passed through verbatim (not sanitized;
    /// drafts are authored and rendered by the same user).
    Html { raw: String },
}

/// One slot resolved to content and an absolute page position.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedSlot {
    pub slot: LayoutSlot,
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: Option<f64>,
    pub hidden: bool,
    pub content: SlotContent,
}

/// Formats a letter date as "dd MMMM, yyyy" (e.g. "05 March, 2026").
/// Date-less drafts render an empty value rather than erroring.
pub fn format_letter_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d %B, %Y").to_string(),
        None => String::new(),
    }
}

/// Resolves all nine slots for a draft whose references are populated.
///
/// Refuses with 422 when the business or recipient is missing: rendering
/// with blank fields is never acceptable. The seal slot is entirely absent
/// (no placeholder, no hidden marker) unless `include_seal` is set AND the
/// business has a seal image. The footer is likewise absent without a banner.
pub fn bind_slots(
    detail: &DraftDetail,
    layout: &LayoutConfig,
    upload_base: &str,
    mode: RenderMode,
) -> Result<Vec<PlacedSlot>, AppError> {
    let business = detail.business.as_ref().ok_or_else(|| {
        AppError::UnprocessableEntity(
            "Draft has no business selected; select one before previewing".to_string(),
        )
    })?;
    let recipient = detail.recipient.as_ref().ok_or_else(|| {
        AppError::UnprocessableEntity(
            "Draft has no recipient selected; select one before previewing".to_string(),
        )
    })?;

    let mut placed = Vec::with_capacity(9);
    for slot in LayoutSlot::ALL {
        let item = layout.get(slot);
        if item.hidden && mode == RenderMode::Normal {
            continue;
        }

        let Some(content) = slot_content(slot, detail, business, recipient, upload_base) else {
            continue;
        };

        placed.push(PlacedSlot {
            slot,
            x_mm: item.x,
            y_mm: item.y,
            width_mm: item.w,
            hidden: item.hidden,
            content,
        });
    }

    Ok(placed)
}

fn slot_content(
    slot: LayoutSlot,
    detail: &DraftDetail,
    business: &BusinessRow,
    recipient: &RecipientRow,
    upload_base: &str,
) -> Option<SlotContent> {
    let draft = &detail.draft;
    match slot {
        LayoutSlot::Header => Some(match business.header_image() {
            Some(url) => SlotContent::Image {
                url: resolve_image_url(url, upload_base),
            },
            None => SlotContent::Placeholder {
                label: business.name.clone(),
            },
        }),
        LayoutSlot::Ref => Some(SlotContent::Text {
            lines: vec![TextLine::bold(format!("Ref: {}", draft.ref_no))],
        }),
        LayoutSlot::Date => Some(SlotContent::Text {
            lines: vec![TextLine::bold(format!(
                "Date: {}",
                format_letter_date(draft.date)
            ))],
        }),
        LayoutSlot::Recipient => {
            let mut lines = vec![
                TextLine::bold("To,"),
                TextLine::bold(recipient.name.clone()),
            ];
            if let Some(person) = recipient.contact_person.as_deref().filter(|p| !p.is_empty()) {
                lines.push(TextLine::plain(person));
            }
            for addr_line in recipient.address.lines() {
                lines.push(TextLine::plain(addr_line));
            }
            Some(SlotContent::Text { lines })
        }
        LayoutSlot::Subject => Some(SlotContent::Text {
            lines: vec![TextLine {
                text: format!("Subject: {}", draft.subject),
                bold: true,
                underline: true,
            }],
        }),
        LayoutSlot::Content => Some(SlotContent::Html {
            raw: draft.content.clone(),
        }),
        LayoutSlot::Signatory => Some(SlotContent::Text {
            lines: vec![
                TextLine::bold(format!("For {}", business.name)),
                TextLine::plain(""), // blank signature space
                TextLine::plain(""),
                TextLine::plain("Authorized Signatory"),
            ],
        }),
        LayoutSlot::Seal => {
            if !draft.include_seal {
                return None;
            }
            business.seal_url().map(|url| SlotContent::Image {
                url: resolve_image_url(url, upload_base),
            })
        }
        LayoutSlot::Footer => business.footer_image().map(|url| SlotContent::Image {
            url: resolve_image_url(url, upload_base),
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
