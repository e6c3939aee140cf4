//! Layout slot model: nine named letter regions with page-relative mm positions.
//!
//! Positions are millimetres from the top-left corner of an A4 sheet. They are
//! deliberately NOT clamped to the page: a user may drag a slot partially or
//! fully off the printable area, and that is treated as a valid layout.

use serde::{Deserialize, Serialize};

/// A4 page dimensions in millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// The nine fixed letter regions. No dynamic slots exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSlot {
    Header,
    Ref,
    Date,
    Recipient,
    Subject,
    Content,
    Signatory,
    Seal,
    Footer,
}

impl LayoutSlot {
    /// All slots in rendering order (header first, footer last).
    pub const ALL: [LayoutSlot; 9] = [
        LayoutSlot::Header,
        LayoutSlot::Ref,
        LayoutSlot::Date,
        LayoutSlot::Recipient,
        LayoutSlot::Subject,
        LayoutSlot::Content,
        LayoutSlot::Signatory,
        LayoutSlot::Seal,
        LayoutSlot::Footer,
    ];
}

/// Position and visibility of a single slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    /// Horizontal offset from the page's left edge, in mm. May be negative.
    pub x: f64,
    /// Vertical offset from the page's top edge, in mm. May be negative.
    pub y: f64,
    /// Optional fixed width in mm; `None` means intrinsic content width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    /// Hidden slots contribute nothing to normal rendering but remain
    /// selectable (dimmed) in customization mode.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl LayoutItem {
    pub fn at(x: f64, y: f64) -> Self {
        LayoutItem {
            x,
            y,
            w: None,
            hidden: false,
        }
    }

    pub fn with_width(x: f64, y: f64, w: f64) -> Self {
        LayoutItem {
            x,
            y,
            w: Some(w),
            hidden: false,
        }
    }
}

/// The full layout of a letter page: all nine slots, always present.
///
/// Stored layouts may predate a slot; serde defaults fill the gap so a
/// `LayoutConfig` deserialized from any historical draft row is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "defaults::header")]
    pub header: LayoutItem,
    #[serde(rename = "ref", default = "defaults::ref_no")]
    pub ref_no: LayoutItem,
    #[serde(default = "defaults::date")]
    pub date: LayoutItem,
    #[serde(default = "defaults::recipient")]
    pub recipient: LayoutItem,
    #[serde(default = "defaults::subject")]
    pub subject: LayoutItem,
    #[serde(default = "defaults::content")]
    pub content: LayoutItem,
    #[serde(default = "defaults::signatory")]
    pub signatory: LayoutItem,
    #[serde(default = "defaults::seal")]
    pub seal: LayoutItem,
    #[serde(default = "defaults::footer")]
    pub footer: LayoutItem,
}

mod defaults {
    use super::LayoutItem;
    use super::PAGE_WIDTH_MM;

    pub fn header() -> LayoutItem {
        LayoutItem::with_width(0.0, 0.0, PAGE_WIDTH_MM)
    }
    pub fn ref_no() -> LayoutItem {
        LayoutItem::at(20.0, 50.0)
    }
    pub fn date() -> LayoutItem {
        LayoutItem::at(140.0, 50.0)
    }
    pub fn recipient() -> LayoutItem {
        LayoutItem::at(20.0, 70.0)
    }
    pub fn subject() -> LayoutItem {
        LayoutItem::at(20.0, 110.0)
    }
    pub fn content() -> LayoutItem {
        LayoutItem::with_width(20.0, 130.0, 170.0)
    }
    pub fn signatory() -> LayoutItem {
        LayoutItem::at(150.0, 250.0)
    }
    pub fn seal() -> LayoutItem {
        LayoutItem::at(150.0, 220.0)
    }
    pub fn footer() -> LayoutItem {
        LayoutItem::with_width(0.0, 280.0, PAGE_WIDTH_MM)
    }
}

/// The baseline layout every draft starts from. Pure constant table; callers
/// receive a fresh value (the assembler takes it via `AppState`, never as a
/// module-level singleton).
pub fn default_layout() -> LayoutConfig {
    LayoutConfig {
        header: defaults::header(),
        ref_no: defaults::ref_no(),
        date: defaults::date(),
        recipient: defaults::recipient(),
        subject: defaults::subject(),
        content: defaults::content(),
        signatory: defaults::signatory(),
        seal: defaults::seal(),
        footer: defaults::footer(),
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        default_layout()
    }
}

impl LayoutConfig {
    pub fn get(&self, slot: LayoutSlot) -> &LayoutItem {
        match slot {
            LayoutSlot::Header => &self.header,
            LayoutSlot::Ref => &self.ref_no,
            LayoutSlot::Date => &self.date,
            LayoutSlot::Recipient => &self.recipient,
            LayoutSlot::Subject => &self.subject,
            LayoutSlot::Content => &self.content,
            LayoutSlot::Signatory => &self.signatory,
            LayoutSlot::Seal => &self.seal,
            LayoutSlot::Footer => &self.footer,
        }
    }

    pub fn get_mut(&mut self, slot: LayoutSlot) -> &mut LayoutItem {
        match slot {
            LayoutSlot::Header => &mut self.header,
            LayoutSlot::Ref => &mut self.ref_no,
            LayoutSlot::Date => &mut self.date,
            LayoutSlot::Recipient => &mut self.recipient,
            LayoutSlot::Subject => &mut self.subject,
            LayoutSlot::Content => &mut self.content,
            LayoutSlot::Signatory => &mut self.signatory,
            LayoutSlot::Seal => &mut self.seal,
            LayoutSlot::Footer => &mut self.footer,
        }
    }

    /// Flips the hidden flag on a slot. Editor operation; handlers receive
    /// the resulting layout whole via PATCH.
    #[allow(dead_code)]
    pub fn toggle_hidden(&mut self, slot: LayoutSlot) {
        let item = self.get_mut(slot);
        item.hidden = !item.hidden;
    }

    /// Discards all customization, restoring the baseline exactly.
    #[allow(dead_code)]
    pub fn reset(&mut self) {
        *self = default_layout();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_has_all_slots_visible() {
        let layout = default_layout();
        for slot in LayoutSlot::ALL {
            assert!(
                !layout.get(slot).hidden,
                "{slot:?} should start visible"
            );
        }
    }

    #[test]
    fn test_default_positions_match_baseline() {
        let layout = default_layout();
        assert_eq!(layout.header.x, 0.0);
        assert_eq!(layout.header.y, 0.0);
        assert_eq!((layout.ref_no.x, layout.ref_no.y), (20.0, 50.0));
        assert_eq!((layout.date.x, layout.date.y), (140.0, 50.0));
        assert_eq!((layout.recipient.x, layout.recipient.y), (20.0, 70.0));
        assert_eq!((layout.subject.x, layout.subject.y), (20.0, 110.0));
        assert_eq!((layout.content.x, layout.content.y), (20.0, 130.0));
        assert_eq!((layout.seal.x, layout.seal.y), (150.0, 220.0));
        assert_eq!((layout.signatory.x, layout.signatory.y), (150.0, 250.0));
        assert_eq!((layout.footer.x, layout.footer.y), (0.0, 280.0));
    }

    #[test]
    fn test_missing_slots_deserialize_to_defaults() {
        // A stored layout from before the seal slot existed.
        let json = r#"{"header":{"x":5.0,"y":1.0},"ref":{"x":25.0,"y":55.0}}"#;
        let layout: LayoutConfig = serde_json::from_str(json).unwrap();

        assert_eq!(layout.header.x, 5.0);
        assert_eq!(layout.ref_no.y, 55.0);
        assert_eq!(layout.seal, LayoutItem::at(150.0, 220.0));
        assert_eq!(layout.footer, default_layout().footer);
    }

    #[test]
    fn test_serde_round_trip_preserves_layout_verbatim() {
        let mut layout = default_layout();
        layout.seal.x = -12.5; // off-page positions are legal
        layout.subject.hidden = true;

        let json = serde_json::to_string(&layout).unwrap();
        let back: LayoutConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn test_ref_slot_serializes_under_its_wire_name() {
        let json = serde_json::to_value(default_layout()).unwrap();
        assert!(json.get("ref").is_some());
        assert!(json.get("ref_no").is_none());
    }

    #[test]
    fn test_toggle_hidden_flips_and_restores() {
        let mut layout = default_layout();
        layout.toggle_hidden(LayoutSlot::Seal);
        assert!(layout.seal.hidden);
        layout.toggle_hidden(LayoutSlot::Seal);
        assert!(!layout.seal.hidden);
    }

    #[test]
    fn test_reset_discards_all_customization() {
        let mut layout = default_layout();
        layout.header.x = 33.0;
        layout.footer.y = -4.0;
        layout.toggle_hidden(LayoutSlot::Date);
        layout.content.w = Some(100.0);

        layout.reset();
        assert_eq!(layout, default_layout());
    }
}
