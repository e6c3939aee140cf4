//! Incremental drag repositioning of layout slots. Models the editor
//! gesture; request handlers never drive it directly.
//!
//! Each pointer-move event commits its pixel delta to the layout immediately
//! and re-baselines the pointer, instead of repositioning from the drag start
//! point. Because the px-to-mm conversion is linear, the accumulated result
//! equals a single large delta, and the gesture stays correct when the page
//! is visually scaled down on narrow viewports.

use serde::{Deserialize, Serialize};

use crate::layout::geometry::px_to_mm;
use crate::layout::slots::{LayoutConfig, LayoutSlot};

/// A pointer position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPx {
    pub x: f64,
    pub y: f64,
}

/// State machine for one drag gesture over a rendered page.
///
/// `container_width_px` is the rendered page width; `scale` the uniform zoom
/// currently applied to it. Both are captured when the session is created so
/// mid-gesture viewport changes do not skew the conversion.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct DragSession {
    container_width_px: f64,
    scale: f64,
    active: Option<(LayoutSlot, PointerPx)>,
}

#[allow(dead_code)]
impl DragSession {
    pub fn new(container_width_px: f64, scale: f64) -> Self {
        DragSession {
            container_width_px,
            scale,
            active: None,
        }
    }

    /// Records the slot being moved and the starting pointer position.
    /// A second `begin` while a drag is active replaces it.
    pub fn begin(&mut self, slot: LayoutSlot, pointer: PointerPx) {
        self.active = Some((slot, pointer));
    }

    /// The slot currently being dragged, if any.
    pub fn active_slot(&self) -> Option<LayoutSlot> {
        self.active.map(|(slot, _)| slot)
    }

    /// Applies the pixel delta since the last recorded pointer position to
    /// the active slot, then re-baselines. Moves without an active drag are
    /// ignored. Positions are not clamped to the page.
    pub fn drag_to(&mut self, layout: &mut LayoutConfig, pointer: PointerPx) {
        let Some((slot, last)) = self.active else {
            return;
        };

        let dx_mm = px_to_mm(pointer.x - last.x, self.container_width_px, self.scale);
        let dy_mm = px_to_mm(pointer.y - last.y, self.container_width_px, self.scale);

        let item = layout.get_mut(slot);
        item.x += dx_mm;
        item.y += dy_mm;

        self.active = Some((slot, pointer));
    }

    /// Clears the active slot. Persisting the layout is a separate, explicit
    /// action; ending a drag by itself changes nothing outside the session.
    pub fn end(&mut self) {
        self.active = None;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
