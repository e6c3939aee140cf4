// Layout model: named slot positions on an A4 page, px/mm conversion, and the
// drag state machine used by the customization editor.

pub mod drag;
pub mod geometry;
pub mod slots;

// Re-export the public API consumed by other modules (assembler, handlers).
pub use slots::{
    default_layout, LayoutConfig, LayoutItem, LayoutSlot, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
