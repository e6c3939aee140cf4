use std::sync::Arc;

use sqlx::PgPool;

use crate::assembler::{ImageSource, PageMetrics};
use crate::config::Config;
use crate::layout::LayoutConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Baseline slot positions used when a draft has no saved layout.
    /// Injected here rather than read as a global so the assembler stays
    /// testable in isolation.
    pub default_layout: LayoutConfig,
    /// Typography and margin parameters for body pagination.
    pub page_metrics: PageMetrics,
    /// Image fetch/decode seam for export; swapped for a stub in tests.
    pub images: Arc<dyn ImageSource>,
}
