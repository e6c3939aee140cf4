//! Pixel/millimetre conversion for the layout editor and preview.
//!
//! The letter page is always 210mm wide logically; on screen it is rendered
//! into a container of some pixel width, optionally shrunk further by a
//! uniform CSS-style zoom. Both conversions live here so the ratio is never
//! recomputed inline at call sites.

use crate::layout::slots::PAGE_WIDTH_MM;

/// Converts a screen-pixel distance to a page-relative mm distance.
///
/// `scale` is the uniform visual zoom applied to the container (1.0 = no
/// zoom); a gesture made on a shrunken page must be divided back up so it
/// maps to the same mm delta regardless of current zoom.
pub fn px_to_mm(px: f64, container_width_px: f64, scale: f64) -> f64 {
    (px / scale) * (PAGE_WIDTH_MM / container_width_px)
}

/// Exact inverse of [`px_to_mm`].
#[allow(dead_code)]
pub fn mm_to_px(mm: f64, container_width_px: f64, scale: f64) -> f64 {
    (mm / PAGE_WIDTH_MM) * container_width_px * scale
}

/// Preview zoom for narrow viewports: shrink to fit, never enlarge.
#[allow(dead_code)]
pub fn fit_scale(available_width_px: f64, reference_width_px: f64) -> f64 {
    (available_width_px / reference_width_px).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_px_to_mm_unscaled() {
        // A 794px container approximates A4 at 96 DPI; 794px spans 210mm.
        let mm = px_to_mm(794.0, 794.0, 1.0);
        assert!((mm - 210.0).abs() < EPS);
    }

    #[test]
    fn test_px_to_mm_corrects_for_zoom() {
        // At 50% zoom the same on-screen distance covers twice the mm.
        let full = px_to_mm(100.0, 794.0, 1.0);
        let zoomed = px_to_mm(100.0, 794.0, 0.5);
        assert!((zoomed - 2.0 * full).abs() < EPS);
    }

    #[test]
    fn test_mm_to_px_is_inverse() {
        let mm = 37.25;
        let px = mm_to_px(mm, 612.0, 0.8);
        assert!((px_to_mm(px, 612.0, 0.8) - mm).abs() < EPS);
    }

    #[test]
    fn test_conversion_is_linear() {
        // Many small deltas must sum to the same mm as one large delta.
        let w = 700.0;
        let s = 0.75;
        let total: f64 = (0..40).map(|_| px_to_mm(3.7, w, s)).sum();
        let single = px_to_mm(40.0 * 3.7, w, s);
        assert!((total - single).abs() < 1e-6);
    }

    #[test]
    fn test_fit_scale_never_enlarges() {
        assert_eq!(fit_scale(1200.0, 794.0), 1.0);
        let shrunk = fit_scale(397.0, 794.0);
        assert!((shrunk - 0.5).abs() < EPS);
    }
}
