//! PDF assembly: turns bound slots plus paginated body lines into a
//! multi-page A4 document.
//!
//! The plan/write split keeps page composition pure and testable: the footer
//! repetition rule (footer image overlaid on every page, header in normal
//! flow on page 1 only) is asserted against `DocumentPlan` without parsing
//! PDF bytes. The asymmetry is deliberate: the header is a letterhead banner
//! shown once, the footer is repeating page furniture.

use std::collections::HashMap;
use std::io::BufWriter;

use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Line, Mm,
    PdfDocument, PdfLayerReference, Point, Px,
};

use crate::errors::AppError;
use crate::layout::{LayoutSlot, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

use super::bindings::{PlacedSlot, SlotContent, TextLine};
use super::images::LoadedImage;
use super::paginate::PageMetrics;

const BODY_FONT_SIZE_PT: f64 = 11.0;
const META_FONT_SIZE_PT: f64 = 11.0;
/// Baseline drop from a slot's top edge to the first text baseline.
const BASELINE_MM: f64 = 4.0;
/// Intrinsic width used for images whose slot has no fixed width (the seal).
const DEFAULT_IMAGE_WIDTH_MM: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedText {
    pub x_mm: f64,
    pub y_mm: f64,
    pub size_pt: f64,
    pub bold: bool,
    pub underline: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedImage {
    pub slot: LayoutSlot,
    pub x_mm: f64,
    /// Top edge of the image, mm from the page top.
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBox {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

#[derive(Debug, Default)]
pub struct PagePlan {
    pub texts: Vec<PlannedText>,
    pub images: Vec<PlannedImage>,
    pub boxes: Vec<PlannedBox>,
}

#[derive(Debug, Default)]
pub struct DocumentPlan {
    pub pages: Vec<PagePlan>,
}

/// Composes the full document: page 1 carries every visible slot, pages 2..N
/// carry only body continuation, and the footer banner is overlaid at the
/// bottom of every page at its natural aspect height against the full page
/// width. Images that failed to load are simply absent from `images` and are
/// skipped (the caller already logged the failure).
pub fn build_document_plan(
    slots: &[PlacedSlot],
    body_pages: &[Vec<String>],
    images: &HashMap<LayoutSlot, LoadedImage>,
    metrics: &PageMetrics,
) -> DocumentPlan {
    let page_count = body_pages.len().max(1);
    let mut pages: Vec<PagePlan> = (0..page_count).map(|_| PagePlan::default()).collect();

    for placed in slots {
        match placed.slot {
            LayoutSlot::Footer => continue, // overlaid on every page below
            LayoutSlot::Content => {
                for (i, lines) in body_pages.iter().enumerate() {
                    let top = if i == 0 { placed.y_mm } else { metrics.top_margin_mm };
                    plan_lines_plain(&mut pages[i], lines, placed.x_mm, top, metrics);
                }
            }
            _ => plan_slot_on_page(&mut pages[0], placed, images, metrics),
        }
    }

    if let Some(footer) = slots.iter().find(|p| p.slot == LayoutSlot::Footer) {
        if let SlotContent::Image { .. } = footer.content {
            if let Some(img) = images.get(&LayoutSlot::Footer) {
                let height_mm = img.height_for_width_mm(PAGE_WIDTH_MM);
                for page in &mut pages {
                    page.images.push(PlannedImage {
                        slot: LayoutSlot::Footer,
                        x_mm: 0.0,
                        y_mm: PAGE_HEIGHT_MM - height_mm,
                        width_mm: PAGE_WIDTH_MM,
                        height_mm,
                    });
                }
            }
        }
    }

    DocumentPlan { pages }
}

fn plan_slot_on_page(
    page: &mut PagePlan,
    placed: &PlacedSlot,
    images: &HashMap<LayoutSlot, LoadedImage>,
    metrics: &PageMetrics,
) {
    match &placed.content {
        SlotContent::Text { lines } => plan_lines(page, lines, placed, metrics),
        SlotContent::Placeholder { label } => {
            let width = placed.width_mm.unwrap_or(PAGE_WIDTH_MM);
            page.boxes.push(PlannedBox {
                x_mm: placed.x_mm,
                y_mm: placed.y_mm,
                width_mm: width,
                height_mm: 24.0,
            });
            page.texts.push(PlannedText {
                x_mm: placed.x_mm + width / 2.0 - label.chars().count() as f64,
                y_mm: placed.y_mm + 10.0,
                size_pt: 14.0,
                bold: true,
                underline: false,
                text: label.clone(),
            });
        }
        SlotContent::Image { .. } => {
            if let Some(img) = images.get(&placed.slot) {
                let width_mm = placed.width_mm.unwrap_or(DEFAULT_IMAGE_WIDTH_MM);
                page.images.push(PlannedImage {
                    slot: placed.slot,
                    x_mm: placed.x_mm,
                    y_mm: placed.y_mm,
                    width_mm,
                    height_mm: img.height_for_width_mm(width_mm),
                });
            }
        }
        // The content slot is handled by the caller via body_pages.
        SlotContent::Html { .. } => {}
    }
}

fn plan_lines(page: &mut PagePlan, lines: &[TextLine], placed: &PlacedSlot, metrics: &PageMetrics) {
    for (i, line) in lines.iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        page.texts.push(PlannedText {
            x_mm: placed.x_mm,
            y_mm: placed.y_mm + i as f64 * metrics.line_height_mm,
            size_pt: META_FONT_SIZE_PT,
            bold: line.bold,
            underline: line.underline,
            text: line.text.clone(),
        });
    }
}

fn plan_lines_plain(
    page: &mut PagePlan,
    lines: &[String],
    x_mm: f64,
    top_mm: f64,
    metrics: &PageMetrics,
) {
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        page.texts.push(PlannedText {
            x_mm,
            y_mm: top_mm + i as f64 * metrics.line_height_mm,
            size_pt: BODY_FONT_SIZE_PT,
            bold: false,
            underline: false,
            text: line.clone(),
        });
    }
}

/// Renders a plan to PDF bytes with `printpdf`. CPU-bound; callers run this
/// inside `tokio::task::spawn_blocking`.
pub fn write_pdf(
    plan: &DocumentPlan,
    images: &HashMap<LayoutSlot, LoadedImage>,
    title: &str,
) -> Result<Vec<u8>, AppError> {
    let (doc, page1, layer1) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Export(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Export(e.to_string()))?;

    for (i, page_plan) in plan.pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM as f32),
                Mm(PAGE_HEIGHT_MM as f32),
                "Layer 1",
            );
            doc.get_page(page).get_layer(layer)
        };

        for text in &page_plan.texts {
            let face = if text.bold { &font_bold } else { &font };
            let baseline_y = (PAGE_HEIGHT_MM - text.y_mm - BASELINE_MM) as f32;
            layer.use_text(
                text.text.clone(),
                text.size_pt as f32,
                Mm(text.x_mm as f32),
                Mm(baseline_y),
                face,
            );
            if text.underline {
                // Approximate text width from the average glyph advance.
                let width = text.text.chars().count() as f64 * text.size_pt * 0.18;
                layer.set_outline_thickness(0.3);
                draw_line(
                    &layer,
                    text.x_mm as f32,
                    baseline_y - 0.8,
                    (text.x_mm + width) as f32,
                    baseline_y - 0.8,
                );
            }
        }

        for planned_box in &page_plan.boxes {
            layer.set_outline_thickness(0.4);
            draw_rect(&layer, planned_box);
        }

        for planned in &page_plan.images {
            let Some(img) = images.get(&planned.slot) else {
                continue;
            };
            embed_image(&layer, img, planned);
        }
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| AppError::Export(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let points = vec![
        (Point::new(Mm(x1), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y2)), false),
    ];
    layer.add_line(Line {
        points,
        is_closed: false,
    });
}

fn draw_rect(layer: &PdfLayerReference, b: &PlannedBox) {
    let top = (PAGE_HEIGHT_MM - b.y_mm) as f32;
    let bottom = (PAGE_HEIGHT_MM - b.y_mm - b.height_mm) as f32;
    let left = b.x_mm as f32;
    let right = (b.x_mm + b.width_mm) as f32;
    let points = vec![
        (Point::new(Mm(left), Mm(top)), false),
        (Point::new(Mm(right), Mm(top)), false),
        (Point::new(Mm(right), Mm(bottom)), false),
        (Point::new(Mm(left), Mm(bottom)), false),
    ];
    layer.add_line(Line {
        points,
        is_closed: true,
    });
}

fn embed_image(layer: &PdfLayerReference, img: &LoadedImage, planned: &PlannedImage) {
    let image = Image::from(ImageXObject {
        width: Px(img.width_px as usize),
        height: Px(img.height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: img.rgb.clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI that maps the pixel width onto the planned physical width.
    let dpi = img.width_px as f64 * 25.4 / planned.width_mm;
    let translate_y = PAGE_HEIGHT_MM - planned.y_mm - planned.height_mm;

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(planned.x_mm as f32)),
            translate_y: Some(Mm(translate_y as f32)),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::bindings::{PlacedSlot, SlotContent};
    use crate::assembler::paginate::default_page_metrics;
    use crate::layout::default_layout;

    fn image_slot(slot: LayoutSlot, x: f64, y: f64, w: Option<f64>) -> PlacedSlot {
        PlacedSlot {
            slot,
            x_mm: x,
            y_mm: y,
            width_mm: w,
            hidden: false,
            content: SlotContent::Image {
                url: format!("http://localhost:3000/uploads/{slot:?}.png"),
            },
        }
    }

    fn banner(width_px: u32, height_px: u32) -> LoadedImage {
        LoadedImage {
            width_px,
            height_px,
            rgb: vec![0; (width_px * height_px * 3) as usize],
        }
    }

    fn three_page_body() -> Vec<Vec<String>> {
        vec![
            vec!["page one line".to_string()],
            vec!["page two line".to_string()],
            vec!["page three line".to_string()],
        ]
    }

    fn header_footer_slots() -> Vec<PlacedSlot> {
        let layout = default_layout();
        vec![
            image_slot(LayoutSlot::Header, 0.0, 0.0, layout.header.w),
            PlacedSlot {
                slot: LayoutSlot::Content,
                x_mm: layout.content.x,
                y_mm: layout.content.y,
                width_mm: layout.content.w,
                hidden: false,
                content: SlotContent::Html {
                    raw: String::new(),
                },
            },
            image_slot(LayoutSlot::Footer, 0.0, 280.0, layout.footer.w),
        ]
    }

    #[test]
    fn test_footer_on_every_page_header_only_first() {
        let mut images = HashMap::new();
        images.insert(LayoutSlot::Header, banner(1000, 250));
        images.insert(LayoutSlot::Footer, banner(1000, 100));

        let plan = build_document_plan(
            &header_footer_slots(),
            &three_page_body(),
            &images,
            &default_page_metrics(),
        );

        assert_eq!(plan.pages.len(), 3);
        for page in &plan.pages {
            assert!(
                page.images.iter().any(|i| i.slot == LayoutSlot::Footer),
                "footer must repeat on every page"
            );
        }
        let header_pages: Vec<usize> = plan
            .pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.images.iter().any(|i| i.slot == LayoutSlot::Header))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(header_pages, vec![0]);
    }

    #[test]
    fn test_footer_height_from_aspect_ratio_at_page_width() {
        let mut images = HashMap::new();
        images.insert(LayoutSlot::Footer, banner(800, 200));

        let plan = build_document_plan(
            &header_footer_slots(),
            &three_page_body(),
            &images,
            &default_page_metrics(),
        );

        let footer = plan.pages[1]
            .images
            .iter()
            .find(|i| i.slot == LayoutSlot::Footer)
            .unwrap();
        assert_eq!(footer.width_mm, PAGE_WIDTH_MM);
        assert!((footer.height_mm - 52.5).abs() < 1e-9);
        // Anchored to the page bottom.
        assert!((footer.y_mm - (PAGE_HEIGHT_MM - 52.5)).abs() < 1e-9);
        assert_eq!(footer.x_mm, 0.0);
    }

    #[test]
    fn test_failed_footer_fetch_degrades_silently() {
        // No footer image in the map: the overlay is skipped, export goes on.
        let images = HashMap::new();
        let plan = build_document_plan(
            &header_footer_slots(),
            &three_page_body(),
            &images,
            &default_page_metrics(),
        );
        assert_eq!(plan.pages.len(), 3);
        for page in &plan.pages {
            assert!(page.images.is_empty());
        }
    }

    #[test]
    fn test_body_continuation_starts_at_top_margin() {
        let metrics = default_page_metrics();
        let mut images = HashMap::new();
        images.insert(LayoutSlot::Footer, banner(1000, 100));

        let plan =
            build_document_plan(&header_footer_slots(), &three_page_body(), &images, &metrics);

        let first_body = &plan.pages[0].texts[0];
        assert_eq!(first_body.y_mm, 130.0); // content slot default
        let second_body = &plan.pages[1].texts[0];
        assert_eq!(second_body.y_mm, metrics.top_margin_mm);
    }

    #[test]
    fn test_single_empty_body_still_yields_one_page() {
        let plan = build_document_plan(
            &header_footer_slots(),
            &[],
            &HashMap::new(),
            &default_page_metrics(),
        );
        assert_eq!(plan.pages.len(), 1);
    }

    #[test]
    fn test_write_pdf_produces_pdf_bytes() {
        let mut images = HashMap::new();
        images.insert(LayoutSlot::Header, banner(100, 40));
        images.insert(LayoutSlot::Footer, banner(100, 20));

        let plan = build_document_plan(
            &header_footer_slots(),
            &three_page_body(),
            &images,
            &default_page_metrics(),
        );
        let bytes = write_pdf(&plan, &images, "Berth allocation").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
