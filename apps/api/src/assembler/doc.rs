//! Word export: serializes the bound slots into a standalone HTML document
//! with a minimal print stylesheet and ships it as a Word-compatible `.doc`
//! stream.
//!
//! This path is single-pass: the converter sees one flat document, so the
//! per-page footer repetition of the PDF path cannot be reproduced. Handlers
//! attach [`LAYOUT_WARNING`] to the response so the client can tell the user.

use crate::layout::LayoutSlot;

use super::bindings::{PlacedSlot, SlotContent, TextLine};

/// Surfaced to the client on every DOC export.
pub const LAYOUT_WARNING: &str =
    "Custom layouts may not translate exactly to DOC output; positions follow document flow";

const STYLESHEET: &str = r#"
        body { font-family: 'Times New Roman', serif; font-size: 12pt; }
        h1 { font-size: 24pt; text-align: center; font-weight: bold; text-transform: uppercase; }
        p { margin-bottom: 10pt; }
        .header { text-align: center; margin-bottom: 20pt; border-bottom: 2px solid black; padding-bottom: 10pt; }
        .header img, .footer img { max-width: 100%; }
        .meta { margin-bottom: 16pt; }
        .recipient { margin-bottom: 16pt; }
        .subject { font-weight: bold; text-decoration: underline; margin-bottom: 16pt; }
        .signatory { text-align: right; margin-top: 40pt; }
        .seal { width: 100px; height: 100px; }
        .footer { margin-top: 40pt; }
"#;

/// Builds the complete HTML document for a DOC export from already-bound
/// slots (hidden slots were excluded during binding, so layout visibility
/// carries over even though positions collapse to document flow).
pub fn render_doc_html(slots: &[PlacedSlot], title: &str) -> String {
    let mut body = String::new();
    for placed in slots {
        render_slot(&mut body, placed);
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        STYLESHEET,
        body
    )
}

fn render_slot(out: &mut String, placed: &PlacedSlot) {
    match (&placed.slot, &placed.content) {
        (LayoutSlot::Header, SlotContent::Image { url }) => {
            out.push_str(&format!(
                "<div class=\"header\"><img src=\"{}\" alt=\"Letterhead\"></div>\n",
                escape(url)
            ));
        }
        (LayoutSlot::Header, SlotContent::Placeholder { label }) => {
            out.push_str(&format!(
                "<div class=\"header\"><h1>{}</h1></div>\n",
                escape(label)
            ));
        }
        (LayoutSlot::Ref, SlotContent::Text { lines })
        | (LayoutSlot::Date, SlotContent::Text { lines }) => {
            out.push_str("<p class=\"meta\">");
            push_lines(out, lines);
            out.push_str("</p>\n");
        }
        (LayoutSlot::Recipient, SlotContent::Text { lines }) => {
            out.push_str("<div class=\"recipient\">");
            push_lines(out, lines);
            out.push_str("</div>\n");
        }
        (LayoutSlot::Subject, SlotContent::Text { lines }) => {
            out.push_str("<p class=\"subject\">");
            for line in lines {
                out.push_str(&escape(&line.text));
            }
            out.push_str("</p>\n");
        }
        // The body is the user's own rich text, passed through verbatim.
        (LayoutSlot::Content, SlotContent::Html { raw }) => {
            out.push_str("<div class=\"content\">");
            out.push_str(raw);
            out.push_str("</div>\n");
        }
        (LayoutSlot::Signatory, SlotContent::Text { lines }) => {
            out.push_str("<div class=\"signatory\">");
            push_lines(out, lines);
            out.push_str("</div>\n");
        }
        (LayoutSlot::Seal, SlotContent::Image { url }) => {
            out.push_str(&format!(
                "<p class=\"signatory\"><img class=\"seal\" src=\"{}\" alt=\"Seal\"></p>\n",
                escape(url)
            ));
        }
        (LayoutSlot::Footer, SlotContent::Image { url }) => {
            out.push_str(&format!(
                "<div class=\"footer\"><img src=\"{}\" alt=\"Footer\"></div>\n",
                escape(url)
            ));
        }
        _ => {}
    }
}

fn push_lines(out: &mut String, lines: &[TextLine]) {
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        if line.bold {
            out.push_str("<b>");
            out.push_str(&escape(&line.text));
            out.push_str("</b>");
        } else {
            out.push_str(&escape(&line.text));
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
