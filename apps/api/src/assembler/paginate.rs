//! Body pagination: flattens the rich-text HTML to text blocks, wraps them
//! against the content slot width, and flows the lines across A4 pages.
//!
//! Line measurement uses an average-character-width approximation. Exact
//! glyph metrics are overkill here: the goal is a stable page count and cut
//! points, and the approximation errs by at most a line near page breaks.

use crate::layout::{LayoutItem, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

/// Typography and margin parameters for body flow. Injected through
/// `AppState` so tests can pin exact values.
#[derive(Debug, Clone)]
pub struct PageMetrics {
    pub line_height_mm: f64,
    /// Average glyph advance at body size; 12pt serif is close to 2.2mm.
    pub char_width_mm: f64,
    /// Where continuation pages resume the body.
    pub top_margin_mm: f64,
    /// Body must stop above this so the footer overlay zone stays clear.
    pub bottom_margin_mm: f64,
}

pub fn default_page_metrics() -> PageMetrics {
    PageMetrics {
        line_height_mm: 6.0,
        char_width_mm: 2.2,
        top_margin_mm: 20.0,
        bottom_margin_mm: 25.0,
    }
}

/// Flattens an HTML fragment into plain-text blocks.
///
/// Block boundaries come from paragraph-level closers and `<br>`; inline tags
/// contribute only their text. A handful of common entities are decoded.
/// This intentionally does not validate the HTML; malformed input degrades to
/// best-effort text.
pub fn flatten_html(html: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '<' {
            let mut tag = String::new();
            for t in chars.by_ref() {
                if t == '>' {
                    break;
                }
                tag.push(t);
            }
            let name = tag
                .trim_start_matches('/')
                .split_whitespace()
                .next()
                .unwrap_or("")
                .trim_end_matches('/')
                .to_ascii_lowercase();
            let is_closer = tag.starts_with('/');
            let breaks = matches!(
                name.as_str(),
                "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "blockquote"
            );
            if name == "br" || (is_closer && breaks) {
                push_block(&mut blocks, &mut current);
            }
        } else if c == '&' {
            let mut entity = String::new();
            let mut terminated = false;
            while let Some(&e) = chars.peek() {
                if e == ';' {
                    chars.next();
                    terminated = true;
                    break;
                }
                if entity.len() >= 8 || (!e.is_ascii_alphanumeric() && e != '#') {
                    break;
                }
                entity.push(e);
                chars.next();
            }
            match decode_entity(&entity) {
                Some(decoded) if terminated => current.push_str(decoded),
                _ => {
                    // Not a recognized entity: keep the literal text.
                    current.push('&');
                    current.push_str(&entity);
                    if terminated {
                        current.push(';');
                    }
                }
            }
        } else {
            current.push(c);
        }
    }
    push_block(&mut blocks, &mut current);
    blocks
}

fn push_block(blocks: &mut Vec<String>, current: &mut String) {
    let text = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        blocks.push(text);
    }
    current.clear();
}

fn decode_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "#39" | "apos" => Some("'"),
        "nbsp" => Some(" "),
        _ => None,
    }
}

/// Greedy word wrap against a width budget in characters. Words longer than
/// a full line are hard-split rather than overflowing.
pub fn wrap_block(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            // Hard split: flush the current line, then take a full-width chunk.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split_at].to_string());
            word = &word[split_at..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Flows the body HTML into per-page line lists.
///
/// Page 1 starts at the content slot's y position; continuation pages start
/// at the top margin. A blank separator line is kept between blocks. Always
/// returns at least one (possibly empty) page.
pub fn paginate_body(
    html: &str,
    content_item: &LayoutItem,
    metrics: &PageMetrics,
) -> Vec<Vec<String>> {
    let width_mm = content_item
        .w
        .unwrap_or(PAGE_WIDTH_MM - content_item.x - 20.0)
        .max(metrics.char_width_mm);
    let max_chars = (width_mm / metrics.char_width_mm).floor() as usize;

    let bottom_limit = PAGE_HEIGHT_MM - metrics.bottom_margin_mm;
    let first_capacity =
        lines_between(content_item.y.max(0.0), bottom_limit, metrics.line_height_mm);
    let cont_capacity = lines_between(metrics.top_margin_mm, bottom_limit, metrics.line_height_mm)
        .max(1);

    let mut all_lines: Vec<String> = Vec::new();
    for (i, block) in flatten_html(html).iter().enumerate() {
        if i > 0 {
            all_lines.push(String::new());
        }
        all_lines.extend(wrap_block(block, max_chars));
    }

    let mut pages: Vec<Vec<String>> = vec![Vec::new()];
    let mut capacity = first_capacity;
    for line in all_lines {
        if pages.last().map(|p| p.len()).unwrap_or(0) >= capacity {
            pages.push(Vec::new());
            capacity = cont_capacity;
        }
        if let Some(page) = pages.last_mut() {
            page.push(line);
        }
    }
    pages
}

fn lines_between(top_mm: f64, bottom_mm: f64, line_height_mm: f64) -> usize {
    if bottom_mm <= top_mm {
        return 0;
    }
    ((bottom_mm - top_mm) / line_height_mm).floor() as usize
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutItem;

    #[test]
    fn test_flatten_splits_on_paragraphs_and_breaks() {
        let html = "<p>First <b>paragraph</b>.</p><p>Second.<br>Third line.</p>";
        assert_eq!(
            flatten_html(html),
            vec!["First paragraph.", "Second.", "Third line."]
        );
    }

    #[test]
    fn test_flatten_decodes_common_entities() {
        let html = "<p>Fish &amp; chips &lt;daily&gt; &#39;fresh&#39;</p>";
        assert_eq!(flatten_html(html), vec!["Fish & chips <daily> 'fresh'"]);
    }

    #[test]
    fn test_flatten_plain_text_is_one_block() {
        assert_eq!(flatten_html("no markup at all"), vec!["no markup at all"]);
        assert!(flatten_html("").is_empty());
        assert!(flatten_html("<p></p><p>  </p>").is_empty());
    }

    #[test]
    fn test_flatten_keeps_literal_ampersands() {
        assert_eq!(flatten_html("<p>R&D budget</p>"), vec!["R&D budget"]);
        assert_eq!(flatten_html("<p>&copy; 2026</p>"), vec!["&copy; 2026"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_block("one two three four five six", 9);
        assert_eq!(lines, vec!["one two", "three", "four five", "six"]);
        for line in &lines {
            assert!(line.chars().count() <= 9);
        }
    }

    #[test]
    fn test_wrap_hard_splits_long_words() {
        let lines = wrap_block("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    fn content_item() -> LayoutItem {
        LayoutItem::with_width(20.0, 130.0, 170.0)
    }

    #[test]
    fn test_empty_body_is_a_single_page() {
        let pages = paginate_body("", &content_item(), &default_page_metrics());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn test_long_body_spans_multiple_pages() {
        let metrics = default_page_metrics();
        // First page fits (297 - 25 - 130) / 6 = 23 lines; continuation pages
        // fit (297 - 25 - 20) / 6 = 42.
        let para = "<p>word</p>"; // one line each, plus a separator between
        let html: String = para.repeat(40);
        let pages = paginate_body(&html, &content_item(), &metrics);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 23);
        assert_eq!(pages[1].len(), 42);
        let total: usize = pages.iter().map(|p| p.len()).sum();
        assert_eq!(total, 40 * 2 - 1);
    }

    #[test]
    fn test_content_dragged_low_still_paginates() {
        let metrics = default_page_metrics();
        // Content slot below the bottom limit: page 1 takes nothing, flow
        // continues on page 2. Off-page layouts are valid, never clamped.
        let item = LayoutItem::with_width(20.0, 290.0, 170.0);
        let pages = paginate_body("<p>hello world</p>", &item, &metrics);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].is_empty());
        assert_eq!(pages[1], vec!["hello world"]);
    }
}
