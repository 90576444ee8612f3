//! PDF export of the report text.
//!
//! Coordinates below are measured from the top-left corner of an A4 page,
//! the way the report is laid out on screen; they are flipped to PDF's
//! bottom-left origin only when text is placed.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::ExportError;

pub const DEFAULT_FILE_NAME: &str = "incident-report.pdf";

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
pub const HEADING: &str = "Incident Report";
pub const HEADING_Y_MM: f32 = 20.0;
pub const BODY_Y_MM: f32 = 30.0;
pub const TEXT_WIDTH_MM: f32 = 170.0;
pub const FONT_SIZE_PT: f32 = 12.0;

const PT_TO_MM: f32 = 0.3528;
const LINE_HEIGHT_MM: f32 = FONT_SIZE_PT * 1.15 * PT_TO_MM;

/// Millimetres per glyph unit (1/1000 em) at the body font size.
const MM_PER_UNIT: f32 = FONT_SIZE_PT * PT_TO_MM / 1000.0;

/// Helvetica advance widths for `' '..='~'`, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Glyphs outside printable ASCII are measured as a digit.
const FALLBACK_WIDTH: u32 = 556;

fn glyph_width(c: char) -> u32 {
    match c {
        ' '..='~' => u32::from(HELVETICA_WIDTHS[c as usize - 32]),
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` set in Helvetica, in 1/1000 em.
pub fn text_width(text: &str) -> u32 {
    text.chars().map(glyph_width).sum()
}

/// Usable body width, in 1/1000 em.
pub fn body_width() -> u32 {
    (TEXT_WIDTH_MM / MM_PER_UNIT).floor() as u32
}

/// Longest prefix of `word` that fits `max_width`. Always takes at least
/// one character.
fn split_to_width(word: &str, max_width: u32) -> (String, String) {
    let mut width = 0;
    let mut cut = word.len();
    for (i, c) in word.char_indices() {
        let w = glyph_width(c);
        if i > 0 && width + w > max_width {
            cut = i;
            break;
        }
        width += w;
    }
    (word[..cut].to_string(), word[cut..].to_string())
}

/// Greedy word wrap against measured glyph widths. Existing line breaks
/// are kept and words wider than `max_width` are split.
pub fn wrap_text(text: &str, max_width: u32) -> Vec<String> {
    let space = glyph_width(' ');
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            let mut word_width = text_width(&word);
            while word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                let (head, rest) = split_to_width(&word, max_width);
                lines.push(head);
                word = rest;
                word_width = text_width(&word);
            }
            if word.is_empty() {
                continue;
            }

            if !current.is_empty() && current_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(&word);
            current_width += word_width;
        }
        lines.push(current);
    }
    lines
}

/// Splits wrapped lines into pages. The first page starts below the
/// heading; later pages start at the top margin.
pub fn paginate(lines: Vec<String>) -> Vec<Vec<String>> {
    let bottom = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = BODY_Y_MM;

    for line in lines {
        if y > bottom {
            pages.push(std::mem::take(&mut page));
            y = MARGIN_MM;
        }
        page.push(line);
        y += LINE_HEIGHT_MM;
    }
    pages.push(page);
    pages
}

/// Renders `text` under the report heading and returns the PDF bytes.
pub fn render_pdf(text: &str) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(HEADING, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let pages = paginate(wrap_text(text, body_width()));
    let page_count = pages.len();

    for (index, lines) in pages.into_iter().enumerate() {
        let (page, layer, mut y) = if index == 0 {
            (first_page, first_layer, BODY_Y_MM)
        } else {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}, Layer 1", index + 1),
            );
            (page, layer, MARGIN_MM)
        };
        let layer = doc.get_page(page).get_layer(layer);

        if index == 0 {
            layer.use_text(
                HEADING,
                FONT_SIZE_PT,
                Mm(MARGIN_MM),
                Mm(PAGE_HEIGHT_MM - HEADING_Y_MM),
                &font,
            );
        }
        for line in lines {
            if !line.is_empty() {
                layer.use_text(line, FONT_SIZE_PT, Mm(MARGIN_MM), Mm(PAGE_HEIGHT_MM - y), &font);
            }
            y += LINE_HEIGHT_MM;
        }
    }

    tracing::debug!(pages = page_count, "rendered report pdf");
    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}
