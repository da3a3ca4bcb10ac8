//! PDF export: title then body on A4 pages, word-wrapped and paginated.
//!
//! With a TrueType font on disk (DejaVuSans by default) any Unicode text
//! renders. Without one, built-in Helvetica is used and characters outside
//! its WinAnsi encoding become `?`.

use std::fs::File;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::ExportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const TOP_MM: f32 = PAGE_HEIGHT_MM - 15.0;
const TITLE_GAP_MM: f32 = 5.0;
const LINE_SPACING: f32 = 1.5;
const PT_TO_MM: f32 = 0.3528;
// average glyph advance as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Font choice for a PDF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfFont {
    /// TrueType font with Unicode coverage.
    Unicode(PathBuf),
    /// Helvetica, Latin only.
    Builtin,
}

impl PdfFont {
    /// Use the font at `path` if it exists, else fall back to Helvetica.
    pub fn resolve(path: &Path) -> Self {
        if path.exists() {
            Self::Unicode(path.to_path_buf())
        } else {
            tracing::debug!(path = %path.display(), "unicode font missing, using Helvetica");
            Self::Builtin
        }
    }

    fn title_size(&self) -> f32 {
        match self {
            Self::Unicode(_) => 14.0,
            Self::Builtin => 16.0,
        }
    }
}

const BODY_SIZE: f32 = 12.0;

struct Fonts {
    title: IndirectFontRef,
    body: IndirectFontRef,
}

fn pdf_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

fn load_fonts(doc: &PdfDocumentReference, font: &PdfFont) -> Result<Fonts, ExportError> {
    match font {
        PdfFont::Unicode(path) => {
            let face = doc.add_external_font(File::open(path)?).map_err(pdf_err)?;
            Ok(Fonts {
                title: face.clone(),
                body: face,
            })
        }
        PdfFont::Builtin => Ok(Fonts {
            title: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_err)?,
            body: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        }),
    }
}

/// WinAnsi code points in 0x80..=0x9F that map outside Latin-1.
const WINANSI_EXTRAS: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

fn is_winansi(c: char) -> bool {
    c == ' '
        || c.is_ascii_graphic()
        || ('\u{A0}'..='\u{FF}').contains(&c)
        || WINANSI_EXTRAS.contains(&c)
}

/// Replace anything Helvetica cannot show with `?`.
fn latin_fallback(text: &str) -> String {
    text.chars()
        .map(|c| if is_winansi(c) { c } else { '?' })
        .collect()
}

/// Characters that fit on one line at `size_pt`.
fn chars_per_line(size_pt: f32) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    ((usable / (size_pt * PT_TO_MM * AVG_GLYPH_WIDTH)) as usize).max(1)
}

/// Greedy word wrap. Explicit newlines are kept; over-long words are hard-split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                let chunk: String = chunk.iter().collect();
                let chunk_len = chunk.chars().count();
                if line_len > 0 && line_len + 1 + chunk_len > width {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.push_str(&chunk);
                line_len += chunk_len;
            }
        }
        lines.push(line);
    }
    lines
}

/// Tracks the write position and starts new pages as lines run out.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn line(&mut self, text: &str, size_pt: f32, font: &IndirectFontRef) {
        let advance = size_pt * PT_TO_MM * LINE_SPACING;
        if self.y - advance < MARGIN_MM {
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}", self.pages + 1),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_MM;
            self.pages += 1;
        }
        if !text.is_empty() {
            self.layer
                .use_text(text, size_pt, Mm(MARGIN_MM), Mm(self.y), font);
        }
        self.y -= advance;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Render a note as PDF bytes.
pub fn render_pdf(title: &str, content: &str, font: &PdfFont) -> Result<Vec<u8>, ExportError> {
    let (title, content) = match font {
        PdfFont::Unicode(_) => (title.to_string(), content.to_string()),
        PdfFont::Builtin => (latin_fallback(title), latin_fallback(content)),
    };

    let (doc, page, layer) =
        PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Page 1");
    let fonts = load_fonts(&doc, font)?;
    let title_size = font.title_size();

    {
        let mut writer = PageWriter {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: TOP_MM,
            pages: 1,
        };
        for line in wrap_text(&title, chars_per_line(title_size)) {
            writer.line(&line, title_size, &fonts.title);
        }
        writer.gap(TITLE_GAP_MM);
        for line in wrap_text(&content, chars_per_line(BODY_SIZE)) {
            writer.line(&line, BODY_SIZE, &fonts.body);
        }
        tracing::debug!(pages = writer.pages, "pdf laid out");
    }

    doc.save_to_bytes().map_err(pdf_err)
}
