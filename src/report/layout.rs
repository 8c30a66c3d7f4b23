//! A4 page writer on top of printpdf: a moving cursor, word wrapping,
//! simple column tables and automatic page breaks.

use std::io::BufWriter;

use chrono::{DateTime, Utc};
use lopdf::{Object, StringFormat};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use sha2::{Digest, Sha256};

use super::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
pub const LEFT: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = 170.0;
const LAYER: &str = "Layer 1";

/// Approximate Helvetica character width as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Regular,
    Bold,
    Italic,
}

/// One table column: header text and width in millimetres.
pub struct Column<'a> {
    pub header: &'a str,
    pub width: f32,
}

pub struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    pub fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page1, layer1) =
            PdfDocument::new(ascii_safe(title), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let layer = doc.get_page(page1).get_layer(layer1);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            y: TOP,
            pages: 1,
        })
    }

    /// Start a new page when fewer than `height` millimetres remain.
    pub fn ensure(&mut self, height: f32) {
        if self.y - height < BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
            self.pages += 1;
        }
    }

    pub fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    /// Write at the cursor without moving it.
    pub fn text_at(&self, text: &str, size: f32, x: f32, style: Style) {
        let font = match style {
            Style::Regular => &self.regular,
            Style::Bold => &self.bold,
            Style::Italic => &self.italic,
        };
        self.layer
            .use_text(ascii_safe(text), size, Mm(LEFT + x), Mm(self.y), font);
    }

    /// One line, then advance.
    pub fn line(&mut self, text: &str, size: f32, style: Style) {
        let height = line_height(size);
        self.ensure(height);
        self.text_at(text, size, 0.0, style);
        self.y -= height;
    }

    /// Section heading with breathing room above it.
    pub fn heading(&mut self, text: &str) {
        self.ensure(16.0);
        self.y -= 4.0;
        self.line(text, 12.0, Style::Bold);
        self.y -= 1.5;
    }

    /// Word-wrapped block, indented by `indent` millimetres.
    pub fn paragraph(&mut self, text: &str, size: f32, indent: f32, style: Style) {
        let height = line_height(size);
        let max_chars = chars_for_width(CONTENT_WIDTH - indent, size);
        for source_line in text.lines() {
            for line in wrap_text(source_line, max_chars) {
                self.ensure(height);
                self.text_at(&line, size, indent, style);
                self.y -= height;
            }
        }
    }

    /// Header row in bold, then one line per row. Cells that do not fit
    /// their column are truncated. The header repeats after a page break.
    pub fn table(&mut self, columns: &[Column<'_>], rows: &[Vec<String>], size: f32) {
        let height = line_height(size) + 1.0;
        self.ensure(height * 2.0);
        self.table_row(columns, columns.iter().map(|c| c.header), size, Style::Bold);
        self.y -= height;

        for row in rows {
            if self.y - height < BOTTOM {
                self.ensure(height * 2.0);
                self.table_row(columns, columns.iter().map(|c| c.header), size, Style::Bold);
                self.y -= height;
            }
            self.table_row(columns, row.iter().map(String::as_str), size, Style::Regular);
            self.y -= height;
        }
    }

    fn table_row<'a>(
        &self,
        columns: &[Column<'_>],
        cells: impl Iterator<Item = &'a str>,
        size: f32,
        style: Style,
    ) {
        let mut x = 0.0;
        for (column, cell) in columns.iter().zip(cells) {
            let max_chars = chars_for_width(column.width - 1.5, size);
            self.text_at(&truncate(cell, max_chars), size, x, style);
            x += column.width;
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Serialize and stamp the document with identity and dates derived
    /// from the inputs, so identical inputs give identical bytes.
    pub fn finish(self, identity: &[u8], generated_at: DateTime<Utc>) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf)?;
        let raw = buf
            .into_inner()
            .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))?;
        stamp(&raw, identity, generated_at)
    }
}

/// Replace the per-save random identifiers and wall-clock dates with
/// values derived from the report inputs. XMP metadata is dropped since
/// it repeats both.
fn stamp(raw: &[u8], identity: &[u8], generated_at: DateTime<Utc>) -> Result<Vec<u8>, ReportError> {
    let mut doc = lopdf::Document::load_mem(raw)?;

    let digest = Sha256::digest(identity);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(digest[..16].to_vec(), StringFormat::Hexadecimal),
            Object::String(digest[16..].to_vec(), StringFormat::Hexadecimal),
        ]),
    );

    let pdf_date = generated_at.format("D:%Y%m%d%H%M%S+00'00'").to_string();
    if let Ok(info_id) = doc.trailer.get(b"Info").and_then(Object::as_reference) {
        if let Ok(Object::Dictionary(info)) = doc.get_object_mut(info_id) {
            info.set("CreationDate", Object::string_literal(pdf_date.clone()));
            info.set("ModDate", Object::string_literal(pdf_date));
        }
    }
    if let Ok(root_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root_id) {
            catalog.remove(b"Metadata");
        }
    }
    doc.prune_objects();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.45
}

fn chars_for_width(width_mm: f32, size: f32) -> usize {
    let per_char = size * PT_TO_MM * CHAR_WIDTH_FACTOR;
    ((width_mm / per_char).floor() as usize).max(4)
}

pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// The built-in fonts only cover ASCII reliably.
pub fn ascii_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if c.is_ascii() && !c.is_ascii_control() => c,
            '\t' => ' ',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2022}' | '\u{00B7}' => '-',
            '\u{00A0}' => ' ',
            _ => '?',
        })
        .collect()
}
