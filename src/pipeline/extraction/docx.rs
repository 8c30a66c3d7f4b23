use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("Not a DOCX package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("Unreadable document part: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document XML: {0}")]
    Xml(String),
}

/// Paragraph texts in document order, one per line.
///
/// Table cells are paragraphs too, so their text is included.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    let paragraphs = paragraphs_from_xml(&xml)?;
    Ok(paragraphs.join("\n"))
}

/// Text boxes nest whole paragraphs inside a run, so open paragraphs
/// form a stack. An inner paragraph is emitted when it closes, ahead of
/// the paragraph that contains it. `mc:Fallback` repeats the content of
/// its `mc:Choice` and is skipped.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_text_run = false;
    let mut fallback_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| DocxError::Xml(e.to_string()))?;
        if fallback_depth > 0 {
            match &event {
                Event::Start(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth += 1,
                Event::End(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:t" => in_text_run = true,
                b"mc:Fallback" => fallback_depth = 1,
                _ => {}
            },
            Event::Empty(e) => match (e.name().as_ref(), open.last_mut()) {
                (b"w:p", _) => paragraphs.push(String::new()),
                (b"w:tab", Some(current)) => current.push('\t'),
                (b"w:br" | b"w:cr", Some(current)) => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                let text = t.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if let Some(done) = open.pop() {
                        paragraphs.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
