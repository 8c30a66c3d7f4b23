//! Document text extraction: uploaded bytes plus a declared extension
//! in, plain text out. No OCR and no encoding detection beyond UTF-8.

pub mod docx;
pub mod pdf;
pub mod text;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0:?} (expected pdf, docx or txt)")]
    UnsupportedFormat(String),

    #[error("Could not parse {format} document: {detail}")]
    Parse {
        format: &'static str,
        detail: String,
    },
}

/// Upload formats accepted at the document boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Case-insensitive; a leading dot is ignored.
    pub fn from_extension(ext: &str) -> Result<Self, ExtractionError> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(ExtractionError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Derive the declared format from an uploaded file name.
    pub fn from_file_name(name: &str) -> Result<Self, ExtractionError> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(name.to_string()))?;
        Self::from_extension(ext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

/// Extract plain text from an uploaded document.
///
/// DOCX never fails: an unreadable package degrades to the raw text
/// decode and the degradation is logged.
pub fn extract_text(bytes: &[u8], declared_extension: &str) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_extension(declared_extension)?;
    tracing::debug!(format = format.as_str(), bytes = bytes.len(), "Extracting document text");

    match format {
        DocumentFormat::Txt => Ok(text::decode_lossy(bytes)),
        DocumentFormat::Pdf => pdf::extract_pdf_text(bytes),
        DocumentFormat::Docx => match docx::extract_docx_text(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bytes = bytes.len(),
                    "DOCX parsing failed, falling back to raw text decode"
                );
                Ok(text::decode_lossy(bytes))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension(".Docx").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_extension("txt").unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = extract_text(b"data", "xlsx").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn format_from_file_name() {
        assert_eq!(
            DocumentFormat::from_file_name("bid.final.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert!(DocumentFormat::from_file_name("README").is_err());
    }

    #[test]
    fn txt_passes_through() {
        assert_eq!(extract_text(b"Tender text", "txt").unwrap(), "Tender text");
    }

    #[test]
    fn corrupt_docx_falls_back_to_raw_decode() {
        let text = extract_text(b"not really a docx", "docx").unwrap();
        assert_eq!(text, "not really a docx");
    }

    #[test]
    fn corrupt_pdf_is_an_error() {
        let err = extract_text(b"not a pdf", "pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { format: "pdf", .. }));
    }
}
