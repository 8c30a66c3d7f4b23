use std::panic::{catch_unwind, AssertUnwindSafe};

use super::ExtractionError;

/// Concatenate the text layer of every page, in page order.
/// Digital PDFs only; scanned pages yield empty text.
pub fn extract_pdf_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = extract_pages(pdf_bytes)?;
    tracing::debug!(pages = pages.len(), "PDF text extracted");
    Ok(pages.concat())
}

/// Per-page text. pdf-extract panics on some malformed streams; those
/// surface as parse errors like any other unreadable input.
pub fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    }));

    match outcome {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Parse {
            format: "pdf",
            detail: e.to_string(),
        }),
        Err(_) => Err(ExtractionError::Parse {
            format: "pdf",
            detail: "PDF parser aborted on malformed input".into(),
        }),
    }
}
