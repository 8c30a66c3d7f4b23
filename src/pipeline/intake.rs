//! Document intake: uploaded files through text extraction and the model.
//!
//! Tender intake is all-or-nothing. Bid intake is per file: a file that
//! fails is reported and skipped while the rest of the batch proceeds.

use serde::Serialize;
use thiserror::Error;

use super::extraction::{extract_text, DocumentFormat, ExtractionError};
use super::structuring::{BidAnalyst, StructuringError, TenderContext};
use crate::config::MAX_BATCH_FILES;
use crate::models::{SupplierEvaluation, TenderRecord};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Too many bid files: {count} submitted, at most {max} per batch")]
    BatchTooLarge { count: usize, max: usize },

    #[error("No bid files submitted")]
    EmptyBatch,
}

/// Why a single document produced no record.
#[derive(Error, Debug)]
pub enum DocumentFailure {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Structuring(#[from] StructuringError),
}

/// One uploaded file as received at the boundary.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Extension declared by the file name.
    pub fn text(&self) -> Result<String, ExtractionError> {
        let format = DocumentFormat::from_file_name(&self.file_name)?;
        extract_text(&self.bytes, format.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub evaluations: Vec<SupplierEvaluation>,
    pub failures: Vec<FileFailure>,
}

/// Reject batches over the cap before any file is touched.
pub fn check_batch_size(count: usize) -> Result<(), IntakeError> {
    match count {
        0 => Err(IntakeError::EmptyBatch),
        n if n > MAX_BATCH_FILES => Err(IntakeError::BatchTooLarge {
            count: n,
            max: MAX_BATCH_FILES,
        }),
        _ => Ok(()),
    }
}

pub fn process_tender(
    analyst: &BidAnalyst,
    document: &UploadedDocument,
) -> Result<TenderRecord, DocumentFailure> {
    let text = document.text()?;
    tracing::info!(file = %document.file_name, chars = text.len(), "Tender text extracted");
    Ok(analyst.extract_tender(&text)?)
}

pub fn process_bid(
    analyst: &BidAnalyst,
    ctx: &TenderContext,
    document: &UploadedDocument,
) -> Result<SupplierEvaluation, DocumentFailure> {
    let text = document.text()?;
    tracing::info!(file = %document.file_name, chars = text.len(), "Bid text extracted");
    Ok(analyst.evaluate_bid(&text, ctx)?)
}

/// Evaluate every bid in upload order, one model call per file.
pub fn evaluate_batch(
    analyst: &BidAnalyst,
    ctx: &TenderContext,
    documents: &[UploadedDocument],
) -> Result<BatchOutcome, IntakeError> {
    check_batch_size(documents.len())?;

    let mut outcome = BatchOutcome::default();
    for document in documents {
        match process_bid(analyst, ctx, document) {
            Ok(evaluation) => outcome.evaluations.push(evaluation),
            Err(e) => {
                tracing::warn!(file = %document.file_name, error = %e, "Bid evaluation failed");
                outcome.failures.push(FileFailure {
                    file_name: document.file_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        evaluated = outcome.evaluations.len(),
        failed = outcome.failures.len(),
        "Bid batch complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::structuring::MockLlmClient;

    fn bid_reply(name: &str, score: u32) -> Result<String, String> {
        Ok(format!("{{\"supplier_name\": \"{name}\", \"overall_score\": {score}}}"))
    }

    fn txt(name: &str) -> UploadedDocument {
        UploadedDocument::new(format!("{name}.txt"), format!("Bid from {name}").into_bytes())
    }

    fn analyst(mock: &Arc<MockLlmClient>) -> BidAnalyst {
        BidAnalyst::new(Box::new(Arc::clone(mock)), "claude-test")
    }

    #[test]
    fn batch_size_limits() {
        assert_eq!(check_batch_size(0), Err(IntakeError::EmptyBatch));
        assert!(check_batch_size(1).is_ok());
        assert!(check_batch_size(MAX_BATCH_FILES).is_ok());
        assert_eq!(
            check_batch_size(11),
            Err(IntakeError::BatchTooLarge { count: 11, max: 10 })
        );
    }

    #[test]
    fn eleven_files_rejected_before_any_model_call() {
        let mock = Arc::new(MockLlmClient::new("{}"));
        let docs: Vec<_> = (0..11).map(|i| txt(&format!("bid{i}"))).collect();
        let err = evaluate_batch(&analyst(&mock), &TenderContext::default(), &docs).unwrap_err();
        assert!(matches!(err, IntakeError::BatchTooLarge { count: 11, .. }));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn all_successful_files_yield_one_evaluation_each() {
        let mock = Arc::new(MockLlmClient::scripted(vec![
            bid_reply("A", 70),
            bid_reply("B", 90),
            bid_reply("C", 80),
        ]));
        let docs = vec![txt("a"), txt("b"), txt("c")];
        let outcome = evaluate_batch(&analyst(&mock), &TenderContext::default(), &docs).unwrap();
        assert_eq!(outcome.evaluations.len(), 3);
        assert!(outcome.failures.is_empty());
        let names: Vec<_> = outcome.evaluations.iter().map(|e| e.supplier_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn failed_file_is_skipped_others_continue() {
        let mock = Arc::new(MockLlmClient::scripted(vec![
            bid_reply("A", 70),
            Ok("no json here".into()),
            Err("overloaded".into()),
            bid_reply("D", 60),
        ]));
        let docs = vec![
            txt("a"),
            txt("b"),
            txt("c"),
            UploadedDocument::new("d.xls", vec![1, 2, 3]),
            txt("d"),
        ];
        let outcome = evaluate_batch(&analyst(&mock), &TenderContext::default(), &docs).unwrap();
        let names: Vec<_> = outcome.evaluations.iter().map(|e| e.supplier_name.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
        let failed: Vec<_> = outcome.failures.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(failed, vec!["b.txt", "c.txt", "d.xls"]);
        // The unsupported file never reached the model.
        assert_eq!(mock.requests().len(), 4);
    }

    #[test]
    fn tender_processing_is_all_or_nothing() {
        let mock = Arc::new(MockLlmClient::new("garbage"));
        let doc = UploadedDocument::new("rfq.txt", b"RFQ".to_vec());
        assert!(matches!(
            process_tender(&analyst(&mock), &doc),
            Err(DocumentFailure::Structuring(StructuringError::MalformedResponse { .. }))
        ));
    }

    #[test]
    fn tender_from_docx_fallback_text() {
        let mock = Arc::new(MockLlmClient::new("{\"tender_title\": \"Valves\"}"));
        let doc = UploadedDocument::new("rfq.DOCX", b"raw tender words".to_vec());
        let tender = process_tender(&analyst(&mock), &doc).unwrap();
        assert_eq!(tender.title, "Valves");
        assert_eq!(mock.requests()[0].messages[0].text, "raw tender words");
    }
}
