//! Report rendering: PDF summaries, the CSV ranking table and the JSON
//! store dump.
//!
//! Every renderer is a pure function of its inputs plus an explicit
//! generation timestamp, so the same inputs always produce the same bytes.

pub mod export;
mod layout;
pub mod pdf;

pub use export::{rankings_csv, store_json};
pub use pdf::{generate_comparative_report, generate_executive_summary, generate_supplier_report};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("CSV rendering failed: {0}")]
    Csv(String),

    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<printpdf::Error> for ReportError {
    fn from(e: printpdf::Error) -> Self {
        Self::Pdf(e.to_string())
    }
}

impl From<lopdf::Error> for ReportError {
    fn from(e: lopdf::Error) -> Self {
        Self::Pdf(e.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        Self::Pdf(e.to_string())
    }
}
