//! Structured extraction over a remote language model.
//!
//! Prompt building, the model client seam, tolerant JSON recovery of the
//! model's reply, and the operations that tie them together.

pub mod anthropic;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use anthropic::*;
pub use orchestrator::*;
pub use parser::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Model response is not recoverable as JSON: {detail} (response: {snippet})")]
    MalformedResponse { detail: String, snippet: String },

    #[error("Model service error: {0}")]
    RemoteService(String),

    #[error("No model API key configured; set ANTHROPIC_API_KEY or provide a key for this session")]
    MissingCredential,
}
