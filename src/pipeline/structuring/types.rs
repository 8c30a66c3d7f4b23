use std::sync::Arc;

use serde::Serialize;

use super::StructuringError;
use crate::models::{ChatRole, ChatTurn, CriterionRecord, TenderRecord};

/// One message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelMessage {
    pub role: ChatRole,
    pub text: String,
}

impl From<&ChatTurn> for ModelMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role,
            text: turn.text.clone(),
        }
    }
}

/// Provider-neutral completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub system: Option<String>,
    pub max_tokens: u32,
    pub messages: Vec<ModelMessage>,
}

impl ModelRequest {
    /// Single user message with an optional system instruction.
    pub fn single(model: &str, system: Option<String>, max_tokens: u32, text: &str) -> Self {
        Self {
            model: model.to_string(),
            system,
            max_tokens,
            messages: vec![ModelMessage {
                role: ChatRole::User,
                text: text.to_string(),
            }],
        }
    }
}

/// Remote model abstraction (allows mocking).
pub trait LlmClient {
    /// Send one request and return the generated text.
    fn complete(&self, request: &ModelRequest) -> Result<String, StructuringError>;
}

impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    fn complete(&self, request: &ModelRequest) -> Result<String, StructuringError> {
        (**self).complete(request)
    }
}

/// Builds a client for a resolved API key.
///
/// Called on a blocking thread: blocking HTTP clients must not be created
/// or dropped inside the async runtime.
pub trait LlmConnector: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Box<dyn LlmClient + Send + Sync>, StructuringError>;
}

/// What a structured extraction call is asked to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Tender,
    BidEvaluation(TenderContext),
}

/// Tender facts folded into the bid evaluation instruction.
///
/// Criterion weights are not sent; the model computes the
/// overall score on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenderContext {
    pub title: String,
    pub criteria: Vec<(String, String)>,
    pub mandatory_requirements: Vec<String>,
}

impl TenderContext {
    pub fn new(tender: &TenderRecord, criteria: &[CriterionRecord]) -> Self {
        Self {
            title: tender.title.clone(),
            criteria: criteria
                .iter()
                .map(|c| (c.name.clone(), c.category.clone()))
                .collect(),
            mandatory_requirements: tender.mandatory_requirements.clone(),
        }
    }
}
