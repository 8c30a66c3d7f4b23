use serde_json::Value;

use super::parser::recover_json;
use super::prompt::{
    build_chat_system_prompt, build_evaluation_system_prompt, build_trade_off_prompt,
    TradeOffEntry, TENDER_SYSTEM_PROMPT,
};
use super::types::{LlmClient, ModelMessage, ModelRequest, SchemaKind, TenderContext};
use super::StructuringError;
use crate::config::{NARRATIVE_MAX_TOKENS, STRUCTURED_MAX_TOKENS};
use crate::models::{ChatTurn, CriterionRecord, SupplierEvaluation, TenderRecord};

/// Runs every model-backed operation:
/// prompt → model → (for structured calls) JSON recovery → record.
///
/// One model call per operation. No retry and no caching: a failed
/// call surfaces immediately.
pub struct BidAnalyst {
    llm: Box<dyn LlmClient + Send + Sync>,
    model_name: String,
}

impl BidAnalyst {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, model_name: &str) -> Self {
        Self {
            llm,
            model_name: model_name.to_string(),
        }
    }

    /// Send document text with the schema instruction for `kind` and
    /// recover the JSON object from the reply.
    pub fn extract_structured(&self, text: &str, kind: &SchemaKind) -> Result<Value, StructuringError> {
        let system = match kind {
            SchemaKind::Tender => TENDER_SYSTEM_PROMPT.to_string(),
            SchemaKind::BidEvaluation(ctx) => build_evaluation_system_prompt(ctx),
        };
        let request = ModelRequest::single(&self.model_name, Some(system), STRUCTURED_MAX_TOKENS, text);
        let reply = self.llm.complete(&request)?;
        recover_json(&reply)
    }

    pub fn extract_tender(&self, text: &str) -> Result<TenderRecord, StructuringError> {
        let value = self.extract_structured(text, &SchemaKind::Tender)?;
        let tender = TenderRecord::from_value(value);
        tracing::info!(
            criteria = tender.criteria.len(),
            mandatory = tender.mandatory_requirements.len(),
            "Tender extracted"
        );
        Ok(tender)
    }

    pub fn evaluate_bid(&self, text: &str, ctx: &TenderContext) -> Result<SupplierEvaluation, StructuringError> {
        let value = self.extract_structured(text, &SchemaKind::BidEvaluation(ctx.clone()))?;
        let evaluation = SupplierEvaluation::from_value(value);
        tracing::info!(
            supplier = %evaluation.supplier_name,
            score = evaluation.overall_score,
            "Bid evaluated"
        );
        Ok(evaluation)
    }

    /// Free-text comparison of the leading suppliers, returned verbatim.
    pub fn trade_off_analysis(
        &self,
        tender_title: &str,
        leaders: &[TradeOffEntry],
    ) -> Result<String, StructuringError> {
        let prompt = build_trade_off_prompt(tender_title, leaders);
        let request = ModelRequest::single(&self.model_name, None, NARRATIVE_MAX_TOKENS, &prompt);
        self.llm.complete(&request)
    }

    /// Answer a question with the whole store as context and the prior
    /// turns replayed in order. The reply is returned verbatim.
    pub fn answer_question(
        &self,
        question: &str,
        tender: Option<&TenderRecord>,
        evaluations: &[SupplierEvaluation],
        criteria: &[CriterionRecord],
        history: &[ChatTurn],
    ) -> Result<String, StructuringError> {
        let mut messages: Vec<ModelMessage> = history.iter().map(ModelMessage::from).collect();
        messages.push(ModelMessage::from(&ChatTurn::user(question)));

        let request = ModelRequest {
            model: self.model_name.clone(),
            system: Some(build_chat_system_prompt(tender, evaluations, criteria)),
            max_tokens: NARRATIVE_MAX_TOKENS,
            messages,
        };
        self.llm.complete(&request)
    }
}
