//! Evaluation record store: everything one user session has produced.
//!
//! Plain owned data with no interior locking. Each session gets its own
//! instance; the HTTP layer wraps instances in a mutex only because its
//! runtime is multi-threaded.

use crate::models::{ChatTurn, CriterionRecord, SupplierEvaluation, TenderRecord};
use crate::pipeline::structuring::StructuringError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Criterion index {index} out of range ({len} criteria)")]
    CriterionOutOfRange { index: usize, len: usize },

    #[error("Criterion weight {0} exceeds 100")]
    WeightOutOfRange(u32),
}

pub const MAX_CRITERION_WEIGHT: u32 = 100;

#[derive(Debug, Default, Clone)]
pub struct EvaluationSession {
    tender: Option<TenderRecord>,
    criteria: Vec<CriterionRecord>,
    evaluations: Vec<SupplierEvaluation>,
    chat: Vec<ChatTurn>,
    trade_off: Option<String>,
    api_key: Option<String>,
    revision: u64,
}

impl EvaluationSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Tender & criteria ─────────────────────────────────────

    /// Replace the tender wholesale. The criteria list is reset to the
    /// tender's own criteria and any trade-off narrative is dropped.
    pub fn set_tender(&mut self, tender: TenderRecord) {
        self.criteria = tender.criteria.clone();
        self.tender = Some(tender);
        self.trade_off = None;
        self.revision += 1;
    }

    pub fn tender(&self) -> Option<&TenderRecord> {
        self.tender.as_ref()
    }

    pub fn set_criteria(&mut self, criteria: Vec<CriterionRecord>) {
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &[CriterionRecord] {
        &self.criteria
    }

    /// Rewrite one criterion's weight. The sum is not rebalanced.
    pub fn set_criterion_weight(
        &mut self,
        index: usize,
        weight: u32,
    ) -> Result<&CriterionRecord, SessionError> {
        if weight > MAX_CRITERION_WEIGHT {
            return Err(SessionError::WeightOutOfRange(weight));
        }
        let len = self.criteria.len();
        let criterion = self
            .criteria
            .get_mut(index)
            .ok_or(SessionError::CriterionOutOfRange { index, len })?;
        criterion.weight = weight;
        Ok(criterion)
    }

    // ── Evaluations ───────────────────────────────────────────

    /// Replace all evaluations; never merges with the previous batch.
    pub fn replace_evaluations(&mut self, evaluations: Vec<SupplierEvaluation>) {
        self.evaluations = evaluations;
        self.trade_off = None;
        self.revision += 1;
    }

    pub fn evaluations(&self) -> &[SupplierEvaluation] {
        &self.evaluations
    }

    pub fn set_trade_off(&mut self, narrative: String) {
        self.trade_off = Some(narrative);
    }

    /// Store a narrative computed from the data at `revision`. Returns
    /// false, storing nothing, if the tender or evaluations changed since.
    pub fn set_trade_off_at(&mut self, revision: u64, narrative: String) -> bool {
        if revision != self.revision {
            return false;
        }
        self.trade_off = Some(narrative);
        true
    }

    /// Bumped whenever the tender or the evaluations are replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn trade_off(&self) -> Option<&str> {
        self.trade_off.as_deref()
    }

    // ── Chat ──────────────────────────────────────────────────

    pub fn append_chat(&mut self, turn: ChatTurn) {
        self.chat.push(turn);
    }

    /// Record a completed question/answer pair.
    pub fn append_exchange(&mut self, question: &str, answer: &str) {
        self.chat.push(ChatTurn::user(question));
        self.chat.push(ChatTurn::assistant(answer));
    }

    pub fn chat(&self) -> &[ChatTurn] {
        &self.chat
    }

    pub fn clear_chat(&mut self) {
        self.chat.clear();
    }

    // ── Credentials ───────────────────────────────────────────

    /// Store a per-session key; blank input clears it.
    pub fn set_api_key(&mut self, key: Option<String>) {
        self.api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The session key wins over the process-wide one.
    pub fn resolve_api_key(&self, fallback: Option<&str>) -> Result<String, StructuringError> {
        self.api_key
            .as_deref()
            .or(fallback.filter(|k| !k.trim().is_empty()))
            .map(|k| k.trim().to_string())
            .ok_or(StructuringError::MissingCredential)
    }

    /// Clear tender, criteria, evaluations, chat and trade-off in one step.
    /// The session's API key is kept.
    pub fn reset(&mut self) {
        let api_key = self.api_key.take();
        *self = Self {
            api_key,
            revision: self.revision + 1,
            ..Self::default()
        };
    }
}
