use serde::Serialize;

use super::types::TenderContext;
use crate::models::{CriterionRecord, SupplierEvaluation, TenderRecord};

/// System instruction for tender extraction.
pub const TENDER_SYSTEM_PROMPT: &str = r#"You extract procurement tenders (RFPs/RFQs) into JSON.

Read the tender document supplied by the user and respond with a single JSON object and nothing else: no prose, no markdown fences.

Use exactly this structure. Write "Not specified" for any text field the document does not state, and [] for empty lists.
{
  "tender_title": "string",
  "issuing_organization": "string",
  "tender_reference": "string",
  "submission_deadline": "string",
  "scope_of_work": "short summary",
  "evaluation_criteria": [
    {"criterion": "name", "weight_percentage": 0, "category": "technical | commercial | compliance"}
  ],
  "mandatory_requirements": ["string"],
  "technical_specifications": ["string"],
  "commercial_requirements": ["string"],
  "compliance_requirements": ["string"],
  "deliverables": ["string"],
  "contract_duration": "string"
}

weight_percentage is a whole number between 0 and 100."#;

const EVALUATION_SCHEMA: &str = r#"{
  "supplier_name": "string",
  "supplier_country": "string",
  "bid_reference": "string or na",
  "overall_score": 0,
  "category_scores": {
    "technical": {"score": 0, "summary": "string", "strengths": ["string"], "gaps": ["string"]},
    "commercial": {"score": 0, "summary": "string", "strengths": ["string"], "gaps": ["string"]},
    "compliance": {"score": 0, "summary": "string", "strengths": ["string"], "gaps": ["string"]}
  },
  "criterion_scores": [{"criterion": "string", "score": 0, "evidence": "string", "flag": "met | partially_met | not_met"}],
  "mandatory_requirements_status": [{"requirement": "string", "status": "compliant | non_compliant | unclear", "evidence": "string"}],
  "hse_compliance": {"status": "compliant | partial | non_compliant", "details": "string"},
  "esg_compliance": {"status": "compliant | partial | non_compliant", "details": "string"},
  "iso_certifications": ["string"],
  "proposed_price": "string or na",
  "proposed_timeline": "string or na",
  "key_risks": ["string"],
  "recommendation": "one or two sentences",
  "completeness_percentage": 0
}"#;

/// System instruction for evaluating one bid against the tender.
pub fn build_evaluation_system_prompt(ctx: &TenderContext) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(
        "You evaluate supplier bids against a procurement tender and respond with a single JSON object and nothing else.\n\n",
    );

    prompt.push_str("TENDER: ");
    prompt.push_str(non_empty_or(&ctx.title, "Not specified"));
    prompt.push_str("\n\n");

    if !ctx.criteria.is_empty() {
        prompt.push_str("Score the bid on each of these criteria (0-100), using these exact names:\n");
        for (name, category) in &ctx.criteria {
            prompt.push_str(&format!("- {name} ({category})\n"));
        }
        prompt.push('\n');
    }

    if !ctx.mandatory_requirements.is_empty() {
        prompt.push_str(
            "Report the status of each mandatory requirement, using these exact names:\n",
        );
        for req in &ctx.mandatory_requirements {
            prompt.push_str(&format!("- {req}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str("Use exactly this structure:\n");
    prompt.push_str(EVALUATION_SCHEMA);
    prompt.push_str(
        "\n\nRules:\n\
         - All scores are numbers from 0 to 100\n\
         - Keep text values short and plain; avoid quotation marks inside them\n\
         - Use [] for empty lists and \"na\" for values the bid does not state\n\
         - Return only the JSON object",
    );
    prompt
}

/// Compact per-supplier summary sent for the trade-off narrative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeOffEntry {
    pub name: String,
    pub score: f64,
    pub technical: f64,
    pub commercial: f64,
    pub compliance: f64,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub price: String,
}

impl From<&SupplierEvaluation> for TradeOffEntry {
    fn from(e: &SupplierEvaluation) -> Self {
        Self {
            name: e.supplier_name.clone(),
            score: e.overall_score,
            technical: e.category_scores.technical.score,
            commercial: e.category_scores.commercial.score,
            compliance: e.category_scores.compliance.score,
            strengths: e.category_scores.technical.strengths.clone(),
            gaps: e.category_scores.technical.gaps.clone(),
            price: e.proposed_price.clone(),
        }
    }
}

/// User message asking for a trade-off comparison of the leading bids.
pub fn build_trade_off_prompt(tender_title: &str, entries: &[TradeOffEntry]) -> String {
    let summary = serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".into());
    format!(
        "Tender: {}\n\n\
         Leading suppliers, best first:\n{summary}\n\n\
         Write a concise trade-off analysis for a procurement committee. For each supplier, \
         state what it prioritises, what the buyer gains by selecting it and what it gives up. \
         Base every claim on the figures above.",
        non_empty_or(tender_title, "Untitled tender"),
    )
}

/// System instruction for the evaluation chat: the whole store as context.
pub fn build_chat_system_prompt(
    tender: Option<&TenderRecord>,
    evaluations: &[SupplierEvaluation],
    criteria: &[CriterionRecord],
) -> String {
    let tender_json = tender
        .and_then(|t| serde_json::to_string_pretty(t).ok())
        .unwrap_or_else(|| "null".into());
    let evaluations_json = serde_json::to_string_pretty(evaluations).unwrap_or_else(|_| "[]".into());
    let criteria_json = serde_json::to_string_pretty(criteria).unwrap_or_else(|_| "[]".into());

    format!(
        "You are a bid evaluation assistant for a procurement team.\n\n\
         TENDER:\n{tender_json}\n\n\
         SUPPLIER EVALUATIONS:\n{evaluations_json}\n\n\
         EVALUATION CRITERIA AND WEIGHTS:\n{criteria_json}\n\n\
         Answer questions about the bids, scores, compliance, risks and recommendations.\n\
         - Cite the evidence recorded in the evaluations\n\
         - Use the actual scores when comparing suppliers\n\
         - Say so when a bid does not cover something\n\
         - State HSE, ESG and ISO compliance explicitly with evidence\n\
         - When asked about different criteria weights, explain how the ranking could shift\n\
         - Say when you are unsure instead of guessing"
    )
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TenderContext {
        TenderContext {
            title: "Control Valves RFQ".into(),
            criteria: vec![
                ("Technical Capability".into(), "technical".into()),
                ("Commercial Terms".into(), "commercial".into()),
            ],
            mandatory_requirements: vec!["ISO 9001 certification".into()],
        }
    }

    #[test]
    fn tender_prompt_lists_every_field() {
        for key in [
            "tender_title",
            "issuing_organization",
            "tender_reference",
            "submission_deadline",
            "scope_of_work",
            "evaluation_criteria",
            "weight_percentage",
            "mandatory_requirements",
            "technical_specifications",
            "contract_duration",
        ] {
            assert!(TENDER_SYSTEM_PROMPT.contains(key), "missing {key}");
        }
    }

    #[test]
    fn evaluation_prompt_folds_in_tender_context() {
        let prompt = build_evaluation_system_prompt(&context());
        assert!(prompt.contains("TENDER: Control Valves RFQ"));
        assert!(prompt.contains("- Technical Capability (technical)"));
        assert!(prompt.contains("- ISO 9001 certification"));
        assert!(prompt.contains("\"mandatory_requirements_status\""));
    }

    #[test]
    fn evaluation_prompt_omits_weights() {
        let prompt = build_evaluation_system_prompt(&context());
        assert!(!prompt.contains("weight"));
    }

    #[test]
    fn evaluation_prompt_without_tender() {
        let prompt = build_evaluation_system_prompt(&TenderContext::default());
        assert!(prompt.contains("TENDER: Not specified"));
        assert!(!prompt.contains("using these exact names"));
    }

    #[test]
    fn trade_off_prompt_embeds_summary() {
        let entries = vec![TradeOffEntry {
            name: "ValveTech".into(),
            score: 87.0,
            technical: 92.0,
            commercial: 75.0,
            compliance: 92.0,
            strengths: vec!["ISO 9001".into()],
            gaps: vec![],
            price: "EUR 2.45M".into(),
        }];
        let prompt = build_trade_off_prompt("Valves", &entries);
        assert!(prompt.starts_with("Tender: Valves"));
        assert!(prompt.contains("\"name\": \"ValveTech\""));
        assert!(prompt.contains("EUR 2.45M"));
    }

    #[test]
    fn chat_prompt_embeds_store() {
        let tender = TenderRecord {
            title: "Valves".into(),
            ..Default::default()
        };
        let evals = vec![SupplierEvaluation {
            supplier_name: "PetroFlow".into(),
            ..Default::default()
        }];
        let criteria = vec![CriterionRecord {
            name: "Price".into(),
            weight: 40,
            category: "commercial".into(),
        }];
        let prompt = build_chat_system_prompt(Some(&tender), &evals, &criteria);
        assert!(prompt.contains("\"tender_title\": \"Valves\""));
        assert!(prompt.contains("\"supplier_name\": \"PetroFlow\""));
        assert!(prompt.contains("\"weight_percentage\": 40"));
    }

    #[test]
    fn chat_prompt_without_tender() {
        let prompt = build_chat_system_prompt(None, &[], &[]);
        assert!(prompt.contains("TENDER:\nnull"));
    }
}
