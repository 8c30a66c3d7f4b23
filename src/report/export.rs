//! Flat exports: the ranking table as CSV and the whole store as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ReportError;
use crate::models::{ChatTurn, CriterionRecord, SupplierEvaluation, TenderRecord};
use crate::ranking::{display_or_na, ranking_rows};
use crate::session::EvaluationSession;

const CSV_HEADER: [&str; 9] = [
    "Rank",
    "Supplier",
    "Country",
    "Overall Score",
    "Technical",
    "Commercial",
    "Compliance",
    "Price",
    "Timeline",
];

/// Ranking table, one row per supplier in rank order.
pub fn rankings_csv(evaluations: &[SupplierEvaluation]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for row in ranking_rows(evaluations) {
        writer.write_record([
            row.rank.to_string(),
            row.supplier_name,
            display_or_na(&row.supplier_country).to_string(),
            row.overall_score.to_string(),
            row.technical.to_string(),
            row.commercial.to_string(),
            row.compliance.to_string(),
            display_or_na(&row.proposed_price).to_string(),
            display_or_na(&row.proposed_timeline).to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Csv(e.to_string()))
}

#[derive(Serialize)]
struct StoreDump<'a> {
    tender: Option<&'a TenderRecord>,
    criteria: &'a [CriterionRecord],
    evaluations: &'a [SupplierEvaluation],
    chat_history: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Option::is_none")]
    trade_off: Option<&'a str>,
    generated_at: String,
}

/// Pretty-printed dump of everything the session holds. The API key is
/// never included.
pub fn store_json(session: &EvaluationSession, generated_at: DateTime<Utc>) -> Result<String, ReportError> {
    let dump = StoreDump {
        tender: session.tender(),
        criteria: session.criteria(),
        evaluations: session.evaluations(),
        chat_history: session.chat(),
        trade_off: session.trade_off(),
        generated_at: generated_at.to_rfc3339(),
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;
    use crate::samples::{sample_evaluations, sample_tender};

    #[test]
    fn csv_has_header_and_ranked_rows() {
        let csv = rankings_csv(&sample_evaluations()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Rank,Supplier,Country,Overall Score,Technical,Commercial,Compliance,Price,Timeline"
        );
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("1,ValveTech Industries,"));
        assert!(lines[5].starts_with("5,Shanghai Industrial Valves,"));
    }

    #[test]
    fn csv_fills_missing_text_and_quotes_commas() {
        let evals = vec![SupplierEvaluation {
            supplier_name: "Acme, Ltd".into(),
            overall_score: 72.5,
            ..Default::default()
        }];
        let csv = rankings_csv(&evals).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "1,\"Acme, Ltd\",N/A,72.5,0,0,0,N/A,N/A");
    }

    #[test]
    fn csv_of_empty_store_is_header_only() {
        assert_eq!(rankings_csv(&[]).unwrap().lines().count(), 1);
    }

    #[test]
    fn json_dump_carries_whole_store() {
        let mut session = EvaluationSession::new();
        session.set_api_key(Some("sk-secret".into()));
        session.set_tender(sample_tender());
        session.replace_evaluations(sample_evaluations());
        session.append_exchange("Who leads?", "ValveTech.");

        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let text = store_json(&session, at).unwrap();
        assert!(!text.contains("sk-secret"));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tender"]["tender_reference"], "RFQ-2026-BRG-001");
        assert_eq!(value["criteria"].as_array().unwrap().len(), 6);
        assert_eq!(value["evaluations"].as_array().unwrap().len(), 5);
        assert_eq!(value["chat_history"][1]["role"], "assistant");
        assert_eq!(value["chat_history"][1]["content"], "ValveTech.");
        assert_eq!(value["generated_at"], "2026-03-14T09:30:00+00:00");
        assert!(value.get("trade_off").is_none());
    }

    #[test]
    fn json_dump_includes_stored_trade_off() {
        let mut session = EvaluationSession::new();
        session.replace_evaluations(sample_evaluations());
        session.set_trade_off("ValveTech leads on quality.".into());
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let value: Value = serde_json::from_str(&store_json(&session, at).unwrap()).unwrap();
        assert_eq!(value["trade_off"], "ValveTech leads on quality.");
    }

    #[test]
    fn json_dump_of_empty_session() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let value: Value = serde_json::from_str(&store_json(&EvaluationSession::new(), at).unwrap()).unwrap();
        assert!(value["tender"].is_null());
        assert!(value["evaluations"].as_array().unwrap().is_empty());
    }
}
