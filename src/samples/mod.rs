//! Bundled demonstration data: one tender and five scored bids.
//!
//! Lets the dashboard, reports and chat run without uploading documents.

use crate::models::{SupplierEvaluation, TenderRecord};

const SAMPLE_TENDER_JSON: &str = include_str!("tender.json");
const SAMPLE_BIDS_JSON: &str = include_str!("bids.json");

pub fn sample_tender() -> TenderRecord {
    serde_json::from_str(SAMPLE_TENDER_JSON).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Bundled sample tender is invalid");
        TenderRecord::default()
    })
}

pub fn sample_evaluations() -> Vec<SupplierEvaluation> {
    serde_json::from_str(SAMPLE_BIDS_JSON).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Bundled sample bids are invalid");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{rank, weight_summary};

    #[test]
    fn sample_tender_decodes() {
        let tender = sample_tender();
        assert_eq!(tender.reference, "RFQ-2026-BRG-001");
        assert_eq!(tender.criteria.len(), 6);
        assert_eq!(tender.mandatory_requirements.len(), 5);
        assert!(weight_summary(&tender.criteria).sums_to_100);
    }

    #[test]
    fn sample_bids_decode() {
        let evals = sample_evaluations();
        assert_eq!(evals.len(), 5);
        assert!(evals.iter().all(|e| !e.supplier_name.is_empty()));
        assert!(evals.iter().all(|e| e.mandatory_requirements_status.len() == 5));
    }

    #[test]
    fn sample_ranking_leader() {
        let evals = sample_evaluations();
        let ranked = rank(&evals);
        assert_eq!(ranked[0].supplier_name, "ValveTech Industries");
        assert_eq!(ranked[4].supplier_name, "Shanghai Industrial Valves");
    }
}
