//! Ranking and presentation views over the evaluation store.
//!
//! Pure functions: nothing here mutates a session or calls the model.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{ComplianceStatus, CriterionRecord, RecommendationTier, SupplierEvaluation};
use crate::pipeline::structuring::prompt::TradeOffEntry;

/// Suppliers summarised for the trade-off narrative.
pub const TRADE_OFF_TOP_N: usize = 3;
pub const NOT_AVAILABLE: &str = "N/A";

/// Sort by overall score, highest first. Ties keep input order.
pub fn rank(evaluations: &[SupplierEvaluation]) -> Vec<&SupplierEvaluation> {
    let mut ranked: Vec<&SupplierEvaluation> = evaluations.iter().collect();
    ranked.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    ranked
}

/// Missing text renders as "N/A".
pub fn display_or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

// ═══════════════════════════════════════════════════════════
// Compliance matrix
// ═══════════════════════════════════════════════════════════

/// Requirement × supplier grid. Rows alphabetical, columns in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceMatrix {
    pub suppliers: Vec<String>,
    pub rows: Vec<ComplianceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub requirement: String,
    pub statuses: Vec<ComplianceStatus>,
}

impl ComplianceMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Union of every requirement name any supplier reported. Names match by
/// exact string equality; a supplier with no entry for a row is unclear.
pub fn compliance_matrix(evaluations: &[SupplierEvaluation]) -> ComplianceMatrix {
    let ranked = rank(evaluations);

    let requirements: BTreeSet<&str> = evaluations
        .iter()
        .flat_map(|e| e.mandatory_requirements_status.iter())
        .map(|r| r.requirement.as_str())
        .filter(|name| !name.trim().is_empty())
        .collect();

    let rows = requirements
        .into_iter()
        .map(|requirement| ComplianceRow {
            requirement: requirement.to_string(),
            statuses: ranked
                .iter()
                .map(|e| {
                    e.requirement_status(requirement)
                        .map(|r| r.class())
                        .unwrap_or(ComplianceStatus::Unclear)
                })
                .collect(),
        })
        .collect();

    ComplianceMatrix {
        suppliers: ranked.iter().map(|e| e.supplier_name.clone()).collect(),
        rows,
    }
}

// ═══════════════════════════════════════════════════════════
// Criteria weights
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub total: u32,
    /// Reported only; weights are never rebalanced.
    pub sums_to_100: bool,
    pub categories: Vec<CategoryWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryWeight {
    pub category: String,
    pub total_weight: u32,
    pub count: usize,
}

/// Totals per category, in first-seen order.
pub fn weight_summary(criteria: &[CriterionRecord]) -> WeightSummary {
    let mut categories: Vec<CategoryWeight> = Vec::new();
    for c in criteria {
        match categories.iter_mut().find(|g| g.category == c.category) {
            Some(group) => {
                group.total_weight = group.total_weight.saturating_add(c.weight);
                group.count += 1;
            }
            None => categories.push(CategoryWeight {
                category: c.category.clone(),
                total_weight: c.weight,
                count: 1,
            }),
        }
    }
    let total = criteria.iter().fold(0u32, |acc, c| acc.saturating_add(c.weight));
    WeightSummary {
        total,
        sums_to_100: total == 100,
        categories,
    }
}

// ═══════════════════════════════════════════════════════════
// Dashboard
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub supplier_name: String,
    pub supplier_country: String,
    pub overall_score: f64,
    pub technical: f64,
    pub commercial: f64,
    pub compliance: f64,
    pub completeness_percentage: f64,
    pub tier: RecommendationTier,
    pub proposed_price: String,
    pub proposed_timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierCompliance {
    pub supplier_name: String,
    pub hse_status: String,
    pub hse_class: ComplianceStatus,
    pub hse_details: String,
    pub esg_status: String,
    pub esg_class: ComplianceStatus,
    pub esg_details: String,
    pub iso_certifications: Vec<String>,
    pub key_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRecommendation {
    pub supplier_name: String,
    pub overall_score: f64,
    pub tier: RecommendationTier,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub rankings: Vec<RankingRow>,
    pub compliance_matrix: ComplianceMatrix,
    pub supplier_compliance: Vec<SupplierCompliance>,
    pub top_recommendation: Option<TopRecommendation>,
    pub weights: WeightSummary,
}

pub fn ranking_rows(evaluations: &[SupplierEvaluation]) -> Vec<RankingRow> {
    rank(evaluations)
        .into_iter()
        .enumerate()
        .map(|(i, e)| RankingRow {
            rank: i + 1,
            supplier_name: e.supplier_name.clone(),
            supplier_country: e.supplier_country.clone(),
            overall_score: e.overall_score,
            technical: e.category_scores.technical.score,
            commercial: e.category_scores.commercial.score,
            compliance: e.category_scores.compliance.score,
            completeness_percentage: e.completeness_percentage,
            tier: e.tier(),
            proposed_price: e.proposed_price.clone(),
            proposed_timeline: e.proposed_timeline.clone(),
        })
        .collect()
}

pub fn top_recommendation(evaluations: &[SupplierEvaluation]) -> Option<TopRecommendation> {
    rank(evaluations).first().map(|e| TopRecommendation {
        supplier_name: e.supplier_name.clone(),
        overall_score: e.overall_score,
        tier: e.tier(),
        strengths: e.category_scores.technical.strengths.clone(),
        gaps: e.category_scores.technical.gaps.clone(),
        recommendation: e.recommendation.clone(),
    })
}

pub fn dashboard(evaluations: &[SupplierEvaluation], criteria: &[CriterionRecord]) -> Dashboard {
    let supplier_compliance = rank(evaluations)
        .into_iter()
        .map(|e| SupplierCompliance {
            supplier_name: e.supplier_name.clone(),
            hse_status: e.hse_compliance.status.clone(),
            hse_class: ComplianceStatus::classify(&e.hse_compliance.status),
            hse_details: e.hse_compliance.details.clone(),
            esg_status: e.esg_compliance.status.clone(),
            esg_class: ComplianceStatus::classify(&e.esg_compliance.status),
            esg_details: e.esg_compliance.details.clone(),
            iso_certifications: e.iso_certifications.clone(),
            key_risks: e.key_risks.clone(),
        })
        .collect();

    Dashboard {
        rankings: ranking_rows(evaluations),
        compliance_matrix: compliance_matrix(evaluations),
        supplier_compliance,
        top_recommendation: top_recommendation(evaluations),
        weights: weight_summary(criteria),
    }
}

/// Compact summary of the top suppliers for the trade-off call.
pub fn trade_off_summary(evaluations: &[SupplierEvaluation]) -> Vec<TradeOffEntry> {
    rank(evaluations)
        .into_iter()
        .take(TRADE_OFF_TOP_N)
        .map(TradeOffEntry::from)
        .collect()
}
