use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{ComplianceStatus, CriterionFlag, RecommendationTier};
use super::lenient;

/// One supplier bid as scored by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierEvaluation {
    #[serde(deserialize_with = "lenient::text")]
    pub supplier_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub supplier_country: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bid_reference: String,
    #[serde(deserialize_with = "lenient::number")]
    pub overall_score: f64,
    #[serde(deserialize_with = "lenient::record")]
    pub category_scores: CategoryScores,
    #[serde(deserialize_with = "lenient::list")]
    pub criterion_scores: Vec<CriterionScore>,
    #[serde(deserialize_with = "lenient::list")]
    pub mandatory_requirements_status: Vec<RequirementStatus>,
    #[serde(deserialize_with = "lenient::record")]
    pub hse_compliance: ComplianceFinding,
    #[serde(deserialize_with = "lenient::record")]
    pub esg_compliance: ComplianceFinding,
    #[serde(deserialize_with = "lenient::strings")]
    pub iso_certifications: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub proposed_price: String,
    #[serde(deserialize_with = "lenient::text")]
    pub proposed_timeline: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub key_risks: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub recommendation: String,
    #[serde(deserialize_with = "lenient::number")]
    pub completeness_percentage: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SupplierEvaluation {
    /// Decode a recovered model object. Never fails on shape mismatches.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn tier(&self) -> RecommendationTier {
        RecommendationTier::for_score(self.overall_score)
    }

    /// Status for an exact requirement name, if the model reported one.
    pub fn requirement_status(&self, requirement: &str) -> Option<&RequirementStatus> {
        self.mandatory_requirements_status
            .iter()
            .find(|r| r.requirement == requirement)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryScores {
    #[serde(deserialize_with = "lenient::record")]
    pub technical: CategoryScore,
    #[serde(deserialize_with = "lenient::record")]
    pub commercial: CategoryScore,
    #[serde(deserialize_with = "lenient::record")]
    pub compliance: CategoryScore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryScore {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriterionScore {
    #[serde(deserialize_with = "lenient::text")]
    pub criterion: String,
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub evidence: String,
    /// Kept verbatim; classify with [`CriterionScore::flag_class`].
    #[serde(deserialize_with = "lenient::text")]
    pub flag: String,
}

impl CriterionScore {
    pub fn flag_class(&self) -> CriterionFlag {
        CriterionFlag::classify(&self.flag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementStatus {
    #[serde(deserialize_with = "lenient::text")]
    pub requirement: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub evidence: String,
}

impl RequirementStatus {
    pub fn class(&self) -> ComplianceStatus {
        ComplianceStatus::classify(&self.status)
    }
}

/// HSE or ESG finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceFinding {
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub details: String,
}
