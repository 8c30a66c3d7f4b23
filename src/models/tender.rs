use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::CriterionCategory;
use super::lenient;

/// Structured tender as extracted from the buyer's document.
///
/// Field names follow the JSON the model is asked to emit. Fields the
/// model adds beyond these are kept in `extra` and survive the JSON dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderRecord {
    #[serde(rename = "tender_title", deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub issuing_organization: String,
    #[serde(rename = "tender_reference", deserialize_with = "lenient::text")]
    pub reference: String,
    #[serde(deserialize_with = "lenient::text")]
    pub submission_deadline: String,
    #[serde(deserialize_with = "lenient::text")]
    pub scope_of_work: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contract_duration: String,
    #[serde(rename = "evaluation_criteria", deserialize_with = "lenient::list")]
    pub criteria: Vec<CriterionRecord>,
    #[serde(deserialize_with = "lenient::strings")]
    pub mandatory_requirements: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub technical_specifications: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub commercial_requirements: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub compliance_requirements: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub deliverables: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TenderRecord {
    /// Decode a recovered model object. Never fails on shape mismatches.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// One weighted evaluation axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriterionRecord {
    #[serde(rename = "criterion", deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "weight_percentage", deserialize_with = "lenient::percentage")]
    pub weight: u32,
    /// Open set; known values are technical, commercial and compliance.
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
}

impl Default for CriterionRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            weight: 0,
            category: CriterionCategory::Technical.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_model_payload() {
        let tender = TenderRecord::from_value(json!({
            "tender_title": "Valve Supply",
            "issuing_organization": "Acme Petro",
            "tender_reference": "RFQ-1",
            "evaluation_criteria": [
                {"criterion": "Technical Capability", "weight_percentage": 60, "category": "technical"},
                {"criterion": "Price", "weight_percentage": "40"}
            ],
            "mandatory_requirements": ["ISO 9001 certification"],
        }));
        assert_eq!(tender.title, "Valve Supply");
        assert_eq!(tender.reference, "RFQ-1");
        assert_eq!(tender.criteria.len(), 2);
        assert_eq!(tender.criteria[1].weight, 40);
        assert_eq!(tender.criteria[1].category, "technical");
        assert_eq!(tender.mandatory_requirements, vec!["ISO 9001 certification"]);
        assert!(tender.deliverables.is_empty());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let tender = TenderRecord::from_value(json!({
            "tender_title": "X",
            "budget_ceiling": "USD 2M",
        }));
        assert_eq!(tender.extra["budget_ceiling"], "USD 2M");
        let out = serde_json::to_value(&tender).unwrap();
        assert_eq!(out["budget_ceiling"], "USD 2M");
        assert_eq!(out["tender_title"], "X");
    }

    #[test]
    fn non_object_payload_yields_empty_record() {
        let tender = TenderRecord::from_value(json!(["not", "an", "object"]));
        assert_eq!(tender, TenderRecord::default());
    }

    #[test]
    fn criteria_preserve_order() {
        let tender = TenderRecord::from_value(json!({
            "evaluation_criteria": [
                {"criterion": "B", "weight_percentage": 10},
                {"criterion": "A", "weight_percentage": 90}
            ]
        }));
        let names: Vec<_> = tender.criteria.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
