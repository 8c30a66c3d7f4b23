use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {field} value: {value}")]
pub struct UnknownVariant {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ChatRole {
    User => "user",
    Assistant => "assistant",
});

str_enum!(ComplianceStatus {
    Compliant => "compliant",
    NonCompliant => "non_compliant",
    Unclear => "unclear",
});

str_enum!(CriterionFlag {
    Met => "met",
    PartiallyMet => "partially_met",
    NotMet => "not_met",
    Unknown => "unknown",
});

str_enum!(RecommendationTier {
    Recommended => "recommended",
    Conditional => "conditional",
    NotRecommended => "not recommended",
});

str_enum!(CriterionCategory {
    Technical => "technical",
    Commercial => "commercial",
    Compliance => "compliance",
});

impl ComplianceStatus {
    /// Classify a free-text status emitted by the model.
    /// Anything other than the two definite values reads as unclear.
    pub fn classify(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "compliant" => Self::Compliant,
            "non_compliant" => Self::NonCompliant,
            _ => Self::Unclear,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Compliant => "Y",
            Self::NonCompliant => "N",
            Self::Unclear => "?",
        }
    }
}

impl CriterionFlag {
    pub fn classify(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "met" => Self::Met,
            "partially_met" | "partial" | "partially" => Self::PartiallyMet,
            "not_met" => Self::NotMet,
            _ => Self::Unknown,
        }
    }
}

impl RecommendationTier {
    pub const RECOMMENDED_FLOOR: f64 = 80.0;
    pub const CONDITIONAL_FLOOR: f64 = 70.0;

    /// Tier for an overall score; each floor is inclusive.
    pub fn for_score(score: f64) -> Self {
        if score >= Self::RECOMMENDED_FLOOR {
            Self::Recommended
        } else if score >= Self::CONDITIONAL_FLOOR {
            Self::Conditional
        } else {
            Self::NotRecommended
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recommended => "Recommended",
            Self::Conditional => "Conditional",
            Self::NotRecommended => "Not Recommended",
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn chat_role_round_trip() {
        for (variant, s) in [(ChatRole::User, "user"), (ChatRole::Assistant, "assistant")] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ChatRole::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn chat_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = ChatRole::from_str("system").unwrap_err();
        assert_eq!(err.field, "ChatRole");
        assert_eq!(err.value, "system");
    }

    #[test]
    fn compliance_classification() {
        assert_eq!(ComplianceStatus::classify("compliant"), ComplianceStatus::Compliant);
        assert_eq!(ComplianceStatus::classify(" Non-Compliant "), ComplianceStatus::NonCompliant);
        assert_eq!(ComplianceStatus::classify("partially"), ComplianceStatus::Unclear);
        assert_eq!(ComplianceStatus::classify(""), ComplianceStatus::Unclear);
    }

    #[test]
    fn criterion_flag_classification() {
        assert_eq!(CriterionFlag::classify("met"), CriterionFlag::Met);
        assert_eq!(CriterionFlag::classify("partially_met"), CriterionFlag::PartiallyMet);
        assert_eq!(CriterionFlag::classify("not met"), CriterionFlag::NotMet);
        assert_eq!(CriterionFlag::classify("n/a"), CriterionFlag::Unknown);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(RecommendationTier::for_score(80.0), RecommendationTier::Recommended);
        assert_eq!(RecommendationTier::for_score(79.999), RecommendationTier::Conditional);
        assert_eq!(RecommendationTier::for_score(70.0), RecommendationTier::Conditional);
        assert_eq!(RecommendationTier::for_score(69.999), RecommendationTier::NotRecommended);
        assert_eq!(RecommendationTier::for_score(100.0), RecommendationTier::Recommended);
        assert_eq!(RecommendationTier::for_score(0.0), RecommendationTier::NotRecommended);
    }

    #[test]
    fn tier_strings() {
        assert_eq!(RecommendationTier::NotRecommended.as_str(), "not recommended");
        assert_eq!(RecommendationTier::Conditional.label(), "Conditional");
    }
}
