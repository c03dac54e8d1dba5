//! Intent classification output.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::appliance::ApplianceType;
use super::identifier::{ModelNumber, PartNumber};

/// The fixed set of buckets a user message is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Browse or find parts ("I need an ice maker").
    Search,
    /// Facts about one specific part ("Tell me about PS11752778").
    PartDetails,
    /// Does a part fit a model.
    Compatibility,
    /// How to install a part.
    Installation,
    /// A described symptom to diagnose.
    Troubleshooting,
    /// Anything outside refrigerators and dishwashers.
    OffTopic,
}

impl IntentCategory {
    /// Every category, in classification-priority order.
    pub const ALL: [Self; 6] = [
        Self::Compatibility,
        Self::Installation,
        Self::Troubleshooting,
        Self::PartDetails,
        Self::Search,
        Self::OffTopic,
    ];

    /// Snake-case name, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::PartDetails => "part_details",
            Self::Compatibility => "compatibility",
            Self::Installation => "installation",
            Self::Troubleshooting => "troubleshooting",
            Self::OffTopic => "off_topic",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How sure the classifier is about its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    /// Ambiguous input. Language models that answer `medium` land here.
    #[serde(alias = "medium")]
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Low => "low",
        })
    }
}

/// Entities pulled out of the message (or resolved from history).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<PartNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_number: Option<ModelNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliance_type: Option<ApplianceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Search terms for product search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

/// A message's category, confidence and entities.
///
/// Produced once per incoming message and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub category: IntentCategory,
    pub confidence: Confidence,
    #[serde(default)]
    pub extracted: ExtractedEntities,
}

impl ClassifiedIntent {
    /// Create a classification result.
    #[must_use]
    pub const fn new(
        category: IntentCategory,
        confidence: Confidence,
        extracted: ExtractedEntities,
    ) -> Self {
        Self {
            category,
            confidence,
            extracted,
        }
    }

    /// An out-of-scope classification with no entities.
    #[must_use]
    pub fn off_topic() -> Self {
        Self::new(
            IntentCategory::OffTopic,
            Confidence::High,
            ExtractedEntities::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        for category in IntentCategory::ALL {
            let json = serde_json::to_string(&category).expect("serialize");
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result: Result<IntentCategory, _> = serde_json::from_str("\"returns\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_medium_confidence_reads_as_low() {
        let confidence: Confidence = serde_json::from_str("\"medium\"").expect("deserialize");
        assert_eq!(confidence, Confidence::Low);
    }

    #[test]
    fn test_classified_intent_deserializes_without_entities() {
        let intent: ClassifiedIntent =
            serde_json::from_str(r#"{"category":"off_topic","confidence":"high"}"#)
                .expect("deserialize");
        assert_eq!(intent, ClassifiedIntent::off_topic());
    }
}
