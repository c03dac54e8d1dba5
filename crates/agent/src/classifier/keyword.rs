//! Deterministic keyword classifier.

use async_trait::async_trait;
use parts_assist_core::{
    ApplianceType, ClassifiedIntent, Confidence, ConversationTurn, ExtractedEntities,
    IntentCategory,
};
use tracing::{debug, instrument};

use super::entities::{extract_direct, extract_search_query, extract_symptom, resolve_from_history};
use super::signals::{
    ApplianceSignal, appliance_signal, asks_compatibility, asks_details, asks_installation,
    asks_search, describes_problem, mentions_out_of_scope, names_supported_appliance,
};
use super::{ClassificationError, IntentClassifier};

/// Classifies with signal sets and regex extraction. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Classify synchronously.
    #[must_use]
    pub fn classify_message(message: &str, history: &[ConversationTurn]) -> ClassifiedIntent {
        let text = message.trim();
        if text.is_empty() {
            return ClassifiedIntent::off_topic();
        }

        let signal = appliance_signal(text);
        let mut extracted = extract_direct(text);
        let names_identifier = extracted.part_number.is_some() || extracted.model_number.is_some();

        // Indirect words like "drain" or "rack" never pull a named
        // out-of-scope appliance back in.
        if mentions_out_of_scope(text) && !names_supported_appliance(text) && !names_identifier {
            debug!("Out-of-scope appliance with no supported appliance named");
            return ClassifiedIntent::off_topic();
        }

        extracted.appliance_type = signal.appliance();
        resolve_from_history(&mut extracted, text, history);
        if signal == ApplianceSignal::Conflicting {
            // Mixed signals in the message override whatever history suggested.
            extracted.appliance_type = extracted
                .model_number
                .as_ref()
                .and_then(ApplianceType::from_model_number);
        }

        let Some((category, fallback)) = pick_category(text, &extracted, names_identifier, signal)
        else {
            return ClassifiedIntent::off_topic();
        };

        match category {
            IntentCategory::Troubleshooting => extracted.symptom = extract_symptom(text),
            IntentCategory::Search => extracted.search_query = extract_search_query(text),
            _ => {}
        }

        let low = fallback
            || signal == ApplianceSignal::Conflicting
            || (category == IntentCategory::Troubleshooting && extracted.appliance_type.is_none());
        let confidence = if low { Confidence::Low } else { Confidence::High };

        ClassifiedIntent::new(category, confidence, extracted)
    }
}

/// The category for `text`, plus whether it was reached only by fallback.
fn pick_category(
    text: &str,
    extracted: &ExtractedEntities,
    names_identifier: bool,
    signal: ApplianceSignal,
) -> Option<(IntentCategory, bool)> {
    if asks_compatibility(text) {
        return Some((IntentCategory::Compatibility, false));
    }
    if asks_installation(text) {
        return Some((IntentCategory::Installation, false));
    }
    if describes_problem(text) {
        return Some((IntentCategory::Troubleshooting, false));
    }
    if extracted.part_number.is_some() && (names_identifier || asks_details(text)) {
        return Some((IntentCategory::PartDetails, false));
    }
    if asks_search(text) {
        return Some((IntentCategory::Search, false));
    }
    if signal.is_in_scope() || extracted.model_number.is_some() {
        return Some((IntentCategory::Search, true));
    }
    None
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    #[instrument(skip_all, fields(classifier = "keyword"))]
    async fn classify(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ClassifiedIntent, ClassificationError> {
        let intent = Self::classify_message(message, history);
        debug!(
            category = %intent.category,
            confidence = %intent.confidence,
            "Classified message"
        );
        Ok(intent)
    }
}
