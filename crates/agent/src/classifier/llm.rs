//! Intent classifier using Claude Haiku.
//!
//! The model answers with a JSON routing decision. Category, confidence and
//! appliance are deserialized into closed enums, so an answer outside the
//! known values is rejected rather than guessed at. The accepted decision is
//! then enhanced with the same regex extraction and history resolution the
//! keyword classifier uses.

use std::fmt::Write;

use async_trait::async_trait;
use parts_assist_core::{
    ApplianceType, ClassifiedIntent, Confidence, ConversationTurn, IntentCategory, ModelNumber,
    PartNumber, Role,
};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::entities::{extract_direct, extract_search_query, extract_symptom, resolve_from_history};
use super::signals::appliance_signal;
use super::{ClassificationError, IntentClassifier};
use crate::claude::{ClaudeClient, Message, extract_json_object};

const MAX_TOKENS: u32 = 400;

/// What the model is asked to return.
#[derive(Debug, Deserialize)]
struct RoutingDecision {
    category: IntentCategory,
    confidence: Confidence,
    #[serde(default)]
    entities: RoutedEntities,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RoutedEntities {
    #[serde(default)]
    part_numbers: Vec<String>,
    #[serde(default)]
    model_numbers: Vec<String>,
    #[serde(default)]
    appliance_type: Option<ApplianceType>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    symptom: Option<String>,
    #[serde(default)]
    search_query: Option<String>,
}

/// Intent classifier backed by a small Claude model.
#[derive(Clone)]
pub struct LlmClassifier {
    client: ClaudeClient,
}

impl LlmClassifier {
    /// Create a classifier that sends every message to `client`.
    #[must_use]
    pub const fn new(client: ClaudeClient) -> Self {
        Self { client }
    }
}

const fn describe(category: IntentCategory) -> &'static str {
    match category {
        IntentCategory::Search => {
            "the customer wants to find or browse parts (\"I need an ice maker\", \"Show me water filters\")"
        }
        IntentCategory::PartDetails => {
            "the customer asks about one specific part: price, stock, description (\"Tell me about PS11752778\", \"Is PS11752778 in stock?\")"
        }
        IntentCategory::Compatibility => {
            "the customer asks whether a part fits their model (\"Is PS11752778 compatible with WDT780SAEM1?\", \"Will this work with my fridge?\")"
        }
        IntentCategory::Installation => {
            "the customer asks how to install or replace a part (\"How do I install PS11752778?\", \"What tools do I need?\")"
        }
        IntentCategory::Troubleshooting => {
            "the customer describes a problem or symptom (\"My ice maker isn't working\", \"The dishwasher won't drain\")"
        }
        IntentCategory::OffTopic => {
            "anything not about refrigerator or dishwasher parts, including other appliances (ovens, washers, dryers, microwaves)"
        }
    }
}

/// Build the system prompt for intent classification.
fn build_system_prompt() -> String {
    let mut prompt = String::from(
        "You classify customer messages for an appliance parts store that only supports \
         REFRIGERATORS and DISHWASHERS.\n\nCategories:\n",
    );

    for category in IntentCategory::ALL {
        let _ = writeln!(prompt, "- {category}: {}", describe(category));
    }

    prompt.push_str(
        "\nEntities to extract when present:\n\
         - part_numbers: store part numbers, PS followed by digits (PS11752778)\n\
         - model_numbers: appliance model numbers (WDT780SAEM1, RF28R7351SR)\n\
         - appliance_type: \"refrigerator\" or \"dishwasher\", inferred from context \
         (ice maker, freezer, water filter mean refrigerator; spray arm, drain pump, dish rack mean dishwasher)\n\
         - brand: Whirlpool, GE, Samsung, LG, Frigidaire, Maytag, KitchenAid, Bosch and so on\n\
         - symptom: the problem described, for troubleshooting\n\
         - search_query: what they are looking for, for search\n\
         \nRules:\n\
         1. When the message says \"it\", \"this part\" or \"that model\", take the part or model number from the recent conversation.\n\
         2. Use high confidence when the intent is clear, low when it is ambiguous.\n\
         3. Reply with ONE JSON object and nothing else:\n\
         {\"category\": \"...\", \"confidence\": \"high|low\", \"entities\": {\"part_numbers\": [], \"model_numbers\": [], \
         \"appliance_type\": null, \"brand\": null, \"symptom\": null, \"search_query\": null}, \"reasoning\": \"...\"}",
    );

    prompt
}

/// The user turn: recent history first, then the message itself.
fn build_user_message(message: &str, history: &[ConversationTurn]) -> String {
    let mut content = String::new();
    if !history.is_empty() {
        content.push_str("Recent conversation:\n");
        for turn in history {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            let _ = writeln!(content, "{role}: {}", turn.content);
        }
        content.push('\n');
    }
    let _ = write!(content, "Classify this message:\n{message}");
    content
}

/// Parse the model's reply into a validated decision.
fn parse_decision(reply: &str) -> Result<RoutingDecision, ClassificationError> {
    let json = extract_json_object(reply).ok_or_else(|| {
        ClassificationError::Invalid("reply contained no JSON object".to_string())
    })?;
    serde_json::from_str(json).map_err(|e| ClassificationError::Invalid(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn an accepted decision into a [`ClassifiedIntent`].
fn into_intent(
    decision: RoutingDecision,
    message: &str,
    history: &[ConversationTurn],
) -> ClassifiedIntent {
    if decision.category == IntentCategory::OffTopic {
        return ClassifiedIntent::off_topic();
    }

    let RoutedEntities {
        part_numbers,
        model_numbers,
        appliance_type,
        brand,
        symptom,
        search_query,
    } = decision.entities;

    // Regex matches in the message win over model output.
    let mut extracted = extract_direct(message);
    if extracted.part_number.is_none() {
        extracted.part_number = part_numbers
            .iter()
            .filter_map(|p| PartNumber::parse(p).ok())
            .find(PartNumber::is_catalog_number);
    }
    if extracted.model_number.is_none() {
        extracted.model_number = model_numbers
            .iter()
            .find_map(|m| ModelNumber::parse(m).ok());
    }
    if extracted.brand.is_none() {
        extracted.brand = non_empty(brand);
    }
    extracted.appliance_type = appliance_type.or_else(|| appliance_signal(message).appliance());
    resolve_from_history(&mut extracted, message, history);

    match decision.category {
        IntentCategory::Troubleshooting => {
            extracted.symptom = non_empty(symptom).or_else(|| extract_symptom(message));
        }
        IntentCategory::Search => {
            extracted.search_query =
                non_empty(search_query).or_else(|| extract_search_query(message));
        }
        _ => {}
    }

    let confidence = if decision.category == IntentCategory::Troubleshooting
        && extracted.appliance_type.is_none()
    {
        Confidence::Low
    } else {
        decision.confidence
    };

    ClassifiedIntent::new(decision.category, confidence, extracted)
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    #[instrument(skip_all, fields(classifier = "llm", message_len = message.len()))]
    async fn classify(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ClassifiedIntent, ClassificationError> {
        if message.trim().is_empty() {
            return Ok(ClassifiedIntent::off_topic());
        }

        let response = self
            .client
            .chat(
                vec![Message::user(build_user_message(message, history))],
                Some(build_system_prompt()),
                None,
                MAX_TOKENS,
            )
            .await?;

        let reply = response.text();
        let decision = parse_decision(&reply).inspect_err(|e| {
            warn!(error = %e, "Rejected classifier reply");
            debug!(reply = %reply, "Classifier reply");
        })?;

        debug!(
            category = %decision.category,
            confidence = %decision.confidence,
            reasoning = decision.reasoning.as_deref().unwrap_or_default(),
            "Classified message"
        );

        Ok(into_intent(decision, message, history))
    }
}
