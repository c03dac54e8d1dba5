//! Regex entity extraction and history resolution.

use std::sync::LazyLock;

use parts_assist_core::{
    ApplianceType, ConversationTurn, ExtractedEntities, ModelNumber, PartNumber,
};
use regex::Regex;

use super::signals::{APPLIANCE_WORDS, FILLER_WORDS, appliance_signal};

static PART_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPS\d{6,10}\b").expect("Invalid regex"));

static MODEL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z]{2,4}\d{2,4}[A-Z0-9]{3,10}\b").expect("Invalid regex")
});

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:it|its|it's|this|that|these|those|same|the part|the model|my model|this one|that one)\b",
    )
    .expect("Invalid regex")
});

/// Brands we recognize, in their canonical spelling.
const BRANDS: &[&str] = &[
    "Whirlpool",
    "GE",
    "Samsung",
    "LG",
    "Frigidaire",
    "Kenmore",
    "Maytag",
    "KitchenAid",
    "Bosch",
    "Electrolux",
    "Amana",
    "Jenn-Air",
    "Hotpoint",
    "Haier",
    "Beko",
    "Thermador",
    "Sub-Zero",
];

static BRAND: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = BRANDS
        .iter()
        .map(|b| regex::escape(b))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("Invalid regex")
});

/// Words that introduce a request rather than describe a part or symptom.
const CUE_WORDS: &[&str] = &[
    "compatible", "compatibility", "fit", "fits", "install", "installing", "installation",
    "replace", "replacing", "instructions", "how", "tell", "about", "details", "price", "cost",
    "much", "stock", "available", "warranty", "reviews", "model", "number", "does", "will",
    "would", "should", "there",
];

/// Trailing words that leave a symptom dangling ("leaking from").
const TRAILING_WORDS: &[&str] = &["from", "in", "on", "at", "with", "when", "and", "but", "so"];

/// Part numbers in `text`, in order of appearance.
#[must_use]
pub fn extract_part_numbers(text: &str) -> Vec<PartNumber> {
    PART_NUMBER
        .find_iter(text)
        .filter_map(|m| PartNumber::parse(m.as_str()).ok())
        .collect()
}

/// Model numbers in `text`, in order of appearance.
///
/// Anything shaped like a part number is skipped.
#[must_use]
pub fn extract_model_numbers(text: &str) -> Vec<ModelNumber> {
    MODEL_NUMBER
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| !PART_NUMBER.is_match(candidate) && !has_part_prefix(candidate))
        .filter_map(|candidate| ModelNumber::parse(candidate).ok())
        .collect()
}

fn has_part_prefix(candidate: &str) -> bool {
    candidate
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("PS"))
        && candidate
            .get(2..)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

/// The first recognized brand in `text`, canonically spelled.
#[must_use]
pub fn extract_brand(text: &str) -> Option<String> {
    let found = BRAND.find(text)?.as_str();
    BRANDS
        .iter()
        .find(|b| b.eq_ignore_ascii_case(found))
        .map(|b| (*b).to_string())
}

/// Whether `text` refers back to something said earlier.
#[must_use]
pub fn mentions_reference(text: &str) -> bool {
    REFERENCE.is_match(text)
}

/// Fill entities the message left out from the newest turn that has them.
///
/// Part and model numbers carry over only when the message refers back
/// ("it", "this part"). The appliance carries over whenever the message
/// does not name one, since a conversation stays on one appliance.
pub fn resolve_from_history(
    extracted: &mut ExtractedEntities,
    message: &str,
    history: &[ConversationTurn],
) {
    let refers_back = mentions_reference(message);

    if extracted.appliance_type.is_none() {
        extracted.appliance_type = extracted
            .model_number
            .as_ref()
            .and_then(ApplianceType::from_model_number);
    }

    for turn in history.iter().rev() {
        if refers_back && extracted.part_number.is_none() {
            extracted.part_number = extract_part_numbers(&turn.content).pop();
        }
        if refers_back && extracted.model_number.is_none() {
            extracted.model_number = extract_model_numbers(&turn.content).pop();
        }
        if extracted.appliance_type.is_none() {
            extracted.appliance_type = appliance_signal(&turn.content).appliance();
        }
        if extracted.brand.is_none() {
            extracted.brand = extract_brand(&turn.content);
        }
    }

    if extracted.appliance_type.is_none() {
        extracted.appliance_type = extracted
            .model_number
            .as_ref()
            .and_then(ApplianceType::from_model_number);
    }
}

/// Words of `text` not found (case-insensitively) in any of `stop_lists`.
fn content_words<'a>(text: &'a str, stop_lists: &[&[&str]]) -> Vec<&'a str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-'))
        .filter(|w| !w.is_empty())
        .filter(|w| {
            let lower = w.to_lowercase();
            !stop_lists.iter().any(|list| list.contains(&lower.as_str()))
                && !BRANDS.iter().any(|b| b.eq_ignore_ascii_case(w))
        })
        .collect()
}

/// The symptom phrase in `text`, stripped of filler, brand and appliance nouns.
#[must_use]
pub fn extract_symptom(text: &str) -> Option<String> {
    let mut words = content_words(text, &[FILLER_WORDS, APPLIANCE_WORDS]);
    while words
        .last()
        .is_some_and(|w| TRAILING_WORDS.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }
    (!words.is_empty()).then(|| words.join(" ").to_lowercase())
}

/// Search terms in `text`, stripped of filler, request cues and appliance nouns.
#[must_use]
pub fn extract_search_query(text: &str) -> Option<String> {
    let words: Vec<&str> = content_words(text, &[FILLER_WORDS, CUE_WORDS, APPLIANCE_WORDS])
        .into_iter()
        .filter(|w| !PART_NUMBER.is_match(w))
        .collect();
    (!words.is_empty()).then(|| words.join(" ").to_lowercase())
}

/// Part, model and brand found directly in `text`.
#[must_use]
pub fn extract_direct(text: &str) -> ExtractedEntities {
    ExtractedEntities {
        part_number: extract_part_numbers(text).into_iter().next(),
        model_number: extract_model_numbers(text).into_iter().next(),
        brand: extract_brand(text),
        ..ExtractedEntities::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_part_numbers() {
        let parts = extract_part_numbers("Compare ps11752778 and PS3406971 please");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_str(), "PS11752778");
        assert_eq!(parts[1].as_str(), "PS3406971");
        assert!(extract_part_numbers("PS12 is too short").is_empty());
    }

    #[test]
    fn test_extract_model_numbers_skips_part_numbers() {
        let models = extract_model_numbers("Does PS11752778 fit my wdt780saem1?");
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].as_str(), "WDT780SAEM1");

        let models = extract_model_numbers("Samsung RF28R7351SR fridge");
        assert_eq!(models[0].as_str(), "RF28R7351SR");
    }

    #[test]
    fn test_extract_brand_canonical() {
        assert_eq!(extract_brand("my whirlpool fridge").as_deref(), Some("Whirlpool"));
        assert_eq!(extract_brand("an lg dishwasher").as_deref(), Some("LG"));
        assert_eq!(extract_brand("kitchenaid").as_deref(), Some("KitchenAid"));
        assert_eq!(extract_brand("my fridge"), None);
    }

    #[test]
    fn test_extract_symptom() {
        assert_eq!(
            extract_symptom("ice maker not working").as_deref(),
            Some("ice maker not working")
        );
        assert_eq!(
            extract_symptom("My Whirlpool fridge is leaking from").as_deref(),
            Some("leaking")
        );
        assert_eq!(
            extract_symptom("The dishwasher won't drain!").as_deref(),
            Some("won't drain")
        );
        assert_eq!(extract_symptom("my fridge"), None);
    }

    #[test]
    fn test_extract_search_query() {
        assert_eq!(
            extract_search_query("I need a new ice maker for my fridge").as_deref(),
            Some("ice maker")
        );
        assert_eq!(
            extract_search_query("Do you have door bins for a Whirlpool refrigerator?").as_deref(),
            Some("door bins")
        );
        assert_eq!(extract_search_query("I need a part"), None);
    }

    #[test]
    fn test_reference_resolution_newest_first() {
        let history = vec![
            ConversationTurn::user("Tell me about PS3406971"),
            ConversationTurn::assistant("PS3406971 is a lower spray arm."),
            ConversationTurn::user("What about PS11752778?"),
            ConversationTurn::assistant("PS11752778 is a refrigerator door shelf bin."),
        ];
        let mut extracted = ExtractedEntities::default();
        resolve_from_history(&mut extracted, "How do I install it?", &history);
        assert_eq!(
            extracted.part_number.map(PartNumber::into_inner).as_deref(),
            Some("PS11752778")
        );
        assert_eq!(extracted.appliance_type, Some(ApplianceType::Refrigerator));
    }

    #[test]
    fn test_no_reference_keeps_part_empty() {
        let history = vec![ConversationTurn::user("Tell me about PS3406971")];
        let mut extracted = ExtractedEntities::default();
        resolve_from_history(&mut extracted, "I need an ice maker", &history);
        assert!(extracted.part_number.is_none());
    }

    #[test]
    fn test_appliance_from_model_prefix() {
        let mut extracted = extract_direct("Does that fit WDT780SAEM1?");
        resolve_from_history(&mut extracted, "Does that fit WDT780SAEM1?", &[]);
        assert_eq!(extracted.appliance_type, Some(ApplianceType::Dishwasher));
    }
}
