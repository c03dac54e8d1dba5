//! Keyword signal sets for scope, appliance and category detection.

use std::sync::LazyLock;

use parts_assist_core::ApplianceType;
use regex::Regex;

/// Build a case-insensitive, word-bounded alternation of `words`.
fn word_set(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("Invalid regex")
}

static REFRIGERATOR_NAMES: LazyLock<Regex> =
    LazyLock::new(|| word_set(&["refrigerator", "refrigerators", "fridge", "fridges"]));

static DISHWASHER_NAMES: LazyLock<Regex> =
    LazyLock::new(|| word_set(&["dishwasher", "dishwashers", "dish washer"]));

static REFRIGERATOR_SIGNALS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "freezer",
        "ice",
        "ice maker",
        "icemaker",
        "water filter",
        "water dispenser",
        "cooling",
        "cool",
        "cold",
        "crisper",
        "compressor",
        "condenser",
        "evaporator",
        "defrost",
        "door bin",
        "shelf bin",
        "produce drawer",
    ])
});

static DISHWASHER_SIGNALS: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "dish",
        "dishes",
        "drain",
        "draining",
        "drain pump",
        "spray arm",
        "rack",
        "racks",
        "dish rack",
        "detergent",
        "rinse aid",
        "soap dispenser",
        "wash cycle",
        "silverware basket",
    ])
});

static OUT_OF_SCOPE: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        "oven",
        "ovens",
        "stove",
        "stoves",
        "range",
        "cooktop",
        "microwave",
        "microwaves",
        "washer",
        "washers",
        "washing machine",
        "dryer",
        "dryers",
        "air conditioner",
        "furnace",
        "water heater",
        "garbage disposal",
        "vacuum",
    ])
});

static COMPATIBILITY_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:compatible|compatibility|fits?|fitting|work(?:s)? (?:with|on|in)|go(?:es)? with|right part for|match(?:es)? my)\b",
    )
    .expect("Invalid regex")
});

static INSTALLATION_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:install|installs|installing|installation|installed|replace|replacing|swap out|put in|instructions?|tools? (?:do i |would i |will i )?need|how (?:do|can|would) i (?:change|remove|attach|mount))\b",
    )
    .expect("Invalid regex")
});

static TROUBLESHOOTING_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:not working|isn'?t working|stopped working|won'?t|doesn'?t|does not|not (?:cooling|cold|draining|cleaning|making|dispensing|drying|starting|running|filling|spinning|turning)|leak|leaks|leaking|leaky|noise|noisy|loud|broken|broke|problem|issue|fault|error code|too warm|warm|frost(?:ed)? up|smells?|stuck|clogged|no ice|freezing up|troubleshoot(?:ing)?|diagnose)\b",
    )
    .expect("Invalid regex")
});

static DETAIL_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:tell me about|details?|price|pricing|cost|costs|how much|in stock|stock|availability|available|warranty|reviews?|rating|specs?|specifications?|what is|what's|info(?:rmation)?)\b",
    )
    .expect("Invalid regex")
});

static SEARCH_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:find|need|needs|looking for|look for|search|searching|show me|buy|order|where can i get|do you (?:have|sell|carry)|replacement|parts? for|want)\b",
    )
    .expect("Invalid regex")
});

/// What a message says about the appliance category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceSignal {
    /// One category is named outright ("fridge", "dishwasher").
    Named(ApplianceType),
    /// Only indirect signals, all pointing one way ("ice", "spray arm").
    Inferred(ApplianceType),
    /// Signals for both categories and nothing named to break the tie.
    Conflicting,
    /// No signal at all.
    Absent,
}

impl ApplianceSignal {
    /// The appliance, if the signal resolves to exactly one.
    #[must_use]
    pub const fn appliance(self) -> Option<ApplianceType> {
        match self {
            Self::Named(a) | Self::Inferred(a) => Some(a),
            Self::Conflicting | Self::Absent => None,
        }
    }

    /// Whether anything in the message points at a supported appliance.
    #[must_use]
    pub const fn is_in_scope(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Read the appliance signals in `text`.
#[must_use]
pub fn appliance_signal(text: &str) -> ApplianceSignal {
    let named_fridge = REFRIGERATOR_NAMES.is_match(text);
    let named_dish = DISHWASHER_NAMES.is_match(text);
    match (named_fridge, named_dish) {
        (true, false) => return ApplianceSignal::Named(ApplianceType::Refrigerator),
        (false, true) => return ApplianceSignal::Named(ApplianceType::Dishwasher),
        (true, true) => return ApplianceSignal::Conflicting,
        (false, false) => {}
    }

    match (
        REFRIGERATOR_SIGNALS.is_match(text),
        DISHWASHER_SIGNALS.is_match(text),
    ) {
        (true, false) => ApplianceSignal::Inferred(ApplianceType::Refrigerator),
        (false, true) => ApplianceSignal::Inferred(ApplianceType::Dishwasher),
        (true, true) => ApplianceSignal::Conflicting,
        (false, false) => ApplianceSignal::Absent,
    }
}

/// Whether `text` names a supported appliance outright.
#[must_use]
pub fn names_supported_appliance(text: &str) -> bool {
    REFRIGERATOR_NAMES.is_match(text) || DISHWASHER_NAMES.is_match(text)
}

/// Whether `text` names an appliance outside the supported scope.
#[must_use]
pub fn mentions_out_of_scope(text: &str) -> bool {
    OUT_OF_SCOPE.is_match(text)
}

pub(super) fn asks_compatibility(text: &str) -> bool {
    COMPATIBILITY_CUES.is_match(text)
}

pub(super) fn asks_installation(text: &str) -> bool {
    INSTALLATION_CUES.is_match(text)
}

pub(super) fn describes_problem(text: &str) -> bool {
    TROUBLESHOOTING_CUES.is_match(text)
}

pub(super) fn asks_details(text: &str) -> bool {
    DETAIL_CUES.is_match(text)
}

pub(super) fn asks_search(text: &str) -> bool {
    SEARCH_CUES.is_match(text)
}

/// Words that carry no meaning for a search query or symptom.
pub(super) const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "my", "our", "me", "i", "i'm", "im", "is", "are", "am", "for", "of", "to",
    "do", "you", "have", "please", "can", "could", "hi", "hello", "hey", "some", "any", "and",
    "it", "its", "it's", "this", "that", "with", "on", "in", "from", "need", "needs", "want",
    "find", "looking", "look", "show", "search", "searching", "buy", "order", "get", "where",
    "sell", "carry", "new", "replacement", "part", "parts", "help", "which", "what", "one",
];

/// Appliance nouns stripped from queries once the category is known.
pub(super) const APPLIANCE_WORDS: &[&str] = &[
    "refrigerator",
    "refrigerators",
    "fridge",
    "fridges",
    "dishwasher",
    "dishwashers",
];
