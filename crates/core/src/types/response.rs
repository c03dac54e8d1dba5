//! The tagged response returned for every chat message.
//!
//! Front ends switch on the `type` field to pick a widget:
//!
//! | `type`         | Widget              |
//! |----------------|---------------------|
//! | `search`       | product grid        |
//! | `part_details` | detailed product    |
//! | `compatibility`| compatibility card  |
//! | `installation` | installation wizard |
//! | `diagnosis`    | diagnostic flow     |
//! | `off_topic`    | plain message       |

use serde::{Deserialize, Serialize};

use super::appliance::ApplianceType;
use super::part::{InstallDifficulty, PartDetail, PartSummary};

/// Response to a single chat message. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentResponse {
    Search(SearchResponse),
    PartDetails(PartDetailsResponse),
    Compatibility(CompatibilityResponse),
    Installation(InstallationResponse),
    Diagnosis(DiagnosisResponse),
    OffTopic(OffTopicResponse),
}

impl AgentResponse {
    /// The value of the `type` discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::PartDetails(_) => "part_details",
            Self::Compatibility(_) => "compatibility",
            Self::Installation(_) => "installation",
            Self::Diagnosis(_) => "diagnosis",
            Self::OffTopic(_) => "off_topic",
        }
    }

    /// The natural-language message shown alongside the widget.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Search(r) => &r.message,
            Self::PartDetails(r) => &r.message,
            Self::Compatibility(r) => &r.message,
            Self::Installation(r) => &r.message,
            Self::Diagnosis(r) => &r.message,
            Self::OffTopic(r) => &r.message,
        }
    }

    /// A plain off-topic message.
    #[must_use]
    pub fn off_topic(message: impl Into<String>) -> Self {
        Self::OffTopic(OffTopicResponse {
            message: message.into(),
        })
    }
}

/// Product search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub message: String,
    #[serde(default)]
    pub parts: Vec<PartSummary>,
    /// How many parts the data source matched before the result window.
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub appliance_type: Option<ApplianceType>,
}

/// Full information about one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetailsResponse {
    pub message: String,
    /// `null` when the part could not be found.
    #[serde(default)]
    pub part: Option<PartDetail>,
    #[serde(default)]
    pub compatible_models: Vec<String>,
    /// Other parts in the same category, never including `part` itself.
    #[serde(default)]
    pub related_parts: Vec<PartSummary>,
}

/// Compatibility confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityConfidence {
    /// Exact model match in the part's compatibility list.
    Confirmed,
    /// Matches a revision variant of a listed model.
    Likely,
    /// No match found.
    #[default]
    Unlikely,
}

/// Whether a part fits an appliance model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub message: String,
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub model_number: String,
    #[serde(default)]
    pub is_compatible: bool,
    #[serde(default)]
    pub confidence: CompatibilityConfidence,
    #[serde(default)]
    pub explanation: String,
    /// Parts that do fit the model, when the requested one does not.
    #[serde(default)]
    pub alternative_parts: Vec<PartSummary>,
}

/// One installation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationStep {
    /// 1-based and contiguous within a response.
    pub step_number: u32,
    pub instruction: String,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Step-by-step installation guidance.
///
/// `safety_warnings` is declared before `steps` so it is always serialized
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationResponse {
    pub message: String,
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub difficulty: InstallDifficulty,
    #[serde(default)]
    pub estimated_time_minutes: u32,
    #[serde(default)]
    pub tools_required: Vec<String>,
    #[serde(default)]
    pub safety_warnings: Vec<String>,
    #[serde(default)]
    pub steps: Vec<InstallationStep>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// How hard a repair is for a do-it-yourselfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiyDifficulty {
    Easy,
    #[default]
    Moderate,
    Difficult,
    /// Gas, electrical or sealed-system work.
    CallProfessional,
}

/// Troubleshooting diagnosis for a symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub message: String,
    #[serde(default)]
    pub symptom: String,
    #[serde(default)]
    pub appliance_type: Option<ApplianceType>,
    /// Most probable cause first.
    #[serde(default)]
    pub likely_causes: Vec<String>,
    #[serde(default)]
    pub recommended_parts: Vec<PartSummary>,
    #[serde(default)]
    pub diy_difficulty: DiyDifficulty,
    /// Checks to run before buying parts.
    #[serde(default)]
    pub troubleshooting_steps: Vec<String>,
}

/// Decline for messages outside the supported scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffTopicResponse {
    pub message: String,
}
