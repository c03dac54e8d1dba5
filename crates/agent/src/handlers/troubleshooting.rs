//! Symptom diagnosis.

use std::sync::LazyLock;

use parts_assist_core::{AgentResponse, ApplianceType, DiagnosisResponse, DiyDifficulty};
use regex::Regex;
use tracing::{instrument, warn};

use crate::fetch::{DataFetchTool, RankedCause, RawDiagnosisFacts};

/// Symptoms that point at gas, mains wiring or refrigerant.
static HAZARD_SYMPTOMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:gas|smell(?:s)? (?:of )?gas|spark(?:s|ing)?|burning smell|smell(?:s)? (?:of )?burning|shock(?:ed|s)?|breaker|smok(?:e|ing)|wiring|electrical|refrigerant|freon)\b",
    )
    .expect("Invalid regex")
});

/// Checks suggested when the source has none.
const DEFAULT_STEPS: &[&str] = &[
    "Check that the appliance has power and the circuit breaker has not tripped.",
    "Look for visible damage, loose connections or obstructions.",
    "Unplug the appliance for 5 minutes, then plug it back in to reset it.",
    "If the problem persists, consider replacing the parts recommended below.",
];

const CLARIFY_APPLIANCE: &str = "I'd be happy to help diagnose the issue. Is this problem with \
                                 your refrigerator or dishwasher?";

fn rank(mut causes: Vec<RankedCause>) -> Vec<RankedCause> {
    causes.sort_by(|a, b| b.likelihood.total_cmp(&a.likelihood));
    causes
}

fn difficulty(symptom: &str, facts: &RawDiagnosisFacts) -> DiyDifficulty {
    let hazardous_subsystem = facts
        .causes
        .iter()
        .filter_map(|c| c.subsystem)
        .any(|s| s.requires_professional());
    if hazardous_subsystem || HAZARD_SYMPTOMS.is_match(symptom) {
        return DiyDifficulty::CallProfessional;
    }
    facts.difficulty.unwrap_or_default()
}

fn default_steps() -> Vec<String> {
    DEFAULT_STEPS.iter().map(|s| (*s).to_string()).collect()
}

/// Diagnose `symptom` on an appliance.
///
/// Without an appliance the response asks which one, and without a symptom
/// it asks what is wrong. Neither case calls the tool.
#[instrument(skip(tool), fields(handler = "troubleshooting"))]
pub async fn diagnose(
    tool: &dyn DataFetchTool,
    appliance_type: Option<ApplianceType>,
    brand: Option<&str>,
    symptom: Option<&str>,
) -> AgentResponse {
    let symptom = symptom.map(str::trim).unwrap_or_default();

    let Some(appliance_type) = appliance_type else {
        return AgentResponse::Diagnosis(DiagnosisResponse {
            message: CLARIFY_APPLIANCE.to_string(),
            symptom: symptom.to_string(),
            appliance_type: None,
            likely_causes: Vec::new(),
            recommended_parts: Vec::new(),
            diy_difficulty: DiyDifficulty::default(),
            troubleshooting_steps: Vec::new(),
        });
    };

    if symptom.is_empty() {
        return AgentResponse::Diagnosis(DiagnosisResponse {
            message: format!("What's going wrong with your {appliance_type}?"),
            symptom: String::new(),
            appliance_type: Some(appliance_type),
            likely_causes: Vec::new(),
            recommended_parts: Vec::new(),
            diy_difficulty: DiyDifficulty::default(),
            troubleshooting_steps: Vec::new(),
        });
    }

    let facts = match tool.diagnose(appliance_type, brand, symptom).await {
        Ok(facts) => facts,
        Err(e) => {
            warn!(error = %e, "Diagnosis lookup failed");
            let diy_difficulty = difficulty(symptom, &RawDiagnosisFacts::default());
            return AgentResponse::Diagnosis(DiagnosisResponse {
                message: format!(
                    "I couldn't look up causes for \"{symptom}\" right now. \
                     These general checks often help in the meantime."
                ),
                symptom: symptom.to_string(),
                appliance_type: Some(appliance_type),
                likely_causes: Vec::new(),
                recommended_parts: Vec::new(),
                diy_difficulty,
                troubleshooting_steps: default_steps(),
            });
        }
    };

    let diy_difficulty = difficulty(symptom, &facts);
    let RawDiagnosisFacts {
        causes,
        recommended_parts,
        troubleshooting_steps,
        ..
    } = facts;

    let likely_causes: Vec<String> = rank(causes).into_iter().map(|c| c.description).collect();
    let troubleshooting_steps = if troubleshooting_steps.is_empty() {
        default_steps()
    } else {
        troubleshooting_steps
    };

    let mut message = likely_causes.first().map_or_else(
        || format!("Here are some checks for your {appliance_type}: \"{symptom}\"."),
        |top| format!("The most likely cause of \"{symptom}\" on your {appliance_type} is: {top}."),
    );
    if diy_difficulty == DiyDifficulty::CallProfessional {
        message.push_str(
            " This may involve gas, electrical or sealed-system work, so please contact a \
             qualified technician rather than attempting the repair yourself.",
        );
    }

    AgentResponse::Diagnosis(DiagnosisResponse {
        message,
        symptom: symptom.to_string(),
        appliance_type: Some(appliance_type),
        likely_causes,
        recommended_parts,
        diy_difficulty,
        troubleshooting_steps,
    })
}
