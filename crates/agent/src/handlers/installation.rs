//! Installation guides.

use parts_assist_core::{
    AgentResponse, InstallDifficulty, InstallationResponse, InstallationStep, PartNumber,
};
use tracing::{instrument, warn};

use crate::fetch::{DataFetchTool, RawInstallStep, RawInstallationFacts};

const POWER_WARNING: &str =
    "Disconnect power to the appliance before starting: unplug it or switch off its circuit breaker.";
const WATER_WARNING: &str =
    "Turn off the water supply to the appliance and keep a towel handy for residual water.";
const PROFESSIONAL_WARNING: &str =
    "This is a difficult repair. If you are not comfortable with it, we recommend hiring a qualified technician.";

/// Steps used when the source has none for the part.
const GENERIC_STEPS: &[&str] = &[
    "Unplug the appliance and, if it is connected to water, shut off the water supply.",
    "Remove the old part, noting how it is mounted and connected.",
    "Install the new part in the same position and reconnect it.",
    "Restore power (and water), then test that the appliance works correctly.",
];

fn safety_warnings(facts: &RawInstallationFacts, difficulty: InstallDifficulty) -> Vec<String> {
    let mut warnings = Vec::new();
    if facts.involves_electrical {
        warnings.push(POWER_WARNING.to_string());
    }
    if facts.involves_water {
        warnings.push(WATER_WARNING.to_string());
    }
    if difficulty == InstallDifficulty::Difficult {
        warnings.push(PROFESSIONAL_WARNING.to_string());
    }
    if warnings.is_empty() {
        // Every appliance repair starts with the power off.
        warnings.push(POWER_WARNING.to_string());
    }
    warnings
}

/// Number steps 1..=n in source order, dropping blank instructions.
fn number_steps(steps: Vec<RawInstallStep>) -> Vec<InstallationStep> {
    steps
        .into_iter()
        .filter(|s| !s.instruction.trim().is_empty())
        .zip(1..)
        .map(|(step, step_number)| InstallationStep {
            step_number,
            instruction: step.instruction.trim().to_string(),
            warning: step.warning.filter(|w| !w.trim().is_empty()),
        })
        .collect()
}

fn generic_steps() -> Vec<RawInstallStep> {
    GENERIC_STEPS
        .iter()
        .map(|s| RawInstallStep {
            instruction: (*s).to_string(),
            warning: None,
        })
        .collect()
}

fn unavailable(part_number: String, message: String) -> AgentResponse {
    AgentResponse::Installation(InstallationResponse {
        message,
        part_number,
        difficulty: InstallDifficulty::default(),
        estimated_time_minutes: 0,
        tools_required: Vec::new(),
        safety_warnings: vec![POWER_WARNING.to_string()],
        steps: Vec::new(),
        video_url: None,
        pdf_url: None,
    })
}

/// Build an installation guide for one part.
#[instrument(skip(tool), fields(handler = "installation"))]
pub async fn guide(tool: &dyn DataFetchTool, part_number: Option<&PartNumber>) -> AgentResponse {
    let Some(part_number) = part_number else {
        return unavailable(
            String::new(),
            "Which part are you installing? Please share the part number (it starts with PS)."
                .to_string(),
        );
    };

    let facts = match tool.get_installation(part_number).await {
        Ok(Some(facts)) => facts,
        Ok(None) => {
            return unavailable(
                part_number.to_string(),
                format!("I couldn't find installation instructions for part {part_number}."),
            );
        }
        Err(e) => {
            warn!(error = %e, "Installation lookup failed");
            return unavailable(
                part_number.to_string(),
                format!(
                    "I couldn't load installation instructions for part {part_number} right now. \
                     Please try again in a moment."
                ),
            );
        }
    };

    let difficulty = facts.difficulty.unwrap_or_default();
    let estimated_time_minutes = facts
        .estimated_time_minutes
        .filter(|m| *m > 0)
        .unwrap_or_else(|| difficulty.typical_minutes());
    let safety_warnings = safety_warnings(&facts, difficulty);

    let RawInstallationFacts {
        tools_required,
        steps,
        video_url,
        pdf_url,
        ..
    } = facts;

    let mut steps = number_steps(steps);
    if steps.is_empty() {
        steps = number_steps(generic_steps());
    }

    let difficulty_label = match difficulty {
        InstallDifficulty::Easy => "an easy",
        InstallDifficulty::Moderate => "a moderate",
        InstallDifficulty::Difficult => "a difficult",
    };
    let message = format!(
        "Installing {part_number} is {difficulty_label} job that takes about \
         {estimated_time_minutes} minutes. Read the safety warnings before you start."
    );

    AgentResponse::Installation(InstallationResponse {
        message,
        part_number: part_number.to_string(),
        difficulty,
        estimated_time_minutes,
        tools_required,
        safety_warnings,
        steps,
        video_url,
        pdf_url,
    })
}
