//! Run the agent in-process against one message.

use std::path::{Path, PathBuf};

use parts_assist_agent::config::{AgentConfig, ClassifierKind};
use parts_assist_agent::orchestrator::Orchestrator;
use parts_assist_agent::state::build_orchestrator;
use parts_assist_core::ConversationTurn;
use tracing::info;

use super::print_json;

/// Command-line overrides on top of the environment configuration.
#[derive(Debug, Default)]
pub struct AgentOptions {
    pub history: Option<PathBuf>,
    pub classifier: Option<ClassifierKind>,
    pub catalog: Option<PathBuf>,
}

/// Answer `message` and print the [`AgentResponse`](parts_assist_core::AgentResponse).
///
/// # Errors
///
/// Returns an error if configuration or history cannot be loaded, or the
/// classifier backend is unavailable.
pub async fn ask(message: &str, options: &AgentOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (orchestrator, history) = prepare(options).await?;
    let response = orchestrator.handle(message, &history).await?;
    info!(response_type = response.kind(), "Message answered");
    print_json(&serde_json::to_value(&response)?)
}

/// Classify `message` and print the [`ClassifiedIntent`](parts_assist_core::ClassifiedIntent).
///
/// # Errors
///
/// Returns an error if configuration or history cannot be loaded, or
/// classification fails.
pub async fn classify(
    message: &str,
    options: &AgentOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let (orchestrator, history) = prepare(options).await?;
    let intent = orchestrator.classify(message, &history).await?;
    print_json(&serde_json::to_value(&intent)?)
}

async fn prepare(
    options: &AgentOptions,
) -> Result<(Orchestrator, Vec<ConversationTurn>), Box<dyn std::error::Error>> {
    let mut config = AgentConfig::from_env()?;
    if let Some(classifier) = options.classifier {
        config.agent.classifier = classifier;
    }
    if let Some(catalog) = &options.catalog {
        config.agent.catalog_path.clone_from(catalog);
    }

    let history = match &options.history {
        Some(path) => load_history(path).await?,
        None => Vec::new(),
    };

    Ok((build_orchestrator(&config)?, history))
}

async fn load_history(path: &Path) -> Result<Vec<ConversationTurn>, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read history {}: {e}", path.display()))?;
    let turns: Vec<ConversationTurn> = serde_json::from_str(&content)?;
    info!(turns = turns.len(), "Loaded conversation history");
    Ok(turns)
}
