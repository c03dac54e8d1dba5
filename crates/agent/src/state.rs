//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::claude::{ClaudeClient, ClaudeError};
use crate::classifier::{IntentClassifier, KeywordClassifier, LlmClassifier};
use crate::config::{AgentConfig, ClaudeConfig, ClassifierKind, ConfigError, FetchBackend};
use crate::fetch::{CatalogError, CatalogFetchTool, ClaudeFetchTool, DataFetchTool};
use crate::orchestrator::Orchestrator;

/// Error wiring the classifier and data-fetch backend.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("claude client error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything inside is read-only.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AgentConfig,
    orchestrator: Orchestrator,
}

impl AppState {
    /// Create state around an already-built orchestrator.
    #[must_use]
    pub fn new(config: AgentConfig, orchestrator: Orchestrator) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
            }),
        }
    }

    /// Build the classifier and data-fetch backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or a Claude client
    /// cannot be created.
    pub fn from_config(config: AgentConfig) -> Result<Self, StateError> {
        let orchestrator = build_orchestrator(&config)?;
        Ok(Self::new(config, orchestrator))
    }

    /// Get a reference to the agent configuration.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.inner.config
    }

    /// Get a reference to the dispatcher.
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }
}

fn claude_config<'a>(
    config: &'a AgentConfig,
    needed_by: &str,
) -> Result<&'a ClaudeConfig, ConfigError> {
    config.claude().ok_or_else(|| {
        ConfigError::MissingEnvVar(format!("CLAUDE_API_KEY (required by {needed_by})"))
    })
}

/// Build the orchestrator for `config`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, a Claude client cannot
/// be created, or a Claude-backed component is requested without an API key.
pub fn build_orchestrator(config: &AgentConfig) -> Result<Orchestrator, StateError> {
    let settings = &config.agent;

    let tool: Arc<dyn DataFetchTool> = match settings.fetch_backend {
        FetchBackend::Catalog => Arc::new(CatalogFetchTool::load(
            &settings.catalog_path,
            &settings.retailer_base_url,
        )?),
        FetchBackend::Claude => {
            let claude = claude_config(config, "FETCH_BACKEND=claude")?;
            let client = ClaudeClient::new(&claude.api_key, &claude.model)?;
            Arc::new(ClaudeFetchTool::new(
                client,
                settings.retailer_base_url.clone(),
            ))
        }
    };

    let classifier: Arc<dyn IntentClassifier> = match settings.classifier {
        ClassifierKind::Keyword => Arc::new(KeywordClassifier::new()),
        ClassifierKind::Llm => {
            let claude = claude_config(config, "CLASSIFIER=llm")?;
            let client = ClaudeClient::new(&claude.api_key, &claude.classifier_model)?;
            Arc::new(LlmClassifier::new(client))
        }
    };

    info!(
        classifier = ?settings.classifier,
        fetch_backend = ?settings.fetch_backend,
        history_window = settings.history_window,
        search_max_results = settings.search_max_results,
        "Agent configured"
    );

    Ok(Orchestrator::new(classifier, tool, settings))
}
