//! Integration tests for Parts Assist.
//!
//! Everything runs in-process against the shipped catalog or small inline
//! catalogs. No network access or API key is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p parts-assist-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `agent_dispatch` - classification through handler on the shipped catalog
//! - `agent_routes` - the HTTP surface via `tower::ServiceExt::oneshot`
//! - `catalog_data` - the shipped catalog file itself

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use parts_assist_agent::classifier::KeywordClassifier;
use parts_assist_agent::config::{AgentConfig, AgentSettings};
use parts_assist_agent::fetch::{
    Catalog, CatalogFetchTool, DataFetchTool, FetchError, RawDiagnosisFacts,
    RawInstallationFacts,
};
use parts_assist_agent::orchestrator::Orchestrator;
use parts_assist_agent::state::AppState;
use parts_assist_core::{ApplianceType, PartDetail, PartNumber, PartSummary};
use url::Url;

/// Path of the catalog shipped with the agent.
#[must_use]
pub fn shipped_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../agent/data/catalog.yaml")
}

/// The retailer base URL used by every test.
///
/// # Panics
///
/// Never in practice; the literal is a valid URL.
#[must_use]
pub fn retailer_url() -> Url {
    Url::parse("https://www.partselect.com").expect("valid retailer URL")
}

/// Load the shipped catalog.
///
/// # Panics
///
/// Panics if the catalog file is missing or invalid.
#[must_use]
pub fn shipped_catalog() -> CatalogFetchTool {
    CatalogFetchTool::load(&shipped_catalog_path(), &retailer_url())
        .expect("shipped catalog should load")
}

/// Build a catalog tool from inline YAML.
///
/// # Panics
///
/// Panics if the YAML does not parse or validate.
#[must_use]
pub fn catalog_from_yaml(yaml: &str) -> CatalogFetchTool {
    let catalog = Catalog::from_yaml_str(yaml).expect("catalog should parse");
    CatalogFetchTool::new(catalog, &retailer_url()).expect("catalog should validate")
}

/// Wraps a tool and records the name of every call made through it.
pub struct RecordingTool {
    inner: Arc<dyn DataFetchTool>,
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingTool {
    #[must_use]
    pub fn new(inner: Arc<dyn DataFetchTool>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Names of the calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: &'static str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl DataFetchTool for RecordingTool {
    async fn search(
        &self,
        query: &str,
        appliance_type: Option<ApplianceType>,
    ) -> Result<Vec<PartSummary>, FetchError> {
        self.record("search");
        self.inner.search(query, appliance_type).await
    }

    async fn get_details(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<PartDetail>, FetchError> {
        self.record("get_details");
        self.inner.get_details(part_number).await
    }

    async fn check_model_list(&self, part_number: &PartNumber) -> Result<Vec<String>, FetchError> {
        self.record("check_model_list");
        self.inner.check_model_list(part_number).await
    }

    async fn get_installation(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<RawInstallationFacts>, FetchError> {
        self.record("get_installation");
        self.inner.get_installation(part_number).await
    }

    async fn diagnose(
        &self,
        appliance_type: ApplianceType,
        brand: Option<&str>,
        symptom: &str,
    ) -> Result<RawDiagnosisFacts, FetchError> {
        self.record("diagnose");
        self.inner.diagnose(appliance_type, brand, symptom).await
    }
}

/// A keyword-classifier orchestrator over `tool` with default settings.
#[must_use]
pub fn keyword_orchestrator(tool: Arc<dyn DataFetchTool>) -> Orchestrator {
    Orchestrator::new(
        Arc::new(KeywordClassifier::new()),
        tool,
        &AgentSettings::default(),
    )
}

/// Configuration for in-process HTTP tests.
#[must_use]
pub fn test_config() -> AgentConfig {
    AgentConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        claude: None,
        agent: AgentSettings::default(),
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        request_timeout: Duration::from_secs(10),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Application state over the shipped catalog with the keyword classifier.
#[must_use]
pub fn test_state() -> AppState {
    let orchestrator = keyword_orchestrator(Arc::new(shipped_catalog()));
    AppState::new(test_config(), orchestrator)
}
