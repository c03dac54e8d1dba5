//! Data-fetch tools: the single boundary to product data.
//!
//! Handlers only see [`DataFetchTool`]. Two backends ship:
//!
//! - [`CatalogFetchTool`] serves a local YAML catalog (offline and tests).
//! - [`ClaudeFetchTool`] asks Claude to read the retailer site with its web
//!   tools and answer in JSON.
//!
//! [`TimeLimited`] wraps either one so every call is bounded.

mod catalog;
mod claude;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parts_assist_core::{
    ApplianceType, DiyDifficulty, InstallDifficulty, PartDetail, PartNumber, PartSummary,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub use catalog::{
    Catalog, CatalogError, CatalogFetchTool, CatalogInstall, CatalogPart, CatalogSymptom,
    validate_catalog,
};
pub use claude::ClaudeFetchTool;

/// Errors a data-fetch call can produce.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The call did not finish in time.
    #[error("data fetch timed out after {0} seconds")]
    Timeout(u64),

    /// The upstream source failed.
    #[error("upstream fetch failed: {0}")]
    Upstream(String),

    /// The upstream answered with data we could not validate.
    #[error("malformed upstream data: {0}")]
    Malformed(String),

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// One installation step as reported by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstallStep {
    pub instruction: String,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Installation facts for a part, before the handler shapes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstallationFacts {
    #[serde(default)]
    pub difficulty: Option<InstallDifficulty>,
    #[serde(default)]
    pub estimated_time_minutes: Option<u32>,
    #[serde(default)]
    pub tools_required: Vec<String>,
    /// In source order. Numbering is assigned by the handler.
    #[serde(default)]
    pub steps: Vec<RawInstallStep>,
    /// The part connects to the water supply.
    #[serde(default)]
    pub involves_water: bool,
    /// The part connects to mains wiring.
    #[serde(default)]
    pub involves_electrical: bool,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// The part of an appliance a failure lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Mechanical,
    Water,
    Electrical,
    Gas,
    /// Sealed refrigerant circuit (compressor, evaporator, refrigerant).
    SealedSystem,
}

impl Subsystem {
    /// Work on this subsystem needs a licensed technician.
    #[must_use]
    pub const fn requires_professional(self) -> bool {
        matches!(self, Self::Electrical | Self::Gas | Self::SealedSystem)
    }
}

/// A possible cause with its estimated likelihood (0.0 to 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCause {
    pub description: String,
    #[serde(default)]
    pub likelihood: f32,
    #[serde(default)]
    pub subsystem: Option<Subsystem>,
}

/// Diagnosis facts for a symptom, before the handler shapes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDiagnosisFacts {
    #[serde(default)]
    pub causes: Vec<RankedCause>,
    #[serde(default)]
    pub recommended_parts: Vec<PartSummary>,
    #[serde(default)]
    pub difficulty: Option<DiyDifficulty>,
    #[serde(default)]
    pub troubleshooting_steps: Vec<String>,
}

/// Read-only access to product data.
///
/// Implementations must be safe to call concurrently from many requests.
#[async_trait]
pub trait DataFetchTool: Send + Sync {
    /// Parts matching free-text `query`, best match first.
    ///
    /// Returns every match; callers apply their own result window.
    async fn search(
        &self,
        query: &str,
        appliance_type: Option<ApplianceType>,
    ) -> Result<Vec<PartSummary>, FetchError>;

    /// Full record for one part, `None` when the part is unknown.
    async fn get_details(&self, part_number: &PartNumber) -> Result<Option<PartDetail>, FetchError>;

    /// Model numbers the part is listed as fitting.
    ///
    /// Fails with [`FetchError::NotFound`] for an unknown part.
    async fn check_model_list(&self, part_number: &PartNumber) -> Result<Vec<String>, FetchError>;

    /// Installation facts for one part, `None` when the part is unknown.
    async fn get_installation(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<RawInstallationFacts>, FetchError>;

    /// Causes, parts and checks for a described symptom.
    async fn diagnose(
        &self,
        appliance_type: ApplianceType,
        brand: Option<&str>,
        symptom: &str,
    ) -> Result<RawDiagnosisFacts, FetchError>;
}

/// Bounds every call of the wrapped tool by a fixed timeout.
#[derive(Clone)]
pub struct TimeLimited {
    inner: Arc<dyn DataFetchTool>,
    limit: Duration,
}

impl TimeLimited {
    #[must_use]
    pub fn new(inner: Arc<dyn DataFetchTool>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, FetchError>> + Send,
    ) -> Result<T, FetchError> {
        tokio::time::timeout(self.limit, fut).await.unwrap_or_else(|_| {
            warn!(
                operation,
                timeout_secs = self.limit.as_secs(),
                "Data fetch timed out"
            );
            Err(FetchError::Timeout(self.limit.as_secs()))
        })
    }
}

#[async_trait]
impl DataFetchTool for TimeLimited {
    async fn search(
        &self,
        query: &str,
        appliance_type: Option<ApplianceType>,
    ) -> Result<Vec<PartSummary>, FetchError> {
        self.bounded("search", self.inner.search(query, appliance_type))
            .await
    }

    async fn get_details(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<PartDetail>, FetchError> {
        self.bounded("get_details", self.inner.get_details(part_number))
            .await
    }

    async fn check_model_list(&self, part_number: &PartNumber) -> Result<Vec<String>, FetchError> {
        self.bounded("check_model_list", self.inner.check_model_list(part_number))
            .await
    }

    async fn get_installation(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<RawInstallationFacts>, FetchError> {
        self.bounded("get_installation", self.inner.get_installation(part_number))
            .await
    }

    async fn diagnose(
        &self,
        appliance_type: ApplianceType,
        brand: Option<&str>,
        symptom: &str,
    ) -> Result<RawDiagnosisFacts, FetchError> {
        self.bounded(
            "diagnose",
            self.inner.diagnose(appliance_type, brand, symptom),
        )
        .await
    }
}
