//! Data fetching through Claude and its web tools.
//!
//! Each operation asks Claude to read the retailer site (web search and page
//! fetch, restricted to the retailer's domain) and answer with a JSON object
//! of a declared shape. The reply is validated with serde; anything that
//! does not fit is reported as [`FetchError::Malformed`].

use std::fmt::Write;

use async_trait::async_trait;
use parts_assist_core::{ApplianceType, PartDetail, PartNumber, PartSummary};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{DataFetchTool, FetchError, RawDiagnosisFacts, RawInstallationFacts};
use crate::claude::{
    ClaudeClient, ClaudeError, Message, ServerTool, StopReason, extract_json_object,
};

const MAX_TOKENS: u32 = 4096;
const WEB_FETCH_MAX_USES: u32 = 5;
const WEB_SEARCH_MAX_USES: u32 = 3;

const PART_SUMMARY_SHAPE: &str = r#"{"part_number": "PS11752778", "name": "...", "price": 46.82, "image_url": "https://...", "manufacturer": "Whirlpool", "in_stock": true, "product_url": "https://..."}"#;

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    parts: Vec<PartSummary>,
}

#[derive(Debug, Deserialize)]
struct DetailsPayload {
    #[serde(default)]
    part: Option<PartDetail>,
}

#[derive(Debug, Deserialize)]
struct ModelListPayload {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    compatible_models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct InstallationPayload {
    #[serde(default)]
    installation: Option<RawInstallationFacts>,
}

/// Fetches product data by letting Claude browse the retailer site.
#[derive(Clone)]
pub struct ClaudeFetchTool {
    client: ClaudeClient,
    base_url: Url,
    allowed_domains: Vec<String>,
}

impl ClaudeFetchTool {
    /// Create a fetch tool that browses `base_url` only.
    #[must_use]
    pub fn new(client: ClaudeClient, base_url: Url) -> Self {
        let allowed_domains = allowed_domains(&base_url);
        Self {
            client,
            base_url,
            allowed_domains,
        }
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You look up refrigerator and dishwasher parts on a parts retailer's website \
             and report what you find as JSON.\n\n",
        );
        let _ = writeln!(prompt, "Retailer site: {}", self.base_url);
        prompt.push_str(
            "\nRules:\n\
             1. Use the web_search and web_fetch tools to read the retailer site. Never invent data.\n\
             2. Reply with ONE JSON object and nothing else.\n\
             3. Prices are numbers in US dollars. URLs are absolute.\n\
             4. Part numbers are the retailer's numbers (PS followed by digits).\n\
             5. If you cannot find something, use the empty value the shape allows.",
        );
        prompt
    }

    fn tools(&self) -> Vec<ServerTool> {
        vec![
            ServerTool::web_search(self.allowed_domains.clone(), WEB_SEARCH_MAX_USES),
            ServerTool::web_fetch(self.allowed_domains.clone(), WEB_FETCH_MAX_USES),
        ]
    }

    /// Ask for `task`, answered in JSON shaped like `shape`.
    async fn ask<T: DeserializeOwned>(&self, task: &str, shape: &str) -> Result<T, FetchError> {
        let prompt = format!("{task}\n\nRespond with JSON of this shape:\n{shape}");
        let response = self
            .client
            .chat(
                vec![Message::user(prompt)],
                Some(self.system_prompt()),
                Some(self.tools()),
                MAX_TOKENS,
            )
            .await
            .map_err(upstream)?;

        if response.stop_reason == Some(StopReason::MaxTokens) {
            warn!("Fetch reply truncated at max tokens");
        }

        let text = response.text();
        let json = extract_json_object(&text).ok_or_else(|| {
            debug!(reply = %text, "No JSON object in fetch reply");
            FetchError::Malformed("reply contained no JSON object".to_string())
        })?;

        serde_json::from_str(json).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

fn upstream(err: ClaudeError) -> FetchError {
    FetchError::Upstream(err.to_string())
}

/// The retailer host plus its bare domain, e.g. `www.partselect.com` and
/// `partselect.com`.
fn allowed_domains(base_url: &Url) -> Vec<String> {
    let Some(host) = base_url.host_str() else {
        return Vec::new();
    };
    let mut domains = vec![host.to_string()];
    if let Some(bare) = host.strip_prefix("www.") {
        domains.push(bare.to_string());
    }
    domains
}

#[async_trait]
impl DataFetchTool for ClaudeFetchTool {
    #[instrument(skip(self), fields(backend = "claude"))]
    async fn search(
        &self,
        query: &str,
        appliance_type: Option<ApplianceType>,
    ) -> Result<Vec<PartSummary>, FetchError> {
        let scope = appliance_type.map_or("refrigerator or dishwasher", ApplianceType::as_str);
        let task = format!(
            "Search the retailer for {scope} parts matching: \"{query}\". \
             List the best matches first, at most 10."
        );
        let shape = format!(r#"{{"parts": [{PART_SUMMARY_SHAPE}]}}"#);
        let payload: SearchPayload = self.ask(&task, &shape).await?;
        Ok(payload.parts)
    }

    #[instrument(skip(self, part_number), fields(backend = "claude", part_number = %part_number))]
    async fn get_details(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<PartDetail>, FetchError> {
        let task = format!(
            "Fetch the product page for part {part_number} and report its details. \
             List up to 50 compatible model numbers. Use null for part if the page does not exist."
        );
        let shape = r#"{"part": {"part_number": "PS11752778", "name": "...", "price": 46.82, "image_url": "https://...", "manufacturer": "Whirlpool", "in_stock": true, "product_url": "https://...", "description": "...", "image_urls": [], "rating": 4.8, "review_count": 120, "compatible_models": ["WRS325SDHZ"], "installation_difficulty": "easy|moderate|difficult", "warranty": "...", "appliance_type": "refrigerator|dishwasher"}}"#;
        let payload: DetailsPayload = self.ask(&task, shape).await?;
        Ok(payload.part)
    }

    #[instrument(skip(self, part_number), fields(backend = "claude", part_number = %part_number))]
    async fn check_model_list(&self, part_number: &PartNumber) -> Result<Vec<String>, FetchError> {
        let task = format!(
            "Fetch the product page for part {part_number} and list every model number \
             in its compatibility list. Set found to false if the part does not exist."
        );
        let shape = r#"{"found": true, "compatible_models": ["WRS325SDHZ", "WRF555SDFZ"]}"#;
        let payload: ModelListPayload = self.ask(&task, shape).await?;
        if !payload.found {
            return Err(FetchError::NotFound(format!("part {part_number}")));
        }
        Ok(payload.compatible_models)
    }

    #[instrument(skip(self, part_number), fields(backend = "claude", part_number = %part_number))]
    async fn get_installation(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<RawInstallationFacts>, FetchError> {
        let task = format!(
            "Fetch the product page for part {part_number} and report how to install it: \
             difficulty, time, tools, ordered steps, repair video and PDF links. \
             Mark whether the part connects to the water supply or to electrical wiring. \
             Use null for installation if the part does not exist."
        );
        let shape = r#"{"installation": {"difficulty": "easy|moderate|difficult", "estimated_time_minutes": 30, "tools_required": ["Phillips screwdriver"], "steps": [{"instruction": "...", "warning": null}], "involves_water": false, "involves_electrical": true, "video_url": null, "pdf_url": null}}"#;
        let payload: InstallationPayload = self.ask(&task, shape).await?;
        Ok(payload.installation)
    }

    #[instrument(skip(self), fields(backend = "claude"))]
    async fn diagnose(
        &self,
        appliance_type: ApplianceType,
        brand: Option<&str>,
        symptom: &str,
    ) -> Result<RawDiagnosisFacts, FetchError> {
        let brand = brand.unwrap_or("unknown brand");
        let task = format!(
            "Use the retailer's repair help to diagnose a {brand} {appliance_type} with this symptom: \
             \"{symptom}\". Rank causes by likelihood (0.0 to 1.0) and tag each with the subsystem \
             it lives in. Recommend up to 3 parts that fix the likely causes and list checks the \
             customer can run before buying."
        );
        let shape = format!(
            r#"{{"causes": [{{"description": "...", "likelihood": 0.6, "subsystem": "mechanical|water|electrical|gas|sealed_system"}}], "recommended_parts": [{PART_SUMMARY_SHAPE}], "difficulty": "easy|moderate|difficult|call_professional", "troubleshooting_steps": ["..."]}}"#
        );
        self.ask(&task, &shape).await
    }
}
