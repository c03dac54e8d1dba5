//! Local parts catalog backed by a YAML file.
//!
//! Serves every [`DataFetchTool`] operation from memory, which makes it the
//! offline backend and the backbone of the test suite.
//!
//! ```yaml
//! parts:
//!   - part_number: PS11752778
//!     name: Refrigerator Door Shelf Bin
//!     price: "46.82"
//!     product_url: /PS11752778-Whirlpool-WPW10321304-Refrigerator-Door-Shelf-Bin.htm
//!     appliance_type: refrigerator
//!     compatible_models: [WRS325SDHZ, WRF555SDFZ]
//!     search_terms: [door bin, shelf bin]
//!     install:
//!       involves_water: false
//!       steps:
//!         - instruction: Empty the bin and lift it straight up.
//! symptoms:
//!   - appliance_type: refrigerator
//!     phrases: [ice maker not working, no ice]
//!     causes:
//!       - description: Water inlet valve failure
//!         likelihood: 0.5
//!         subsystem: water
//!     recommended_parts: [PS11752778]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parts_assist_core::{
    ApplianceType, DiyDifficulty, PartDetail, PartNumber, PartSummary,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use super::{
    DataFetchTool, FetchError, RankedCause, RawDiagnosisFacts, RawInstallStep,
    RawInstallationFacts,
};

/// Words ignored when matching search text.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "the", "for", "my", "i", "me", "need", "want", "find", "show", "looking",
    "look", "with", "of", "to", "on", "in", "is", "it", "part", "parts", "replacement", "new",
];

/// Errors loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid YAML for the expected shape.
    #[error("failed to parse catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Catalog parsed but failed validation.
    #[error("catalog validation failed:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// Installation facts stored with a catalog part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogInstall {
    #[serde(default)]
    pub estimated_time_minutes: Option<u32>,
    #[serde(default)]
    pub tools_required: Vec<String>,
    #[serde(default)]
    pub steps: Vec<RawInstallStep>,
    #[serde(default)]
    pub involves_water: bool,
    #[serde(default)]
    pub involves_electrical: bool,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// A part record in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPart {
    #[serde(flatten)]
    pub detail: PartDetail,
    /// Extra phrases the part should be found by.
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub install: Option<CatalogInstall>,
}

/// A symptom entry in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSymptom {
    pub appliance_type: ApplianceType,
    /// Lowercase phrases that identify the symptom.
    pub phrases: Vec<String>,
    pub causes: Vec<RankedCause>,
    #[serde(default)]
    pub recommended_parts: Vec<PartNumber>,
    #[serde(default)]
    pub troubleshooting_steps: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<DiyDifficulty>,
}

/// The catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub parts: Vec<CatalogPart>,
    #[serde(default)]
    pub symptoms: Vec<CatalogSymptom>,
}

impl Catalog {
    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a field fails to parse
    /// (including malformed part numbers).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Resolve every relative URL against `base`.
    fn resolve_urls(&mut self, base: &Url) {
        for part in &mut self.parts {
            let detail = &mut part.detail;
            detail.image_url = resolve_url(base, &detail.image_url);
            detail.product_url = resolve_url(base, &detail.product_url);
            for url in &mut detail.image_urls {
                *url = resolve_url(base, url);
            }
            if let Some(install) = &mut part.install {
                install.video_url = install.video_url.as_deref().map(|u| resolve_url(base, u));
                install.pdf_url = install.pdf_url.as_deref().map(|u| resolve_url(base, u));
            }
        }
    }
}

/// Validate a catalog, returning every problem found.
///
/// An empty result means the catalog is valid.
#[must_use]
pub fn validate_catalog(catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for part in &catalog.parts {
        let number = &part.detail.part_number;
        if !seen.insert(number.as_str()) {
            errors.push(format!("duplicate part number '{number}'"));
        }
        if !number.is_catalog_number() {
            errors.push(format!(
                "part number '{number}' is not a retailer number (PS followed by digits)"
            ));
        }
        if part.detail.name.trim().is_empty() {
            errors.push(format!("part '{number}' has an empty name"));
        }
        if part.detail.price.is_sign_negative() {
            errors.push(format!("part '{number}' has a negative price"));
        }
        if part.detail.appliance_type.is_none() {
            errors.push(format!("part '{number}' has no appliance_type"));
        }
        if let Some(install) = &part.install
            && install.steps.iter().any(|s| s.instruction.trim().is_empty())
        {
            errors.push(format!("part '{number}' has an empty installation step"));
        }
    }

    for (index, symptom) in catalog.symptoms.iter().enumerate() {
        let label = symptom
            .phrases
            .first()
            .map_or_else(|| format!("#{index}"), |p| format!("'{p}'"));
        if symptom.phrases.is_empty() {
            errors.push(format!("symptom {label} has no phrases"));
        }
        if symptom.causes.is_empty() {
            errors.push(format!("symptom {label} has no causes"));
        }
        for cause in &symptom.causes {
            if !(0.0..=1.0).contains(&cause.likelihood) {
                errors.push(format!(
                    "symptom {label} cause '{}' has likelihood {} outside 0.0..=1.0",
                    cause.description, cause.likelihood
                ));
            }
        }
        for number in &symptom.recommended_parts {
            if !seen.contains(number.as_str()) {
                errors.push(format!(
                    "symptom {label} recommends unknown part '{number}'"
                ));
            }
        }
    }

    errors
}

/// Serves data-fetch calls from an in-memory catalog.
#[derive(Debug, Clone)]
pub struct CatalogFetchTool {
    catalog: Catalog,
    index: HashMap<PartNumber, usize>,
}

impl CatalogFetchTool {
    /// Build from a parsed catalog, resolving relative URLs against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] if the catalog fails validation.
    pub fn new(mut catalog: Catalog, base_url: &Url) -> Result<Self, CatalogError> {
        let errors = validate_catalog(&catalog);
        if !errors.is_empty() {
            return Err(CatalogError::Invalid(errors));
        }

        catalog.resolve_urls(base_url);
        let index = catalog
            .parts
            .iter()
            .enumerate()
            .map(|(i, p)| (p.detail.part_number.clone(), i))
            .collect();

        Ok(Self { catalog, index })
    }

    /// Load, validate and index a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path, base_url: &Url) -> Result<Self, CatalogError> {
        let catalog = Catalog::from_path(path)?;
        let tool = Self::new(catalog, base_url)?;
        info!(
            path = %path.display(),
            parts = tool.catalog.parts.len(),
            symptoms = tool.catalog.symptoms.len(),
            "Catalog loaded"
        );
        Ok(tool)
    }

    fn part(&self, part_number: &PartNumber) -> Option<&CatalogPart> {
        self.index
            .get(part_number)
            .and_then(|&i| self.catalog.parts.get(i))
    }

    fn best_symptom(
        &self,
        appliance_type: ApplianceType,
        symptom: &str,
    ) -> Option<&CatalogSymptom> {
        let symptom = symptom.to_lowercase();
        let symptom_tokens = tokens(&symptom);

        self.catalog
            .symptoms
            .iter()
            .filter(|s| s.appliance_type == appliance_type)
            .filter_map(|entry| {
                entry
                    .phrases
                    .iter()
                    .filter_map(|phrase| phrase_score(&symptom, &symptom_tokens, phrase))
                    .max()
                    .map(|score| (score, entry))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, entry)| entry)
    }
}

/// How well `phrase` describes `symptom`. `None` when it does not.
fn phrase_score(symptom: &str, symptom_tokens: &[String], phrase: &str) -> Option<usize> {
    let phrase = phrase.to_lowercase();
    if symptom.contains(&phrase) || (!symptom.is_empty() && phrase.contains(symptom)) {
        return Some(phrase.len() * 2);
    }

    let phrase_tokens = tokens(&phrase);
    if phrase_tokens.is_empty() {
        return None;
    }
    let overlap = phrase_tokens
        .iter()
        .filter(|t| symptom_tokens.contains(t))
        .count();
    // Every significant word of the phrase must appear.
    (overlap == phrase_tokens.len()).then_some(phrase.len())
}

/// Significant lowercase words of `text`.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| w.len() > 1)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Relevance of `part` for the query tokens.
fn search_score(part: &CatalogPart, query_upper: &str, query_tokens: &[String]) -> u32 {
    let detail = &part.detail;
    if detail.part_number.as_str() == query_upper {
        return 100;
    }

    let name = detail.name.to_lowercase();
    let description = detail.description.to_lowercase();
    let manufacturer = detail.manufacturer.to_lowercase();
    let terms: Vec<String> = part.search_terms.iter().map(|t| t.to_lowercase()).collect();

    let mut score = 0;
    for token in query_tokens {
        // "filters" should find "Water Filter".
        let stem = token
            .strip_suffix('s')
            .filter(|s| s.len() > 2)
            .unwrap_or(token.as_str());
        if name.contains(stem) {
            score += 3;
        }
        if terms.iter().any(|t| t.contains(stem)) {
            score += 2;
        }
        if description.contains(stem) {
            score += 1;
        }
        if manufacturer == *token {
            score += 1;
        }
        if detail
            .compatible_models
            .iter()
            .any(|m| m.eq_ignore_ascii_case(token))
        {
            score += 5;
        }
    }
    score
}

fn resolve_url(base: &Url, raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match Url::parse(raw) {
        Ok(absolute) => absolute.into(),
        Err(_) => base
            .join(raw)
            .map_or_else(|_| raw.to_string(), Into::into),
    }
}

#[async_trait]
impl DataFetchTool for CatalogFetchTool {
    #[instrument(skip(self), fields(backend = "catalog"))]
    async fn search(
        &self,
        query: &str,
        appliance_type: Option<ApplianceType>,
    ) -> Result<Vec<PartSummary>, FetchError> {
        let query_upper = query.trim().to_uppercase();
        let query_tokens = tokens(query);

        let mut scored: Vec<(u32, &CatalogPart)> = self
            .catalog
            .parts
            .iter()
            .filter(|p| {
                appliance_type.is_none_or(|wanted| {
                    p.detail.appliance_type.is_none_or(|actual| actual == wanted)
                })
            })
            .map(|p| (search_score(p, &query_upper, &query_tokens), p))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .cmp(a_score)
                .then_with(|| a.detail.part_number.as_str().cmp(b.detail.part_number.as_str()))
        });

        debug!(matches = scored.len(), "Catalog search complete");
        Ok(scored.into_iter().map(|(_, p)| p.detail.summary()).collect())
    }

    #[instrument(skip(self, part_number), fields(backend = "catalog", part_number = %part_number))]
    async fn get_details(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<PartDetail>, FetchError> {
        Ok(self.part(part_number).map(|p| p.detail.clone()))
    }

    #[instrument(skip(self, part_number), fields(backend = "catalog", part_number = %part_number))]
    async fn check_model_list(&self, part_number: &PartNumber) -> Result<Vec<String>, FetchError> {
        self.part(part_number)
            .map(|p| p.detail.compatible_models.clone())
            .ok_or_else(|| FetchError::NotFound(format!("part {part_number}")))
    }

    #[instrument(skip(self, part_number), fields(backend = "catalog", part_number = %part_number))]
    async fn get_installation(
        &self,
        part_number: &PartNumber,
    ) -> Result<Option<RawInstallationFacts>, FetchError> {
        Ok(self.part(part_number).map(|part| {
            let install = part.install.clone().unwrap_or_default();
            RawInstallationFacts {
                difficulty: Some(part.detail.installation_difficulty),
                estimated_time_minutes: install.estimated_time_minutes,
                tools_required: install.tools_required,
                steps: install.steps,
                involves_water: install.involves_water,
                involves_electrical: install.involves_electrical,
                video_url: install.video_url,
                pdf_url: install.pdf_url,
            }
        }))
    }

    #[instrument(skip(self), fields(backend = "catalog"))]
    async fn diagnose(
        &self,
        appliance_type: ApplianceType,
        brand: Option<&str>,
        symptom: &str,
    ) -> Result<RawDiagnosisFacts, FetchError> {
        if let Some(entry) = self.best_symptom(appliance_type, symptom) {
            let recommended_parts = entry
                .recommended_parts
                .iter()
                .filter_map(|n| self.part(n))
                .map(|p| p.detail.summary())
                .collect();

            return Ok(RawDiagnosisFacts {
                causes: entry.causes.clone(),
                recommended_parts,
                difficulty: entry.difficulty,
                troubleshooting_steps: entry.troubleshooting_steps.clone(),
            });
        }

        // No known symptom: fall back to the closest parts for this appliance.
        debug!("No catalog symptom matched, searching parts instead");
        let mut recommended_parts = self.search(symptom, Some(appliance_type)).await?;
        if let Some(brand) = brand {
            recommended_parts.sort_by_key(|p| !p.manufacturer.eq_ignore_ascii_case(brand));
        }
        recommended_parts.truncate(2);

        Ok(RawDiagnosisFacts {
            recommended_parts,
            ..RawDiagnosisFacts::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const CATALOG: &str = r#"
parts:
  - part_number: PS11752778
    name: Refrigerator Door Shelf Bin
    price: "46.82"
    image_url: /images/PS11752778.jpg
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS11752778-Whirlpool-WPW10321304-Refrigerator-Door-Shelf-Bin.htm
    appliance_type: refrigerator
    installation_difficulty: easy
    compatible_models: [WRS325SDHZ, WRF555SDFZ]
    search_terms: [door bin, shelf bin]
  - part_number: PS11701542
    name: Ice Maker Assembly
    price: "129.95"
    image_url: https://cdn.example.com/ice.jpg
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS11701542.htm
    appliance_type: refrigerator
    installation_difficulty: moderate
    compatible_models: [WRS325SDHZ]
    search_terms: [ice maker, icemaker]
    install:
      involves_water: true
      involves_electrical: true
      video_url: /videos/ice-maker
      steps:
        - instruction: Unplug the refrigerator.
        - instruction: Remove the old ice maker.
  - part_number: PS3406971
    name: Dishwasher Lower Spray Arm
    price: "24.50"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: false
    product_url: /PS3406971.htm
    appliance_type: dishwasher
    compatible_models: [WDT780SAEM1]
symptoms:
  - appliance_type: refrigerator
    phrases: [ice maker not working, no ice]
    causes:
      - description: Water inlet valve failure
        likelihood: 0.5
        subsystem: water
    recommended_parts: [PS11701542]
"#;

    fn base() -> Url {
        Url::parse("https://www.partselect.com").expect("url")
    }

    fn tool() -> CatalogFetchTool {
        let catalog = Catalog::from_yaml_str(CATALOG).expect("parse");
        CatalogFetchTool::new(catalog, &base()).expect("valid catalog")
    }

    fn pn(s: &str) -> PartNumber {
        PartNumber::parse(s).expect("part number")
    }

    #[test]
    fn test_catalog_parses_prices() {
        let catalog = Catalog::from_yaml_str(CATALOG).expect("parse");
        assert_eq!(catalog.parts.len(), 3);
        assert_eq!(catalog.parts[0].detail.price, Decimal::new(4_682, 2));
    }

    #[test]
    fn test_valid_catalog_has_no_errors() {
        let catalog = Catalog::from_yaml_str(CATALOG).expect("parse");
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut catalog = Catalog::from_yaml_str(CATALOG).expect("parse");
        let duplicate = catalog.parts[0].clone();
        catalog.parts.push(duplicate);
        catalog.symptoms[0].recommended_parts.push(pn("PS999999"));
        catalog.symptoms[0].causes.clear();

        let errors = validate_catalog(&catalog);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("duplicate part number")));
        assert!(errors.iter().any(|e| e.contains("unknown part 'PS999999'")));
        assert!(errors.iter().any(|e| e.contains("no causes")));
    }

    #[test]
    fn test_validate_rejects_non_retailer_numbers() {
        let mut catalog = Catalog::from_yaml_str(CATALOG).expect("parse");
        catalog.parts[2].detail.part_number = pn("W10321304");
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("not a retailer number")));
    }

    #[test]
    fn test_invalid_catalog_is_rejected_by_tool() {
        let mut catalog = Catalog::from_yaml_str(CATALOG).expect("parse");
        catalog.symptoms[0].causes.clear();
        let result = CatalogFetchTool::new(catalog, &base());
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let result = Catalog::from_yaml_str("parts: [ {part_number: 'PS 1'} ]");
        assert!(matches!(result, Err(CatalogError::Yaml(_))));
    }

    #[test]
    fn test_relative_urls_resolved() {
        let tool = tool();
        let bin = tool.part(&pn("PS11752778")).expect("bin");
        assert_eq!(
            bin.detail.product_url,
            "https://www.partselect.com/PS11752778-Whirlpool-WPW10321304-Refrigerator-Door-Shelf-Bin.htm"
        );
        let ice = tool.part(&pn("PS11701542")).expect("ice maker");
        assert_eq!(ice.detail.image_url, "https://cdn.example.com/ice.jpg");
        let spray = tool.part(&pn("PS3406971")).expect("spray arm");
        assert_eq!(spray.detail.image_url, "");
    }

    #[tokio::test]
    async fn test_search_ranks_and_filters() {
        let tool = tool();
        let results = tool.search("ice maker", None).await.expect("search");
        assert_eq!(results[0].part_number.as_str(), "PS11701542");

        let results = tool
            .search("whirlpool", Some(ApplianceType::Dishwasher))
            .await
            .expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].part_number.as_str(), "PS3406971");
    }

    #[tokio::test]
    async fn test_search_matches_plurals() {
        let results = tool().search("door bins", None).await.expect("search");
        assert_eq!(results[0].part_number.as_str(), "PS11752778");
    }

    #[tokio::test]
    async fn test_search_by_model_number() {
        let tool = tool();
        let results = tool.search("WRS325SDHZ", None).await.expect("search");
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_search_by_part_number() {
        let results = tool().search("ps3406971", None).await.expect("search");
        assert_eq!(results[0].part_number.as_str(), "PS3406971");
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let results = tool().search("turbo encabulator", None).await.expect("search");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_check_model_list_unknown_part() {
        let result = tool().check_model_list(&pn("PS000001")).await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_installation_uses_part_difficulty() {
        let tool = tool();
        let facts = tool
            .get_installation(&pn("PS11701542"))
            .await
            .expect("fetch")
            .expect("known part");
        assert!(facts.involves_water);
        assert_eq!(facts.steps.len(), 2);
        assert_eq!(
            facts.video_url.as_deref(),
            Some("https://www.partselect.com/videos/ice-maker")
        );

        let facts = tool
            .get_installation(&pn("PS11752778"))
            .await
            .expect("fetch")
            .expect("known part");
        assert!(facts.steps.is_empty());
        assert_eq!(
            facts.difficulty,
            Some(parts_assist_core::InstallDifficulty::Easy)
        );

        assert!(tool.get_installation(&pn("PS000001")).await.expect("fetch").is_none());
    }

    #[tokio::test]
    async fn test_diagnose_matches_phrase() {
        let facts = tool()
            .diagnose(ApplianceType::Refrigerator, None, "my ice maker not working at all")
            .await
            .expect("diagnose");
        assert_eq!(facts.causes.len(), 1);
        assert_eq!(facts.recommended_parts[0].part_number.as_str(), "PS11701542");
    }

    #[tokio::test]
    async fn test_diagnose_respects_appliance() {
        let facts = tool()
            .diagnose(ApplianceType::Dishwasher, None, "no ice")
            .await
            .expect("diagnose");
        assert!(facts.causes.is_empty());
    }

    #[test]
    fn test_phrase_score_requires_all_words() {
        let symptom = "the ice maker is not working";
        let symptom_tokens = tokens(symptom);
        assert!(phrase_score(symptom, &symptom_tokens, "ice maker not working").is_some());
        assert!(phrase_score(symptom, &symptom_tokens, "water filter leaking").is_none());
    }
}
