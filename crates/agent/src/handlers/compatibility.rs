//! Part/model compatibility checks.
//!
//! A part fits a model when the model appears in the part's compatibility
//! list. Three tiers are reported:
//!
//! 1. exact (case-insensitive) listing: `confirmed`
//! 2. a listed model differing only in its revision suffix: `likely`
//! 3. anything else: `unlikely`, with alternatives for the model
//!
//! A listed model always wins. Otherwise a refrigerator part asked about a
//! model whose prefix marks it as a dishwasher (or the reverse) is reported
//! as a category mismatch.

use parts_assist_core::{
    AgentResponse, ApplianceType, CompatibilityConfidence, CompatibilityResponse, ModelNumber,
    PartNumber, PartSummary,
};
use tracing::{debug, instrument, warn};

use super::MAX_ALTERNATIVES;
use crate::fetch::{DataFetchTool, FetchError};

/// Models named in an explanation before summarizing the rest.
const EXPLAINED_MODELS: usize = 5;

/// Shortest model number a variant match is trusted for.
const MIN_VARIANT_LEN: usize = 5;

/// Longest revision suffix treated as a variant.
const MAX_SUFFIX_DIFF: usize = 2;

/// How a listed model relates to the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMatch {
    Exact,
    Variant,
    None,
}

fn match_listing(model: &ModelNumber, listed: &[String]) -> (ListMatch, Option<String>) {
    if let Some(found) = listed.iter().find(|m| m.eq_ignore_ascii_case(model.as_str())) {
        return (ListMatch::Exact, Some(found.clone()));
    }
    listed
        .iter()
        .find(|m| is_variant(model, m))
        .map_or((ListMatch::None, None), |found| {
            (ListMatch::Variant, Some(found.clone()))
        })
}

/// `WDT780SAEM1` and `WDT780SAEM` (or `WDT780SAEM2`) are variants.
fn is_variant(model: &ModelNumber, listed: &str) -> bool {
    let Ok(listed) = ModelNumber::parse(listed) else {
        return false;
    };

    let (a, b) = (model.base(), listed.base());
    if a.len() >= MIN_VARIANT_LEN && a == b {
        return true;
    }

    let (shorter, longer) = if model.as_str().len() <= listed.as_str().len() {
        (model.as_str(), listed.as_str())
    } else {
        (listed.as_str(), model.as_str())
    };
    shorter.len() >= MIN_VARIANT_LEN
        && longer.starts_with(shorter)
        && longer.len() - shorter.len() <= MAX_SUFFIX_DIFF
}

/// "WRS325SDHZ, WRF555SDFZ and 12 others"
fn summarize_models(models: &[String]) -> String {
    let shown = models
        .iter()
        .take(EXPLAINED_MODELS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match models.len().saturating_sub(EXPLAINED_MODELS) {
        0 => shown,
        1 => format!("{shown} and 1 other"),
        n => format!("{shown} and {n} others"),
    }
}

async fn alternatives(
    tool: &dyn DataFetchTool,
    part_number: &PartNumber,
    model_number: &ModelNumber,
    appliance_type: Option<ApplianceType>,
) -> Vec<PartSummary> {
    match tool.search(model_number.as_str(), appliance_type).await {
        Ok(found) => found
            .into_iter()
            .filter(|p| &p.part_number != part_number)
            .take(MAX_ALTERNATIVES)
            .collect(),
        Err(e) => {
            warn!(error = %e, "Alternative part search failed");
            Vec::new()
        }
    }
}

fn response(
    part_number: &PartNumber,
    model_number: &ModelNumber,
    confidence: CompatibilityConfidence,
    message: String,
    explanation: String,
    alternative_parts: Vec<PartSummary>,
) -> AgentResponse {
    AgentResponse::Compatibility(CompatibilityResponse {
        message,
        part_number: part_number.to_string(),
        model_number: model_number.to_string(),
        is_compatible: matches!(
            confidence,
            CompatibilityConfidence::Confirmed | CompatibilityConfidence::Likely
        ),
        confidence,
        explanation,
        alternative_parts,
    })
}

fn ask_for_missing(
    part_number: Option<&PartNumber>,
    model_number: Option<&ModelNumber>,
) -> AgentResponse {
    let message = match (part_number, model_number) {
        (None, None) => "To check compatibility I need the part number (it starts with PS) \
                         and your appliance's model number."
            .to_string(),
        (Some(part), None) => format!(
            "What's your appliance's model number? I'll check whether {part} fits it. \
             You can usually find it on a label inside the door."
        ),
        (None, Some(model)) => format!(
            "Which part would you like to check against {model}? Please share the part number \
             (it starts with PS)."
        ),
        (Some(_), Some(_)) => String::new(),
    };

    AgentResponse::Compatibility(CompatibilityResponse {
        message,
        part_number: part_number.map(ToString::to_string).unwrap_or_default(),
        model_number: model_number.map(ToString::to_string).unwrap_or_default(),
        is_compatible: false,
        confidence: CompatibilityConfidence::Unlikely,
        explanation: String::new(),
        alternative_parts: Vec::new(),
    })
}

/// Check whether `part_number` fits `model_number`.
///
/// `appliance_hint` is the appliance the conversation is about. It narrows
/// the alternative search when the model prefix is not recognized.
#[instrument(skip(tool), fields(handler = "compatibility"))]
pub async fn check(
    tool: &dyn DataFetchTool,
    part_number: Option<&PartNumber>,
    model_number: Option<&ModelNumber>,
    appliance_hint: Option<ApplianceType>,
) -> AgentResponse {
    let (Some(part_number), Some(model_number)) = (part_number, model_number) else {
        return ask_for_missing(part_number, model_number);
    };

    let (listed, detail) = tokio::join!(
        tool.check_model_list(part_number),
        tool.get_details(part_number)
    );

    let listed = match listed {
        Ok(listed) => listed,
        Err(FetchError::NotFound(_)) => {
            return response(
                part_number,
                model_number,
                CompatibilityConfidence::Unlikely,
                format!("I couldn't find part {part_number}. Please double-check the number."),
                format!("No compatibility information exists for {part_number}."),
                Vec::new(),
            );
        }
        Err(e) => {
            warn!(error = %e, "Model list lookup failed");
            return response(
                part_number,
                model_number,
                CompatibilityConfidence::Unlikely,
                format!(
                    "I couldn't check whether {part_number} fits {model_number} right now. \
                     Please try again in a moment."
                ),
                "The compatibility list could not be retrieved.".to_string(),
                Vec::new(),
            );
        }
    };

    let (found, listed_as) = match_listing(model_number, &listed);
    match found {
        ListMatch::Exact => {
            return response(
                part_number,
                model_number,
                CompatibilityConfidence::Confirmed,
                format!("Yes, {part_number} is compatible with {model_number}."),
                format!("{model_number} is on the compatibility list for {part_number}."),
                Vec::new(),
            );
        }
        ListMatch::Variant => {
            let listed_as = listed_as.unwrap_or_default();
            return response(
                part_number,
                model_number,
                CompatibilityConfidence::Likely,
                format!("{part_number} will most likely fit {model_number}."),
                format!(
                    "{part_number} is listed for {listed_as}, which differs from {model_number} \
                     only in its revision suffix. Compare the full model number on your \
                     appliance's label before ordering."
                ),
                Vec::new(),
            );
        }
        ListMatch::None => {}
    }

    // Details only contribute the part's category; a failed lookup is not fatal.
    let part_category = match detail {
        Ok(detail) => detail.and_then(|d| d.appliance_type),
        Err(e) => {
            debug!(error = %e, "Part details unavailable for category check");
            None
        }
    };
    // Only the model string itself can prove a category mismatch.
    let prefix_category = ApplianceType::from_model_number(model_number);

    if let (Some(part_kind), Some(model_kind)) = (part_category, prefix_category)
        && part_kind != model_kind
    {
        let alternative_parts =
            alternatives(tool, part_number, model_number, Some(model_kind)).await;
        return response(
            part_number,
            model_number,
            CompatibilityConfidence::Unlikely,
            format!("No, {part_number} won't fit {model_number}."),
            format!(
                "{part_number} is a {part_kind} part, but {model_number} is a {model_kind} model."
            ),
            alternative_parts,
        );
    }

    let explanation = if listed.is_empty() {
        format!("{part_number} has no listed compatible models.")
    } else {
        format!(
            "{model_number} is not on the compatibility list for {part_number}, which covers {}.",
            summarize_models(&listed)
        )
    };
    let model_category = prefix_category.or(appliance_hint);
    let alternative_parts = alternatives(tool, part_number, model_number, model_category).await;
    let message = if alternative_parts.is_empty() {
        format!("{part_number} doesn't appear to fit {model_number}.")
    } else {
        format!("{part_number} doesn't appear to fit {model_number}. Here are parts that do.")
    };
    response(
        part_number,
        model_number,
        CompatibilityConfidence::Unlikely,
        message,
        explanation,
        alternative_parts,
    )
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::fetch::{Catalog, CatalogFetchTool};

    const CATALOG: &str = r#"
parts:
  - part_number: PS11752778
    name: Refrigerator Door Shelf Bin
    price: "46.82"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS11752778.htm
    appliance_type: refrigerator
    compatible_models: [WRS325SDHZ00, WRS325SDHZ01, WRF555SDFZ, WRX735SDHZ, WRS321SDHZ, WRS588FIHZ, WRF535SWHZ]
  - part_number: PS3406971
    name: Dishwasher Lower Spray Arm
    price: "24.50"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS3406971.htm
    appliance_type: dishwasher
    compatible_models: [WDT780SAEM]
  - part_number: PS11722130
    name: Dishwasher Rack Adjuster
    price: "31.20"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS11722130.htm
    appliance_type: dishwasher
    compatible_models: [WDT780SAEM1, WDF520PADM7]
  - part_number: PS10065979
    name: Refrigerator Water Filter
    price: "49.99"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS10065979.htm
    appliance_type: refrigerator
    compatible_models: [WRF555SDFZ]
"#;

    fn tool() -> CatalogFetchTool {
        let catalog = Catalog::from_yaml_str(CATALOG).expect("catalog");
        CatalogFetchTool::new(catalog, &Url::parse("https://www.partselect.com").expect("url"))
            .expect("valid catalog")
    }

    fn pn(s: &str) -> PartNumber {
        PartNumber::parse(s).expect("part number")
    }

    fn mn(s: &str) -> ModelNumber {
        ModelNumber::parse(s).expect("model number")
    }

    async fn run(part: &str, model: &str) -> CompatibilityResponse {
        let AgentResponse::Compatibility(response) =
            check(&tool(), Some(&pn(part)), Some(&mn(model)), None).await
        else {
            panic!("expected compatibility response");
        };
        response
    }

    #[tokio::test]
    async fn test_exact_match_confirmed() {
        let response = run("PS11752778", "wrf555sdfz").await;
        assert!(response.is_compatible);
        assert_eq!(response.confidence, CompatibilityConfidence::Confirmed);
        assert_eq!(response.model_number, "WRF555SDFZ");
    }

    #[tokio::test]
    async fn test_revision_suffix_is_likely() {
        let response = run("PS3406971", "WDT780SAEM1").await;
        assert!(response.is_compatible);
        assert_eq!(response.confidence, CompatibilityConfidence::Likely);
        assert!(response.explanation.contains("WDT780SAEM"));
    }

    #[tokio::test]
    async fn test_cross_category_mismatch() {
        let response = run("PS11752778", "WDT780SAEM1").await;
        assert!(!response.is_compatible);
        assert_eq!(response.confidence, CompatibilityConfidence::Unlikely);
        assert!(response.explanation.contains("refrigerator"));
        assert!(response.explanation.contains("dishwasher"));
        // Dishwasher parts listed for the model are offered instead.
        assert_eq!(response.alternative_parts.len(), 1);
        assert_eq!(response.alternative_parts[0].part_number.as_str(), "PS11722130");
    }

    #[tokio::test]
    async fn test_listing_beats_conflicting_hint() {
        let AgentResponse::Compatibility(response) = check(
            &tool(),
            Some(&pn("PS11752778")),
            Some(&mn("WRF555SDFZ")),
            Some(ApplianceType::Dishwasher),
        )
        .await
        else {
            panic!("expected compatibility response");
        };
        assert!(response.is_compatible);
        assert_eq!(response.confidence, CompatibilityConfidence::Confirmed);
    }

    #[tokio::test]
    async fn test_not_listed_offers_alternatives() {
        let response = run("PS11752778", "WRF999XXXZ").await;
        assert!(!response.is_compatible);
        assert_eq!(response.confidence, CompatibilityConfidence::Unlikely);
        assert!(response.explanation.contains("and 2 others"));
        assert!(response.alternative_parts.is_empty());
    }

    #[tokio::test]
    async fn test_alternatives_exclude_requested_part() {
        let response = run("PS10065979", "WRS325SDHZ00").await;
        assert_eq!(response.confidence, CompatibilityConfidence::Unlikely);
        assert!(
            response
                .alternative_parts
                .iter()
                .all(|p| p.part_number.as_str() != "PS10065979")
        );
        assert_eq!(response.alternative_parts[0].part_number.as_str(), "PS11752778");
    }

    #[tokio::test]
    async fn test_unknown_part() {
        let response = run("PS99999999", "WRF555SDFZ").await;
        assert!(!response.is_compatible);
        assert!(response.message.contains("couldn't find"));
    }

    #[tokio::test]
    async fn test_missing_model_asks() {
        let AgentResponse::Compatibility(response) =
            check(&tool(), Some(&pn("PS11752778")), None, None).await
        else {
            panic!("expected compatibility response");
        };
        assert!(!response.is_compatible);
        assert!(response.message.contains("model number"));
        assert_eq!(response.part_number, "PS11752778");
    }

    #[test]
    fn test_variant_rules() {
        assert!(is_variant(&mn("WDT780SAEM1"), "WDT780SAEM"));
        assert!(is_variant(&mn("WDT780SAEM1"), "WDT780SAEM2"));
        assert!(!is_variant(&mn("WDT780SAEM1"), "WDT780SBEM1"));
        // Too short to trust.
        assert!(!is_variant(&mn("RF28"), "RF2"));
    }

    #[test]
    fn test_summarize_models() {
        let models: Vec<String> = (1..=7).map(|i| format!("M{i}")).collect();
        assert_eq!(summarize_models(&models), "M1, M2, M3, M4, M5 and 2 others");
        assert_eq!(summarize_models(&models[..2]), "M1, M2");
    }
}
