//! Part details.

use parts_assist_core::{AgentResponse, PartDetail, PartDetailsResponse, PartNumber, PartSummary};
use tracing::{instrument, warn};

use super::{MAX_LISTED_MODELS, MAX_RELATED_PARTS};
use crate::fetch::DataFetchTool;

fn not_found(message: String) -> AgentResponse {
    AgentResponse::PartDetails(PartDetailsResponse {
        message,
        part: None,
        compatible_models: Vec::new(),
        related_parts: Vec::new(),
    })
}

/// Parts found by searching the part's name within its appliance category.
async fn related_parts(tool: &dyn DataFetchTool, part: &PartDetail) -> Vec<PartSummary> {
    match tool.search(&part.name, part.appliance_type).await {
        Ok(found) => found
            .into_iter()
            .filter(|p| p.part_number != part.part_number)
            .take(MAX_RELATED_PARTS)
            .collect(),
        Err(e) => {
            warn!(error = %e, "Related part search failed");
            Vec::new()
        }
    }
}

/// Look up one part. Unknown parts and fetch failures return `part: null`.
#[instrument(skip(tool), fields(handler = "part_details"))]
pub async fn details(
    tool: &dyn DataFetchTool,
    part_number: Option<&PartNumber>,
) -> AgentResponse {
    let Some(part_number) = part_number else {
        return not_found(
            "Which part would you like to know about? Please share the part number \
             (it starts with PS, like PS11752778)."
                .to_string(),
        );
    };

    let part = match tool.get_details(part_number).await {
        Ok(Some(part)) => part,
        Ok(None) => {
            return not_found(format!(
                "I couldn't find part {part_number}. Please double-check the number."
            ));
        }
        Err(e) => {
            warn!(error = %e, "Part details lookup failed");
            return not_found(format!(
                "I couldn't look up part {part_number} right now. Please try again in a moment."
            ));
        }
    };

    let stock = if part.in_stock {
        "in stock"
    } else {
        "currently out of stock"
    };
    let message = format!(
        "{} ({}) by {} is ${} and {stock}.",
        part.name, part.part_number, part.manufacturer, part.price
    );

    let compatible_models = part
        .compatible_models
        .iter()
        .take(MAX_LISTED_MODELS)
        .cloned()
        .collect();
    let related_parts = related_parts(tool, &part).await;

    AgentResponse::PartDetails(PartDetailsResponse {
        message,
        part: Some(part),
        compatible_models,
        related_parts,
    })
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use url::Url;

    use super::*;
    use crate::fetch::{Catalog, CatalogFetchTool};

    fn tool() -> CatalogFetchTool {
        let mut yaml = String::from("parts:\n");
        for (number, name, appliance) in [
            ("PS11752779", "Refrigerator Door Shelf Bin, Clear", "refrigerator"),
            ("PS12364199", "Refrigerator Shelf Bin Retainer", "refrigerator"),
            ("PS10065979", "Dishwasher Shelf Bin", "dishwasher"),
        ] {
            let _ = writeln!(
                yaml,
                "  - part_number: {number}\n    name: {name}\n    price: \"12.00\"\n    \
                 image_url: \"\"\n    manufacturer: Whirlpool\n    in_stock: true\n    \
                 product_url: /{number}.htm\n    appliance_type: {appliance}"
            );
        }
        yaml.push_str(
            "  - part_number: PS11752778\n    name: Refrigerator Door Shelf Bin\n    \
             price: \"46.82\"\n    image_url: \"\"\n    manufacturer: Whirlpool\n    \
             in_stock: true\n    product_url: /PS11752778.htm\n    \
             appliance_type: refrigerator\n    compatible_models:\n",
        );
        for i in 0..30 {
            let _ = writeln!(yaml, "      - WRS325SDHZ{i:02}");
        }
        let catalog = Catalog::from_yaml_str(&yaml).expect("catalog");
        CatalogFetchTool::new(catalog, &Url::parse("https://www.partselect.com").expect("url"))
            .expect("valid catalog")
    }

    #[tokio::test]
    async fn test_details_caps_compatible_models() {
        let part_number = PartNumber::parse("PS11752778").expect("part number");
        let AgentResponse::PartDetails(response) = details(&tool(), Some(&part_number)).await
        else {
            panic!("expected part details");
        };
        let part = response.part.expect("part found");
        assert_eq!(part.compatible_models.len(), 30);
        assert_eq!(response.compatible_models.len(), MAX_LISTED_MODELS);
        assert!(response.message.contains("$46.82"));
        assert!(response.message.contains("in stock"));
    }

    #[tokio::test]
    async fn test_related_parts_share_category_and_exclude_part() {
        let part_number = PartNumber::parse("PS11752778").expect("part number");
        let AgentResponse::PartDetails(response) = details(&tool(), Some(&part_number)).await
        else {
            panic!("expected part details");
        };
        let related: Vec<&str> = response
            .related_parts
            .iter()
            .map(|p| p.part_number.as_str())
            .collect();
        assert!(!related.is_empty());
        assert!(related.len() <= MAX_RELATED_PARTS);
        assert!(!related.contains(&"PS11752778"));
        assert!(!related.contains(&"PS10065979"), "dishwasher part offered: {related:?}");
        assert!(related.contains(&"PS11752779"));
    }

    #[tokio::test]
    async fn test_unknown_part_is_null() {
        let part_number = PartNumber::parse("PS99999999").expect("part number");
        let AgentResponse::PartDetails(response) = details(&tool(), Some(&part_number)).await
        else {
            panic!("expected part details");
        };
        assert!(response.part.is_none());
        assert!(response.related_parts.is_empty());
        assert!(response.message.contains("couldn't find"));
    }

    #[tokio::test]
    async fn test_missing_part_number_asks() {
        let AgentResponse::PartDetails(response) = details(&tool(), None).await else {
            panic!("expected part details");
        };
        assert!(response.part.is_none());
        assert!(response.message.contains("part number"));
    }
}
