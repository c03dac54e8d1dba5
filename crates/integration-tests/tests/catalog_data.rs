//! Checks on the catalog file shipped with the agent.

use std::collections::HashSet;

use parts_assist_agent::fetch::{Catalog, DataFetchTool, validate_catalog};
use parts_assist_core::{ApplianceType, ModelNumber};
use parts_assist_integration_tests::{shipped_catalog, shipped_catalog_path};

fn catalog() -> Catalog {
    Catalog::from_path(&shipped_catalog_path()).expect("shipped catalog should parse")
}

#[test]
fn test_shipped_catalog_is_valid() {
    let errors = validate_catalog(&catalog());
    assert!(errors.is_empty(), "{errors:#?}");
}

#[test]
fn test_both_appliances_have_parts_and_symptoms() {
    let catalog = catalog();
    for appliance in ApplianceType::ALL {
        assert!(
            catalog
                .parts
                .iter()
                .any(|p| p.detail.appliance_type == Some(appliance)),
            "no {appliance} parts"
        );
        assert!(
            catalog.symptoms.iter().any(|s| s.appliance_type == appliance),
            "no {appliance} symptoms"
        );
    }
}

#[test]
fn test_recommended_parts_match_symptom_appliance() {
    let catalog = catalog();
    for symptom in &catalog.symptoms {
        for number in &symptom.recommended_parts {
            let part = catalog
                .parts
                .iter()
                .find(|p| &p.detail.part_number == number)
                .expect("validated part");
            assert_eq!(
                part.detail.appliance_type,
                Some(symptom.appliance_type),
                "{number} recommended for a {} symptom",
                symptom.appliance_type
            );
        }
    }
}

#[test]
fn test_compatible_models_agree_with_prefix_table() {
    let catalog = catalog();
    let mut checked = HashSet::new();
    for part in &catalog.parts {
        for raw in &part.detail.compatible_models {
            let model = ModelNumber::parse(raw).expect("valid model number");
            if let Some(category) = ApplianceType::from_model_number(&model) {
                assert_eq!(
                    Some(category),
                    part.detail.appliance_type,
                    "{} lists {raw}",
                    part.detail.part_number
                );
                checked.insert(raw.clone());
            }
        }
    }
    assert!(!checked.is_empty());
}

#[tokio::test]
async fn test_shipped_catalog_search_and_details() {
    let tool = shipped_catalog();

    let results = tool
        .search("ice maker", Some(ApplianceType::Refrigerator))
        .await
        .expect("search");
    assert_eq!(results[0].part_number.as_str(), "PS11701542");

    let detail = tool
        .get_details(&results[0].part_number)
        .await
        .expect("fetch")
        .expect("known part");
    assert!(detail.image_url.starts_with("https://www.partselect.com/images/"));
}
