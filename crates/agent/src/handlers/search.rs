//! Product search.

use parts_assist_core::{AgentResponse, ApplianceType, SearchResponse};
use tracing::{instrument, warn};

use crate::fetch::DataFetchTool;

/// Search for parts matching `query`, keeping at most `max_results`.
///
/// `total_results` reports everything the tool found, not the window.
#[instrument(skip(tool), fields(handler = "search"))]
pub async fn search(
    tool: &dyn DataFetchTool,
    query: &str,
    appliance_type: Option<ApplianceType>,
    max_results: usize,
) -> AgentResponse {
    let query = query.trim();
    let scope = appliance_type.map_or("refrigerator and dishwasher", ApplianceType::as_str);

    if query.is_empty() {
        return AgentResponse::Search(SearchResponse {
            message: format!(
                "What part are you looking for? Tell me the part name or your {scope} model number and I'll find it."
            ),
            parts: Vec::new(),
            total_results: 0,
            search_query: String::new(),
            appliance_type,
        });
    }

    let found = match tool.search(query, appliance_type).await {
        Ok(found) => found,
        Err(e) => {
            warn!(error = %e, "Search failed");
            return AgentResponse::Search(SearchResponse {
                message: format!(
                    "I couldn't search for \"{query}\" right now. Please try again in a moment."
                ),
                parts: Vec::new(),
                total_results: 0,
                search_query: query.to_string(),
                appliance_type,
            });
        }
    };

    let total_results = found.len();
    let message = match total_results {
        0 => format!(
            "I couldn't find any {scope} parts matching \"{query}\". Try a different name, \
             or give me your model number and I'll look up parts that fit it."
        ),
        1 => format!("I found 1 {scope} part matching \"{query}\"."),
        n if n > max_results => format!(
            "I found {n} {scope} parts matching \"{query}\". Here are the top {max_results}."
        ),
        n => format!("I found {n} {scope} parts matching \"{query}\"."),
    };

    let mut parts = found;
    parts.truncate(max_results);

    AgentResponse::Search(SearchResponse {
        message,
        parts,
        total_results,
        search_query: query.to_string(),
        appliance_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Catalog, CatalogFetchTool};
    use url::Url;

    const CATALOG: &str = r#"
parts:
  - part_number: PS1000001
    name: Ice Maker Assembly
    price: "89.99"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS1000001.htm
    appliance_type: refrigerator
    search_terms: [ice maker]
  - part_number: PS1000002
    name: Ice Maker Fill Tube
    price: "12.50"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS1000002.htm
    appliance_type: refrigerator
    search_terms: [ice maker]
  - part_number: PS1000003
    name: Ice Maker Mold Heater
    price: "24.00"
    image_url: ""
    manufacturer: GE
    in_stock: false
    product_url: /PS1000003.htm
    appliance_type: refrigerator
    search_terms: [ice maker]
  - part_number: PS1000004
    name: Ice Maker Water Valve
    price: "41.10"
    image_url: ""
    manufacturer: GE
    in_stock: true
    product_url: /PS1000004.htm
    appliance_type: refrigerator
    search_terms: [ice maker]
symptoms: []
"#;

    fn tool() -> CatalogFetchTool {
        let catalog = Catalog::from_yaml_str(CATALOG).expect("catalog");
        CatalogFetchTool::new(catalog, &Url::parse("https://www.partselect.com").expect("url"))
            .expect("valid catalog")
    }

    #[tokio::test]
    async fn test_search_caps_results_and_reports_total() {
        let response = search(&tool(), "ice maker", Some(ApplianceType::Refrigerator), 3).await;
        let AgentResponse::Search(search) = response else {
            panic!("expected search response");
        };
        assert_eq!(search.parts.len(), 3);
        assert_eq!(search.total_results, 4);
        assert_eq!(search.search_query, "ice maker");
        assert!(search.message.contains("top 3"));
    }

    #[tokio::test]
    async fn test_search_empty_result_is_helpful() {
        let response = search(&tool(), "spray arm", Some(ApplianceType::Dishwasher), 8).await;
        let AgentResponse::Search(search) = response else {
            panic!("expected search response");
        };
        assert!(search.parts.is_empty());
        assert_eq!(search.total_results, 0);
        assert!(search.message.contains("model number"));
    }

    #[tokio::test]
    async fn test_search_without_query_asks() {
        let response = search(&tool(), "  ", None, 8).await;
        let AgentResponse::Search(search) = response else {
            panic!("expected search response");
        };
        assert_eq!(search.total_results, 0);
        assert!(search.message.starts_with("What part"));
    }
}
