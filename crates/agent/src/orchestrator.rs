//! Dispatcher: classify a message and route it to one handler.

use std::sync::Arc;

use parts_assist_core::{
    AgentResponse, ClassifiedIntent, Confidence, ConversationTurn, IntentCategory, recent_turns,
};
use tracing::{field, info, instrument, warn};

use crate::classifier::{ClassificationError, IntentClassifier};
use crate::config::AgentSettings;
use crate::fetch::{DataFetchTool, TimeLimited};
use crate::handlers;

/// Static decline for out-of-scope messages.
pub const OFF_TOPIC_MESSAGE: &str = "I can only help with refrigerator and dishwasher parts: \
                                     finding parts, checking compatibility, installation and \
                                     troubleshooting. What can I help you with for your \
                                     refrigerator or dishwasher?";

/// Reply when a message could not be classified.
pub const REPHRASE_MESSAGE: &str = "Sorry, I didn't quite catch that. Could you rephrase your \
                                    question about your refrigerator or dishwasher?";

/// Routes each message to the handler for its intent.
#[derive(Clone)]
pub struct Orchestrator {
    classifier: Arc<dyn IntentClassifier>,
    tool: Arc<dyn DataFetchTool>,
    history_window: usize,
    search_max_results: usize,
}

impl Orchestrator {
    /// Create an orchestrator. Every tool call is bounded by
    /// `settings.fetch_timeout`.
    #[must_use]
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        tool: Arc<dyn DataFetchTool>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            classifier,
            tool: Arc::new(TimeLimited::new(tool, settings.fetch_timeout)),
            history_window: settings.history_window,
            search_max_results: settings.search_max_results,
        }
    }

    /// Classify `message` against the recent `history` window.
    ///
    /// # Errors
    ///
    /// Returns an error only when the classifier backend is unavailable.
    /// Other classification failures read as an off-topic intent.
    pub async fn classify(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ClassifiedIntent, ClassificationError> {
        let window = recent_turns(history, self.history_window);
        self.classifier.classify(message, window).await
    }

    /// Answer one message.
    ///
    /// # Errors
    ///
    /// Returns an error only when the classifier backend is unavailable.
    #[instrument(
        skip_all,
        fields(
            category = field::Empty,
            confidence = field::Empty,
            response_type = field::Empty
        )
    )]
    pub async fn handle(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<AgentResponse, ClassificationError> {
        let intent = match self.classify(message, history).await {
            Ok(intent) => intent,
            Err(e) if e.is_unavailable() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Classification failed");
                return Ok(AgentResponse::off_topic(REPHRASE_MESSAGE));
            }
        };

        let span = tracing::Span::current();
        span.record("category", intent.category.as_str());
        span.record("confidence", field::display(intent.confidence));

        let response = self.dispatch(intent).await;
        span.record("response_type", response.kind());
        info!("Handled message");
        Ok(response)
    }

    /// Run the handler for an already-classified intent.
    pub async fn dispatch(&self, intent: ClassifiedIntent) -> AgentResponse {
        let tool = self.tool.as_ref();
        let ClassifiedIntent {
            category,
            confidence,
            extracted,
        } = intent;

        match category {
            IntentCategory::OffTopic => AgentResponse::off_topic(OFF_TOPIC_MESSAGE),
            IntentCategory::Search => {
                // An uncertain appliance guess should not hide results.
                let appliance = match confidence {
                    Confidence::High => extracted.appliance_type,
                    Confidence::Low => None,
                };
                handlers::search(
                    tool,
                    extracted.search_query.as_deref().unwrap_or_default(),
                    appliance,
                    self.search_max_results,
                )
                .await
            }
            IntentCategory::PartDetails => {
                handlers::details(tool, extracted.part_number.as_ref()).await
            }
            IntentCategory::Compatibility => {
                handlers::check(
                    tool,
                    extracted.part_number.as_ref(),
                    extracted.model_number.as_ref(),
                    extracted.appliance_type,
                )
                .await
            }
            IntentCategory::Installation => {
                handlers::guide(tool, extracted.part_number.as_ref()).await
            }
            IntentCategory::Troubleshooting => {
                handlers::diagnose(
                    tool,
                    extracted.appliance_type,
                    extracted.brand.as_deref(),
                    extracted.symptom.as_deref(),
                )
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parts_assist_core::{ApplianceType, ExtractedEntities};
    use url::Url;

    use super::*;
    use crate::classifier::KeywordClassifier;
    use crate::fetch::{Catalog, CatalogFetchTool};

    struct Failing(fn() -> ClassificationError);

    #[async_trait]
    impl IntentClassifier for Failing {
        async fn classify(
            &self,
            _message: &str,
            _history: &[ConversationTurn],
        ) -> Result<ClassifiedIntent, ClassificationError> {
            Err((self.0)())
        }
    }

    fn catalog_tool() -> Arc<dyn DataFetchTool> {
        let catalog = Catalog::from_yaml_str(
            r#"
parts:
  - part_number: PS11701542
    name: Ice Maker Assembly
    price: "129.95"
    image_url: ""
    manufacturer: Whirlpool
    in_stock: true
    product_url: /PS11701542.htm
    appliance_type: refrigerator
    search_terms: [ice maker]
"#,
        )
        .expect("catalog");
        Arc::new(
            CatalogFetchTool::new(catalog, &Url::parse("https://www.partselect.com").expect("url"))
                .expect("valid catalog"),
        )
    }

    fn orchestrator(classifier: Arc<dyn IntentClassifier>) -> Orchestrator {
        Orchestrator::new(classifier, catalog_tool(), &AgentSettings::default())
    }

    #[tokio::test]
    async fn test_off_topic_decline_names_only_supported_appliances() {
        let response = orchestrator(Arc::new(KeywordClassifier::new()))
            .handle("My oven is broken", &[])
            .await
            .expect("handled");
        assert_eq!(response.kind(), "off_topic");
        assert!(response.message().contains("refrigerator"));
        assert!(response.message().contains("dishwasher"));
        assert!(!response.message().contains("oven"));
    }

    #[tokio::test]
    async fn test_invalid_classification_asks_to_rephrase() {
        let classifier = Failing(|| ClassificationError::Invalid("garbage".to_string()));
        let response = orchestrator(Arc::new(classifier))
            .handle("anything", &[])
            .await
            .expect("handled");
        assert_eq!(response, AgentResponse::off_topic(REPHRASE_MESSAGE));

        let classifier = Failing(|| ClassificationError::RateLimited(30));
        let response = orchestrator(Arc::new(classifier))
            .handle("anything", &[])
            .await
            .expect("handled");
        assert_eq!(response.kind(), "off_topic");
    }

    #[tokio::test]
    async fn test_unavailable_classifier_is_an_error() {
        let classifier =
            Failing(|| ClassificationError::Unavailable("connection refused".to_string()));
        let result = orchestrator(Arc::new(classifier)).handle("anything", &[]).await;
        assert!(matches!(result, Err(ClassificationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_low_confidence_search_is_unfiltered() {
        let intent = ClassifiedIntent::new(
            IntentCategory::Search,
            Confidence::Low,
            ExtractedEntities {
                appliance_type: Some(ApplianceType::Dishwasher),
                search_query: Some("ice maker".to_string()),
                ..ExtractedEntities::default()
            },
        );
        let response = orchestrator(Arc::new(KeywordClassifier::new()))
            .dispatch(intent)
            .await;
        let AgentResponse::Search(search) = response else {
            panic!("expected search");
        };
        assert_eq!(search.total_results, 1);
        assert!(search.appliance_type.is_none());
    }
}
