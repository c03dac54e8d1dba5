//! Intent classification.
//!
//! A classifier turns one message plus a short window of prior turns into a
//! [`ClassifiedIntent`]. Two implementations ship:
//!
//! - [`KeywordClassifier`]: deterministic signal sets and regex extraction.
//! - [`LlmClassifier`]: Claude Haiku, validated into closed enums, then
//!   enriched with the same regex extraction and history resolution.

mod entities;
mod keyword;
mod llm;
mod signals;

use async_trait::async_trait;
use parts_assist_core::{ClassifiedIntent, ConversationTurn};
use thiserror::Error;

use crate::claude::ClaudeError;

pub use entities::{
    extract_brand, extract_model_numbers, extract_part_numbers, mentions_reference,
    resolve_from_history,
};
pub use keyword::KeywordClassifier;
pub use llm::LlmClassifier;
pub use signals::{
    ApplianceSignal, appliance_signal, mentions_out_of_scope, names_supported_appliance,
};

/// Errors that can occur during classification.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The classifier answered with something we could not validate.
    #[error("invalid classifier response: {0}")]
    Invalid(String),

    /// The classifier backend is throttling us.
    #[error("classifier rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The classifier backend is unreachable or rejected our credentials.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

impl ClassificationError {
    /// Whether the failure is infrastructure-wide rather than about this message.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<ClaudeError> for ClassificationError {
    fn from(err: ClaudeError) -> Self {
        match err {
            ClaudeError::RateLimited(secs) => Self::RateLimited(secs),
            e if e.is_unavailable() => Self::Unavailable(e.to_string()),
            e => Self::Invalid(e.to_string()),
        }
    }
}

/// Classifies a message into one of the six intent categories.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify `message`, using `history` (oldest first) to resolve
    /// references like "it" or "this part".
    async fn classify(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ClassifiedIntent, ClassificationError>;
}
