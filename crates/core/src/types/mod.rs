//! Core types for Parts Assist.
//!
//! This module provides type-safe wrappers for the support agent's domain.

pub mod appliance;
pub mod conversation;
pub mod identifier;
pub mod intent;
pub mod part;
pub mod response;

pub use appliance::ApplianceType;
pub use conversation::{ConversationTurn, Role, recent_turns};
pub use identifier::{IdentifierError, ModelNumber, PartNumber};
pub use intent::{ClassifiedIntent, Confidence, ExtractedEntities, IntentCategory};
pub use part::{InstallDifficulty, PartDetail, PartSummary};
pub use response::{
    AgentResponse, CompatibilityConfidence, CompatibilityResponse, DiagnosisResponse,
    DiyDifficulty, InstallationResponse, InstallationStep, OffTopicResponse, PartDetailsResponse,
    SearchResponse,
};
