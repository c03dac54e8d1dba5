//! Claude API integration.
//!
//! Used by the language-model intent classifier and the web-backed data
//! fetch tool. Both ask for JSON and validate it with serde, so the client
//! only needs the non-streaming Messages API.

mod client;
mod error;
mod types;

pub use client::{ClaudeClient, extract_json_object};
pub use error::ClaudeError;
pub use types::{ChatResponse, ContentBlock, Message, ServerTool, StopReason};
