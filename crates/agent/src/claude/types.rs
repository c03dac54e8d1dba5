//! Types for the Claude Messages API.

use serde::{Deserialize, Serialize};

/// A message in a conversation with Claude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender ("user" or "assistant").
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A content block in a response.
///
/// Server tool activity (`server_tool_use`, `web_search_tool_result`,
/// `web_fetch_tool_result`) is folded into [`ContentBlock::Other`]; only
/// the text is consumed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Server tool invocation made by the model.
    #[serde(rename = "server_tool_use")]
    ServerToolUse {
        /// Tool use ID.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input.
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// An Anthropic-hosted tool the model may call while answering.
#[derive(Debug, Clone, Serialize)]
pub struct ServerTool {
    /// Versioned tool type.
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Tool name.
    pub name: String,
    /// Cap on invocations per request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    /// Domains the tool may touch.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_domains: Vec<String>,
}

impl ServerTool {
    /// Web search restricted to `allowed_domains`.
    #[must_use]
    pub fn web_search(allowed_domains: Vec<String>, max_uses: u32) -> Self {
        Self {
            tool_type: "web_search_20250305".to_string(),
            name: "web_search".to_string(),
            max_uses: Some(max_uses),
            allowed_domains,
        }
    }

    /// Page fetch restricted to `allowed_domains`.
    #[must_use]
    pub fn web_fetch(allowed_domains: Vec<String>, max_uses: u32) -> Self {
        Self {
            tool_type: "web_fetch_20250910".to_string(),
            name: "web_fetch".to_string(),
            max_uses: Some(max_uses),
            allowed_domains,
        }
    }
}

/// Request body for the Claude Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Server tools the model may use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ServerTool>>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response from the Claude Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique response ID.
    pub id: String,
    /// Model that generated the response.
    pub model: String,
    /// Reason the response stopped.
    pub stop_reason: Option<StopReason>,
    /// Response content blocks.
    pub content: Vec<ContentBlock>,
    /// Token usage information.
    pub usage: Usage,
}

impl ChatResponse {
    /// All text blocks joined together.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// Max tokens reached.
    MaxTokens,
    /// Stop sequence encountered.
    StopSequence,
    /// Tool use requested.
    ToolUse,
    /// A long server-tool turn was paused.
    PauseTurn,
    /// The model declined to answer.
    Refusal,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_tool_serialization() {
        let tool = ServerTool::web_fetch(vec!["www.partselect.com".to_string()], 5);
        let json = serde_json::to_value(&tool).expect("serialize");
        assert_eq!(json["type"], "web_fetch_20250910");
        assert_eq!(json["name"], "web_fetch");
        assert_eq!(json["max_uses"], 5);
        assert_eq!(json["allowed_domains"][0], "www.partselect.com");
    }

    #[test]
    fn test_request_omits_empty_options() {
        let request = ChatRequest {
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 100,
            messages: vec![Message::user("hi")],
            system: None,
            tools: None,
            temperature: None,
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("system"));
        assert!(!json.contains("tools"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_response_with_server_tool_blocks() {
        let json = r#"{
            "id": "msg_1",
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "content": [
                {"type": "server_tool_use", "id": "srv_1", "name": "web_fetch", "input": {"url": "https://www.partselect.com"}},
                {"type": "web_fetch_tool_result", "tool_use_id": "srv_1", "content": {}},
                {"type": "text", "text": "{\"parts\": "},
                {"type": "text", "text": "[]}"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.content.len(), 4);
        assert_eq!(response.text(), "{\"parts\": []}");
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }

    #[test]
    fn test_stop_reason_deserialization() {
        let reason: StopReason = serde_json::from_str("\"pause_turn\"").expect("deserialize");
        assert_eq!(reason, StopReason::PauseTurn);
    }
}
