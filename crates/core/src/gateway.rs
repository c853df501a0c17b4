//! Gateway trait — the abstraction over the hosted language model.
//!
//! A Gateway knows how to send the visitor's message, the conversation
//! history, and the assembled business instruction to a model API and get
//! the reply text plus token usage back.
//!
//! Implementations: Gemini generative-language API, test stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::message::Message;

/// The supported model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
}

impl ModelId {
    /// The wire identifier used by the model API and the pricing table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::Gemini25Flash
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelId {
    type Err = GatewayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gemini-2.5-flash" => Ok(Self::Gemini25Flash),
            "gemini-2.5-flash-lite" => Ok(Self::Gemini25FlashLite),
            other => Err(GatewayError::ModelNotFound(other.to_string())),
        }
    }
}

/// One complete request to the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The visitor message being answered
    pub new_message: String,

    /// Prior messages, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,

    /// The assembled system instruction (persona + business context)
    pub instruction: String,

    /// Which model to call
    pub model: ModelId,

    /// Cap on generated tokens
    pub max_output_tokens: u32,

    /// Functions the model may request (calendar lookup when enabled)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A function declaration sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The function name
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// JSON Schema describing the function's parameters
    pub parameters: serde_json::Value,
}

/// Raw token counts reported by the model API for one exchange.
///
/// `total_tokens` includes the prompt; output tokens are derived as
/// `total_tokens - prompt_tokens`, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// A complete reply from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The generated text
    pub text: String,

    /// Token usage, when the API reported it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenCounts>,
}

/// The core Gateway trait.
///
/// The session engine calls `complete()` without knowing which backend is
/// being used. Failures never propagate past the session boundary: the
/// caller substitutes a fixed user-facing error message and moves on.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// A human-readable name for this gateway (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and get the complete reply.
    async fn complete(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChatReply, GatewayError>;

    /// Rewrite a knowledge-base block more clearly and professionally,
    /// keeping it in Spanish. Returns the replacement text.
    ///
    /// Default implementation reports the capability as unavailable.
    async fn enhance(
        &self,
        _text: &str,
        _label: &str,
    ) -> std::result::Result<String, GatewayError> {
        Err(GatewayError::NotConfigured(format!(
            "Gateway '{}' does not support text enhancement",
            self.name()
        )))
    }

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, GatewayError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_wire_names() {
        assert_eq!(ModelId::Gemini25Flash.as_str(), "gemini-2.5-flash");
        assert_eq!(
            ModelId::Gemini25FlashLite.as_str(),
            "gemini-2.5-flash-lite"
        );
    }

    #[test]
    fn model_id_parses_wire_name() {
        let model: ModelId = "gemini-2.5-flash-lite".parse().unwrap();
        assert_eq!(model, ModelId::Gemini25FlashLite);
        assert!("gpt-4o".parse::<ModelId>().is_err());
    }

    #[test]
    fn model_id_serde_uses_wire_name() {
        let json = serde_json::to_string(&ModelId::Gemini25Flash).unwrap();
        assert_eq!(json, "\"gemini-2.5-flash\"");
        let back: ModelId = serde_json::from_str("\"gemini-2.5-flash-lite\"").unwrap();
        assert_eq!(back, ModelId::Gemini25FlashLite);
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "get_calendar_events".into(),
            description: "Consulta la disponibilidad del calendario".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "startDate": { "type": "string", "description": "ISO 8601" },
                    "endDate": { "type": "string", "description": "ISO 8601" }
                },
                "required": ["startDate", "endDate"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("get_calendar_events"));
        assert!(json.contains("startDate"));
    }

    #[test]
    fn reply_without_usage_deserializes() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"text":"Hola"}"#).unwrap();
        assert_eq!(reply.text, "Hola");
        assert!(reply.usage.is_none());
    }
}
