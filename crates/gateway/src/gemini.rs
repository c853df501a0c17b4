//! Gemini generative-language API client.
//!
//! Posts one `generateContent` request per exchange: the conversation
//! history plus the new visitor message as `contents`, the assembled
//! business instruction as `systemInstruction`, and the calendar function
//! declarations as `tools` when the integration is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mostrador_core::{
    ChatReply, ChatRequest, Gateway, GatewayError, Message, ModelId, Role, TokenCounts,
    ToolDefinition,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling parameters applied to every chat completion.
const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.9;
const TOP_K: u32 = 40;

/// Token allowance for the model's internal reasoning pass.
const THINKING_BUDGET: u32 = 50;

/// Generation cap for the enhancement rewrite.
const ENHANCE_MAX_TOKENS: u32 = 800;

/// The Gemini-backed gateway.
pub struct GeminiGateway {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint. Used by tests and proxies.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Convert transcript messages plus the new visitor message into API
    /// contents. Assistant turns map to the `model` role.
    fn to_api_contents(history: &[Message], new_message: &str) -> Vec<ApiContent> {
        let mut contents: Vec<ApiContent> = history
            .iter()
            .map(|m| ApiContent {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "model".into(),
                },
                parts: vec![ApiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        contents.push(ApiContent {
            role: "user".into(),
            parts: vec![ApiPart {
                text: new_message.to_string(),
            }],
        });

        contents
    }

    /// Wrap tool definitions in the API's function-declaration envelope.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiTool> {
        vec![ApiTool {
            function_declarations: tools
                .iter()
                .map(|t| ApiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    }

    async fn generate(
        &self,
        model: ModelId,
        body: &ApiRequest,
    ) -> std::result::Result<ApiResponse, GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            model.as_str()
        );

        debug!(model = %model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(e.to_string())
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GatewayError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(GatewayError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status == 404 {
            return Err(GatewayError::ModelNotFound(model.as_str().into()));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(GatewayError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        response.json().await.map_err(|e| GatewayError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })
    }
}

#[async_trait]
impl Gateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChatReply, GatewayError> {
        let body = ApiRequest {
            contents: Self::to_api_contents(&request.history, &request.new_message),
            system_instruction: Some(ApiSystemInstruction {
                parts: vec![ApiPart {
                    text: request.instruction.clone(),
                }],
            }),
            generation_config: ApiGenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                thinking_config: Some(ApiThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                }),
            },
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(Self::to_api_tools(&request.tools))
            },
        };

        let api_response = self.generate(request.model, &body).await?;

        let text = api_response.text().ok_or(GatewayError::EmptyReply)?;

        let usage = api_response.usage_metadata.map(|u| TokenCounts {
            prompt_tokens: u.prompt_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ChatReply { text, usage })
    }

    async fn enhance(
        &self,
        text: &str,
        label: &str,
    ) -> std::result::Result<String, GatewayError> {
        let prompt = format!(
            "Mejora el siguiente texto para la sección \"{label}\" de la base \
             de conocimiento de un negocio. Hazlo más claro, profesional y \
             conciso, conservando toda la información importante. Responde \
             únicamente con el texto mejorado, en español, sin explicaciones \
             adicionales.\n\nTexto original:\n{text}"
        );

        let body = ApiRequest {
            contents: vec![ApiContent {
                role: "user".into(),
                parts: vec![ApiPart { text: prompt }],
            }],
            system_instruction: None,
            generation_config: ApiGenerationConfig {
                max_output_tokens: ENHANCE_MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                thinking_config: None,
            },
            tools: None,
        };

        let api_response = self.generate(ModelId::Gemini25Flash, &body).await?;
        let improved = api_response.text().ok_or(GatewayError::EmptyReply)?;

        Ok(improved.trim().to_string())
    }

    async fn health_check(&self) -> std::result::Result<bool, GatewayError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction>,
    generation_config: ApiGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    role: String,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
    top_p: f64,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ApiThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    function_declarations: Vec<ApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsageMetadata>,
}

impl ApiResponse {
    /// The reply text: all text parts of the first candidate, joined.
    /// `None` when the response carries no usable text.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_body(request: &ChatRequest) -> serde_json::Value {
        let body = ApiRequest {
            contents: GeminiGateway::to_api_contents(
                &request.history,
                &request.new_message,
            ),
            system_instruction: Some(ApiSystemInstruction {
                parts: vec![ApiPart {
                    text: request.instruction.clone(),
                }],
            }),
            generation_config: ApiGenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                thinking_config: Some(ApiThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                }),
            },
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(GeminiGateway::to_api_tools(&request.tools))
            },
        };
        serde_json::to_value(&body).unwrap()
    }

    fn basic_request() -> ChatRequest {
        ChatRequest {
            new_message: "¿Tienen promociones?".into(),
            history: vec![
                Message::user("Hola"),
                Message::assistant("¡Hola! ¿En qué puedo ayudarte?"),
            ],
            instruction: "Eres un asistente amigable.".into(),
            model: ModelId::Gemini25Flash,
            max_output_tokens: 400,
            tools: Vec::new(),
        }
    }

    #[test]
    fn assistant_history_maps_to_model_role() {
        let request = basic_request();
        let contents =
            GeminiGateway::to_api_contents(&request.history, &request.new_message);

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].role, "user");
        assert_eq!(contents[2].parts[0].text, "¿Tienen promociones?");
    }

    #[test]
    fn body_serializes_camel_case_generation_config() {
        let body = request_body(&basic_request());
        let config = &body["generationConfig"];

        assert_eq!(config["maxOutputTokens"], 400);
        assert_eq!(config["thinkingConfig"]["thinkingBudget"], 50);
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-10);
        assert!((config["topP"].as_f64().unwrap() - 0.9).abs() < 1e-10);
        assert_eq!(config["topK"], 40);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "Eres un asistente amigable."
        );
    }

    #[test]
    fn tools_are_omitted_when_empty() {
        let body = request_body(&basic_request());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn tools_serialize_as_function_declarations() {
        let mut request = basic_request();
        request.tools = vec![ToolDefinition {
            name: "get_calendar_events".into(),
            description: "Obtiene eventos del calendario".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "startDate": { "type": "string" },
                    "endDate": { "type": "string" }
                },
                "required": ["startDate", "endDate"]
            }),
        }];

        let body = request_body(&request);
        let declaration = &body["tools"][0]["functionDeclarations"][0];
        assert_eq!(declaration["name"], "get_calendar_events");
        assert_eq!(declaration["parameters"]["required"][0], "startDate");
    }

    #[test]
    fn parse_response_with_usage() {
        let data = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "¡Claro que sí!" }], "role": "model" } }
            ],
            "usageMetadata": { "promptTokenCount": 100, "totalTokenCount": 150 }
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();

        assert_eq!(parsed.text().as_deref(), Some("¡Claro que sí!"));
        let usage = parsed.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 100);
        assert_eq!(usage.total_token_count, 150);
    }

    #[test]
    fn parse_response_without_usage() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hola"}]}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Hola"));
        assert!(parsed.usage_metadata.is_none());
    }

    #[test]
    fn multi_part_candidate_joins_text() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hola, "},{"text":"¿qué tal?"}]}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Hola, ¿qué tal?"));
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(parsed.text().is_none());

        let parsed: ApiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.text().is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = GeminiGateway::with_base_url("key", "http://localhost:9999/v1/");
        assert_eq!(gateway.base_url, "http://localhost:9999/v1");
        assert_eq!(gateway.name(), "gemini");
    }
}
