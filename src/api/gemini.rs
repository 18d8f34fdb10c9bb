//! Gemini (`generativelanguage.googleapis.com`) API provider

use super::sse::{candidate_text, forward_sse};
use super::streaming::{StreamChunk, StreamingProvider};
use super::{
    ApiError, FinishReason, GenerateRequest, GenerateResponse, GenerativeProvider, TokenUsage,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: String,
    /// Model to use (e.g., "gemini-2.5-flash")
    pub model: String,
    /// Base URL (default: https://generativelanguage.googleapis.com/v1beta)
    pub base_url: Option<String>,
    /// Maximum tokens for response
    pub max_output_tokens: Option<u32>,
    /// Temperature for generation
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            max_output_tokens: None,
            temperature: None,
        }
    }
}

/// Gemini API provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Same credentials and endpoint, different model
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            config: GeminiConfig {
                model: model.into(),
                ..self.config.clone()
            },
            client: self.client.clone(),
        }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url(), self.config.model, method)
    }

    pub(crate) fn build_request(&self, request: &GenerateRequest) -> Value {
        let mut contents: Vec<Value> = request
            .messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "parts": [{ "text": msg.content }]
                })
            })
            .collect();

        contents.push(json!({
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }));

        let mut body = json!({ "contents": contents });

        if let Some(system) = &request.system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = self.config.temperature {
            generation_config.insert("temperature".into(), json!(temp));
        }
        if let Some(max_tokens) = self.config.max_output_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(max_tokens));
        }
        if let Some(mime) = &request.response_mime_type {
            generation_config.insert("responseMimeType".into(), json!(mime));
        }
        if let Some(schema) = &request.response_schema {
            generation_config.insert("responseSchema".into(), schema.clone());
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }

    pub(crate) fn parse_response(&self, json: Value) -> Result<GenerateResponse, ApiError> {
        if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
            return Err(ApiError::Provider(format!("Prompt blocked: {}", reason)));
        }

        let finish_reason = json["candidates"][0]["finishReason"]
            .as_str()
            .map(FinishReason::from_wire);

        let usage = json
            .get("usageMetadata")
            .map(TokenUsage::from_metadata)
            .unwrap_or_default();

        Ok(GenerateResponse {
            content: candidate_text(&json).unwrap_or_default(),
            usage,
            model: json["modelVersion"]
                .as_str()
                .unwrap_or(&self.config.model)
                .to_string(),
            truncated: finish_reason == Some(FinishReason::MaxTokens),
            finish_reason,
        })
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Response, ApiError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        warn!(%status, "Gemini request failed");
        Err(status_error(status, error_text))
    }
}

/// Map a non-success status to the matching error kind
fn status_error(status: StatusCode, body: String) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::Auth(format!("{}: {}", status, body)),
        429 => ApiError::RateLimited {
            retry_after_secs: 60,
        },
        _ => ApiError::Provider(format!("{}: {}", status, body)),
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn send_request(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError> {
        let url = self.endpoint("generateContent");
        let body = self.build_request(&request);
        debug!(model = %self.config.model, structured = request.is_structured(), "generateContent");

        let response = self.post(&url, &body).await?;
        let json: Value = response.json().await?;
        self.parse_response(json)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl StreamingProvider for GeminiProvider {
    async fn send_streaming(
        &self,
        request: GenerateRequest,
    ) -> Result<mpsc::Receiver<StreamChunk>, ApiError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let body = self.build_request(&request);
        debug!(model = %self.config.model, history = request.messages.len(), "streamGenerateContent");

        let response = self.post(&url, &body).await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            forward_sse(response.bytes_stream(), tx).await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Message;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(GeminiConfig {
            api_key: "test-key".to_string(),
            temperature: Some(0.5),
            ..GeminiConfig::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_endpoint() {
        let provider = provider();
        assert_eq!(
            provider.endpoint("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            provider.with_model("gemini-2.0-pro").endpoint("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-pro:generateContent"
        );
    }

    #[test]
    fn test_build_request_with_history_and_system() {
        let request = GenerateRequest::new("And then?")
            .with_system("You are a tutor.")
            .with_history(vec![Message::user("Hi"), Message::model("Hello!")]);

        let body = provider().build_request(&request);

        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "And then?");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a tutor.");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_build_request_with_schema() {
        let request = GenerateRequest::new("plan").with_json_schema(json!({"type": "ARRAY"}));
        let body = provider().build_request(&request);

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Short " }, { "text": "summary" }], "role": "model" },
                "finishReason": "MAX_TOKENS"
            }],
            "usageMetadata": { "promptTokenCount": 100, "candidatesTokenCount": 20 },
            "modelVersion": "gemini-2.5-flash-001"
        });

        let response = provider().parse_response(json).unwrap();
        assert_eq!(response.content, "Short summary");
        assert!(response.truncated);
        assert_eq!(response.usage.total_tokens, 120);
        assert_eq!(response.model, "gemini-2.5-flash-001");
    }

    #[test]
    fn test_parse_blocked_response() {
        let json = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            provider().parse_response(json),
            Err(ApiError::Provider(msg)) if msg.contains("SAFETY")
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, String::new()),
            ApiError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ApiError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            ApiError::Provider(msg) if msg.contains("boom")
        ));
    }
}
