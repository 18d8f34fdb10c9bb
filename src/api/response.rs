//! API response structures

use serde::{Deserialize, Serialize};

/// Response from the generative-language service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text (concatenation of all candidate parts)
    pub content: String,

    /// Token usage statistics
    pub usage: TokenUsage,

    /// Model that generated the response
    pub model: String,

    /// Whether the response was truncated
    pub truncated: bool,

    /// Finish reason reported by the service
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the response
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

impl FinishReason {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" => FinishReason::Safety,
            "RECITATION" => FinishReason::Recitation,
            _ => FinishReason::Other,
        }
    }
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Read `usageMetadata` from a service payload
    pub fn from_metadata(metadata: &serde_json::Value) -> Self {
        let count = |field: &str| {
            metadata[field]
                .as_u64()
                .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
        };
        Self::new(count("promptTokenCount"), count("candidatesTokenCount"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_from_metadata() {
        let usage = TokenUsage::from_metadata(&json!({
            "promptTokenCount": 12,
            "candidatesTokenCount": 30,
            "totalTokenCount": 42
        }));
        assert_eq!(usage, TokenUsage::new(12, 30));
        assert_eq!(usage.total_tokens, 42);
    }

    #[test]
    fn test_finish_reason_from_wire() {
        assert_eq!(FinishReason::from_wire("MAX_TOKENS"), FinishReason::MaxTokens);
        assert_eq!(FinishReason::from_wire("BLOCKLIST"), FinishReason::Other);
    }

    #[test]
    fn test_usage_saturates_on_oversized_counts() {
        let usage = TokenUsage::from_metadata(&json!({
            "promptTokenCount": u64::from(u32::MAX) + 10,
            "candidatesTokenCount": 5
        }));
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.total_tokens, u32::MAX);
    }
}
