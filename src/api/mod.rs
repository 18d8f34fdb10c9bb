//! API abstraction layer for the hosted generative-language service

mod chat;
mod gemini;
mod request;
mod response;
mod sse;
mod streaming;

#[cfg(test)]
pub mod mock;

pub use chat::{ChatSession, TurnStream};
pub use gemini::{GeminiConfig, GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use request::{GenerateRequest, Message, Role};
pub use response::{FinishReason, GenerateResponse, TokenUsage};
pub use sse::{parse_sse_line, SseEvent};
pub use streaming::{StreamChunk, StreamingProvider};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for single-shot generation ("generate once")
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn send_request(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError>;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;
}

/// A provider that can serve both conversation and single-shot flows
pub trait ChatProvider: GenerativeProvider + StreamingProvider {}

impl<T: GenerativeProvider + StreamingProvider> ChatProvider for T {}
