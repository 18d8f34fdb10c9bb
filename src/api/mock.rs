//! Deterministic scripted provider for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    ApiError, GenerateRequest, GenerateResponse, GenerativeProvider, StreamChunk,
    StreamingProvider, TokenUsage,
};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Single-shot text response
    Text(String),
    /// Streamed response, one chunk per entry, ending with `Done`
    Chunks(Vec<String>),
    /// Streamed response that delivers some chunks and then fails
    ChunksThenError(Vec<String>, String),
    /// The call itself fails
    Fail(String),
}

/// A provider that replays scripted replies and records every request
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_replies(replies: Vec<MockReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::default()
        }
    }

    /// Number of calls made (single-shot and streaming)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self, request: GenerateRequest) -> MockReply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| MockReply::Fail("mock script exhausted".to_string()))
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn send_request(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError> {
        let content = match self.next_reply(request) {
            MockReply::Text(text) => text,
            MockReply::Chunks(chunks) => chunks.concat(),
            MockReply::ChunksThenError(_, msg) | MockReply::Fail(msg) => {
                return Err(ApiError::Provider(msg))
            }
        };

        Ok(GenerateResponse {
            usage: TokenUsage::new(1, content.len() as u32),
            content,
            model: "mock".to_string(),
            truncated: false,
            finish_reason: None,
        })
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl StreamingProvider for MockProvider {
    async fn send_streaming(
        &self,
        request: GenerateRequest,
    ) -> Result<mpsc::Receiver<StreamChunk>, ApiError> {
        let (chunks, tail) = match self.next_reply(request) {
            MockReply::Text(text) => {
                let usage = TokenUsage::new(1, text.len() as u32);
                (vec![text], StreamChunk::Done(usage))
            }
            MockReply::Chunks(chunks) => {
                let usage = TokenUsage::new(1, chunks.concat().len() as u32);
                (chunks, StreamChunk::Done(usage))
            }
            MockReply::ChunksThenError(chunks, msg) => (chunks, StreamChunk::Error(msg)),
            MockReply::Fail(msg) => return Err(ApiError::Provider(msg)),
        };

        let (tx, rx) = mpsc::channel(chunks.len() + 1);
        for chunk in chunks {
            let _ = tx.send(StreamChunk::TextDelta(chunk)).await;
        }
        let _ = tx.send(tail).await;

        Ok(rx)
    }
}
