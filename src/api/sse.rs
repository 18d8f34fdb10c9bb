//! Server-Sent Events (SSE) parser for `streamGenerateContent?alt=sse`
//!
//! Every event is a single `data: {...}` line holding a complete
//! `GenerateContentResponse`; text lives at `candidates[0].content.parts[*].text`.
//! The final event carries `finishReason` and `usageMetadata`.

use super::streaming::StreamChunk;
use super::{FinishReason, TokenUsage};
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use std::ops::ControlFlow;
use tokio::sync::mpsc;

/// One decoded SSE event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SseEvent {
    /// Text carried by this event, if any
    pub text: Option<String>,
    /// Usage stats (usually only on the final event)
    pub usage: Option<TokenUsage>,
    /// Finish reason (only on the final event)
    pub finish_reason: Option<FinishReason>,
}

/// SSE fields other than `data` that carry nothing for us
const IGNORED_FIELDS: [&str; 3] = ["event:", "id:", "retry:"];

/// Parse a single SSE line.
/// Returns None if the line should be skipped (comments, empty lines, event types).
/// Any other line that is not a `data:` field means the body is not an event stream.
pub fn parse_sse_line(line: &str) -> Option<Result<SseEvent, String>> {
    let line = line.trim();

    // Skip empty lines and SSE comments
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    if IGNORED_FIELDS.iter().any(|field| line.starts_with(field)) {
        return None;
    }

    let Some(data) = line.strip_prefix("data:") else {
        let preview: String = line.chars().take(80).collect();
        return Some(Err(format!("Unexpected non-SSE line: {}", preview)));
    };
    let data = data.trim_start();

    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(format!("JSON parse error: {}", e))),
    };

    if let Some(error) = json.get("error") {
        let msg = error["message"].as_str().unwrap_or("Unknown error");
        return Some(Err(msg.to_string()));
    }

    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Some(Err(format!("Prompt blocked: {}", reason)));
    }

    Some(Ok(SseEvent {
        text: candidate_text(&json),
        usage: json.get("usageMetadata").map(TokenUsage::from_metadata),
        finish_reason: json["candidates"][0]["finishReason"]
            .as_str()
            .map(FinishReason::from_wire),
    }))
}

/// Concatenate the text parts of the first candidate
pub(crate) fn candidate_text(json: &Value) -> Option<String> {
    let parts = json["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Split a byte stream into SSE lines and forward decoded chunks to `tx`.
///
/// Always finishes the channel with exactly one `Done` or `Error` chunk unless
/// the receiver was dropped. A body without a single event is an error.
pub(crate) async fn forward_sse<S, B, E>(mut stream: S, tx: mpsc::Sender<StreamChunk>)
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut buffer: Vec<u8> = Vec::new();
    let mut state = ForwardState::default();

    while let Some(chunk_result) = stream.next().await {
        let bytes = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx
                    .send(StreamChunk::Error(format!("Stream error: {}", e)))
                    .await;
                return;
            }
        };
        buffer.extend_from_slice(bytes.as_ref());

        // Process complete lines; a partial line (or partial UTF-8 sequence) stays buffered
        while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
            let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            if state.forward_line(&line, &tx).await.is_break() {
                return;
            }
        }
    }

    // Flush a trailing line without newline
    if !buffer.is_empty() {
        let line = String::from_utf8_lossy(&buffer).into_owned();
        if state.forward_line(&line, &tx).await.is_break() {
            return;
        }
    }

    let last = if state.events == 0 {
        StreamChunk::Error("Stream ended without any event".to_string())
    } else {
        StreamChunk::Done(state.usage)
    };
    let _ = tx.send(last).await;
}

#[derive(Default)]
struct ForwardState {
    usage: TokenUsage,
    events: usize,
}

impl ForwardState {
    /// Forward one line; `Break` once the channel has been closed out or dropped
    async fn forward_line(&mut self, line: &str, tx: &mpsc::Sender<StreamChunk>) -> ControlFlow<()> {
        let event = match parse_sse_line(line) {
            None => return ControlFlow::Continue(()),
            Some(Ok(event)) => event,
            Some(Err(msg)) => {
                let _ = tx.send(StreamChunk::Error(msg)).await;
                return ControlFlow::Break(());
            }
        };
        self.events += 1;

        if let Some(text) = event.text {
            if tx.send(StreamChunk::TextDelta(text)).await.is_err() {
                return ControlFlow::Break(()); // Receiver dropped
            }
        }
        if let Some(usage) = event.usage {
            self.usage = usage;
        }
        if let Some(reason @ (FinishReason::Safety | FinishReason::Recitation)) = event.finish_reason {
            let _ = tx
                .send(StreamChunk::Error(format!("Response stopped: {:?}", reason)))
                .await;
            return ControlFlow::Break(());
        }

        ControlFlow::Continue(())
    }
}
