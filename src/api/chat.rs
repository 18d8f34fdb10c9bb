//! Conversation sessions on top of a streaming provider
//!
//! The service is stateless over HTTP, so a session keeps the system
//! instruction and the committed history itself and replays them with every
//! new turn. Callers only ever hand over the new user text.

use super::{ApiError, ChatProvider, GenerateRequest, Message, StreamChunk, TokenUsage};
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;

/// A conversation with one fixed system instruction
pub struct ChatSession {
    provider: Arc<dyn ChatProvider>,
    system_instruction: String,
    history: Vec<Message>,
}

impl ChatSession {
    /// Create a session bound to `system_instruction` and seeded with `history`
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        system_instruction: impl Into<String>,
        history: Vec<Message>,
    ) -> Self {
        Self {
            provider,
            system_instruction: system_instruction.into(),
            history,
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Committed turns, oldest first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Send `text` as the next user turn and stream the reply.
    ///
    /// The exchange is added to the session history only once the returned
    /// stream finishes cleanly; a failed turn leaves the history untouched.
    pub async fn send_message_stream(&mut self, text: &str) -> Result<TurnStream<'_>, ApiError> {
        let request = GenerateRequest::new(text)
            .with_system(self.system_instruction.clone())
            .with_history(self.history.clone());

        let rx = self.provider.send_streaming(request).await?;

        Ok(TurnStream {
            session: self,
            chunks: ReceiverStream::new(rx),
            user_text: text.to_string(),
            reply: String::new(),
            usage: None,
            finished: false,
        })
    }

    fn commit(&mut self, user_text: String, reply: String) {
        // Empty model turns are rejected by the service on replay
        if reply.is_empty() {
            debug!("skipping commit of empty reply");
            return;
        }
        self.history.push(Message::user(user_text));
        self.history.push(Message::model(reply));
    }
}

/// The reply to one turn: a finite, non-restartable sequence of text chunks
pub struct TurnStream<'a> {
    session: &'a mut ChatSession,
    chunks: ReceiverStream<StreamChunk>,
    user_text: String,
    reply: String,
    usage: Option<TokenUsage>,
    finished: bool,
}

impl TurnStream<'_> {
    /// Next text chunk in arrival order.
    ///
    /// Returns `None` after a clean end of stream. An `Err` ends the stream;
    /// every later call returns `None`.
    pub async fn next_chunk(&mut self) -> Option<Result<String, ApiError>> {
        if self.finished {
            return None;
        }

        match self.chunks.next().await {
            Some(StreamChunk::TextDelta(text)) => {
                self.reply.push_str(&text);
                Some(Ok(text))
            }
            Some(StreamChunk::Done(usage)) => {
                self.finished = true;
                self.usage = Some(usage);
                let user_text = std::mem::take(&mut self.user_text);
                let reply = self.reply.clone();
                self.session.commit(user_text, reply);
                None
            }
            Some(StreamChunk::Error(msg)) => {
                self.finished = true;
                Some(Err(ApiError::Stream(msg)))
            }
            None => {
                self.finished = true;
                Some(Err(ApiError::Stream(
                    "stream closed before completion".to_string(),
                )))
            }
        }
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.reply
    }

    /// Usage reported at the end of a clean stream
    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockProvider, MockReply};
    use crate::api::Role;

    fn chunks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn test_clean_stream_commits_turn() {
        let mock = MockProvider::from_replies(vec![MockReply::Chunks(chunks(&["Hel", "lo"]))]);
        let mut session = ChatSession::new(Arc::new(mock.clone()), "persona", Vec::new());

        let mut stream = session.send_message_stream("hi").await.unwrap();
        let mut received = Vec::new();
        while let Some(chunk) = stream.next_chunk().await {
            received.push(chunk.unwrap());
        }
        assert_eq!(received, vec!["Hel", "lo"]);
        assert_eq!(stream.text(), "Hello");
        assert!(stream.usage().is_some());
        assert!(stream.next_chunk().await.is_none());

        assert_eq!(
            session.history(),
            &[Message::user("hi"), Message::model("Hello")]
        );
    }

    #[tokio::test]
    async fn test_history_replayed_on_next_turn() {
        let mock = MockProvider::from_replies(vec![
            MockReply::Chunks(chunks(&["first"])),
            MockReply::Chunks(chunks(&["second"])),
        ]);
        let mut session = ChatSession::new(Arc::new(mock.clone()), "persona", Vec::new());

        for text in ["one", "two"] {
            let mut stream = session.send_message_stream(text).await.unwrap();
            while stream.next_chunk().await.is_some() {}
        }

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].messages.is_empty());
        assert_eq!(requests[1].prompt, "two");
        assert_eq!(requests[1].messages.len(), 2);
        assert_eq!(requests[1].messages[1].role, Role::Model);
        assert_eq!(requests[1].system.as_deref(), Some("persona"));
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_history_untouched() {
        let mock = MockProvider::from_replies(vec![MockReply::ChunksThenError(
            chunks(&["partial"]),
            "boom".to_string(),
        )]);
        let mut session = ChatSession::new(Arc::new(mock), "persona", Vec::new());

        let mut stream = session.send_message_stream("hi").await.unwrap();
        assert_eq!(stream.next_chunk().await.unwrap().unwrap(), "partial");
        assert!(matches!(
            stream.next_chunk().await,
            Some(Err(ApiError::Stream(msg))) if msg == "boom"
        ));
        assert!(stream.next_chunk().await.is_none());

        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_request_failure_surfaces() {
        let mock = MockProvider::from_replies(vec![MockReply::Fail("offline".to_string())]);
        let mut session = ChatSession::new(Arc::new(mock), "persona", Vec::new());

        let result = session.send_message_stream("hi").await;
        assert!(matches!(result, Err(ApiError::Provider(_))));
        assert!(session.history().is_empty());
    }
}
