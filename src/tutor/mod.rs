//! Tutor panel: streaming conversation with a fixed tutor persona
//!
//! Each accepted submission appends exactly one user turn and one assistant
//! turn to the transcript. The assistant turn grows chunk by chunk while the
//! reply streams in and is replaced by an apology if the turn fails.

mod transcript;

pub use transcript::{Speaker, Transcript, Turn};

use crate::api::{ChatProvider, ChatSession, TokenUsage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persona the tutor session is bound to
pub const TUTOR_PERSONA: &str = "You are a friendly and encouraging AI tutor for students. \
Explain concepts clearly, provide helpful examples, and guide students to find answers \
themselves when appropriate. Your tone should be patient and supportive.";

/// Shown in place of the reply when a turn fails
pub const TUTOR_APOLOGY: &str = "Sorry, something went wrong. Please try again.";

/// Result of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty input or a request already pending; nothing changed
    Ignored,
    /// The reply streamed to completion
    Completed { usage: Option<TokenUsage> },
    /// The reply failed and was replaced by [`TUTOR_APOLOGY`]
    Failed,
}

/// Conversation state owned by one tutor panel
pub struct TutorPanel {
    provider: Arc<dyn ChatProvider>,
    system_instruction: String,
    session: Option<ChatSession>,
    transcript: Transcript,
    pending: bool,
}

impl TutorPanel {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            system_instruction: TUTOR_PERSONA.to_string(),
            session: None,
            transcript: Transcript::new(),
            pending: false,
        }
    }

    /// Override the persona used when the session is created
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The live session, if one has been created
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Drop the session and transcript (the panel was torn down)
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("tutor session released");
        }
        self.transcript.clear();
        self.pending = false;
    }

    /// Submit one user turn and stream the reply into the transcript.
    ///
    /// `on_update` is called with the transcript after the user turn is
    /// appended, after the placeholder is appended and after every applied
    /// chunk, so callers can redraw incrementally.
    pub async fn submit_turn<F>(&mut self, user_text: &str, mut on_update: F) -> TurnOutcome
    where
        F: FnMut(&Transcript),
    {
        if user_text.trim().is_empty() || self.pending {
            return TurnOutcome::Ignored;
        }

        self.pending = true;
        let outcome = self.run_turn(user_text, &mut on_update).await;
        self.pending = false;

        outcome
    }

    async fn run_turn<F>(&mut self, user_text: &str, on_update: &mut F) -> TurnOutcome
    where
        F: FnMut(&Transcript),
    {
        let Self {
            provider,
            system_instruction,
            session,
            transcript,
            ..
        } = self;

        let session = session.get_or_insert_with(|| {
            info!("creating tutor session");
            ChatSession::new(Arc::clone(provider), system_instruction.clone(), Vec::new())
        });

        transcript.push(Turn::user(user_text));
        on_update(transcript);

        let mut stream = match session.send_message_stream(user_text).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "tutor request failed");
                transcript.push(Turn::assistant(TUTOR_APOLOGY));
                on_update(transcript);
                return TurnOutcome::Failed;
            }
        };

        transcript.push(Turn::assistant(""));
        on_update(transcript);

        let mut buffer = String::new();
        while let Some(chunk) = stream.next_chunk().await {
            match chunk {
                Ok(text) => {
                    buffer.push_str(&text);
                    transcript.set_last_assistant_text(&buffer);
                    on_update(transcript);
                }
                Err(e) => {
                    warn!(error = %e, received = buffer.len(), "tutor stream failed");
                    transcript.set_last_assistant_text(TUTOR_APOLOGY);
                    on_update(transcript);
                    return TurnOutcome::Failed;
                }
            }
        }

        TurnOutcome::Completed {
            usage: stream.usage(),
        }
    }
}
