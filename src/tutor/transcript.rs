//! Append-only conversation transcript shown by the tutor panel

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered turns, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Overwrite the text of the trailing assistant turn.
    /// Returns false when the transcript does not end with one.
    pub(crate) fn set_last_assistant_text(&mut self, text: &str) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.speaker == Speaker::Assistant => {
                turn.text.clear();
                turn.text.push_str(text);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_only_trailing_assistant() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("q"));
        assert!(!transcript.set_last_assistant_text("nope"));

        transcript.push(Turn::assistant(""));
        assert!(transcript.set_last_assistant_text("answer"));
        assert_eq!(transcript.last(), Some(&Turn::assistant("answer")));
        assert_eq!(transcript.turns()[0], Turn::user("q"));
    }
}
