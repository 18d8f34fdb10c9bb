//! Summarizer panel: single-shot summarization of pasted text

use crate::api::{GenerateRequest, GenerativeProvider, TokenUsage};
use std::sync::Arc;
use tracing::warn;

/// Returned whenever a summary cannot be produced
pub const SUMMARY_APOLOGY: &str = "Sorry, I was unable to summarize the text. Please try again.";

/// Build the summarization prompt for `text`
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following text for a university student. Your goal is to create a concise \
summary that is significantly shorter than the original text. Focus on the key concepts, main \
arguments, and any important conclusions. Present it in a clear and easy-to-digest format:\n\n---\n\n{}",
        text
    )
}

/// Summarize `text` with one non-streaming request.
///
/// Never fails: any service error, or an empty reply, yields [`SUMMARY_APOLOGY`].
pub async fn summarize_text(provider: &dyn GenerativeProvider, text: &str) -> String {
    summarize_with_usage(provider, text).await.0
}

/// Usage is `Some` only when a real summary was produced
async fn summarize_with_usage(
    provider: &dyn GenerativeProvider,
    text: &str,
) -> (String, Option<TokenUsage>) {
    let request = GenerateRequest::new(summary_prompt(text));

    match provider.send_request(request).await {
        Ok(response) if !response.content.is_empty() => (response.content, Some(response.usage)),
        Ok(_) => {
            warn!("summarization returned no text");
            (SUMMARY_APOLOGY.to_string(), None)
        }
        Err(e) => {
            warn!(error = %e, "summarization failed");
            (SUMMARY_APOLOGY.to_string(), None)
        }
    }
}

/// Input/output state owned by one summarizer panel
pub struct SummarizerPanel {
    provider: Arc<dyn GenerativeProvider>,
    summary: Option<String>,
    usage: Option<TokenUsage>,
    pending: bool,
}

impl SummarizerPanel {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self {
            provider,
            summary: None,
            usage: None,
            pending: false,
        }
    }

    /// Last produced summary (or apology)
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Token usage of the last summary; `None` after a failure
    pub fn last_usage(&self) -> Option<TokenUsage> {
        self.usage
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Summarize `text`, replacing any previous output.
    ///
    /// Returns `None` without touching state when `text` is blank or a
    /// request is already pending.
    pub async fn summarize(&mut self, text: &str) -> Option<&str> {
        if text.trim().is_empty() || self.pending {
            return None;
        }

        self.pending = true;
        self.summary = None;
        self.usage = None;
        let (summary, usage) = summarize_with_usage(self.provider.as_ref(), text).await;
        self.summary = Some(summary);
        self.usage = usage;
        self.pending = false;

        self.summary.as_deref()
    }

    pub fn reset(&mut self) {
        self.summary = None;
        self.usage = None;
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockProvider, MockReply};

    #[tokio::test]
    async fn test_summary_returned_verbatim() {
        let mock = MockProvider::from_replies(vec![MockReply::Text("- Key idea\n- Conclusion".into())]);

        let summary = summarize_text(&mock, "A very long lecture...").await;

        assert_eq!(summary, "- Key idea\n- Conclusion");
        let requests = mock.requests();
        let prompt = &requests[0].prompt;
        assert!(prompt.starts_with("Summarize the following text for a university student."));
        assert!(prompt.ends_with("---\n\nA very long lecture..."));
        assert!(!requests[0].is_structured());
    }

    #[tokio::test]
    async fn test_service_failure_yields_apology() {
        let mock = MockProvider::from_replies(vec![MockReply::Fail("network down".into())]);
        assert_eq!(summarize_text(&mock, "text").await, SUMMARY_APOLOGY);
    }

    #[tokio::test]
    async fn test_empty_reply_yields_apology() {
        let mock = MockProvider::from_replies(vec![MockReply::Text(String::new())]);
        assert_eq!(summarize_text(&mock, "text").await, SUMMARY_APOLOGY);
    }

    #[tokio::test]
    async fn test_panel_stores_output_and_clears_pending() {
        let mock = MockProvider::from_replies(vec![
            MockReply::Text("first".into()),
            MockReply::Fail("boom".into()),
        ]);
        let mut panel = SummarizerPanel::new(Arc::new(mock));

        assert_eq!(panel.summarize("notes").await, Some("first"));
        assert!(!panel.is_pending());
        assert_eq!(panel.last_usage(), Some(TokenUsage::new(1, 5)));

        assert_eq!(panel.summarize("more notes").await, Some(SUMMARY_APOLOGY));
        assert_eq!(panel.summary(), Some(SUMMARY_APOLOGY));
        assert_eq!(panel.last_usage(), None);
        assert!(!panel.is_pending());
    }

    #[tokio::test]
    async fn test_blank_input_is_inert() {
        let mock = MockProvider::from_replies(vec![MockReply::Text("first".into())]);
        let mut panel = SummarizerPanel::new(Arc::new(mock.clone()));
        panel.summarize("notes").await;

        assert_eq!(panel.summarize("  \n ").await, None);
        assert_eq!(panel.summary(), Some("first"));
        assert_eq!(mock.call_count(), 1);
    }
}
