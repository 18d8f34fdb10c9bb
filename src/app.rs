//! Wiring from configuration to the three panels

use crate::api::{ChatProvider, GeminiProvider, GenerativeProvider};
use crate::config::{Config, ConfigError};
use crate::planner::PlannerPanel;
use crate::summarizer::SummarizerPanel;
use crate::tutor::TutorPanel;
use std::sync::Arc;
use tracing::debug;

/// Shared providers, one per panel, built once per process.
///
/// Panels are created fresh from here every time a view is entered, so
/// leaving a view discards its state.
#[derive(Clone)]
pub struct Companion {
    tutor: Arc<dyn ChatProvider>,
    summarizer: Arc<dyn GenerativeProvider>,
    planner: Arc<dyn GenerativeProvider>,
    tutor_instruction: Option<String>,
    model: String,
}

impl Companion {
    /// Build providers from configuration. Fails when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base = config.provider()?;

        let tutor = per_panel(&base, config.tutor.model.as_deref());
        let summarizer = per_panel(&base, config.summarizer.model.as_deref());
        let planner = per_panel(&base, config.planner.model.as_deref());

        Ok(Self {
            tutor: Arc::new(tutor),
            summarizer: Arc::new(summarizer),
            planner: Arc::new(planner),
            tutor_instruction: config.tutor.system_instruction.clone(),
            model: config.gemini.model.clone(),
        })
    }

    /// Use one provider for every panel
    pub fn with_provider<P>(provider: Arc<P>) -> Self
    where
        P: ChatProvider + 'static,
    {
        let model = provider.model().to_string();
        Self {
            tutor: provider.clone(),
            summarizer: provider.clone(),
            planner: provider,
            tutor_instruction: None,
            model,
        }
    }

    /// Override the tutor persona
    pub fn with_tutor_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.tutor_instruction = Some(instruction.into());
        self
    }

    /// Default model name, for display
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tutor_panel(&self) -> TutorPanel {
        let panel = TutorPanel::new(Arc::clone(&self.tutor));
        match &self.tutor_instruction {
            Some(instruction) => panel.with_system_instruction(instruction.clone()),
            None => panel,
        }
    }

    pub fn summarizer_panel(&self) -> SummarizerPanel {
        SummarizerPanel::new(Arc::clone(&self.summarizer))
    }

    pub fn planner_panel(&self) -> PlannerPanel {
        PlannerPanel::new(Arc::clone(&self.planner))
    }
}

fn per_panel(base: &GeminiProvider, model: Option<&str>) -> GeminiProvider {
    match model.filter(|m| !m.trim().is_empty()) {
        Some(model) => {
            debug!(model, "panel model override");
            base.with_model(model)
        }
        None => base.with_model(base.model()),
    }
}
