//! Study Companion - an AI study assistant for the terminal
//!
//! Three independent flows over a hosted generative-language service:
//!
//! - **Tutor**: a streaming, multi-turn conversation with a fixed persona
//! - **Summarizer**: single-shot condensation of pasted text
//! - **Planner**: a schema-constrained, day-by-day study schedule

pub mod api;
pub mod app;
pub mod config;
pub mod metrics;
pub mod planner;
pub mod summarizer;
pub mod tui;
pub mod tutor;
pub mod view;

pub use api::{ApiError, ChatSession, GeminiConfig, GeminiProvider, GenerativeProvider};
pub use app::Companion;
pub use config::{Config, ConfigBuilder, ConfigError};
pub use metrics::{UsageSummary, UsageTracker};
pub use planner::{generate_study_plan, PlanError, PlanRequest, PlannerPanel, StudyPlan};
pub use summarizer::{summarize_text, SummarizerPanel};
pub use tutor::{TutorPanel, TurnOutcome};
pub use view::View;
