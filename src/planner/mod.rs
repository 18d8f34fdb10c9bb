//! Planner panel: schema-constrained study-plan generation
//!
//! A plan comes back from one non-streaming request whose response is
//! constrained to [`study_plan_schema`]. The text is parsed as a whole; a plan
//! is either accepted completely or not at all.

mod schema;

pub use schema::{study_plan_schema, StudyDay, StudyPlan, StudyTask};

use crate::api::{ApiError, GenerateRequest, GenerativeProvider, TokenUsage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// User-facing message for every failed plan
pub const PLAN_FAILURE_MESSAGE: &str = "Could not generate the study plan. The AI may have returned \
an invalid format. Please try again.";

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The generation call itself failed
    #[error("Plan service failed: {0}")]
    Service(#[from] ApiError),

    /// The call succeeded but the text is not a valid plan
    #[error("Invalid plan format: {0}")]
    InvalidFormat(String),
}

impl PlanError {
    pub fn is_service_failure(&self) -> bool {
        matches!(self, PlanError::Service(_))
    }
}

/// The four planner inputs, as free text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub subjects: String,
    pub topics: String,
    pub timeframe: String,
    pub hours_per_week: String,
}

impl PlanRequest {
    pub fn new(
        subjects: impl Into<String>,
        topics: impl Into<String>,
        timeframe: impl Into<String>,
        hours_per_week: impl Into<String>,
    ) -> Self {
        Self {
            subjects: subjects.into(),
            topics: topics.into(),
            timeframe: timeframe.into(),
            hours_per_week: hours_per_week.into(),
        }
    }

    /// All four fields must be non-blank
    pub fn validate(&self) -> Result<(), PlanError> {
        let fields = [
            ("subjects", &self.subjects),
            ("topics", &self.topics),
            ("timeframe", &self.timeframe),
            ("hours_per_week", &self.hours_per_week),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(PlanError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Natural-language instruction embedding all four fields
    pub fn prompt(&self) -> String {
        format!(
            "Create a detailed study plan for a student with the following details:
- Subjects: {}
- Topics/Chapters to cover: {}
- Timeframe: {}
- Available study hours per week: {}

Break down the plan day-by-day. For each day, list the subject, a specific topic to study from \
the provided list, and a recommended duration in minutes. Ensure the plan is balanced and covers \
all subjects and topics mentioned. The student prefers focused study sessions of 60-90 minutes \
with breaks in between (you don't need to schedule the breaks, just the sessions).",
            self.subjects, self.topics, self.timeframe, self.hours_per_week
        )
    }
}

/// Parse a complete response body into a plan.
///
/// Rejects anything that is not a JSON array of day-entries, and any task
/// whose duration is not a positive integer.
pub fn parse_study_plan(text: &str) -> Result<StudyPlan, PlanError> {
    let plan: StudyPlan = serde_json::from_str(text.trim())
        .map_err(|e| PlanError::InvalidFormat(e.to_string()))?;

    for day in &plan.days {
        if let Some(task) = day.tasks.iter().find(|t| t.duration == 0) {
            return Err(PlanError::InvalidFormat(format!(
                "non-positive duration for {} / {} on {}",
                task.subject, task.topic, day.day
            )));
        }
    }

    Ok(plan)
}

/// Request a plan and parse it.
///
/// Service failures are returned before any parsing is attempted, so the two
/// failure kinds stay distinguishable.
pub async fn generate_study_plan(
    provider: &dyn GenerativeProvider,
    request: &PlanRequest,
) -> Result<StudyPlan, PlanError> {
    generate_with_usage(provider, request)
        .await
        .map(|(plan, _)| plan)
}

async fn generate_with_usage(
    provider: &dyn GenerativeProvider,
    request: &PlanRequest,
) -> Result<(StudyPlan, TokenUsage), PlanError> {
    request.validate()?;

    let generate =
        GenerateRequest::new(request.prompt()).with_json_schema(study_plan_schema());
    let response = provider.send_request(generate).await?;
    debug!(bytes = response.content.len(), "plan response received");

    let plan = parse_study_plan(&response.content)?;
    Ok((plan, response.usage))
}

/// Result of a plan submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Missing input or a request already pending; nothing changed
    Ignored,
    Generated { usage: TokenUsage },
    Failed,
}

/// Form/output state owned by one planner panel
pub struct PlannerPanel {
    provider: Arc<dyn GenerativeProvider>,
    plan: Option<StudyPlan>,
    error: Option<String>,
    pending: bool,
}

impl PlannerPanel {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self {
            provider,
            plan: None,
            error: None,
            pending: false,
        }
    }

    pub fn plan(&self) -> Option<&StudyPlan> {
        self.plan.as_ref()
    }

    /// User-facing failure message from the last submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Generate a plan, replacing the previous plan or error
    pub async fn generate(&mut self, request: &PlanRequest) -> PlanOutcome {
        if self.pending || request.validate().is_err() {
            return PlanOutcome::Ignored;
        }

        self.pending = true;
        self.plan = None;
        self.error = None;

        let outcome = match generate_with_usage(self.provider.as_ref(), request).await {
            Ok((plan, usage)) => {
                info!(days = plan.len(), tasks = plan.task_count(), "study plan generated");
                self.plan = Some(plan);
                PlanOutcome::Generated { usage }
            }
            Err(e) => {
                if e.is_service_failure() {
                    warn!(error = %e, "plan service failure");
                } else {
                    warn!(error = %e, "plan format failure");
                }
                self.error = Some(PLAN_FAILURE_MESSAGE.to_string());
                PlanOutcome::Failed
            }
        };

        self.pending = false;
        outcome
    }

    pub fn reset(&mut self) {
        self.plan = None;
        self.error = None;
        self.pending = false;
    }
}
