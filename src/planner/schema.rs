//! Study-plan data model and the response schema sent with plan requests

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One study session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTask {
    pub subject: String,
    pub topic: String,
    /// Minutes
    pub duration: u32,
}

/// One day of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDay {
    pub day: String,
    pub date: String,
    pub tasks: Vec<StudyTask>,
}

/// A complete plan, accepted or rejected as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyPlan {
    pub days: Vec<StudyDay>,
}

impl StudyPlan {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum()
    }

    /// Total scheduled minutes across all days
    pub fn total_minutes(&self) -> u64 {
        self.days
            .iter()
            .flat_map(|d| d.tasks.iter())
            .map(|t| t.duration as u64)
            .sum()
    }
}

/// `responseSchema` describing a [`StudyPlan`] in the service's OpenAPI subset
pub fn study_plan_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "day": {
                    "type": "STRING",
                    "description": "The day of the week (e.g., Monday)."
                },
                "date": {
                    "type": "STRING",
                    "description": "The specific date (e.g., 2024-07-29)."
                },
                "tasks": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "subject": { "type": "STRING" },
                            "topic": {
                                "type": "STRING",
                                "description": "A specific topic or chapter to study."
                            },
                            "duration": {
                                "type": "INTEGER",
                                "description": "Study duration in minutes."
                            }
                        },
                        "required": ["subject", "topic", "duration"]
                    }
                }
            },
            "required": ["day", "date", "tasks"]
        }
    })
}
