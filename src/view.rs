//! The three panels an interactive session can switch between

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Tutor,
    Summarizer,
    Planner,
}

impl View {
    pub const ALL: [View; 3] = [View::Tutor, View::Summarizer, View::Planner];

    pub fn title(&self) -> &'static str {
        match self {
            View::Tutor => "AI Tutor",
            View::Summarizer => "Text Summarizer",
            View::Planner => "Study Planner",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Tutor => "tutor",
            View::Summarizer => "summarizer",
            View::Planner => "planner",
        };
        f.write_str(name)
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tutor" | "chat" => Ok(View::Tutor),
            "summarizer" | "summarize" | "summary" => Ok(View::Summarizer),
            "planner" | "plan" => Ok(View::Planner),
            other => Err(format!(
                "Unknown view: {}. Available: tutor, summarizer, planner",
                other
            )),
        }
    }
}
