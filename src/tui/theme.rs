//! Terminal theme and color definitions

use crate::view::View;
use crossterm::style::Color;

/// Theme colors for the interactive shell
pub struct Theme {
    /// Color for the tutor prompt symbol
    pub tutor: Color,
    /// Color for the summarizer prompt symbol
    pub summarizer: Color,
    /// Color for the planner prompt symbol
    pub planner: Color,
    /// Color for assistant response text
    pub assistant: Color,
    /// Color for system messages
    pub system: Color,
    /// Color for error messages
    pub error: Color,
    /// Color for dim/secondary info
    pub dim: Color,
    /// Color for success messages
    pub success: Color,
    /// Color for the banner and headings
    pub title: Color,
    /// Color for numbers (usage, durations)
    pub stats: Color,
    /// Color for slash command names
    pub command: Color,
}

impl Theme {
    /// Accent color of a view
    pub fn accent(&self, view: View) -> Color {
        match view {
            View::Tutor => self.tutor,
            View::Summarizer => self.summarizer,
            View::Planner => self.planner,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            tutor: Color::Cyan,
            summarizer: Color::Green,
            planner: Color::Magenta,
            assistant: Color::White,
            system: Color::DarkYellow,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            title: Color::Magenta,
            stats: Color::Blue,
            command: Color::Yellow,
        }
    }
}
