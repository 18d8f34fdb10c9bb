//! Terminal rendering with markdown support

use crossterm::style::{Color, Stylize};
use std::io::Write;
use termimad::MadSkin;

use super::theme::Theme;
use crate::api::TokenUsage;
use crate::planner::StudyPlan;
use crate::view::View;

/// Terminal renderer with markdown and styled output
pub struct TerminalRenderer {
    theme: Theme,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let theme = Theme::default();
        let skin = Self::build_skin(&theme);
        Self { theme, skin }
    }

    fn build_skin(theme: &Theme) -> MadSkin {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(to_termimad_color(theme.title));
        skin.bold.set_fg(to_termimad_color(Color::White));
        skin.italic.set_fg(to_termimad_color(Color::DarkYellow));
        skin.inline_code.set_fg(to_termimad_color(Color::Green));
        skin.code_block.set_fg(to_termimad_color(Color::Green));
        skin
    }

    /// Render the welcome banner
    pub fn render_banner(&self, version: &str, model: &str) {
        println!();
        println!("{}", "  Study Companion".with(self.theme.title));
        println!(
            "  {} {}  {} {}",
            "v".with(self.theme.dim),
            version.with(self.theme.dim),
            "Model:".with(self.theme.dim),
            model.with(self.theme.stats),
        );
        println!(
            "  {}",
            "Type /help for commands, /quit to exit".with(self.theme.dim)
        );
        println!();
    }

    /// Render the heading shown when a view becomes active
    pub fn render_view_header(&self, view: View) {
        println!();
        println!(
            "  {} {}",
            "\u{25cf}".with(self.theme.accent(view)),
            view.title().with(self.theme.accent(view)),
        );
        let hint = match view {
            View::Tutor => "Ask anything. The tutor remembers this conversation.",
            View::Summarizer => "Paste text, then press Enter on an empty line.",
            View::Planner => "Press Enter to fill in the plan form.",
        };
        self.render_info(hint);
        println!();
    }

    /// Render a streaming text delta (raw, no markdown processing)
    pub fn render_delta(&self, text: &str) {
        print!("{}", text.with(self.theme.assistant));
        let _ = std::io::stdout().flush();
    }

    /// Render a complete response with markdown formatting
    pub fn render_markdown(&self, content: &str) {
        // Only re-render with markdown if content has markdown elements
        if has_markdown_elements(content) {
            println!();
            self.skin.print_text(content);
        } else {
            println!();
        }
    }

    /// Render a one-shot response that was not streamed
    pub fn render_document(&self, content: &str) {
        println!();
        if has_markdown_elements(content) {
            self.skin.print_text(content);
        } else {
            println!("{}", content.with(self.theme.assistant));
        }
    }

    /// Render the token usage line after a response
    pub fn render_usage_line(&self, usage: &TokenUsage, model: &str) {
        println!(
            "\n  {} {} prompt + {} completion [{}]",
            "\u{2022}".with(self.theme.dim),
            format!("{}", usage.prompt_tokens).with(self.theme.stats),
            format!("{}", usage.completion_tokens).with(self.theme.stats),
            model.with(self.theme.dim),
        );
        println!();
    }

    /// Render a study plan as a day-by-day schedule
    pub fn render_plan(&self, plan: &StudyPlan) {
        println!();
        for day in &plan.days {
            println!(
                "  {} {}",
                day.day.as_str().with(self.theme.planner),
                format!("({})", day.date).with(self.theme.dim),
            );
            for task in &day.tasks {
                println!(
                    "    {} {} {} {}",
                    "\u{2022}".with(self.theme.dim),
                    task.subject.as_str().with(self.theme.assistant),
                    format!("- {}", task.topic).with(self.theme.assistant),
                    format!("{} min", task.duration).with(self.theme.stats),
                );
            }
        }
        println!();
        self.render_info(&format!(
            "{} days, {} tasks, {} minutes total",
            plan.len(),
            plan.task_count(),
            plan.total_minutes()
        ));
        println!();
    }

    /// Render a system message
    pub fn render_system(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{25b6}".with(self.theme.system),
            msg.with(self.theme.system)
        );
    }

    /// Render an error message
    pub fn render_error(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{2717}".with(self.theme.error),
            msg.with(self.theme.error)
        );
    }

    /// Render a success message
    pub fn render_success(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{2713}".with(self.theme.success),
            msg.with(self.theme.success)
        );
    }

    /// Render info text
    pub fn render_info(&self, msg: &str) {
        println!("  {}", msg.with(self.theme.dim));
    }

    pub fn accent_color(&self, view: View) -> Color {
        self.theme.accent(view)
    }

    pub fn command_color(&self) -> Color {
        self.theme.command
    }

    pub fn dim_color(&self) -> Color {
        self.theme.dim
    }

    pub fn stats_color(&self) -> Color {
        self.theme.stats
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// What to print for the next snapshot of a growing reply
#[derive(Debug, PartialEq, Eq)]
pub enum StreamUpdate<'a> {
    /// Text appended since the last snapshot
    Append(&'a str),
    /// The reply was replaced wholesale
    Replace(&'a str),
    Unchanged,
}

/// Tracks how much of the assistant reply is already on screen.
///
/// Streaming starts at the empty placeholder turn. A first snapshot that is
/// already non-empty never streamed and is reported as a replacement.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    started: bool,
    shown: usize,
    replaced: bool,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `text` against what was printed so far
    pub fn update<'a>(&mut self, text: &'a str) -> StreamUpdate<'a> {
        if self.replaced {
            return StreamUpdate::Unchanged;
        }
        if !self.started {
            self.started = true;
            if !text.is_empty() {
                self.replaced = true;
                return StreamUpdate::Replace(text);
            }
        }
        if text.len() < self.shown || !text.is_char_boundary(self.shown) {
            self.replaced = true;
            return StreamUpdate::Replace(text);
        }
        if text.len() == self.shown {
            return StreamUpdate::Unchanged;
        }
        let delta = &text[self.shown..];
        self.shown = text.len();
        StreamUpdate::Append(delta)
    }

    /// Whether the reply was replaced after streaming began
    pub fn was_replaced(&self) -> bool {
        self.replaced
    }
}

/// Check if content has markdown elements worth re-rendering
fn has_markdown_elements(content: &str) -> bool {
    content.contains("```")
        || content.contains("## ")
        || content.contains("# ")
        || content.contains("**")
        || content.contains("| ")
        || content.contains("- [")
        || content.lines().any(|l| l.trim_start().starts_with("* "))
}

/// Convert crossterm Color to termimad color
fn to_termimad_color(color: Color) -> termimad::crossterm::style::Color {
    use termimad::crossterm::style::Color as Tc;

    match color {
        Color::Black => Tc::Black,
        Color::DarkGrey => Tc::DarkGrey,
        Color::Red => Tc::Red,
        Color::DarkRed => Tc::DarkRed,
        Color::Green => Tc::Green,
        Color::DarkGreen => Tc::DarkGreen,
        Color::Yellow => Tc::Yellow,
        Color::DarkYellow => Tc::DarkYellow,
        Color::Blue => Tc::Blue,
        Color::DarkBlue => Tc::DarkBlue,
        Color::Magenta => Tc::Magenta,
        Color::DarkMagenta => Tc::DarkMagenta,
        Color::Cyan => Tc::Cyan,
        Color::DarkCyan => Tc::DarkCyan,
        Color::White => Tc::White,
        Color::Grey => Tc::Grey,
        _ => Tc::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_printer_emits_suffixes() {
        let mut printer = StreamPrinter::new();
        assert_eq!(printer.update(""), StreamUpdate::Unchanged);
        assert_eq!(printer.update("Photo"), StreamUpdate::Append("Photo"));
        assert_eq!(printer.update("Photosynthesis"), StreamUpdate::Append("synthesis"));
        assert_eq!(printer.update("Photosynthesis"), StreamUpdate::Unchanged);
        assert!(!printer.was_replaced());
    }

    #[test]
    fn test_stream_printer_detects_replacement() {
        let mut printer = StreamPrinter::new();
        printer.update("");
        printer.update("A long partial answer");
        assert_eq!(printer.update("Sorry"), StreamUpdate::Replace("Sorry"));
        assert!(printer.was_replaced());
        assert_eq!(printer.update("Sorry, more"), StreamUpdate::Unchanged);
    }

    #[test]
    fn test_markdown_detection() {
        assert!(has_markdown_elements("## Key ideas"));
        assert!(has_markdown_elements("* first\n* second"));
        assert!(!has_markdown_elements("Plain prose answer."));
    }

    #[test]
    fn test_reply_without_placeholder_is_a_replacement() {
        let mut printer = StreamPrinter::new();
        assert_eq!(printer.update("Sorry"), StreamUpdate::Replace("Sorry"));
        assert!(printer.was_replaced());
    }
}
