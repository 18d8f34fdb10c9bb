//! Slash command parsing and definitions

use crate::view::View;
use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    /// Reset the current panel
    Clear,
    /// Switch view, optionally running the panel with inline input
    Switch(View, Option<String>),
    /// Show the current view, or switch when a name is given
    View(Option<String>),
    Stats,
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let (cmd, rest) = match input.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, Some(rest.trim().to_string()).filter(|r| !r.is_empty())),
        None => (input, None),
    };

    match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => Some(SlashCommand::Help),
        "/quit" | "/q" | "/exit" => Some(SlashCommand::Quit),
        "/clear" | "/cls" | "/new" => Some(SlashCommand::Clear),
        "/tutor" | "/chat" => Some(SlashCommand::Switch(View::Tutor, rest)),
        "/summarize" | "/sum" => Some(SlashCommand::Switch(View::Summarizer, rest)),
        "/plan" | "/planner" => Some(SlashCommand::Switch(View::Planner, rest)),
        "/view" => Some(SlashCommand::View(rest)),
        "/stats" => Some(SlashCommand::Stats),
        _ => None,
    }
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit interactive mode"),
        ("/tutor [question]", "Switch to the AI tutor"),
        ("/summarize [text]", "Switch to the summarizer"),
        ("/plan [subjects]", "Switch to the study planner"),
        ("/view [name]", "Show or change the current view"),
        ("/clear", "Start the current panel over"),
        ("/stats", "Show token usage statistics"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<25} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
    renderer.render_info("Summarizer: paste text and finish with an empty line.");
    renderer.render_info("Switching views starts the panel you leave over next time.");
    println!();
}
