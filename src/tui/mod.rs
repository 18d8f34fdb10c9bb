//! Interactive terminal UI for Study Companion
//!
//! One shell with three views (tutor, summarizer, planner). Only the active
//! view owns a panel; switching views tears the old panel down.

pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::api::TokenUsage;
use crate::app::Companion;
use crate::metrics::UsageTracker;
use crate::planner::{PlanOutcome, PlanRequest, PlannerPanel};
use crate::summarizer::SummarizerPanel;
use crate::tutor::{Speaker, TurnOutcome, TutorPanel};
use crate::view::View;

use commands::{parse_command, render_help, SlashCommand};
use prompt::PromptHandler;
use renderer::{StreamPrinter, StreamUpdate, TerminalRenderer};
use spinner::WaitSpinner;

use anyhow::Result;
use crossterm::style::Stylize;
use tracing::debug;

/// The panel behind the active view
enum ActivePanel {
    Tutor(TutorPanel),
    Summarizer(SummarizerPanel),
    Planner(PlannerPanel),
}

impl ActivePanel {
    fn open(companion: &Companion, view: View) -> Self {
        match view {
            View::Tutor => ActivePanel::Tutor(companion.tutor_panel()),
            View::Summarizer => ActivePanel::Summarizer(companion.summarizer_panel()),
            View::Planner => ActivePanel::Planner(companion.planner_panel()),
        }
    }

    fn view(&self) -> View {
        match self {
            ActivePanel::Tutor(_) => View::Tutor,
            ActivePanel::Summarizer(_) => View::Summarizer,
            ActivePanel::Planner(_) => View::Planner,
        }
    }
}

/// Interactive shell with streaming, markdown, and view switching
pub struct InteractiveShell {
    companion: Companion,
    panel: ActivePanel,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
    usage: UsageTracker,
}

impl InteractiveShell {
    pub fn new(companion: Companion, view: View) -> Self {
        let panel = ActivePanel::open(&companion, view);
        Self {
            companion,
            panel,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::new(),
            usage: UsageTracker::new(),
        }
    }

    pub fn view(&self) -> View {
        self.panel.view()
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Run the interactive shell main loop
    pub async fn run(&mut self) -> Result<()> {
        self.renderer
            .render_banner(env!("CARGO_PKG_VERSION"), self.companion.model());
        self.renderer.render_view_header(self.view());

        loop {
            let view = self.view();
            let color = self.renderer.accent_color(view);
            let input = match self.prompt_handler.read_line(&view.to_string(), color) {
                Some(input) => input,
                None => {
                    // EOF (Ctrl+D)
                    self.render_session_summary();
                    break;
                }
            };

            if let Some(cmd) = parse_command(&input) {
                match self.handle_command(cmd).await {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => {
                        self.render_session_summary();
                        break;
                    }
                }
            } else if input.starts_with('/') {
                self.renderer
                    .render_error(&format!("Unknown command: {}. Type /help.", input));
            } else {
                self.handle_input(&input).await;
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => render_help(&self.renderer),
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Clear => {
                let view = self.view();
                self.switch_to(view);
                self.renderer
                    .render_success(&format!("{} cleared.", view.title()));
            }
            SlashCommand::Switch(view, inline) => {
                if view != self.view() {
                    self.switch_to(view);
                    self.renderer.render_view_header(view);
                }
                if let Some(text) = inline {
                    self.handle_input(&text).await;
                }
            }
            SlashCommand::View(None) => {
                self.renderer
                    .render_info(&format!("Current view: {}", self.view()));
            }
            SlashCommand::View(Some(name)) => match name.parse::<View>() {
                Ok(view) => {
                    if view != self.view() {
                        self.switch_to(view);
                    }
                    self.renderer.render_view_header(view);
                }
                Err(e) => self.renderer.render_error(&e),
            },
            SlashCommand::Stats => self.render_stats(),
        }
        CommandResult::Continue
    }

    /// Replace the active panel with a fresh one for `view`
    fn switch_to(&mut self, view: View) {
        debug!(from = %self.view(), to = %view, "switching view");
        self.panel = ActivePanel::open(&self.companion, view);
    }

    /// Route free text to the active panel
    async fn handle_input(&mut self, input: &str) {
        match self.panel.view() {
            View::Tutor => {
                if !input.is_empty() {
                    self.run_tutor_turn(input).await;
                }
            }
            View::Summarizer => {
                let color = self.renderer.accent_color(View::Summarizer);
                let text = self.prompt_handler.read_block(input, color);
                self.run_summary(&text).await;
            }
            View::Planner => {
                let subjects = Some(input).filter(|s| !s.is_empty());
                self.run_planner_form(subjects).await;
            }
        }
    }

    async fn run_tutor_turn(&mut self, input: &str) {
        let ActivePanel::Tutor(tutor) = &mut self.panel else {
            return;
        };
        let renderer = &self.renderer;

        let mut spinner = WaitSpinner::new();
        spinner.start("Thinking...");
        let mut printer = StreamPrinter::new();

        let outcome = tutor
            .submit_turn(input, |transcript| {
                let Some(turn) = transcript.last().filter(|t| t.speaker == Speaker::Assistant)
                else {
                    return;
                };
                match printer.update(&turn.text) {
                    StreamUpdate::Append(delta) => {
                        if spinner.is_active() {
                            spinner.stop();
                            println!();
                        }
                        renderer.render_delta(delta);
                    }
                    StreamUpdate::Replace(text) => {
                        spinner.stop();
                        println!();
                        renderer.render_error(text);
                    }
                    StreamUpdate::Unchanged => {}
                }
            })
            .await;
        spinner.stop();

        match outcome {
            TurnOutcome::Ignored => {}
            TurnOutcome::Completed { usage } => {
                let reply = tutor
                    .transcript()
                    .last()
                    .map(|t| t.text.clone())
                    .unwrap_or_default();
                if reply.is_empty() {
                    self.renderer.render_error("No response received.");
                } else {
                    self.renderer.render_markdown(&reply);
                }
                let usage = usage.unwrap_or_default();
                self.render_usage(View::Tutor, &usage);
            }
            TurnOutcome::Failed => {
                if !printer.was_replaced() {
                    println!();
                }
                self.usage.record_failure(View::Tutor);
                println!();
            }
        }
    }

    async fn run_summary(&mut self, text: &str) {
        let ActivePanel::Summarizer(summarizer) = &mut self.panel else {
            return;
        };
        if text.trim().is_empty() {
            self.renderer.render_info("Nothing to summarize.");
            return;
        }

        let mut spinner = WaitSpinner::new();
        spinner.start("Generating summary...");
        let summary = summarizer.summarize(text).await.map(str::to_string);
        let usage = summarizer.last_usage();
        spinner.stop();

        match (summary, usage) {
            (Some(summary), Some(usage)) => {
                self.renderer.render_document(&summary);
                self.render_usage(View::Summarizer, &usage);
            }
            (Some(apology), None) => {
                self.usage.record_failure(View::Summarizer);
                self.renderer.render_error(&apology);
            }
            (None, _) => {}
        }
    }

    async fn run_planner_form(&mut self, subjects: Option<&str>) {
        let color = self.renderer.accent_color(View::Planner);
        println!();
        self.renderer.render_system("Create your study plan");

        let mut fields = Vec::with_capacity(4);
        let form = [
            ("Subjects", "e.g. Calculus, Organic Chemistry", subjects),
            ("Topics", "e.g. Derivatives, Alkanes", None),
            ("Timeframe", "e.g. 1 week, 2 weeks", None),
            ("Hours per week", "e.g. 10", None),
        ];
        for (label, hint, preset) in form {
            match self.prompt_handler.read_field(label, hint, preset, color) {
                Some(value) => fields.push(value),
                None => return,
            }
        }

        let request = PlanRequest::new(
            fields[0].clone(),
            fields[1].clone(),
            fields[2].clone(),
            fields[3].clone(),
        );
        if let Err(e) = request.validate() {
            self.renderer.render_error(&format!("{}", e));
            return;
        }

        self.run_plan(&request).await;
    }

    async fn run_plan(&mut self, request: &PlanRequest) {
        let ActivePanel::Planner(planner) = &mut self.panel else {
            return;
        };

        let mut spinner = WaitSpinner::new();
        spinner.start("Crafting your personalized plan...");
        let outcome = planner.generate(request).await;
        spinner.stop();

        match outcome {
            PlanOutcome::Ignored => {}
            PlanOutcome::Generated { usage } => {
                if let Some(plan) = planner.plan() {
                    self.renderer.render_plan(plan);
                }
                self.render_usage(View::Planner, &usage);
            }
            PlanOutcome::Failed => {
                if let Some(error) = planner.error() {
                    self.renderer.render_error(error);
                }
                self.usage.record_failure(View::Planner);
            }
        }
    }

    fn render_usage(&self, view: View, usage: &TokenUsage) {
        self.usage.record_request(view, *usage);
        self.renderer.render_usage_line(usage, self.companion.model());
    }

    fn render_stats(&self) {
        let metrics = self.usage.get_metrics();
        println!();
        self.renderer.render_system("Session Statistics:");
        for line in self.usage.summary().to_string().lines().skip(1) {
            self.renderer.render_info(line);
        }
        for view in View::ALL {
            if let Some(panel) = metrics.panels.get(&view) {
                println!(
                    "  {:<18} {} requests, {} failed, {} tokens",
                    view.title().with(self.renderer.accent_color(view)),
                    format!("{}", panel.requests).with(self.renderer.stats_color()),
                    format!("{}", panel.failures).with(self.renderer.stats_color()),
                    format!("{}", panel.tokens).with(self.renderer.stats_color()),
                );
            }
        }
        println!();
    }

    fn render_session_summary(&self) {
        let summary = self.usage.summary();
        println!();
        self.renderer.render_system("Session Summary:");
        println!(
            "  {} requests, {} total tokens",
            format!("{}", summary.request_count).with(self.renderer.stats_color()),
            format!("{}", summary.total_tokens).with(self.renderer.stats_color()),
        );
        self.renderer.render_info("Goodbye!");
        println!();
    }
}

/// Result of handling a slash command
enum CommandResult {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockProvider, MockReply};
    use std::sync::Arc;

    fn shell(replies: Vec<MockReply>) -> (InteractiveShell, Arc<MockProvider>) {
        let mock = Arc::new(MockProvider::from_replies(replies));
        let companion = Companion::with_provider(Arc::clone(&mock));
        (InteractiveShell::new(companion, View::Tutor), mock)
    }

    fn tutor_turns(shell: &InteractiveShell) -> usize {
        match &shell.panel {
            ActivePanel::Tutor(tutor) => tutor.transcript().len(),
            _ => 0,
        }
    }

    #[tokio::test]
    async fn test_switching_views_discards_tutor_state() {
        let (mut shell, _) = shell(vec![MockReply::Chunks(vec!["Hello".into()])]);

        shell.run_tutor_turn("hi").await;
        assert_eq!(tutor_turns(&shell), 2);
        assert_eq!(shell.usage().get_metrics().request_count, 1);

        shell
            .handle_command(SlashCommand::Switch(View::Planner, None))
            .await;
        assert_eq!(shell.view(), View::Planner);

        shell.handle_command(SlashCommand::Switch(View::Tutor, None)).await;
        assert_eq!(tutor_turns(&shell), 0);
    }

    #[tokio::test]
    async fn test_failed_turn_is_counted() {
        let (mut shell, _) = shell(vec![MockReply::ChunksThenError(
            vec!["Half".into()],
            "boom".into(),
        )]);

        shell.run_tutor_turn("explain").await;

        let metrics = shell.usage().get_metrics();
        assert_eq!(metrics.failure_count, 1);
        assert_eq!(metrics.request_count, 0);
        assert_eq!(tutor_turns(&shell), 2);
    }

    #[tokio::test]
    async fn test_request_failure_counts_once() {
        let (mut shell, _) = shell(vec![MockReply::Fail("unreachable".into())]);

        shell.run_tutor_turn("explain").await;

        let metrics = shell.usage().get_metrics();
        assert_eq!(metrics.failure_count, 1);
        assert_eq!(tutor_turns(&shell), 2);
    }

    #[tokio::test]
    async fn test_summary_tokens_are_recorded() {
        let (mut shell, _) = shell(vec![MockReply::Text("Short".into()), MockReply::Fail("x".into())]);
        shell.switch_to(View::Summarizer);

        shell.run_summary("A long chapter").await;
        shell.run_summary("Another chapter").await;

        let metrics = shell.usage().get_metrics();
        let summarizer = metrics.panels[&View::Summarizer];
        assert_eq!(summarizer.requests, 1);
        assert_eq!(summarizer.failures, 1);
        assert_eq!(summarizer.tokens, 6);
    }

    #[tokio::test]
    async fn test_plan_runs_only_in_planner_view() {
        let (mut shell, mock) = shell(vec![MockReply::Text("[]".into())]);
        let request = PlanRequest::new("Math", "Algebra", "1 week", "5");

        shell.run_plan(&request).await;
        assert_eq!(mock.call_count(), 0);

        shell.switch_to(View::Planner);
        shell.run_plan(&request).await;
        assert_eq!(mock.call_count(), 1);
        assert_eq!(shell.usage().get_metrics().request_count, 1);
    }

    #[tokio::test]
    async fn test_quit_command() {
        let (mut shell, _) = shell(vec![]);
        assert!(matches!(
            shell.handle_command(SlashCommand::Quit).await,
            CommandResult::Quit
        ));
    }
}
