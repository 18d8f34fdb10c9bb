//! Study Companion CLI - AI tutor, summarizer and study planner in the terminal

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use study_companion::{
    app::Companion,
    config::{Config, API_KEY_VARS},
    planner::{PlanOutcome, PlanRequest},
    summarizer::SUMMARY_APOLOGY,
    tui::InteractiveShell,
    view::View,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "study-companion")]
#[command(about = "AI study companion: tutor chat, summarizer and study-plan generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Config file (default: platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell (default)
    Tutor {
        /// View to open first (tutor, summarizer, planner)
        #[arg(short, long, default_value = "tutor")]
        view: View,
    },

    /// Summarize text from an argument, a file or stdin
    Summarize {
        /// Text to summarize
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// Generate a study plan
    Plan {
        /// Subjects, comma separated
        #[arg(short, long)]
        subjects: String,

        /// Topics, comma separated
        #[arg(short, long)]
        topics: String,

        /// Timeframe (e.g. "2 weeks")
        #[arg(long)]
        timeframe: String,

        /// Study hours per week
        #[arg(long)]
        hours: String,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command.unwrap_or(Commands::Tutor { view: View::Tutor }) {
        Commands::Tutor { view } => {
            let companion = load_companion(&config_path)?;
            info!(%view, "starting interactive shell");
            let mut shell = InteractiveShell::new(companion, view);
            shell.run().await?;
        }

        Commands::Summarize { text, file } => {
            let companion = load_companion(&config_path)?;
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let mut panel = companion.summarizer_panel();
            match panel.summarize(&text).await {
                Some(SUMMARY_APOLOGY) => anyhow::bail!(SUMMARY_APOLOGY),
                Some(summary) => println!("{}", summary),
                None => anyhow::bail!("Nothing to summarize: input is empty"),
            }
        }

        Commands::Plan {
            subjects,
            topics,
            timeframe,
            hours,
            json,
        } => {
            let request = PlanRequest::new(subjects, topics, timeframe, hours);
            request.validate()?;

            let companion = load_companion(&config_path)?;
            let mut panel = companion.planner_panel();
            match panel.generate(&request).await {
                PlanOutcome::Generated { usage } => {
                    info!(tokens = usage.total_tokens, "plan generated");
                    if let Some(plan) = panel.plan() {
                        if json {
                            println!("{}", serde_json::to_string_pretty(plan)?);
                        } else {
                            print_plan(plan);
                        }
                    }
                }
                PlanOutcome::Failed => {
                    anyhow::bail!("{}", panel.error().unwrap_or("Plan generation failed"))
                }
                PlanOutcome::Ignored => anyhow::bail!("Plan request was not accepted"),
            }
        }

        Commands::Config(cmd) => {
            handle_config_command(cmd, &config_path)?;
        }
    }

    Ok(())
}

/// Load configuration and build the providers. A missing API key is fatal.
fn load_companion(path: &std::path::Path) -> Result<Companion> {
    let config = Config::load_from(path.to_path_buf())?;
    let companion = Companion::from_config(&config).with_context(|| {
        format!(
            "Cannot start without an API key. Set {} or add gemini.api_key to {}",
            API_KEY_VARS.join(" or "),
            path.display()
        )
    })?;
    Ok(companion)
}

fn print_plan(plan: &study_companion::planner::StudyPlan) {
    for day in &plan.days {
        println!("{} ({})", day.day, day.date);
        for task in &day.tasks {
            println!("  - {}: {} [{} min]", task.subject, task.topic, task.duration);
        }
    }
    println!();
    println!(
        "{} days, {} tasks, {} minutes total",
        plan.len(),
        plan.task_count(),
        plan.total_minutes()
    );
}

fn handle_config_command(cmd: ConfigCommands, path: &std::path::Path) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => config_init(path, force)?,
        ConfigCommands::Show => config_show(path)?,
        ConfigCommands::Path => config_path(path),
        ConfigCommands::Validate => config_validate(path)?,
    }
    Ok(())
}

fn config_init(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(path.to_path_buf())?;

    println!("Configuration file created at: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the config file to add your API key, or");
    println!("  2. Set an environment variable:");
    println!("     export GEMINI_API_KEY=your_key");

    Ok(())
}

fn config_show(path: &std::path::Path) -> Result<()> {
    let config = Config::load_from(path.to_path_buf())?;
    println!("{}", toml::to_string_pretty(&config.masked())?);

    println!("--- Environment Variables ---");
    for name in API_KEY_VARS {
        let state = if std::env::var(name).is_ok() { "set" } else { "not set" };
        println!("{}: {}", name, state);
    }

    Ok(())
}

fn config_path(path: &std::path::Path) {
    println!("{}", path.display());

    if path.exists() {
        println!("(file exists)");
    } else {
        println!("(file does not exist - run 'config init' to create)");
    }
}

fn config_validate(path: &std::path::Path) -> Result<()> {
    let config = Config::load_from(path.to_path_buf())?;
    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid.");
            println!("Model: {}", config.gemini.model);
            Ok(())
        }
        Err(e) => anyhow::bail!("Configuration is invalid: {}", e),
    }
}
