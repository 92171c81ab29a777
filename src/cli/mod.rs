mod noninteractive;
mod output;
mod repl;
mod tui;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::core::config::AppConfig;
use crate::core::error::InsightsError;
use crate::session::Controller;

#[derive(Parser, Debug)]
#[command(
    name = "alpha-insights",
    version,
    about = "Sales analytics assistant for the terminal"
)]
struct Cli {
    /// Non-interactive mode: ask one question and print the answer
    #[arg(short, long)]
    prompt: Option<String>,

    /// Working directory
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Output format for non-interactive mode
    #[arg(short = 'f', long, default_value = "text")]
    output_format: OutputFormat,

    /// Suppress progress indicators
    #[arg(short, long)]
    quiet: bool,

    /// Use the line-oriented REPL instead of the dashboard
    #[arg(long)]
    repl: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Analytics backend base URL (overrides config)
    #[arg(long)]
    url: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    /// The rendered markup, as a browser would receive it
    Html,
}

pub struct App {
    pub controller: Controller,
    pub config: AppConfig,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        crate::core::config::load_config(cli.working_dir.clone()).map_err(InsightsError::from)?;
    if let Some(url) = cli.url.clone() {
        config.base_url = url;
    }
    if cli.debug {
        config.debug = true;
    }
    let interactive_tui = cli.prompt.is_none() && !cli.repl;
    init_tracing(&config, interactive_tui)?;

    config.validate().map_err(InsightsError::from)?;
    tracing::debug!(base_url = %config.base_url, "configuration loaded");

    let app = build_app(config)?;

    if let Some(prompt) = cli.prompt {
        noninteractive::run(app, prompt, cli.output_format, cli.quiet).await
    } else if cli.repl {
        repl::run(app).await
    } else {
        tui::run(app).await
    }
}

fn build_app(config: AppConfig) -> Result<App> {
    let backend = crate::backend::create_backend(&config).map_err(InsightsError::from)?;
    let controller = Controller::new(backend, config.greeting.clone());
    Ok(App { controller, config })
}

fn init_tracing(config: &AppConfig, to_file: bool) -> Result<()> {
    let level = if config.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if to_file {
        // The dashboard owns the terminal; logs go next to the data dir instead
        let dir = config.data_path();
        std::fs::create_dir_all(&dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("alpha-insights.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
