//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use replidocs_artifacts::DocumentArtifact;
use replidocs_core::{CurationPipeline, QueryOutcome, QueryProgress};
use replidocs_shared::{
    AppConfig, Query, RepliDocsError, init_config, load_config, load_config_from,
};

use crate::shell;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// RepliDocs — put up-to-date documentation into your AI assistant's context.
#[derive(Parser)]
#[command(
    name = "replidocs",
    version,
    about = "Search the web for documentation and save the best page for your IDE's AI context.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.replidocs/replidocs.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Programming language for the session (skips the language prompt).
    #[arg(short, long, global = true)]
    pub lang: Option<String>,

    /// Where to write the documentation file.
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Without a subcommand, start the interactive shell.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a single lookup and exit.
    Ask {
        /// The documentation question.
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "replidocs=warn",
        1 => "replidocs=info",
        2 => "replidocs=debug",
        _ => "replidocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => shell::run_shell(resolve_config(&cli)?).await,
        Some(Command::Ask { ref question }) => {
            cmd_ask(resolve_config(&cli)?, &question.join(" ")).await
        }
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&cli).await,
        },
    }
}

/// Load the config file and apply `--lang` / `--output` on top.
pub(crate) fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(lang) = &cli.lang {
        config.defaults.language = Some(lang.clone());
    }
    if let Some(output) = &cli.output {
        config.defaults.output_path = output.clone();
    }
    config.defaults.language = config
        .defaults
        .language
        .take()
        .filter(|l| !l.trim().is_empty());

    Ok(config)
}

/// Build the pipeline and a fresh, empty artifact.
pub(crate) fn build_pipeline(config: &AppConfig) -> Result<CurationPipeline> {
    let artifact =
        DocumentArtifact::create(&config.defaults.output_path, config.pipeline.max_chars)?;
    Ok(CurationPipeline::from_config(config, artifact)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ask(config: AppConfig, question: &str) -> Result<()> {
    let language = config
        .defaults
        .language
        .clone()
        .ok_or_else(|| eyre!("no language given: pass --lang or set defaults.language"))?;

    let pipeline = build_pipeline(&config)?;
    let query = Query::new(&language, question);
    info!(language = %query.language, "running single lookup");

    let outcome = lookup(&pipeline, &query).await?;
    print_outcome(&outcome);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Lookup helpers shared with the shell
// ---------------------------------------------------------------------------

/// Run one query behind a spinner.
pub(crate) async fn lookup(
    pipeline: &CurationPipeline,
    query: &Query,
) -> std::result::Result<QueryOutcome, RepliDocsError> {
    let progress = CliProgress::new();
    let result = pipeline.run_query(query, &progress).await;
    progress.finish();
    result
}

pub(crate) fn print_outcome(outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Saved { source, summary } => {
            println!("Documentation added to AI context!");
            println!("Source: {source}");
            if summary.truncated() {
                println!(
                    "(kept the last {} of {} characters)",
                    summary.written_chars, summary.original_chars
                );
            }
        }
        QueryOutcome::LanguageMismatch { .. } => {
            println!("Language mismatch in search results. Please try again!");
        }
        QueryOutcome::NoCandidates => {
            println!("No search results found. Please rephrase and try again!");
        }
    }
}

// ---------------------------------------------------------------------------
// Spinner progress reporter
// ---------------------------------------------------------------------------

struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl QueryProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn retrying(&self, failed_attempt: u32, max_attempts: u32, error: &RepliDocsError) {
        self.spinner.println(format!(
            "Model failed to get the source ({error}). Trying again [{}/{max_attempts}]...",
            failed_attempt + 1
        ));
    }
}
