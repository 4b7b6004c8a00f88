//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use lakesearch_core::pipeline::{ProgressReporter, SyncConfig, SyncResult};
use lakesearch_shared::{
    AppConfig, init_config, load_config, resolve_db_path, resolve_token, validate_config,
};
use lakesearch_storage::JobStore;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Index lakehouse catalog metadata into a search core.
#[derive(Parser)]
#[command(
    name = "lakesearch",
    version,
    about = "Crawl catalog metadata and bulk-load it into a search core.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
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
    /// Rebuild the search index from the workspace catalog hierarchy.
    Sync,

    /// List recent indexing jobs.
    Jobs {
        /// Maximum number of jobs to show.
        #[arg(long, default_value = "20")]
        limit: u32,
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lakesearch=info",
        1 => "lakesearch=debug",
        _ => "lakesearch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
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
        Command::Sync => cmd_sync().await,
        Command::Jobs { limit } => cmd_jobs(limit).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

async fn cmd_sync() -> Result<()> {
    let config = load_config()?;
    validate_config(&config)?;
    let token = resolve_token(&config.metadata)?;
    let db_path = resolve_db_path(&config.storage)?;

    let sync_config = SyncConfig {
        metadata_base_url: config.metadata.base_url.clone(),
        metadata_token: token,
        search: config.search.clone(),
        db_path,
        walker: config.walker.clone(),
    };

    info!(
        base_url = %sync_config.metadata_base_url,
        core = %sync_config.search.core,
        "starting catalog sync"
    );

    let reporter = CliProgress::new();
    let result = lakesearch_core::pipeline::run_sync(&sync_config, &reporter).await?;

    println!();
    println!("  Catalog sync complete!");
    println!("  Job:       {}", result.job_id);
    println!("  Indexed:   {} documents", result.documents_indexed);
    println!("  Failures:  {} branches", result.branch_failures);
    println!("  Truncated: {} paths", result.truncated_paths);
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &SyncResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// jobs
// ---------------------------------------------------------------------------

async fn cmd_jobs(limit: u32) -> Result<()> {
    let config = load_config()?;
    let db_path = resolve_db_path(&config.storage)?;
    let store = JobStore::open(&db_path).await?;
    let jobs = store.list_recent_jobs(limit).await?;

    if jobs.is_empty() {
        println!("No indexing jobs recorded yet. Run `lakesearch sync` first.");
        return Ok(());
    }

    println!();
    println!(
        "  {:<36}  {:<9}  {:>8}  {:<19}  {}",
        "ID", "STATUS", "RECORDS", "STARTED", "DURATION"
    );
    for job in &jobs {
        let duration = match job.completed_at {
            Some(end) => {
                let secs = (end - job.started_at).num_milliseconds() as f64 / 1000.0;
                format!("{secs:.1}s")
            }
            None => "-".to_string(),
        };
        println!(
            "  {:<36}  {:<9}  {:>8}  {:<19}  {}",
            job.id,
            job.status.as_str(),
            job.records_processed,
            job.started_at.format("%Y-%m-%d %H:%M:%S"),
            duration
        );
        if let Some(message) = &job.error_message {
            println!("      error: {message}");
        }
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
