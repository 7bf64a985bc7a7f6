//! postwatch CLI
//!
//! Single-shot publication watcher, meant to be invoked periodically by an
//! external scheduler (cron, GitHub Actions). With no subcommand it runs
//! one watch cycle.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postwatch::{
    error::Result,
    models::Config,
    pipeline,
    services::Notifier,
    storage::{LocalStateStore, StateStore},
    utils::http,
};

/// postwatch - single-publication post watcher
#[derive(Parser, Debug)]
#[command(
    name = "postwatch",
    version,
    about = "Watches a publication feed for new posts and emails ticket links"
)]

struct Cli {
    /// Path to storage directory containing config.toml and state.json
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the latest post, notify and persist if it is new (default)
    Watch,

    /// Validate configuration files
    Validate,

    /// Show current watch state
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    let store = LocalStateStore::new(&cli.storage_dir);

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            log::info!("Watching {}...", config.publication.domain);

            let client = http::create_client(&config.fetch)?;
            let notifier = Notifier::from_env(&config.mail)?;
            if notifier.is_dry_run() {
                log::debug!("Mail credentials absent; notifications will be logged only.");
            }

            let outcome = pipeline::run_watch(&config, &store, &notifier, &client).await?;

            if outcome.new_post {
                log::info!(
                    "Run complete: new post handled, notification {}.",
                    if outcome.notified { "sent" } else { "failed" }
                );
            } else {
                log::info!("Run complete: nothing to do.");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (publication, feed, fetch, tickets, mail)");

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Publication: {}", config.publication.domain);

            let state = store.load_state().await?;
            match state.last_post_id {
                Some(id) => {
                    log::info!("Last post id: {}", id);
                    log::info!(
                        "Last published at: {}",
                        state.last_published_at.as_deref().unwrap_or("<unknown>")
                    );
                }
                None => log::info!("No watch state yet; next run treats any post as new."),
            }
        }
    }

    Ok(())
}
