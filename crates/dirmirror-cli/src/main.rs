//! DirMirror - replicate what a destination directory is missing
//!
//! Compares a source tree against a destination tree, shows every file and
//! directory that exists only in the source, and copies (or moves) exactly
//! those entries into place while reporting progress.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};
use dirmirror_config::{Config, ConfigLoader, LoggingConfig};
use dirmirror_sync::{DiffTree, DirectoryComparator};
use dirmirror_types::{DirectoryPair, ReplicationStats, TransferMode};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

mod display;
mod json_output;
mod progress;

use display::{print_diff, print_header, print_stats};
use json_output::ComparisonJson;
use progress::ProgressPoller;

/// DirMirror - replicate what a destination directory is missing
#[derive(Parser)]
#[command(
    name = "dirmirror",
    version = env!("CARGO_PKG_VERSION"),
    about = "Replicate files missing from a destination directory",
    long_about = "DirMirror compares a source directory against a destination directory,\n\
                  shows the entries that exist only in the source, and replicates them\n\
                  into the destination. Entries already in the destination are left alone."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the destination is missing
    Compare {
        /// Source directory
        source: PathBuf,
        /// Destination directory
        destination: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare, then replicate the missing entries
    Mirror {
        /// Source directory
        source: PathBuf,
        /// Destination directory
        destination: PathBuf,
        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,
        /// Operation applied to each missing file
        #[arg(short, long, value_enum)]
        operation: Option<OperationArg>,
    },
    /// Prompt for the directories and confirm before replicating
    Interactive {
        /// Operation applied to each missing file
        #[arg(short, long, value_enum)]
        operation: Option<OperationArg>,
        /// Replicate without asking for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
        /// Write the configuration to this file instead of printing it
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum OperationArg {
    Copy,
    Move,
}

impl From<OperationArg> for TransferMode {
    fn from(operation: OperationArg) -> Self {
        match operation {
            OperationArg::Copy => TransferMode::Copy,
            OperationArg::Move => TransferMode::Move,
        }
    }
}

/// How a mirror run treats the comparison result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    DryRun,
    Apply,
    Confirm,
}

/// Settings shared by every command
struct Session {
    config: Config,
    quiet: bool,
}

impl Session {
    fn mode(&self, operation: Option<OperationArg>) -> TransferMode {
        operation.map_or(self.config.mirror.operation, TransferMode::from)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };

    let _guard = init_logging(&cli, &config.logging)?;

    info!("DirMirror v{} starting", env!("CARGO_PKG_VERSION"));

    let session = Session {
        config,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Compare {
            source,
            destination,
            json,
        } => compare_command(DirectoryPair::new(source, destination), json, &session).await?,
        Commands::Mirror {
            source,
            destination,
            dry_run,
            operation,
        } => {
            let plan = if dry_run { Plan::DryRun } else { Plan::Apply };
            mirror_pair(
                DirectoryPair::new(source, destination),
                session.mode(operation),
                plan,
                &session,
            )
            .await?;
        }
        Commands::Interactive { operation, yes } => {
            let pair = prompt_directory_pair()?;
            let plan = if yes { Plan::Apply } else { Plan::Confirm };
            mirror_pair(pair, session.mode(operation), plan, &session).await?;
        }
        Commands::Config { default, output } => {
            config_command(&session.config, default, output.as_deref())?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; the returned guard flushes the log file on drop
fn init_logging(cli: &Cli, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let stderr_layer = if logging.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file '{}' does not name a file", path.display()))?;
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

async fn compare_command(pair: DirectoryPair, json: bool, session: &Session) -> Result<()> {
    pair.validate()?;
    if !json && !session.quiet {
        print_header(
            "🔍",
            "Comparing",
            &pair.source_directory,
            &pair.destination_directory,
        );
    }

    let comparator = DirectoryComparator::new();
    let (_, diff) = run_comparison(comparator, Some(pair.clone()), session, json).await?;

    if json {
        println!("{}", ComparisonJson::new(&pair, &diff).to_json()?);
    } else {
        print_diff(&diff, session.config.progress.show_tree);
    }

    Ok(())
}

async fn mirror_pair(
    pair: DirectoryPair,
    mode: TransferMode,
    plan: Plan,
    session: &Session,
) -> Result<()> {
    pair.validate()?;
    if !session.quiet {
        print_header(
            "📂",
            "Mirroring",
            &pair.source_directory,
            &pair.destination_directory,
        );
    }

    let comparator = DirectoryComparator::with_mode(mode);
    let (comparator, diff) = run_comparison(comparator, Some(pair), session, false).await?;

    if !session.quiet || plan == Plan::DryRun {
        print_diff(&diff, session.config.progress.show_tree || plan == Plan::DryRun);
    }

    if diff.is_empty() {
        return Ok(());
    }

    match plan {
        Plan::DryRun => {
            println!(
                "{} Dry run: nothing was {}.",
                style("ℹ").blue(),
                if mode == TransferMode::Move { "moved" } else { "copied" }
            );
            return Ok(());
        }
        Plan::Confirm => {
            let proceed = Confirm::new()
                .with_prompt(format!(
                    "Replicate {} missing items into the destination ({})?",
                    diff.item_count(),
                    mode
                ))
                .default(true)
                .interact()?;
            if !proceed {
                println!("{}", style("Replication cancelled.").yellow());
                return Ok(());
            }
        }
        Plan::Apply => {}
    }

    let (comparator, result) = run_replication(comparator, session).await?;
    let stats = result.context("Replication failed")?;

    if !session.quiet {
        print_stats(comparator.operation().name(), &stats);
    }
    report_skipped(&stats);

    if session.config.mirror.refresh_after_replication {
        let (_, refreshed) = run_comparison(comparator, None, session, true).await?;
        if refreshed.is_empty() {
            println!("{} Directories are in sync.", style("✓").green().bold());
        } else {
            println!(
                "{} {} items are still missing from the destination.",
                style("⚠").yellow().bold(),
                refreshed.item_count()
            );
        }
    }

    Ok(())
}

fn report_skipped(stats: &ReplicationStats) {
    if !stats.is_complete() {
        eprintln!(
            "{} {} directories could not be created; their contents were skipped.",
            style("⚠").yellow().bold(),
            stats.skipped.len()
        );
    }
}

/// Compare on a blocking worker while the progress display polls the counters.
///
/// `pair` of `None` re-compares the pair the comparator already holds.
async fn run_comparison(
    comparator: DirectoryComparator,
    pair: Option<DirectoryPair>,
    session: &Session,
    silent: bool,
) -> Result<(DirectoryComparator, DiffTree)> {
    let poller = ProgressPoller::for_comparison(
        comparator.progress(),
        session.config.progress.poll_interval(),
        session.quiet || silent,
    );

    let task = tokio::task::spawn_blocking(move || {
        let mut comparator = comparator;
        let result = match pair {
            Some(pair) => comparator.compare_pair(pair),
            None => comparator.compare_current(),
        };
        (comparator, result)
    });

    let (comparator, result) = poller.wait(task).await.context("Comparison task failed")?;
    let diff = result?;
    debug!(
        "Comparison found {} missing items ({} files)",
        diff.item_count(),
        diff.missing_files
    );
    Ok((comparator, diff))
}

/// Replicate the comparator's last comparison on a blocking worker
async fn run_replication(
    comparator: DirectoryComparator,
    session: &Session,
) -> Result<(DirectoryComparator, dirmirror_types::Result<ReplicationStats>)> {
    let poller = ProgressPoller::for_replication(
        comparator.progress(),
        session.config.progress.poll_interval(),
        session.quiet,
    );

    let task = tokio::task::spawn_blocking(move || {
        let result = comparator.replicate();
        (comparator, result)
    });

    poller.wait(task).await.context("Replication task failed")
}

fn prompt_directory_pair() -> Result<DirectoryPair> {
    let source = prompt_directory("Enter source directory path")?;
    let destination = prompt_directory("Enter destination directory path")?;
    Ok(DirectoryPair::new(source, destination))
}

fn prompt_directory(prompt: &str) -> Result<PathBuf> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| {
            if Path::new(input.trim()).is_dir() {
                Ok(())
            } else {
                Err("Not an existing directory")
            }
        })
        .interact_text()?;
    Ok(PathBuf::from(input.trim()))
}

fn config_command(current: &Config, default: bool, output: Option<&Path>) -> Result<()> {
    let config = if default {
        Config::default()
    } else {
        current.clone()
    };

    match output {
        Some(path) => {
            ConfigLoader::save_to_file(&config, path)
                .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
            println!(
                "{} Configuration written to {}",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
        }
        None => {
            let title = if default {
                "Default Configuration:"
            } else {
                "Current Configuration:"
            };
            println!("{}", style(title).bold().underlined());
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}
