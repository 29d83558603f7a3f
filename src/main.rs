use anyhow::{Context, Result};
use clap::Parser;
use series_renamer::{
    BatchMode, DEFAULT_FORMAT, NumberingScheme, ProgressEvent, RenameOptions,
    default_config_dir, rename_episodes,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Rename tv series episode files after their series and episode titles
#[derive(Parser)]
#[command(name = "series-renamer", version, about)]
struct Args {
    /// Episode file or directory of episode files
    #[arg(default_value = ".")]
    target: PathBuf,

    /// Directory holding the configuration and alias files
    #[arg(short, long, value_name = "DIR")]
    config: Option<PathBuf>,

    /// Output name template
    #[arg(short, long, value_name = "TEMPLATE", default_value = DEFAULT_FORMAT)]
    format: String,

    /// Episode numbering used for parsing and lookup
    #[arg(short, long, value_enum, default_value = "default")]
    sort: NumberingScheme,

    /// Fetch all episodes of the series once instead of one lookup per file
    #[arg(long, conflicts_with = "full_season")]
    full_series: bool,

    /// Fetch all episodes of the first file's season once
    #[arg(long)]
    full_season: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Only show what would be renamed
    #[arg(long)]
    simulate: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Language passed to the metadata provider
    #[arg(long, default_value = "en")]
    language: String,

    /// Do not cache metadata responses on disk
    #[arg(long)]
    no_cache: bool,

    /// Append log output to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn rename_options(&self) -> RenameOptions {
        let batch_mode = if self.full_series {
            BatchMode::FullSeries
        } else if self.full_season {
            BatchMode::FullSeason
        } else {
            BatchMode::None
        };

        RenameOptions {
            format: self.format.clone(),
            scheme: self.sort,
            batch_mode,
            simulate: self.simulate,
            recursive: self.recursive,
            language: self.language.clone(),
        }
    }
}

/// Installs the stderr logger and, if requested, a file logger
fn init_logging(args: &Args) -> Result<()> {
    // RUST_LOG wins over the verbosity flags
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(())
}

/// Turns progress events into log lines
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::Started {
            target,
            simulate,
            scheme,
        } => {
            info!(
                "Renaming episodes in {} ({:?} numbering{})",
                target.display(),
                scheme,
                if simulate { ", simulated" } else { "" }
            );
        }
        ProgressEvent::FilesFound { count } => {
            if count == 0 {
                warn!("No episode files found");
            } else {
                debug!("Found {} episode file(s)", count);
            }
        }
        ProgressEvent::ProcessingFile { index, total, path } => {
            debug!("[{}/{}] Processing: {}", index + 1, total, path.display());
        }
        ProgressEvent::BatchFetched {
            series_id,
            season,
            episode_count,
        } => match season {
            Some(season) => info!(
                "Fetched {} episodes of season {} of series {}",
                episode_count, season, series_id
            ),
            None => info!("Fetched {} episodes of series {}", episode_count, series_id),
        },
        ProgressEvent::Renamed { from, to } => {
            info!("Renamed {} -> {}", file_name(&from), file_name(&to));
        }
        ProgressEvent::Simulated { from, to } => {
            info!("Would rename {} -> {}", file_name(&from), file_name(&to));
        }
        ProgressEvent::AlreadyNamed { path } => {
            info!("{} already has the correct name", file_name(&path));
        }
        ProgressEvent::Skipped { path, reason } => {
            warn!("Skipping {}: {}", file_name(&path), reason);
        }
        ProgressEvent::Complete { summary } => {
            info!(
                "Processed {} file(s): {} renamed, {} already named, {} skipped",
                summary.processed, summary.renamed, summary.already_named, summary.skipped
            );
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args)?;

    let config_dir = match &args.config {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };
    debug!("Using configuration directory {}", config_dir.display());

    match rename_episodes(
        &args.target,
        &config_dir,
        args.rename_options(),
        !args.no_cache,
        handle_progress_event,
    ) {
        Ok(summary) if summary.success() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
