use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::debug;

use version_age::config::EngineConfig;
use version_age::engine::Engine;
use version_age::logging;
use version_age::version::checker::windows_release_name;
use version_age::version::interpolate::EstimateKind;

#[derive(Parser)]
#[command(name = "version-age")]
#[command(version, about = "Estimates how old a browser or OS version is")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the bundled dataset only
    #[arg(long, global = true)]
    offline: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seconds since a version was released
    Age { software: String, version: String },
    /// Whether a version lags the current release
    Outdated { software: String, version: String },
    /// Newest known version of a software
    Current { software: String },
    /// Refresh the cached dataset
    Refresh {
        /// Ignore cache and memo freshness
        #[arg(long)]
        force: bool,
    },
    /// Dataset provenance and known software
    Info,
}

fn format_epoch(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch.to_string())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if cli.offline {
        config.fetch_remote_data = false;
    }
    debug!("Cache directory: {:?}", config.cache_dir);

    let engine = Engine::new(config)?;

    match cli.command {
        Command::Age { software, version } => {
            engine.initialize(false).await?;
            let estimate = engine.age_estimate(&software, &version)?;
            let note = match estimate.kind {
                EstimateKind::Exact => "",
                EstimateKind::Interpolated => " (interpolated)",
                EstimateKind::OutOfRange => " (out of range)",
            };
            println!("{}{}", estimate.seconds, note);
        }
        Command::Outdated { software, version } => {
            engine.initialize(false).await?;
            let status = engine.is_outdated(&software, &version)?;
            if let Ok(Some(name)) = windows_release_name(&version)
                && software.eq_ignore_ascii_case("windows")
            {
                println!("release: {}", name);
            }
            println!("outdated: {}, factor: {:.2}", status.outdated, status.factor);
        }
        Command::Current { software } => {
            engine.initialize(false).await?;
            println!("{}", engine.current_version(&software)?);
        }
        Command::Refresh { force } => {
            let report = engine.initialize(force).await?;
            println!(
                "{}: released {}, {} new anchors",
                report.tier.as_str(),
                format_epoch(report.released),
                report.inserted
            );
        }
        Command::Info => {
            engine.initialize(false).await?;
            println!("released:   {}", format_epoch(engine.released()?));
            println!("last check: {}", format_epoch(engine.last_check()?));
            for name in engine.software_names()? {
                let anchors = engine.timeline(&name)?;
                let latest = anchors
                    .last()
                    .map(|a| a.version_key.as_str())
                    .unwrap_or("-");
                println!("{:<16} {:>3} anchors, latest {}", name, anchors.len(), latest);
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
