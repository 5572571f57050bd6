use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assetdesk_config::{
    BrowserConfig, BrowserConfigSource, ConfigWarnings, apply_guard_rails,
};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use log::LevelFilter;
use serde_json::json;

mod scenario;

use scenario::{Scenario, replay};

#[derive(Parser)]
#[command(
    name = "assetdesk",
    about = "Replay scripted asset browser sessions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a JSON scenario against the in-memory backend and print the final
    /// snapshot
    Replay {
        /// Scenario file (JSON)
        #[arg(long)]
        scenario: PathBuf,
        /// Browser config file (TOML or JSON); overrides the environment
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the resolved browser configuration
    Config {
        /// Browser config file (TOML or JSON); overrides the environment
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("assetdesk_core", LevelFilter::Debug)
        .filter_module("assetdesk", LevelFilter::Debug)
        .init();
}

fn resolve_config(
    path: Option<&Path>,
) -> Result<(BrowserConfig, BrowserConfigSource, ConfigWarnings)> {
    let (config, source) = match path {
        Some(path) => (
            BrowserConfig::load_from_file(path)?,
            BrowserConfigSource::File(path.to_path_buf()),
        ),
        None => BrowserConfig::load_from_env()?,
    };

    let warnings = apply_guard_rails(&config)
        .with_context(|| format!("rejected browser config from {source:?}"))?;
    for warning in warnings.iter() {
        match warning.hint() {
            Some(hint) => log::warn!("{warning} ({hint})"),
            None => log::warn!("{warning}"),
        }
    }
    Ok((config, source, warnings))
}

fn describe_source(source: &BrowserConfigSource) -> String {
    match source {
        BrowserConfigSource::Default => "default".to_owned(),
        BrowserConfigSource::EnvPath(path) => {
            format!("env-path:{}", path.display())
        }
        BrowserConfigSource::EnvInline => "env-inline".to_owned(),
        BrowserConfigSource::File(path) => format!("file:{}", path.display()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::Builder::from_default_env()
            .target(Target::Stderr)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Replay { scenario, config } => {
            let (config, source, _) = resolve_config(config.as_deref())?;
            log::debug!("Using browser config from {}", describe_source(&source));

            let raw = fs::read_to_string(&scenario).with_context(|| {
                format!("failed to read scenario {}", scenario.display())
            })?;
            let parsed: Scenario = serde_json::from_str(&raw).with_context(|| {
                format!("invalid scenario {}", scenario.display())
            })?;

            let report = replay(parsed, config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Config { config } => {
            let (config, source, warnings) =
                resolve_config(config.as_deref())?;
            let output = json!({
                "source": describe_source(&source),
                "config": config,
                "warnings": warnings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
