//! MA Research Binary
//!
//! Runs the window search and selection for one or many research configs
//! and prints the resulting report as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! ma-research run --config configs/baseline.yaml
//! ma-research run --config configs/baseline.yaml --series data/raw/SPY.csv --raw
//! ma-research batch --configs-dir configs
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: the config's `observability.logging.level`)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ma_research::config::{LoggingConfig, ResearchConfig, load_config};
use ma_research::research::{ResearchReport, RunSummary, rank_runs, run_research};
use ma_research::series::{FeatureSeries, load_feature_csv, load_price_csv};
use ma_research::telemetry::init_telemetry;
use serde::Serialize;
use tracing::info;

/// Moving-average window research.
#[derive(Debug, Parser)]
#[command(name = "ma-research", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Research one config.
    Run {
        /// Path to the YAML config.
        #[arg(long)]
        config: PathBuf,
        /// Series CSV, overriding the config's `feature_file`.
        #[arg(long)]
        series: Option<PathBuf>,
        /// Treat the series as raw `date,close` prices and derive features.
        #[arg(long)]
        raw: bool,
    },
    /// Research every `*.yaml` / `*.yml` config in a directory and rank the runs.
    Batch {
        /// Directory of YAML configs.
        #[arg(long, env = "MA_RESEARCH_CONFIGS_DIR")]
        configs_dir: PathBuf,
        /// Treat each series as raw `date,close` prices.
        #[arg(long)]
        raw: bool,
    },
}

/// Output of the `batch` command.
#[derive(Debug, Serialize)]
struct BatchOutput {
    runs: Vec<ResearchReport>,
    ranking: Vec<RunSummary>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            series,
            raw,
        } => {
            let config = load_config(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            let _guard = init_telemetry(&config.observability.logging);

            let report = research_one(config, series, raw).await?;
            print_json(&report)
        }
        Command::Batch { configs_dir, raw } => {
            let configs = load_configs(&configs_dir)?;
            let logging = configs
                .first()
                .map_or_else(LoggingConfig::default, |c| c.observability.logging.clone());
            let _guard = init_telemetry(&logging);

            let mut runs = Vec::with_capacity(configs.len());
            for config in configs {
                runs.push(research_one(config, None, raw).await?);
            }
            let ranking = rank_runs(&runs);

            if let Some(top) = ranking.first() {
                info!(
                    runs = runs.len(),
                    top_run = %top.run_name,
                    window = top.best.window,
                    sharpe = top.best.sharpe,
                    "Batch complete"
                );
            }
            print_json(&BatchOutput { runs, ranking })
        }
    }
}

/// Load the series and run the research on the blocking pool.
async fn research_one(
    config: ResearchConfig,
    series_override: Option<PathBuf>,
    raw: bool,
) -> Result<ResearchReport> {
    let path = match series_override {
        Some(path) => path,
        None => match &config.feature_file {
            Some(file) => PathBuf::from(file),
            None => bail!(
                "run '{}' has no feature_file and no --series was given",
                config.run_name
            ),
        },
    };

    tokio::task::spawn_blocking(move || {
        let series = load_series(&path, raw)?;
        run_research(&series, &config)
            .with_context(|| format!("research run '{}' failed", config.run_name))
    })
    .await
    .context("research task panicked")?
}

fn load_series(path: &Path, raw: bool) -> Result<FeatureSeries> {
    let series = if raw {
        load_price_csv(path)
    } else {
        load_feature_csv(path)
    };
    series.with_context(|| format!("loading series {}", path.display()))
}

/// Configs in `dir`, sorted by file name.
fn load_configs(dir: &Path) -> Result<Vec<ResearchConfig>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading configs dir {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        bail!("no YAML configs found in {}", dir.display());
    }

    paths
        .iter()
        .map(|p| load_config(p).with_context(|| format!("loading config {}", p.display())))
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing report")?;
    println!("{json}");
    Ok(())
}

/// Load `.env` from the working directory or the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
