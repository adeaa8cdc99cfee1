//! lpds: Command-line tool for building lending position datasets.
//!
//! This binary wires together the readers, the dataset builder and the
//! writers. Commands:
//! - `hourly` - reconstruct every position on a fixed grid
//! - `select-period` - keep each user's first position opened in a window
//! - `chains` - summarize users by their sequence of actions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lp_dataset::{ChainFilter, DatasetBuilder, DatasetConfig, MarketSeries, PeriodWindow};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "lpds",
    about = "Reconstruct lending position time series from action logs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resample positions onto a fixed grid joined with market data.
    Hourly {
        /// Action log CSV.
        #[arg(long)]
        actions: PathBuf,

        /// Market series CSV.
        #[arg(long)]
        market: PathBuf,

        /// Output path.
        #[arg(long)]
        output: PathBuf,

        /// Grid spacing in hours. Overrides LP_STEP_HOURS.
        #[arg(long)]
        step_hours: Option<u32>,

        /// End date for positions that never close. Overrides LP_TRUNCATION_DATE.
        #[arg(long)]
        truncation_date: Option<String>,

        /// Reconstruct users in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Write JSON instead of CSV.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Keep each user's first position opened inside a date window.
    SelectPeriod {
        /// Action log CSV.
        #[arg(long)]
        actions: PathBuf,

        /// Window start (YYYY-MM-DD or datetime, UTC).
        #[arg(long)]
        start: String,

        /// Window end (YYYY-MM-DD or datetime, UTC).
        #[arg(long)]
        end: String,

        /// Output CSV.
        #[arg(long)]
        output: PathBuf,

        /// Cap for positions that never close. Overrides LP_TRUNCATION_DATE.
        #[arg(long)]
        truncation_date: Option<String>,
    },
    /// Build per-user event chains.
    Chains {
        /// Action log CSV.
        #[arg(long)]
        actions: PathBuf,

        /// Output CSV.
        #[arg(long)]
        output: PathBuf,

        /// Required chain prefix.
        #[arg(long, default_value = "")]
        prefix: String,

        /// Keep chains with fewer events than this.
        #[arg(long, default_value_t = lp_dataset::DEFAULT_LEN_LIM)]
        len_lim: usize,

        /// Truncate kept chains to their first K events.
        #[arg(long)]
        first_k: Option<usize>,

        /// Event label the chain must contain.
        #[arg(long)]
        contains: Option<String>,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lpds=info,lp_dataset=info,lp_io=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let env_config = DatasetConfig::from_env().context("invalid LP_* environment")?;

    match cli.command {
        Commands::Hourly {
            actions,
            market,
            output,
            step_hours,
            truncation_date,
            parallel,
            json,
        } => {
            let config = apply_overrides(env_config, step_hours, truncation_date.as_deref(), parallel)?;
            let builder = DatasetBuilder::new(config);

            let actions = lp_io::read_actions_file(&actions)
                .with_context(|| format!("failed to read actions from {}", actions.display()))?;
            let market = lp_io::read_market_file(&market)
                .with_context(|| format!("failed to read market series from {}", market.display()))?;

            let rows = builder.build_hourly(&actions, &MarketSeries::new(market))?;

            let written = if json {
                lp_io::write_hourly_json_file(&output, &rows)
            } else {
                lp_io::write_hourly_file(&output, &rows)
            };
            written.with_context(|| format!("failed to write {}", output.display()))?;
        }
        Commands::SelectPeriod {
            actions,
            start,
            end,
            output,
            truncation_date,
        } => {
            let config = apply_overrides(env_config, None, truncation_date.as_deref(), false)?;
            let window = PeriodWindow::from_dates(&start, &end)?;
            let builder = DatasetBuilder::new(config);

            let actions = lp_io::read_actions_file(&actions)
                .with_context(|| format!("failed to read actions from {}", actions.display()))?;
            let selected = builder.select_period(&actions, &window);

            lp_io::write_actions_file(&output, &selected)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        Commands::Chains {
            actions,
            output,
            prefix,
            len_lim,
            first_k,
            contains,
        } => {
            let filter = chain_filter(prefix, len_lim, first_k, contains);
            let builder = DatasetBuilder::new(env_config);

            let actions = lp_io::read_actions_file(&actions)
                .with_context(|| format!("failed to read actions from {}", actions.display()))?;
            let chains = builder.event_chains(&actions, Some(&filter));

            lp_io::write_chains_file(&output, &chains)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
    }

    Ok(())
}

/// Apply CLI flags on top of the environment config.
fn apply_overrides(
    mut config: DatasetConfig,
    step_hours: Option<u32>,
    truncation_date: Option<&str>,
    parallel: bool,
) -> Result<DatasetConfig> {
    if let Some(hours) = step_hours {
        config = config.with_step_hours(hours);
    }
    if let Some(date) = truncation_date {
        config = config
            .with_truncation_date(date)
            .with_context(|| format!("invalid truncation date {:?}", date))?;
    }
    if parallel {
        config = config.with_parallel(true);
    }
    config.validate()?;
    Ok(config)
}

fn chain_filter(
    prefix: String,
    len_lim: usize,
    first_k: Option<usize>,
    contains: Option<String>,
) -> ChainFilter {
    let mut filter = ChainFilter::default()
        .with_prefix(prefix)
        .with_len_lim(len_lim);
    if let Some(k) = first_k {
        filter = filter.with_first_k(k);
    }
    if let Some(event) = contains {
        filter = filter.with_contains(event);
    }
    filter
}
