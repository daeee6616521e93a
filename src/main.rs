use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::U256;
use clap::{Parser, Subcommand};
use eyre::{Error, Result};
use log::info;

use orbit::arb::path_quote::PathQuote;
use orbit::arb::DryRunSettlement;
use orbit::bot::{Bot, SnapshotReserveSource};
use orbit::config::{self, Config};
use orbit::snapshot::PoolSnapshot;
use orbit::utils::logger::setup_logger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Pool snapshot file
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Maximum number of swaps in a cycle
    #[arg(long, global = true)]
    cutoff: Option<usize>,

    /// Largest trade size, in native base units
    #[arg(long, global = true)]
    max_amount_in: Option<u64>,

    /// Size trades with the fast optimizer
    #[arg(long, global = true)]
    fast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one decision cycle and print the opportunities
    Scan,
    /// Run decision cycles until ctrl-c
    Run,
}

impl Cli {
    /// Applies the command line overrides to `config`
    fn apply(&self, mut config: Config) -> Config {
        if let Some(snapshot) = &self.snapshot {
            config.snapshot_path.clone_from(snapshot);
        }
        if let Some(cutoff) = self.cutoff {
            config.cutoff = cutoff;
        }
        if let Some(max_amount_in) = self.max_amount_in {
            config.max_amount_in = U256::from(max_amount_in);
        }
        if self.fast {
            config.optimizer = config::optimizer(false);
        }
        config
    }
}

/// Builds a dry-run bot over the configured snapshot
fn build_bot(config: Config) -> Result<Bot, Error> {
    let pools = PoolSnapshot::load(&config.snapshot_path)?.into_pools()?;
    let source = Arc::new(SnapshotReserveSource::new(&config.snapshot_path));
    Ok(Bot::new(pools, source, Arc::new(DryRunSettlement), config))
}

async fn scan(config: Config) -> Result<(), Error> {
    let mut bot = build_bot(config)?;
    bot.refresh().await?;
    let opportunities = bot.opportunities()?;

    println!("\nFound {} opportunities", opportunities.len());
    for opportunity in &opportunities {
        let margin = PathQuote::new(&opportunity.path, opportunity.amount_in).profit_margin();
        println!(
            "{} ratio {:.6}: amount_in {}, profit {} ({margin} bps), after fee {}",
            opportunity.path,
            opportunity.path.ratio(),
            opportunity.amount_in,
            opportunity.profit,
            opportunity.profit_after_fee
        );
    }
    Ok(())
}

async fn run(config: Config) -> Result<(), Error> {
    info!(
        "Bot started with snapshot {}, cutoff {}",
        config.snapshot_path.display(),
        config.cutoff
    );
    let mut bot = build_bot(config)?;
    bot.run().await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_logger()?;

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env()?);
    config.validate()?;

    match cli.command {
        Some(Commands::Scan) => scan(config).await?,
        Some(Commands::Run) | None => run(config).await?,
    }

    Ok(())
}
