//! Runtime configuration.
//!
//! Everything is read from `ORBIT_*` environment variables, after loading a `.env`
//! file if one exists. Unset variables fall back to [`crate::utils::constants`];
//! variables that are set but do not parse are errors.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use eyre::{eyre, Result};

use crate::arb::{FastParams, FeeContext, Optimizer, PreciseParams};
use crate::utils::constants::{
    DEFAULT_CUTOFF, DEFAULT_INTERVAL_MS, DEFAULT_MAX_AMOUNT_IN, DEFAULT_MAX_WORKERS,
    DEFAULT_MIN_FEE, DEFAULT_PRECISE, DEFAULT_SNAPSHOT_PATH, DEFAULT_TOP_OPPORTUNITIES,
};

/// Settings of the decision loop
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Pool snapshot file
    pub snapshot_path: PathBuf,
    /// Maximum number of swaps in a cycle
    pub cutoff: usize,
    /// Largest trade size, in native base units
    pub max_amount_in: U256,
    /// Network fee parameters
    pub fee: FeeContext,
    /// Opportunities sized and sent per decision cycle
    pub top_opportunities: usize,
    /// Pause between decision cycles
    pub interval: Duration,
    /// Concurrent pool refreshes
    pub max_workers: usize,
    /// How trades are sized
    pub optimizer: Optimizer,
    /// Account the swaps are sent from
    pub sender: Address,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            cutoff: DEFAULT_CUTOFF,
            max_amount_in: U256::from(DEFAULT_MAX_AMOUNT_IN),
            fee: FeeContext::new(DEFAULT_MIN_FEE),
            top_opportunities: DEFAULT_TOP_OPPORTUNITIES,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_workers: DEFAULT_MAX_WORKERS,
            optimizer: optimizer(DEFAULT_PRECISE),
            sender: Address::ZERO,
        }
    }
}

/// The optimizer with default parameters
#[must_use]
pub fn optimizer(precise: bool) -> Optimizer {
    if precise {
        Optimizer::Precise(PreciseParams::default())
    } else {
        Optimizer::Fast(FastParams::default())
    }
}

impl Config {
    /// Loads `.env` if present, then reads the configuration from the environment.
    ///
    /// # Errors
    /// * If a variable is set to a value that does not parse
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// * If a variable is set to a value that does not parse
    /// * If `ORBIT_CUTOFF` or `ORBIT_MAX_WORKERS` is zero
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let cutoff: usize = parse_var(&lookup, "ORBIT_CUTOFF", defaults.cutoff)?;
        let max_workers: usize = parse_var(&lookup, "ORBIT_MAX_WORKERS", defaults.max_workers)?;

        let config = Self {
            snapshot_path: lookup("ORBIT_SNAPSHOT_PATH").map_or(defaults.snapshot_path, PathBuf::from),
            cutoff,
            max_amount_in: parse_var(&lookup, "ORBIT_MAX_AMOUNT_IN", defaults.max_amount_in)?,
            fee: FeeContext::new(parse_var(&lookup, "ORBIT_MIN_FEE", defaults.fee.min_fee)?),
            top_opportunities: parse_var(
                &lookup,
                "ORBIT_TOP_OPPORTUNITIES",
                defaults.top_opportunities,
            )?,
            interval: Duration::from_millis(parse_var(
                &lookup,
                "ORBIT_INTERVAL_MS",
                DEFAULT_INTERVAL_MS,
            )?),
            max_workers,
            optimizer: optimizer(parse_var(&lookup, "ORBIT_PRECISE", DEFAULT_PRECISE)?),
            sender: parse_var(&lookup, "ORBIT_SENDER", defaults.sender)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings the bot cannot run without.
    ///
    /// # Errors
    /// * If the cutoff or the worker count is zero
    pub fn validate(&self) -> Result<()> {
        if self.cutoff == 0 {
            return Err(eyre!("cutoff must be at least 1"));
        }
        if self.max_workers == 0 {
            return Err(eyre!("max_workers must be at least 1"));
        }
        Ok(())
    }
}

/// Parses variable `key`, or returns `default` when it is unset
fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| eyre!("{key} has invalid value {value:?}: {e}")),
    }
}
