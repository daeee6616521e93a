//! Defaults of the decision loop, overridable through the environment

/// Snapshot file read at startup and on every refresh
pub const DEFAULT_SNAPSHOT_PATH: &str = "pools.json";
/// Maximum number of swaps in a cycle
pub const DEFAULT_CUTOFF: usize = 4;
/// Largest trade size, in native base units
pub const DEFAULT_MAX_AMOUNT_IN: u64 = 1_000_000;
/// Flat fee of one ledger transaction, in native base units
pub const DEFAULT_MIN_FEE: u64 = 1_000;
/// Opportunities sized and sent per decision cycle
pub const DEFAULT_TOP_OPPORTUNITIES: usize = 10;
/// Pause between decision cycles
pub const DEFAULT_INTERVAL_MS: u64 = 1_000;
/// Concurrent pool refreshes
pub const DEFAULT_MAX_WORKERS: usize = 5;
/// Whether the precise optimizer sizes trades
pub const DEFAULT_PRECISE: bool = true;
