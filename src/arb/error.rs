use thiserror::Error;

use super::asset::Asset;
use super::pool::PoolId;

/// Errors raised by the arbitrage core.
///
/// Quote-level anomalies never show up here: a pool that cannot quote an
/// amount returns zero, so one bad leg only devalues its own paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArbError {
    /// The requested source asset has no incident edge in the graph
    #[error("Asset {0} is not in any pool of the graph")]
    AssetNotInGraph(Asset),

    /// The asset is not one of the two assets of the pool
    #[error("Asset {asset} is not traded by pool {pool}")]
    AssetNotInPool {
        /// The offending asset
        asset: Asset,
        /// The pool that was asked about it
        pool: PoolId,
    },

    /// The edge sequence does not form a closed, chained cycle
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The pool reserves could not be read by the refresh collaborator
    #[error("Pool {pool} unavailable: {reason}")]
    PoolUnavailable {
        /// The pool that failed to refresh
        pool: PoolId,
        /// What the collaborator reported
        reason: String,
    },

    /// Fees are paid in the native asset, so fee-adjusted profit needs a native path
    #[error("Path asset {0} is not the fee currency")]
    FeeCurrencyMismatch(Asset),

    /// A batch was requested for an amount that yields nothing
    #[error("No trade: {0}")]
    NoTrade(String),

    /// The settlement collaborator rejected the batch
    #[error("Settlement failed: {0}")]
    Settlement(String),
}
