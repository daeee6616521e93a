//! The pool capability.
//!
//! Every AMM adapter implements [`Pool`]. The graph, paths and optimizers only ever
//! hold `Arc<dyn Pool>`, so adding an AMM family never touches the search code.
//! Pools handed to the core are snapshots: they must not change while a decision
//! cycle is quoting them. Refreshing means building a new snapshot.

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::error::ArbError;
use super::transaction::SwapRequest;

/// A unique identifier of a pool (its address or escrow account)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub String);

impl From<&str> for PoolId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PoolId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network parameters needed to price the ledger side of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeContext {
    /// Flat fee of one ledger transaction, in native base units
    pub min_fee: u64,
}

impl FeeContext {
    /// Creates a new fee context
    #[must_use]
    pub const fn new(min_fee: u64) -> Self {
        Self { min_fee }
    }
}

/// Shared handle to a pool snapshot
pub type PoolRef = Arc<dyn Pool>;

/// What the arbitrage core needs from an AMM pool.
pub trait Pool: Debug + Send + Sync {
    /// The pool identity, used as the key of its graph edges
    fn id(&self) -> &PoolId;

    /// Name of the AMM family this pool belongs to
    fn family(&self) -> &str;

    /// The two distinct assets of the pool, ordered by id
    fn assets(&self) -> (&Asset, &Asset);

    /// Current reserve of `asset`; zero for an asset the pool does not hold
    fn supply(&self, asset: &Asset) -> U256;

    /// The exact amount the pool pays out for `amount_in` of `asset_in`.
    ///
    /// Must be non-decreasing in `amount_in`. Anything the pool cannot quote
    /// (input below its minimum, empty reserves, overflow) is zero.
    fn amount_out(&self, asset_in: &Asset, amount_in: U256) -> U256;

    /// Flat network fee of one swap through this pool, in native base units
    fn fee(&self, ctx: &FeeContext) -> u64;

    /// Prepares the request that executes an already quoted swap.
    ///
    /// # Errors
    ///
    /// Returns an error if `asset_in` is not one of the pool's assets
    fn prepare_swap_request(
        &self,
        sender: Address,
        asset_in: &Asset,
        amount_in: U256,
        amount_out: U256,
        ctx: &FeeContext,
    ) -> Result<SwapRequest, ArbError>;

    /// The asset on the other side of `given`.
    ///
    /// # Errors
    ///
    /// Returns an error if `given` is not one of the pool's assets
    fn other_asset(&self, given: &Asset) -> Result<&Asset, ArbError> {
        let (asset0, asset1) = self.assets();
        if given == asset0 {
            Ok(asset1)
        } else if given == asset1 {
            Ok(asset0)
        } else {
            Err(ArbError::AssetNotInPool {
                asset: given.clone(),
                pool: self.id().clone(),
            })
        }
    }

    /// Output per unit of input for an infinitesimal swap, fees ignored
    fn ratio(&self, asset_in: &Asset) -> f64 {
        let Ok(asset_out) = self.other_asset(asset_in) else {
            return 0.0;
        };
        let supply_in = self.supply(asset_in);
        if supply_in.is_zero() {
            return 0.0;
        }
        f64::from(self.supply(asset_out)) / f64::from(supply_in)
    }
}
