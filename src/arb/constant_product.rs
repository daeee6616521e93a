//! Constant-product (x * y = k) pools.
//!
//! This one adapter covers every XYK-style AMM the bot trades on. Families differ
//! only in fee tier, minimum input and how many ledger transactions a swap needs,
//! which are plain parameters here.

use std::fmt::{self, Display};

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::error::ArbError;
use super::pool::{FeeContext, Pool, PoolId};
use super::transaction::SwapRequest;

/// Basis points in one whole
const BPS: u64 = 10_000;

/// Default swap fee of a constant-product pool (0.3%)
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Default number of ledger transactions in one swap group
pub const DEFAULT_SWAP_TXN_COUNT: u64 = 2;

/// A constant-product pool snapshot.
///
/// Reserves never change in place; [`ConstantProductPool::with_reserves`] returns the
/// refreshed pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantProductPool {
    /// The pool identity
    id: PoolId,
    /// AMM family label (e.g. `tinyman`, `pactfi`)
    family: String,
    /// The lower-id asset
    asset0: Asset,
    /// The higher-id asset
    asset1: Asset,
    /// Reserve of `asset0`
    reserve0: U256,
    /// Reserve of `asset1`
    reserve1: U256,
    /// Swap fee in basis points
    fee_bps: u32,
    /// Inputs below this amount are rejected by the pool
    min_amount_in: U256,
    /// Ledger transactions needed by one swap
    swap_txn_count: u64,
}

impl ConstantProductPool {
    /// Creates a new pool. Assets may be given in any order; reserves follow them.
    ///
    /// # Errors
    ///
    /// Returns an error if both assets are the same
    pub fn new(
        id: PoolId,
        family: impl Into<String>,
        (asset_a, reserve_a): (Asset, U256),
        (asset_b, reserve_b): (Asset, U256),
        fee_bps: u32,
    ) -> Result<Self, ArbError> {
        if asset_a == asset_b {
            return Err(ArbError::AssetNotInPool {
                asset: asset_b,
                pool: id,
            });
        }
        let ((asset0, reserve0), (asset1, reserve1)) = if asset_a < asset_b {
            ((asset_a, reserve_a), (asset_b, reserve_b))
        } else {
            ((asset_b, reserve_b), (asset_a, reserve_a))
        };
        Ok(Self {
            id,
            family: family.into(),
            asset0,
            asset1,
            reserve0,
            reserve1,
            fee_bps: fee_bps.min(BPS as u32),
            min_amount_in: U256::ZERO,
            swap_txn_count: DEFAULT_SWAP_TXN_COUNT,
        })
    }

    /// Sets the minimum input amount the pool accepts
    #[must_use]
    pub fn with_min_amount_in(mut self, min_amount_in: U256) -> Self {
        self.min_amount_in = min_amount_in;
        self
    }

    /// Sets the number of ledger transactions one swap needs
    #[must_use]
    pub const fn with_swap_txn_count(mut self, swap_txn_count: u64) -> Self {
        self.swap_txn_count = swap_txn_count;
        self
    }

    /// Returns a copy of the pool with refreshed reserves, ordered as `assets()`
    #[must_use]
    pub fn with_reserves(&self, reserve0: U256, reserve1: U256) -> Self {
        Self {
            reserve0,
            reserve1,
            ..self.clone()
        }
    }

    /// Both reserves, ordered as `assets()`
    #[must_use]
    pub const fn reserves(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    /// Reserves as (input side, output side), if `asset_in` belongs to the pool
    fn sides(&self, asset_in: &Asset) -> Option<(U256, U256)> {
        if asset_in == &self.asset0 {
            Some((self.reserve0, self.reserve1))
        } else if asset_in == &self.asset1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }

    /// The constant-product quote with the fee taken from the input.
    /// `None` when the arithmetic overflows.
    fn quote(&self, reserve_in: U256, reserve_out: U256, amount_in: U256) -> Option<U256> {
        let fee_factor = U256::from(BPS - u64::from(self.fee_bps));
        let amount_in_with_fee = amount_in.checked_mul(fee_factor)?;
        let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
        let denominator = reserve_in
            .checked_mul(U256::from(BPS))?
            .checked_add(amount_in_with_fee)?;
        numerator.checked_div(denominator)
    }
}

impl Pool for ConstantProductPool {
    fn id(&self) -> &PoolId {
        &self.id
    }

    fn family(&self) -> &str {
        &self.family
    }

    fn assets(&self) -> (&Asset, &Asset) {
        (&self.asset0, &self.asset1)
    }

    fn supply(&self, asset: &Asset) -> U256 {
        if asset == &self.asset0 {
            self.reserve0
        } else if asset == &self.asset1 {
            self.reserve1
        } else {
            U256::ZERO
        }
    }

    fn amount_out(&self, asset_in: &Asset, amount_in: U256) -> U256 {
        if amount_in.is_zero() || amount_in < self.min_amount_in {
            return U256::ZERO;
        }
        let Some((reserve_in, reserve_out)) = self.sides(asset_in) else {
            return U256::ZERO;
        };
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return U256::ZERO;
        }
        self.quote(reserve_in, reserve_out, amount_in)
            .unwrap_or(U256::ZERO)
    }

    fn fee(&self, ctx: &FeeContext) -> u64 {
        self.swap_txn_count.saturating_mul(ctx.min_fee)
    }

    fn prepare_swap_request(
        &self,
        sender: Address,
        asset_in: &Asset,
        amount_in: U256,
        amount_out: U256,
        ctx: &FeeContext,
    ) -> Result<SwapRequest, ArbError> {
        let asset_out = self.other_asset(asset_in)?.clone();
        Ok(SwapRequest {
            pool_id: self.id.clone(),
            sender,
            asset_in: asset_in.clone(),
            asset_out,
            amount_in,
            amount_out,
            fee: self.fee(ctx),
        })
    }
}

impl Display for ConstantProductPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {} {}",
            self.asset0, self.reserve0, self.asset1, self.reserve1, self.family
        )
    }
}

/// Serialized form of a constant-product pool, as stored in snapshots
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// The pool identity
    pub id: PoolId,
    /// AMM family label
    pub family: String,
    /// The lower-id asset
    pub asset0: Asset,
    /// The higher-id asset
    pub asset1: Asset,
    /// Reserve of `asset0`
    pub reserve0: u64,
    /// Reserve of `asset1`
    pub reserve1: u64,
    /// Swap fee in basis points
    pub fee_bps: u32,
    /// Minimum accepted input
    #[serde(default)]
    pub min_amount_in: u64,
    /// Ledger transactions per swap
    #[serde(default = "default_swap_txn_count")]
    pub swap_txn_count: u64,
}

/// Serde default for `swap_txn_count`
const fn default_swap_txn_count() -> u64 {
    DEFAULT_SWAP_TXN_COUNT
}

impl TryFrom<PoolRecord> for ConstantProductPool {
    type Error = ArbError;

    fn try_from(record: PoolRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(
            record.id,
            record.family,
            (record.asset0, U256::from(record.reserve0)),
            (record.asset1, U256::from(record.reserve1)),
            record.fee_bps,
        )?
        .with_min_amount_in(U256::from(record.min_amount_in))
        .with_swap_txn_count(record.swap_txn_count))
    }
}

impl From<&ConstantProductPool> for PoolRecord {
    fn from(pool: &ConstantProductPool) -> Self {
        Self {
            id: pool.id.clone(),
            family: pool.family.clone(),
            asset0: pool.asset0.clone(),
            asset1: pool.asset1.clone(),
            reserve0: pool.reserve0.saturating_to(),
            reserve1: pool.reserve1.saturating_to(),
            fee_bps: pool.fee_bps,
            min_amount_in: pool.min_amount_in.saturating_to(),
            swap_txn_count: pool.swap_txn_count,
        }
    }
}
