use alloy::primitives::{I256, U256};

use super::asset::Asset;
use super::edge::Edge;
use super::path::{signed, ArbitragePath};
use super::pool::PoolId;

/// The quote of one leg of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegQuote {
    /// Pool the leg trades against
    pub pool_id: PoolId,
    /// Asset sold into the pool
    pub asset_in: Asset,
    /// Asset bought from the pool
    pub asset_out: Asset,
    /// Amount sold
    pub amount_in: U256,
    /// Amount bought
    pub amount_out: U256,
}

impl LegQuote {
    fn new(edge: &Edge, amount_in: U256) -> Self {
        Self {
            pool_id: edge.pool_id().clone(),
            asset_in: edge.asset_in().clone(),
            asset_out: edge.asset_out().clone(),
            amount_in,
            amount_out: edge.amount_out(amount_in),
        }
    }
}

/// Leg-by-leg quote of a whole path for one input amount.
///
/// The amounts chain: every leg sells exactly what the previous one bought. This is
/// what a batch of swap requests is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuote {
    /// One quote per edge, in trade order
    legs: Vec<LegQuote>,
}

impl PathQuote {
    /// Simulates `path` leg by leg starting with `amount_in`
    #[must_use]
    pub fn new(path: &ArbitragePath, amount_in: U256) -> Self {
        let mut legs = Vec::with_capacity(path.len());
        path.edges().iter().fold(amount_in, |amount, edge| {
            let leg = LegQuote::new(edge, amount);
            let amount_out = leg.amount_out;
            legs.push(leg);
            amount_out
        });
        Self { legs }
    }

    /// The per-leg quotes
    #[must_use]
    pub fn legs(&self) -> &[LegQuote] {
        &self.legs
    }

    /// Amount sold into the first leg
    #[must_use]
    pub fn amount_in(&self) -> U256 {
        self.legs.first().map_or(U256::ZERO, |leg| leg.amount_in)
    }

    /// Amount bought by the last leg
    #[must_use]
    pub fn amount_out(&self) -> U256 {
        self.legs.last().map_or(U256::ZERO, |leg| leg.amount_out)
    }

    /// Gross profit of the quoted trade
    #[must_use]
    pub fn profit(&self) -> I256 {
        signed(self.amount_out()).saturating_sub(signed(self.amount_in()))
    }

    /// The first leg that quotes nothing, if any
    #[must_use]
    pub fn dry_leg(&self) -> Option<&LegQuote> {
        self.legs.iter().find(|leg| leg.amount_out.is_zero())
    }

    /// Profit margin in basis points (10,000 = 100%), capped at `i32` range
    #[must_use]
    pub fn profit_margin(&self) -> i32 {
        let amount_in = self.amount_in();
        if amount_in.is_zero() {
            return 0;
        }
        let profit = self.profit();
        let margin = profit.unsigned_abs().saturating_mul(U256::from(10_000)) / amount_in;
        let margin: i32 = margin.try_into().unwrap_or(i32::MAX);
        if profit.is_negative() {
            -margin
        } else {
            margin
        }
    }
}
