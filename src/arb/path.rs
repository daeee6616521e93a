/// An arbitrage path is a sequence of edges that forms a cycle (first and last asset are
/// the same). It quotes the whole cycle against the current pool snapshots; sizing the
/// trade lives in the optimizer.
use std::fmt::{self, Debug, Display};

use alloy::primitives::{I256, U256};
use itertools::Itertools;

use super::asset::Asset;
use super::edge::Edge;
use super::error::ArbError;
use super::pool::FeeContext;

/// A closed cycle of edges starting and ending at the same asset
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ArbitragePath {
    /// Edges in trade order
    edges: Vec<Edge>,
}

impl Debug for ArbitragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ArbitragePath({})",
            self.edges.iter().map(|e| format!("{e:?}")).join(", ")
        )
    }
}

impl Display for ArbitragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArbitragePath<{}>", self.asset_cycle().iter().join("|"))
    }
}

impl ArbitragePath {
    /// Creates a path from edges that chain into a closed cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if `edges` is empty or does not chain back to its start
    pub fn new(edges: Vec<Edge>) -> Result<Self, ArbError> {
        let path = Self { edges };
        path.validate_edges()?;
        Ok(path)
    }

    /// Wraps edges the cycle finder already proved to be a closed chain
    pub(crate) const fn from_cycle(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    fn validate_edges(&self) -> Result<(), ArbError> {
        if self.edges.is_empty() {
            return Err(ArbError::InvalidPath(
                "Path must have at least one edge".to_string(),
            ));
        }

        for i in 0..self.edges.len() {
            let next = (i + 1) % self.edges.len();
            if self.edges[i].asset_out() != self.edges[next].asset_in() {
                return Err(ArbError::InvalidPath(format!(
                    "Edge {} asset_out ({}) does not match edge {} asset_in ({})",
                    i,
                    self.edges[i].asset_out(),
                    next,
                    self.edges[next].asset_in()
                )));
            }
        }
        Ok(())
    }

    /// The edges in trade order
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of swaps in the cycle
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Always false: a path has at least one edge
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The asset the cycle starts and ends with; profits are denominated in it
    #[must_use]
    pub fn asset(&self) -> &Asset {
        self.edges[0].asset_in()
    }

    /// Assets visited in order, start asset repeated at the end
    #[must_use]
    pub fn asset_cycle(&self) -> Vec<&Asset> {
        self.edges
            .iter()
            .map(Edge::asset_in)
            .chain(std::iter::once(self.asset()))
            .collect()
    }

    /// The `amount_out` we get from this path when we start with `amount_in`.
    ///
    /// Stops at the first leg that pays nothing: a dry leg kills the whole path.
    #[must_use]
    pub fn amount_out(&self, amount_in: U256) -> U256 {
        let mut amount = amount_in;
        for edge in &self.edges {
            if amount.is_zero() {
                break;
            }
            amount = edge.amount_out(amount);
        }
        amount
    }

    /// `amount_out(amount_in) - amount_in`, in units of [`ArbitragePath::asset`]
    #[must_use]
    pub fn profit(&self, amount_in: U256) -> I256 {
        signed(self.amount_out(amount_in)).saturating_sub(signed(amount_in))
    }

    /// Profit minus the flat network fee of the whole cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not start at the native asset, which is the
    /// only asset fees can be subtracted from
    pub fn profit_after_fee(&self, amount_in: U256, ctx: &FeeContext) -> Result<I256, ArbError> {
        if !self.asset().is_native() {
            return Err(ArbError::FeeCurrencyMismatch(self.asset().clone()));
        }
        Ok(self
            .profit(amount_in)
            .saturating_sub(signed(U256::from(self.fee(ctx)))))
    }

    /// Finite-difference estimate of the profit derivative around `amount_in`.
    ///
    /// Quotes are integer-truncated, so profit is a step function and this is only a
    /// direction signal at scales of `step` and above, not a gradient.
    #[must_use]
    pub fn profit_slope(&self, amount_in: U256, step: U256, centered: bool) -> f64 {
        let step = step.max(U256::from(1));
        let mut left = amount_in;
        let mut right = amount_in.saturating_add(step);
        if centered {
            let half = step / U256::from(2);
            left = left.saturating_sub(half);
            right = right.saturating_sub(half);
        }
        let rise = self.profit(right).saturating_sub(self.profit(left));
        signed_to_f64(rise) / f64::from(step)
    }

    /// Profit per unit of input at `amount_in`
    #[must_use]
    pub fn profit_ratio(&self, amount_in: U256) -> f64 {
        if amount_in.is_zero() {
            return 0.0;
        }
        signed_to_f64(self.profit(amount_in)) / f64::from(amount_in)
    }

    /// Spot rate of the cycle minus one, fees and slippage ignored.
    /// Positive means small trades around the cycle gain.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.edges.iter().map(Edge::ratio).product::<f64>() - 1.0
    }

    /// Flat network fee of executing every leg, in native base units
    #[must_use]
    pub fn fee(&self, ctx: &FeeContext) -> u64 {
        self.edges
            .iter()
            .fold(0u64, |fee, edge| fee.saturating_add(edge.pool().fee(ctx)))
    }
}

/// Reinterprets an amount as a signed value. Amounts stay far below 2^255.
pub(crate) fn signed(amount: U256) -> I256 {
    I256::from_raw(amount)
}

/// Lossy conversion of a signed amount, for ratios and slopes
pub(crate) fn signed_to_f64(value: I256) -> f64 {
    let magnitude = f64::from(value.unsigned_abs());
    if value.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}
