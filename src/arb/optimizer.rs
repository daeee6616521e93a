//! Trade sizing.
//!
//! Both optimizers search `[min_amount_in, max_amount_in]` for the input that maximizes
//! the profit of a path, assuming profit rises then falls over that interval. That holds
//! for chained constant-product pools but is not checked. Both return zero when no
//! amount in range is profitable, and callers must treat zero as "no trade".

use alloy::primitives::{I256, U256};
use log::trace;

use super::error::ArbError;
use super::path::ArbitragePath;
use super::pool::FeeContext;
use super::step::{step_end, step_start};

/// Default smallest amount worth trading, in base units
pub const DEFAULT_MIN_AMOUNT_IN: u64 = 10_000;
/// Default finite-difference step of the fast optimizer
pub const DEFAULT_STEP: u64 = 10_000;
/// Default bracket width at which the precise optimizer stops
pub const DEFAULT_PRECISION: u64 = 100;
/// Default number of points sampled per precise iteration
pub const DEFAULT_SAMPLES: usize = 10;
/// Default iteration cap of the precise optimizer
pub const DEFAULT_ITERATIONS: usize = 100;

/// Parameters of [`ArbitragePath::optimal_amount_in_fast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastParams {
    /// Lower bound of the search
    pub min_amount_in: U256,
    /// Finite-difference step, also the resolution of the result
    pub step: U256,
}

impl Default for FastParams {
    fn default() -> Self {
        Self {
            min_amount_in: U256::from(DEFAULT_MIN_AMOUNT_IN),
            step: U256::from(DEFAULT_STEP),
        }
    }
}

/// Parameters of [`ArbitragePath::optimal_amount_in_precise`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreciseParams {
    /// Lower bound of the search
    pub min_amount_in: U256,
    /// Bracket width at which the search stops
    pub precision: U256,
    /// Points sampled across the bracket per iteration (at least 3 are used)
    pub samples: usize,
    /// Maximum number of narrowing iterations
    pub iterations: usize,
}

impl Default for PreciseParams {
    fn default() -> Self {
        Self {
            min_amount_in: U256::from(DEFAULT_MIN_AMOUNT_IN),
            precision: U256::from(DEFAULT_PRECISION),
            samples: DEFAULT_SAMPLES,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Which optimizer sizes a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimizer {
    /// Binary search on the sign of the profit slope
    Fast(FastParams),
    /// Plateau-aware sampling search
    Precise(PreciseParams),
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::Fast(FastParams::default())
    }
}

impl ArbitragePath {
    /// Binary search on the sign of the profit slope.
    ///
    /// Returns `max_amount_in` when profit is still rising there, and zero when the
    /// lower bound never moves (nothing in range is worth trading).
    ///
    /// # Arguments
    ///
    /// * `max_amount_in` - Largest amount the trade may use
    /// * `params` - Lower bound, slope step and search precision
    ///
    /// # Returns
    ///
    /// The amount to trade, or zero if no amount in range is profitable
    #[must_use]
    pub fn optimal_amount_in_fast(&self, max_amount_in: U256, params: &FastParams) -> U256 {
        let min_amount_in = params.min_amount_in;
        if max_amount_in < min_amount_in {
            return U256::ZERO;
        }
        let step = params.step.max(U256::from(1));
        let mut x = min_amount_in;
        let mut y = max_amount_in;

        let amount_in = if self.profit_slope(y, step, true) >= 0.0 {
            y
        } else {
            let mut mid = x;
            while y.saturating_sub(x) > step {
                mid = (x + y) / U256::from(2);
                if self.profit_slope(mid, step, true) > 0.0 {
                    x = mid;
                } else {
                    y = mid;
                }
            }
            if x == min_amount_in {
                U256::ZERO
            } else {
                mid
            }
        };

        trace!("{self}: fast optimizer picked {amount_in}");
        self.no_trade_unless_profitable(amount_in)
    }

    /// Sampling search whose candidates are snapped to plateau boundaries of the
    /// path quote, so comparisons never happen in the middle of a flat step.
    ///
    /// Each iteration samples the bracket evenly and keeps the neighbours of the best
    /// sample. Stops once the bracket is narrower than `precision` or the iteration cap
    /// is hit. If profit peaks at the upper end of the bracket the upper end is returned.
    ///
    /// # Arguments
    ///
    /// * `max_amount_in` - Largest amount the trade may use
    /// * `params` - Lower bound, sample count, precision and iteration cap
    ///
    /// # Returns
    ///
    /// The amount to trade, or zero if no amount in range is profitable
    #[must_use]
    pub fn optimal_amount_in_precise(&self, max_amount_in: U256, params: &PreciseParams) -> U256 {
        let min_amount_in = params.min_amount_in;
        if max_amount_in < min_amount_in {
            return U256::ZERO;
        }
        let samples = params.samples.max(3);
        let last = samples - 1;
        let snap = |x: U256| self.snap_to_step(x, min_amount_in, max_amount_in);

        let mut left = snap(min_amount_in);
        let mut right = snap(max_amount_in);
        let mut best = if self.profit(left) >= self.profit(right) {
            left
        } else {
            right
        };
        let mut rising_to_edge = false;

        for _ in 0..params.iterations {
            let width = right.saturating_sub(left);
            if width <= params.precision {
                break;
            }
            let xs: Vec<U256> = (0..samples)
                .map(|i| snap(left + width * U256::from(i) / U256::from(last)))
                .collect();
            let profits: Vec<I256> = xs.iter().map(|x| self.profit(*x)).collect();

            // first arg-max
            let mut top = 0;
            for (i, profit) in profits.iter().enumerate() {
                if *profit > profits[top] {
                    top = i;
                }
            }
            if profits[top] > self.profit(best) {
                best = xs[top];
            }

            if top == last {
                rising_to_edge = true;
                break;
            }
            (left, right) = if top == 0 {
                (xs[0], xs[1])
            } else {
                (xs[top - 1], xs[top + 1])
            };
        }

        let amount_in = if rising_to_edge { right } else { best };
        trace!("{self}: precise optimizer picked {amount_in}");
        self.no_trade_unless_profitable(amount_in)
    }

    /// The better of the start of the plateau holding `x` and the start of the next one,
    /// kept inside `[lower, upper]`
    fn snap_to_step(&self, x: U256, lower: U256, upper: U256) -> U256 {
        let quote = |amount: U256| self.amount_out(amount);
        let start = step_start(quote, x).clamp(lower, upper);
        let next = step_end(quote, x, upper)
            .saturating_add(U256::from(1))
            .clamp(lower, upper);
        if self.profit(start) >= self.profit(next) {
            start
        } else {
            next
        }
    }

    fn no_trade_unless_profitable(&self, amount_in: U256) -> U256 {
        if self.profit(amount_in) > I256::ZERO {
            amount_in
        } else {
            U256::ZERO
        }
    }

    /// The amount chosen by `optimizer`
    #[must_use]
    pub fn optimal_amount_in(&self, max_amount_in: U256, optimizer: &Optimizer) -> U256 {
        match optimizer {
            Optimizer::Fast(params) => self.optimal_amount_in_fast(max_amount_in, params),
            Optimizer::Precise(params) => self.optimal_amount_in_precise(max_amount_in, params),
        }
    }

    /// Gross profit at the amount chosen by `optimizer`; zero when there is no trade
    #[must_use]
    pub fn maximum_profit(&self, max_amount_in: U256, optimizer: &Optimizer) -> I256 {
        self.profit(self.optimal_amount_in(max_amount_in, optimizer))
    }

    /// Profit net of network fees at the amount chosen by `optimizer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not start at the native asset
    pub fn maximum_profit_after_fee(
        &self,
        max_amount_in: U256,
        optimizer: &Optimizer,
        ctx: &FeeContext,
    ) -> Result<I256, ArbError> {
        self.profit_after_fee(self.optimal_amount_in(max_amount_in, optimizer), ctx)
    }
}
