//! Turning a sized opportunity into an atomic batch of swaps.
//!
//! The coordinator only prepares requests. Signing and submission belong to a
//! [`Settlement`] implementation; the batch must be executed all-or-nothing.

use std::fmt::{self, Display};

use alloy::primitives::{Address, I256, U256};
use itertools::Itertools;
use log::info;

use super::asset::Asset;
use super::error::ArbError;
use super::path::{signed, ArbitragePath};
use super::path_quote::PathQuote;
use super::pool::{FeeContext, PoolId};

/// One swap of a batch, as prepared by its pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Pool to trade against
    pub pool_id: PoolId,
    /// Account the swap is sent from
    pub sender: Address,
    /// Asset sold
    pub asset_in: Asset,
    /// Asset bought
    pub asset_out: Asset,
    /// Amount sold
    pub amount_in: U256,
    /// Amount the quote promises; the minimum the swap must return
    pub amount_out: U256,
    /// Flat network fee of the swap, in native base units
    pub fee: u64,
}

impl Display for SwapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {} {}",
            self.pool_id, self.amount_in, self.asset_in, self.amount_out, self.asset_out
        )
    }
}

/// Swap requests that must execute together or not at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicBatch {
    /// Requests in execution order
    requests: Vec<SwapRequest>,
}

impl Display for AtomicBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.requests.iter().join(", "))
    }
}

impl AtomicBatch {
    /// Creates a batch from requests in execution order.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no requests
    pub fn new(requests: Vec<SwapRequest>) -> Result<Self, ArbError> {
        if requests.is_empty() {
            return Err(ArbError::NoTrade("batch has no swaps".to_string()));
        }
        Ok(Self { requests })
    }

    /// The requests in execution order
    #[must_use]
    pub fn requests(&self) -> &[SwapRequest] {
        &self.requests
    }

    /// The asset the batch starts and ends with
    #[must_use]
    pub fn asset(&self) -> &Asset {
        &self.requests[0].asset_in
    }

    /// Amount sold by the first swap
    #[must_use]
    pub fn amount_in(&self) -> U256 {
        self.requests[0].amount_in
    }

    /// Amount bought by the last swap
    #[must_use]
    pub fn amount_out(&self) -> U256 {
        self.requests[self.requests.len() - 1].amount_out
    }

    /// Expected gross profit
    #[must_use]
    pub fn profit(&self) -> I256 {
        signed(self.amount_out()).saturating_sub(signed(self.amount_in()))
    }

    /// Total network fee of the batch
    #[must_use]
    pub fn fee(&self) -> u64 {
        self.requests
            .iter()
            .fold(0u64, |fee, request| fee.saturating_add(request.fee))
    }

    /// Expected profit net of network fees.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch does not trade the native asset
    pub fn profit_after_fee(&self) -> Result<I256, ArbError> {
        if !self.asset().is_native() {
            return Err(ArbError::FeeCurrencyMismatch(self.asset().clone()));
        }
        Ok(self.profit().saturating_sub(signed(U256::from(self.fee()))))
    }
}

/// Prepares the atomic batch executing `path` with `amount_in`.
///
/// Every leg is quoted against the current snapshot and the promised outputs are
/// written into the requests.
///
/// # Arguments
///
/// * `path` - The cycle to execute
/// * `sender` - Account that signs every swap
/// * `amount_in` - Amount sold into the first pool
/// * `ctx` - Network fee parameters
///
/// # Returns
///
/// One swap request per leg, with the quoted output as each leg's minimum
///
/// # Errors
///
/// Returns an error if `amount_in` is zero (the optimizers' no-trade value) or if
/// any leg quotes nothing
pub fn prepare_batch(
    path: &ArbitragePath,
    sender: Address,
    amount_in: U256,
    ctx: &FeeContext,
) -> Result<AtomicBatch, ArbError> {
    if amount_in.is_zero() {
        return Err(ArbError::NoTrade(format!("{path} has no profitable amount")));
    }
    let quote = PathQuote::new(path, amount_in);
    if let Some(leg) = quote.dry_leg() {
        return Err(ArbError::NoTrade(format!(
            "pool {} pays nothing for {} {}",
            leg.pool_id, leg.amount_in, leg.asset_in
        )));
    }
    let requests = path
        .edges()
        .iter()
        .zip(quote.legs())
        .map(|(edge, leg)| {
            edge.pool().prepare_swap_request(
                sender,
                &leg.asset_in,
                leg.amount_in,
                leg.amount_out,
                ctx,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    AtomicBatch::new(requests)
}

/// What a settlement did with a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    /// Identifier of the submitted group, if anything was sent
    pub group_id: Option<String>,
    /// Whether the batch reached the network
    pub submitted: bool,
}

/// Signs and submits atomic batches.
pub trait Settlement: Send + Sync {
    /// Submits `batch` atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be submitted
    fn submit(&self, batch: &AtomicBatch) -> Result<SettlementReceipt, ArbError>;
}

/// Settlement that only logs the batch
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSettlement;

impl Settlement for DryRunSettlement {
    fn submit(&self, batch: &AtomicBatch) -> Result<SettlementReceipt, ArbError> {
        info!(
            "Dry run: {} swaps, in {} {}, out {}, fee {}: {batch}",
            batch.requests().len(),
            batch.amount_in(),
            batch.asset(),
            batch.amount_out(),
            batch.fee()
        );
        Ok(SettlementReceipt {
            group_id: None,
            submitted: false,
        })
    }
}
