//! # Arbitrage Module
//!
//! This module contains the arbitrage discovery engine. It models assets and pools as
//! a multigraph, enumerates the cycles through a source asset, quotes them against a
//! pool snapshot, sizes the trade and prepares the atomic batch that executes it.

/// Assets and the native fee currency
pub mod asset;
/// Constant-product pool adapter
pub mod constant_product;
/// Bounded cycle enumeration
pub mod cycles;
/// Directed pool edges
pub mod edge;
/// Error type of the arbitrage core
pub mod error;
/// The asset/pool multigraph
pub mod graph;
/// Trade sizing
pub mod optimizer;
/// Closed cycles of edges and their quotes
pub mod path;
/// Leg-by-leg quotes of a path
pub mod path_quote;
/// The pool capability
pub mod pool;
/// Plateau search over step functions
pub mod step;
/// Atomic batch preparation and settlement
pub mod transaction;

/// Test helpers and utilities
#[cfg(test)]
mod test_helpers;

pub use asset::Asset;
pub use constant_product::{ConstantProductPool, PoolRecord};
pub use error::ArbError;
pub use graph::ArbitrageGraph;
pub use optimizer::{FastParams, Optimizer, PreciseParams};
pub use path::ArbitragePath;
pub use pool::{FeeContext, Pool, PoolId, PoolRef};
pub use transaction::{prepare_batch, AtomicBatch, DryRunSettlement, Settlement};
