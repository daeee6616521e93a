/*!
 * # Orbit - AMM Cycle Arbitrage Discovery and Execution
 *
 * Orbit searches constant-product AMM pools for profitable multi-hop cycles,
 * sizes each trade and hands the resulting swaps to a settlement as one atomic batch.
 *
 * ## Core Features
 *
 * - **Cycle Discovery**: Enumerates bounded cycles through the native asset
 * - **Trade Sizing**: Fast and plateau-aware optimizers over integer quotes
 * - **Atomic Execution**: Prepares all-or-nothing swap batches
 * - **Snapshot Consistency**: Every decision cycle quotes one frozen pool snapshot
 *
 * ## Module Structure
 *
 * - `arb`: Core arbitrage discovery, quoting and sizing
 * - `bot`: The refresh and decision loop
 * - `config`: Configuration from the environment
 * - `snapshot`: Pool snapshots on disk
 * - `utils`: Utility functions and helpers
 */

/// Arbitrage discovery, quoting and sizing
pub mod arb;
/// The refresh and decision loop
pub mod bot;
/// Configuration management for the system
pub mod config;
/// Pool snapshots on disk
pub mod snapshot;
/// Utility functions and helpers
pub mod utils;
