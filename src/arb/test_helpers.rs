//! Fixtures shared by the unit tests of the arbitrage core
#![allow(clippy::unwrap_used, dead_code)]

use std::sync::Arc;

use alloy::primitives::U256;

use super::asset::Asset;
use super::constant_product::ConstantProductPool;
use super::edge::Edge;
use super::graph::ArbitrageGraph;
use super::path::ArbitragePath;
use super::pool::{PoolId, PoolRef};

/// Test asset whose id is derived from its symbol, so `A < B < C`
pub fn asset(symbol: &str) -> Asset {
    let id = symbol
        .bytes()
        .fold(0u64, |id, byte| id.wrapping_mul(256) + u64::from(byte));
    Asset::new(id, 6, symbol)
}

/// Constant-product pool with the usual 0.3% fee
pub fn pool(id: &str, asset_a: &str, asset_b: &str, reserve_a: u64, reserve_b: u64) -> ConstantProductPool {
    pool_with_fee(id, asset_a, asset_b, reserve_a, reserve_b, 30)
}

/// Constant-product pool with an explicit fee in basis points
pub fn pool_with_fee(
    id: &str,
    asset_a: &str,
    asset_b: &str,
    reserve_a: u64,
    reserve_b: u64,
    fee_bps: u32,
) -> ConstantProductPool {
    ConstantProductPool::new(
        PoolId::from(id),
        "xyk",
        (asset(asset_a), U256::from(reserve_a)),
        (asset(asset_b), U256::from(reserve_b)),
        fee_bps,
    )
    .unwrap()
}

/// Edge selling `asset_in` into a fresh pool
pub fn edge(id: &str, asset_in: &str, asset_out: &str, reserve_in: u64, reserve_out: u64) -> Edge {
    let pool: PoolRef = Arc::new(pool(id, asset_in, asset_out, reserve_in, reserve_out));
    Edge::new(pool, &asset(asset_in)).unwrap()
}

/// Path through fresh 0.3% pools: `(pool, asset_in, asset_out, reserve_in, reserve_out)`
pub fn path(edges: &[(&str, &str, &str, u64, u64)]) -> ArbitragePath {
    let edges = edges
        .iter()
        .map(|(id, asset_in, asset_out, reserve_in, reserve_out)| {
            edge(id, asset_in, asset_out, *reserve_in, *reserve_out)
        })
        .collect();
    ArbitragePath::new(edges).unwrap()
}

/// Path through fresh fee-free pools
pub fn fee_free_path(edges: &[(&str, &str, &str, u64, u64)]) -> ArbitragePath {
    let edges = edges
        .iter()
        .map(|(id, asset_in, asset_out, reserve_in, reserve_out)| {
            let pool: PoolRef = Arc::new(pool_with_fee(
                id,
                asset_in,
                asset_out,
                *reserve_in,
                *reserve_out,
                0,
            ));
            Edge::new(pool, &asset(asset_in)).unwrap()
        })
        .collect();
    ArbitragePath::new(edges).unwrap()
}

/// Graph over fee-free pools: `(pool, asset_a, asset_b, reserve_a, reserve_b)`
pub fn graph(pools: &[(&str, &str, &str, u64, u64)]) -> ArbitrageGraph {
    let pools: Vec<PoolRef> = pools
        .iter()
        .map(|(id, asset_a, asset_b, reserve_a, reserve_b)| {
            Arc::new(pool_with_fee(id, asset_a, asset_b, *reserve_a, *reserve_b, 0)) as PoolRef
        })
        .collect();
    ArbitrageGraph::new(pools)
}

/// The three fee-free pools A-B, B-C, C-A whose cycle from A is profitable
pub fn triangle() -> ArbitrageGraph {
    graph(&[
        ("AB", "A", "B", 1_000_000, 2_000_000),
        ("BC", "B", "C", 2_000_000, 1_000_000),
        ("CA", "C", "A", 1_000_000, 1_050_000),
    ])
}
