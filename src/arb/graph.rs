//! The arbitrage graph.
//!
//! A directed multigraph whose vertices are assets and whose edges are (pool, direction)
//! pairs. Every pool contributes both of its directions, and parallel pools between the
//! same assets stay separate edges since they quote differently.
//! The graph is rebuilt from scratch whenever the pool set or its snapshot changes.

use std::collections::HashMap;

use log::debug;

use super::asset::Asset;
use super::cycles::Cycles;
use super::edge::Edge;
use super::error::ArbError;
use super::path::ArbitragePath;
use super::pool::PoolRef;

/// Assets and their outgoing edges
#[derive(Debug, Clone, Default)]
pub struct ArbitrageGraph {
    /// The pools the graph was built from
    pools: Vec<PoolRef>,
    /// Outgoing edges of every asset, in pool order
    adjacency: HashMap<Asset, Vec<Edge>>,
}

impl ArbitrageGraph {
    /// Builds the graph from a pool snapshot.
    ///
    /// Degenerate pools are kept: they become edges that quote zero.
    ///
    /// # Arguments
    ///
    /// * `pools` - The pools to trade through, in the order their edges are explored
    ///
    /// # Returns
    ///
    /// A graph holding both directions of every pool
    #[must_use]
    pub fn new(pools: Vec<PoolRef>) -> Self {
        let mut adjacency: HashMap<Asset, Vec<Edge>> = HashMap::new();
        for pool in &pools {
            for edge in Edge::both(pool) {
                adjacency
                    .entry(edge.asset_in().clone())
                    .or_default()
                    .push(edge);
            }
        }
        debug!(
            "Built arbitrage graph: {} assets, {} pools",
            adjacency.len(),
            pools.len()
        );
        Self { pools, adjacency }
    }

    /// The pools behind the graph
    #[must_use]
    pub fn pools(&self) -> &[PoolRef] {
        &self.pools
    }

    /// Whether `asset` has at least one incident edge
    #[must_use]
    pub fn contains(&self, asset: &Asset) -> bool {
        self.adjacency.contains_key(asset)
    }

    /// All assets with incident edges, in no particular order
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.adjacency.keys()
    }

    /// Total number of directed edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Outgoing edges of `asset`; empty for an unknown asset
    #[must_use]
    pub fn edges_from(&self, asset: &Asset) -> &[Edge] {
        self.adjacency.get(asset).map_or(&[][..], Vec::as_slice)
    }

    /// Lazily enumerates the simple cycles through `source` with at most `cutoff` edges.
    ///
    /// A pool is used at most once per cycle, so a round trip through the two directions
    /// of one pool (`A -> B -> A` on the same pool) is never produced. For a
    /// constant-product pool such a round trip always loses the fee; adapters where it
    /// could pay are not covered by this finder.
    ///
    /// # Arguments
    ///
    /// * `source` - The asset every cycle starts and ends with
    /// * `cutoff` - Maximum number of swaps in a cycle
    ///
    /// # Returns
    ///
    /// An iterator producing each cycle once per orientation
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not in any pool of the graph
    pub fn find_cycles(&self, source: &Asset, cutoff: usize) -> Result<Cycles<'_>, ArbError> {
        if !self.contains(source) {
            return Err(ArbError::AssetNotInGraph(source.clone()));
        }
        Ok(Cycles::new(self, source.clone(), cutoff))
    }

    /// Cycles through `source` that pass `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not in any pool of the graph
    pub fn paths<'g, F>(
        &'g self,
        source: &Asset,
        cutoff: usize,
        filter: F,
    ) -> Result<impl Iterator<Item = ArbitragePath> + 'g, ArbError>
    where
        F: Fn(&ArbitragePath) -> bool + 'g,
    {
        Ok(self
            .find_cycles(source, cutoff)?
            .filter(move |path| filter(path)))
    }

    /// Collects the cycles through `source` that pass `filter`, sorted by `sort_key`
    /// (ascending) when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not in any pool of the graph
    pub fn find_opportunities<F, K>(
        &self,
        source: &Asset,
        cutoff: usize,
        filter: F,
        sort_key: Option<K>,
    ) -> Result<Vec<ArbitragePath>, ArbError>
    where
        F: Fn(&ArbitragePath) -> bool,
        K: Fn(&ArbitragePath) -> f64,
    {
        let mut paths: Vec<ArbitragePath> = self
            .find_cycles(source, cutoff)?
            .filter(|path| filter(path))
            .collect();
        if let Some(key) = sort_key {
            paths.sort_by(|a, b| key(a).total_cmp(&key(b)));
        }
        debug!(
            "Found {} opportunities from {} with cutoff {}",
            paths.len(),
            source,
            cutoff
        );
        Ok(paths)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_new_adds_both_directions() {
        let graph = triangle();
        assert_eq!(graph.pools().len(), 3);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.assets().count(), 3);
        for edge in graph.edges_from(&asset("A")) {
            assert_eq!(edge.asset_in(), &asset("A"));
        }
        assert_eq!(graph.edges_from(&asset("A")).len(), 2);
        assert!(graph.edges_from(&asset("Z")).is_empty());
    }

    #[test]
    fn test_parallel_pools_are_separate_edges() {
        let graph = graph(&[
            ("P1", "A", "B", 100, 200),
            ("P2", "A", "B", 100, 300),
        ]);
        let edges = graph.edges_from(&asset("A"));
        assert_eq!(edges.len(), 2);
        assert_ne!(edges[0].id(), edges[1].id());
    }

    #[test]
    fn test_find_cycles_unknown_source() {
        let graph = triangle();
        let cycles = graph.find_cycles(&asset("Z"), 3);
        assert_eq!(
            cycles.err().unwrap(),
            ArbError::AssetNotInGraph(asset("Z"))
        );
        assert!(ArbitrageGraph::default().find_cycles(&asset("A"), 3).is_err());
    }

    #[test]
    fn test_paths_filter() {
        let graph = triangle();
        let all = graph.paths(&asset("A"), 3, |_| true).unwrap().count();
        let three_legged = graph
            .paths(&asset("A"), 3, |path| path.len() == 3)
            .unwrap()
            .count();
        assert_eq!(all, 2);
        assert_eq!(three_legged, 2);
    }

    #[test]
    fn test_find_opportunities_sorted_by_ratio() {
        let graph = triangle();
        let opportunities = graph
            .find_opportunities(
                &asset("A"),
                3,
                |path| path.ratio() > 0.0,
                Some(|path: &ArbitragePath| -path.ratio()),
            )
            .unwrap();
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].to_string(), "ArbitragePath<A|B|C|A>");

        let all = graph
            .find_opportunities(
                &asset("A"),
                3,
                |_| true,
                Some(|path: &ArbitragePath| -path.ratio()),
            )
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].ratio() >= all[1].ratio());
    }
}
