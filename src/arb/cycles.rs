//! Bounded cycle enumeration.
//!
//! A depth-first search with an explicit stack of edge iterators, one per depth, so
//! cycles are produced on demand without recursion. A cycle closes at the source asset
//! and never descends through it. No pool is used twice and no intermediate asset is
//! visited twice.

use super::asset::Asset;
use super::edge::Edge;
use super::graph::ArbitrageGraph;
use super::path::ArbitragePath;

/// Lazy iterator over the cycles through one source asset.
///
/// Finite and not restartable: ask the graph for a new one to start over.
pub struct Cycles<'g> {
    /// The graph being searched
    graph: &'g ArbitrageGraph,
    /// Where every cycle starts and ends
    source: Asset,
    /// Maximum number of edges in a cycle
    cutoff: usize,
    /// Edges of the walk so far
    path: Vec<&'g Edge>,
    /// Unvisited sibling edges, one iterator per depth
    stack: Vec<std::slice::Iter<'g, Edge>>,
}

impl<'g> Cycles<'g> {
    /// Starts a search from `source`
    pub(crate) fn new(graph: &'g ArbitrageGraph, source: Asset, cutoff: usize) -> Self {
        let stack = if cutoff == 0 {
            Vec::new()
        } else {
            vec![graph.edges_from(&source).iter()]
        };
        Self {
            graph,
            source,
            cutoff,
            path: Vec::with_capacity(cutoff),
            stack,
        }
    }

    /// Whether `edge` may extend the walk: its pool is unused so far, and it either
    /// closes at the source or reaches an asset the walk has not visited.
    fn is_open(&self, edge: &Edge) -> bool {
        let pool_unused = self
            .path
            .iter()
            .all(|step| step.pool_id() != edge.pool_id());
        let target = edge.asset_out();
        let target_unvisited =
            target == &self.source || self.path.iter().all(|step| step.asset_in() != target);
        pool_unused && target_unvisited
    }

    /// The walk so far closed by `edge`
    fn close(&self, edge: &'g Edge) -> ArbitragePath {
        let edges = self
            .path
            .iter()
            .copied()
            .chain(std::iter::once(edge))
            .cloned()
            .collect();
        ArbitragePath::from_cycle(edges)
    }
}

impl Iterator for Cycles<'_> {
    type Item = ArbitragePath;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(children) = self.stack.last_mut() {
            let Some(edge) = children.next() else {
                // backtrack
                self.stack.pop();
                self.path.pop();
                continue;
            };
            if !self.is_open(edge) {
                continue;
            }
            if edge.asset_out() == &self.source {
                return Some(self.close(edge));
            }
            // one edge left before the cutoff: only closing edges are of interest
            if self.path.len() + 1 < self.cutoff {
                self.path.push(edge);
                self.stack.push(self.graph.edges_from(edge.asset_out()).iter());
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use alloy::primitives::{I256, U256};
    use proptest::prelude::*;

    use super::*;
    use crate::arb::test_helpers::*;

    fn cycle_names(graph: &ArbitrageGraph, source: &str, cutoff: usize) -> Vec<String> {
        graph
            .find_cycles(&asset(source), cutoff)
            .unwrap()
            .map(|path| {
                path.edges()
                    .iter()
                    .map(|edge| edge.pool_id().to_string())
                    .collect::<Vec<_>>()
                    .join(">")
            })
            .collect()
    }

    #[test]
    fn test_triangle() {
        let graph = triangle();
        let cycles: Vec<ArbitragePath> = graph.find_cycles(&asset("A"), 3).unwrap().collect();
        assert_eq!(cycles.len(), 2);

        // one orientation gains, the other loses
        let profitable: Vec<&ArbitragePath> = cycles
            .iter()
            .filter(|path| path.profit(U256::from(10_000)) > I256::ZERO)
            .collect();
        assert_eq!(profitable.len(), 1);
        assert_eq!(profitable[0].to_string(), "ArbitragePath<A|B|C|A>");
        assert_eq!(profitable[0].len(), 3);
    }

    #[test]
    fn test_cutoff_bounds_length() {
        let graph = triangle();
        assert!(cycle_names(&graph, "A", 0).is_empty());
        assert!(cycle_names(&graph, "A", 1).is_empty());
        assert!(cycle_names(&graph, "A", 2).is_empty());
        assert_eq!(cycle_names(&graph, "A", 3), vec!["AB>BC>CA", "CA>BC>AB"]);
        assert_eq!(cycle_names(&graph, "A", 5).len(), 2);
    }

    #[test]
    fn test_parallel_pools_make_two_leg_cycles() {
        let graph = graph(&[
            ("P1", "A", "B", 100, 200),
            ("P2", "A", "B", 100, 300),
        ]);
        assert_eq!(cycle_names(&graph, "A", 2), vec!["P1>P2", "P2>P1"]);
    }

    #[test]
    fn test_no_round_trip_through_one_pool() {
        let single = graph(&[("P1", "A", "B", 100, 200)]);
        assert!(cycle_names(&single, "A", 2).is_empty());
        assert!(cycle_names(&single, "A", 4).is_empty());

        let parallel = graph(&[("P1", "A", "B", 100, 200), ("P2", "A", "B", 100, 200)]);
        assert_eq!(cycle_names(&parallel, "A", 4), vec!["P1>P2", "P2>P1"]);
    }

    #[test]
    fn test_no_intermediate_revisits() {
        // two B-C pools would allow A>B>C>B>A if intermediate assets could repeat
        let graph = graph(&[
            ("AB", "A", "B", 100, 200),
            ("BC1", "B", "C", 100, 200),
            ("BC2", "B", "C", 100, 300),
            ("CA", "C", "A", 100, 200),
        ]);
        let cycles = cycle_names(&graph, "A", 4);
        assert_eq!(
            cycles,
            vec!["AB>BC1>CA", "AB>BC2>CA", "CA>BC1>AB", "CA>BC2>AB"]
        );
    }

    #[test]
    fn test_iterator_is_lazy() {
        let graph = triangle();
        let mut cycles = graph.find_cycles(&asset("A"), 3).unwrap();
        assert!(cycles.next().is_some());
        assert!(cycles.next().is_some());
        assert!(cycles.next().is_none());
        assert!(cycles.next().is_none());
    }

    /// A random market over up to 6 assets
    fn market() -> impl Strategy<Value = Vec<(usize, usize, u64, u64)>> {
        prop::collection::vec((0usize..6, 0usize..6, 1u64..1_000_000, 1u64..1_000_000), 1..14)
    }

    proptest! {
        #[test]
        fn test_cycles_are_closed_chained_and_bounded(
            pools in market(),
            cutoff in 1usize..5,
        ) {
            const NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
            let ids: Vec<String> = (0..pools.len()).map(|i| format!("P{i}")).collect();
            let specs: Vec<(&str, &str, &str, u64, u64)> = pools
                .iter()
                .zip(&ids)
                .filter(|((a, b, _, _), _)| a != b)
                .map(|((a, b, ra, rb), id)| (id.as_str(), NAMES[*a], NAMES[*b], *ra, *rb))
                .collect();
            let graph = graph(&specs);
            let source = asset("A");
            let Ok(cycles) = graph.find_cycles(&source, cutoff) else {
                prop_assert!(!graph.contains(&source));
                return Ok(());
            };

            let mut seen = HashSet::new();
            for path in cycles {
                let edges = path.edges();
                prop_assert!(!edges.is_empty() && edges.len() <= cutoff);
                prop_assert_eq!(edges[0].asset_in(), &source);
                prop_assert_eq!(edges[edges.len() - 1].asset_out(), &source);
                for pair in edges.windows(2) {
                    prop_assert_eq!(pair[0].asset_out(), pair[1].asset_in());
                }
                let pools: HashSet<_> = edges.iter().map(Edge::pool_id).collect();
                prop_assert_eq!(pools.len(), edges.len());
                let visited: HashSet<_> = edges.iter().map(Edge::asset_in).collect();
                prop_assert_eq!(visited.len(), edges.len());
                prop_assert!(seen.insert(path.clone()));
            }
        }
    }
}
