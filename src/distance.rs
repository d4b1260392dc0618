//! All-pairs distance matrix over a sector map.
//!
//! Two builders exist because transiting through an intermediate sector is not
//! always meaningful (asymmetric warp links, for example):
//!
//! - [`PathPolicy::Transitive`] runs Floyd-Warshall, so every entry is the
//!   cheapest multi-hop travel cost. Pairs with no path hold [`UNREACHABLE`].
//! - [`PathPolicy::Static`] keeps direct edges only and fills every other pair
//!   with `max_edge_weight + 1`, a finite sentinel.
//!
//! Self-distances are not addressable: the search never asks for them and a
//! name-based lookup of one is reported as a missing distance.

use crate::error::{Result, RouteError};
use crate::graph::SectorGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Travel cost. Signed so that accumulated sums can be clamped instead of wrapped.
pub type Cost = i64;

/// Sentinel for "no path" in the transitive matrix. Any sum that reaches it is
/// clamped to it.
pub const UNREACHABLE: Cost = Cost::MAX;

/// Adds two costs, clamping at [`UNREACHABLE`] instead of overflowing.
#[inline]
pub fn add_cost(a: Cost, b: Cost) -> Cost {
    match a.checked_add(b) {
        Some(sum) if sum < UNREACHABLE => sum,
        _ => UNREACHABLE,
    }
}

/// Which shortest-path builder to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathPolicy {
    /// Cheapest path through any intermediate sectors (Floyd-Warshall).
    #[default]
    Transitive,
    /// Direct edges only; non-adjacent pairs get `max_edge_weight + 1`.
    Static,
}

/// Dense `n x n` matrix of travel costs indexed by sector index.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    names: Vec<String>,
    index: HashMap<String, usize>,
    n: usize,
    dist: Vec<Cost>,
    policy: PathPolicy,
    sentinel: Cost,
}

impl DistanceMatrix {
    /// Build the matrix for `graph` with the given policy.
    pub fn build(graph: &SectorGraph, policy: PathPolicy) -> Self {
        match policy {
            PathPolicy::Transitive => Self::transitive(graph),
            PathPolicy::Static => Self::direct(graph),
        }
    }

    /// Floyd-Warshall closure over the graph.
    pub fn transitive(graph: &SectorGraph) -> Self {
        let mut matrix = Self::empty(graph, PathPolicy::Transitive, UNREACHABLE);
        let n = matrix.n;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    matrix.dist[i * n + j] = 0;
                } else if let Some(w) = graph.edge_weight(i, j) {
                    matrix.dist[i * n + j] = Cost::from(w);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let i2k = matrix.dist[i * n + k];
                if i2k == UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    let i2k2j = add_cost(i2k, matrix.dist[k * n + j]);
                    if i2k2j < matrix.dist[i * n + j] {
                        matrix.dist[i * n + j] = i2k2j;
                    }
                }
            }
        }

        matrix
    }

    /// Direct-edge matrix: no transit through other sectors.
    pub fn direct(graph: &SectorGraph) -> Self {
        let sentinel = Cost::from(graph.max_edge_weight()) + 1;
        let mut matrix = Self::empty(graph, PathPolicy::Static, sentinel);
        let n = matrix.n;

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    matrix.dist[i * n + j] = 0;
                } else if let Some(w) = graph.edge_weight(i, j) {
                    matrix.dist[i * n + j] = Cost::from(w);
                }
            }
        }

        matrix
    }

    fn empty(graph: &SectorGraph, policy: PathPolicy, sentinel: Cost) -> Self {
        let n = graph.len();
        let names: Vec<String> = graph.sectors().iter().map(|s| s.name().to_string()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        DistanceMatrix {
            names,
            index,
            n,
            dist: vec![sentinel; n * n],
            policy,
            sentinel,
        }
    }

    /// Number of sectors covered by the matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    /// The value stored for pairs with no usable path.
    pub fn sentinel(&self) -> Cost {
        self.sentinel
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Distance between two distinct sector indices.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> Cost {
        debug_assert_ne!(from, to, "self-distance requested");
        self.dist[from * self.n + to]
    }

    /// Checked lookup; `None` for self-pairs or out-of-range indices.
    pub fn try_get(&self, from: usize, to: usize) -> Option<Cost> {
        if from == to || from >= self.n || to >= self.n {
            return None;
        }
        Some(self.dist[from * self.n + to])
    }

    /// Name-based lookup. A miss means the caller holds sectors from a
    /// different map, which is a contract violation.
    pub fn distance(&self, from: &str, to: &str) -> Result<Cost> {
        let missing = || RouteError::missing_distance(from, to);
        let i = self.index_of(from).ok_or_else(missing)?;
        let j = self.index_of(to).ok_or_else(missing)?;
        self.try_get(i, j).ok_or_else(missing)
    }

    /// Whether `to` can be reached from `from` at a real (non-sentinel) cost.
    #[inline]
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.get(from, to) < self.sentinel
    }

    /// Ordered pairs `(from, to)` with no usable path.
    pub fn unreachable_pairs(&self) -> usize {
        (0..self.n)
            .flat_map(|i| (0..self.n).map(move |j| (i, j)))
            .filter(|&(i, j)| i != j && !self.is_reachable(i, j))
            .count()
    }

    /// Cost of walking `path` step by step, clamped at [`UNREACHABLE`].
    pub fn path_cost(&self, path: &[usize]) -> Cost {
        path.windows(2)
            .fold(0, |acc, w| add_cost(acc, self.get(w[0], w[1])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::testing;

    #[test]
    fn test_transitive_uses_cheaper_detours() {
        let mut b = GraphBuilder::new("detour");
        for s in ["A", "B", "C"] {
            b.add_sector(s).unwrap();
        }
        b.add_edge("A", "B", 2).unwrap();
        b.add_edge("B", "C", 1).unwrap();
        b.add_edge("A", "C", 10).unwrap();
        let graph = b.build().unwrap();

        let m = DistanceMatrix::transitive(&graph);
        assert_eq!(m.distance("A", "C").unwrap(), 3);
        assert_eq!(m.distance("A", "B").unwrap(), 2);
        assert_eq!(m.distance("C", "A").unwrap(), UNREACHABLE);
        assert_eq!(m.unreachable_pairs(), 3);
    }

    #[test]
    fn test_static_keeps_direct_edges_and_finite_sentinel() {
        let mut b = GraphBuilder::new("warp");
        for s in ["A", "B", "C"] {
            b.add_sector(s).unwrap();
        }
        b.add_edge("A", "B", 2).unwrap();
        b.add_edge("B", "C", 1).unwrap();
        b.add_edge("A", "C", 10).unwrap();
        let graph = b.build().unwrap();

        let m = DistanceMatrix::build(&graph, PathPolicy::Static);
        assert_eq!(m.policy(), PathPolicy::Static);
        assert_eq!(m.distance("A", "C").unwrap(), 10);
        assert_eq!(m.sentinel(), 11);
        assert_eq!(m.distance("C", "A").unwrap(), 11);
        assert!(!m.is_reachable(2, 0));
    }

    #[test]
    fn test_self_and_unknown_lookups_fail() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        assert!(matches!(
            m.distance("A", "A"),
            Err(RouteError::MissingDistance { .. })
        ));
        assert!(matches!(
            m.distance("A", "Q"),
            Err(RouteError::MissingDistance { .. })
        ));
        assert_eq!(m.try_get(1, 1), None);
        assert_eq!(m.try_get(0, 9), None);
    }

    #[test]
    fn test_unreachable_sums_clamp_instead_of_wrapping() {
        assert_eq!(add_cost(UNREACHABLE, 5), UNREACHABLE);
        assert_eq!(add_cost(UNREACHABLE - 1, 5), UNREACHABLE);
        assert_eq!(add_cost(3, 4), 7);

        let m = DistanceMatrix::transitive(&testing::two_cliques());
        for i in 0..m.len() {
            for j in 0..m.len() {
                if i != j {
                    assert!(m.get(i, j) >= 0);
                }
            }
        }
        assert_eq!(m.path_cost(&[0, 1, 3]), UNREACHABLE);
    }

    #[test]
    fn test_square_matrix() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        assert_eq!(m.distance("A", "B").unwrap(), 2);
        assert_eq!(m.distance("A", "C").unwrap(), 3);
        assert_eq!(m.distance("A", "D").unwrap(), 3);
        assert_eq!(m.distance("B", "D").unwrap(), 3);
    }

    #[test]
    fn test_transitive_matches_brute_force_paths() {
        for seed in 0..8 {
            let graph = testing::random_digraph(6, seed, 0.5);
            let m = DistanceMatrix::transitive(&graph);
            for i in 0..graph.len() {
                for j in 0..graph.len() {
                    if i == j {
                        continue;
                    }
                    let expected = testing::brute_force_shortest_path(&graph, i, j)
                        .unwrap_or(UNREACHABLE);
                    assert_eq!(m.get(i, j), expected, "seed {} pair {}->{}", seed, i, j);
                }
            }
        }
    }
}
