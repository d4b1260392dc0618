//! Shared fixtures and brute-force oracles for unit tests.

use crate::distance::{Cost, DistanceMatrix, UNREACHABLE};
use crate::graph::{GraphBuilder, SectorGraph};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A, B, C, D fully connected, symmetric:
/// A-B=2, B-C=1, C-D=2, D-A=3, A-C=3, B-D=4. Best open route costs 5.
pub fn square_graph() -> SectorGraph {
    let mut b = GraphBuilder::new("square");
    for s in ["A", "B", "C", "D"] {
        b.add_sector(s).unwrap();
    }
    for (x, y, w) in [
        ("A", "B", 2),
        ("B", "C", 1),
        ("C", "D", 2),
        ("D", "A", 3),
        ("A", "C", 3),
        ("B", "D", 4),
    ] {
        b.add_undirected_edge(x, y, w).unwrap();
    }
    b.build().unwrap()
}

/// Two triangles {A, B, C} and {D, E, F} with no edge between them.
pub fn two_cliques() -> SectorGraph {
    let mut b = GraphBuilder::new("cliques");
    for s in ["A", "B", "C", "D", "E", "F"] {
        b.add_sector(s).unwrap();
    }
    for (x, y, w) in [
        ("A", "B", 1),
        ("B", "C", 2),
        ("A", "C", 3),
        ("D", "E", 1),
        ("E", "F", 2),
        ("D", "F", 3),
    ] {
        b.add_undirected_edge(x, y, w).unwrap();
    }
    b.build().unwrap()
}

/// Random directed graph; each ordered pair gets an edge with probability
/// `density`, weights in `1..=20`.
pub fn random_digraph(n: usize, seed: u64, density: f64) -> SectorGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let names: Vec<String> = (0..n).map(|i| format!("S{}", i)).collect();
    let mut b = GraphBuilder::new(format!("random-{}-{}", n, seed));
    for name in &names {
        b.add_sector(name.clone()).unwrap();
    }
    for from in &names {
        for to in &names {
            if from != to && rng.gen::<f64>() < density {
                b.add_edge(from, to, rng.gen_range(1..=20)).unwrap();
            }
        }
    }
    b.build().unwrap()
}

/// Cheapest simple path between two sectors by exhaustive DFS.
pub fn brute_force_shortest_path(graph: &SectorGraph, from: usize, to: usize) -> Option<Cost> {
    fn dfs(
        graph: &SectorGraph,
        at: usize,
        to: usize,
        cost: Cost,
        seen: &mut Vec<bool>,
        best: &mut Option<Cost>,
    ) {
        if at == to {
            *best = Some(best.map_or(cost, |b| b.min(cost)));
            return;
        }
        for next in 0..graph.len() {
            if seen[next] {
                continue;
            }
            if let Some(w) = graph.edge_weight(at, next) {
                seen[next] = true;
                dfs(graph, next, to, cost + Cost::from(w), seen, best);
                seen[next] = false;
            }
        }
    }

    let mut seen = vec![false; graph.len()];
    seen[from] = true;
    let mut best = None;
    dfs(graph, from, to, 0, &mut seen, &mut best);
    best
}

/// Visits every ordering of the sectors that are not yet in `prefix`.
fn for_each_completion(n: usize, prefix: &mut Vec<usize>, f: &mut impl FnMut(&[usize])) {
    if prefix.len() == n {
        f(prefix);
        return;
    }
    for next in 0..n {
        if prefix.contains(&next) {
            continue;
        }
        prefix.push(next);
        for_each_completion(n, prefix, f);
        prefix.pop();
    }
}

/// Cheapest full route that starts with `prefix` and ends with `suffix`;
/// routes through [`UNREACHABLE`] legs do not count.
pub fn brute_force_route(
    matrix: &DistanceMatrix,
    prefix: &[usize],
    suffix: &[usize],
) -> Option<(Cost, Vec<usize>)> {
    let n = matrix.len();
    let mut best: Option<(Cost, Vec<usize>)> = None;
    let mut start = prefix.to_vec();
    for_each_completion(n, &mut start, &mut |route| {
        if !route.ends_with(suffix) {
            return;
        }
        let cost = matrix.path_cost(route);
        if cost == UNREACHABLE {
            return;
        }
        if best.as_ref().map_or(true, |(b, _)| cost < *b) {
            best = Some((cost, route.to_vec()));
        }
    });
    best
}

/// Cheapest cost over every completion of `prefix`, unreachable legs included
/// as clamped sums.
pub fn brute_force_completion_cost(matrix: &DistanceMatrix, prefix: &[usize]) -> Cost {
    let n = matrix.len();
    let mut best = UNREACHABLE;
    let mut start = prefix.to_vec();
    for_each_completion(n, &mut start, &mut |route| {
        best = best.min(matrix.path_cost(route));
    });
    best
}
