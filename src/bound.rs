//! Admissible lower bound for partial and complete routes.
//!
//! The bound is the cost already committed by the path plus, for each sector
//! not yet visited, the cheapest way to enter it from a sector that could still
//! precede it: another unvisited sector or the current tail of the path. Every
//! completion enters each unvisited sector exactly once from one of those, so
//! the sum never exceeds the true completion cost.

use crate::distance::{add_cost, Cost, DistanceMatrix, UNREACHABLE};
use crate::error::{Result, RouteError};

/// Per-worker buffer for [`BoundScratch::bound`]; reuse it across calls so the
/// hot path never allocates.
#[derive(Debug, Clone)]
pub struct BoundScratch {
    used: Vec<bool>,
}

impl BoundScratch {
    pub fn new(n: usize) -> Self {
        BoundScratch {
            used: vec![false; n],
        }
    }

    /// Lower bound for a path of sector indices.
    pub fn bound(&mut self, matrix: &DistanceMatrix, path: &[usize]) -> Cost {
        let n = matrix.len();
        if path.is_empty() {
            return 0;
        }

        let mut total = matrix.path_cost(path);
        if path.len() >= n || total == UNREACHABLE {
            return total;
        }

        self.used.clear();
        self.used.resize(n, false);
        for &s in path {
            self.used[s] = true;
        }
        let last = path[path.len() - 1];

        for u in 0..n {
            if self.used[u] {
                continue;
            }
            let mut cheapest = matrix.get(last, u);
            for v in 0..n {
                if v != u && !self.used[v] {
                    cheapest = cheapest.min(matrix.get(v, u));
                }
            }
            total = add_cost(total, cheapest);
            if total == UNREACHABLE {
                break;
            }
        }

        total
    }
}

/// Name-based form of the bound. Every name must belong to the matrix.
pub fn bound_for_path<S: AsRef<str>>(matrix: &DistanceMatrix, path: &[S]) -> Result<Cost> {
    let indices = path
        .iter()
        .map(|name| {
            let name = name.as_ref();
            matrix
                .index_of(name)
                .ok_or_else(|| RouteError::UnknownSector(name.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    for pair in indices.windows(2) {
        if pair[0] == pair[1] {
            return Err(RouteError::missing_distance(
                matrix.name(pair[0]),
                matrix.name(pair[1]),
            ));
        }
    }

    Ok(BoundScratch::new(matrix.len()).bound(matrix, &indices))
}
