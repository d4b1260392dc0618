//! Node processing shared by every execution policy.

use super::{Expansion, SolverConfig};
use crate::bound::BoundScratch;
use crate::cache::{sector_set, RouteCache};
use crate::distance::{Cost, DistanceMatrix, UNREACHABLE};
use crate::graph::route_string;
use crate::incumbent::SharedIncumbent;
use crate::node::SearchNode;
use crate::progress::{DepthTracker, ProgressSink};
use crate::stats::{SearchCounters, SearchStatistics};
use log::{debug, info};
use std::sync::Arc;

/// For every sector, the other sectors it can reach, nearest first. Ties go
/// to the lower sector index.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    order: Vec<Vec<usize>>,
}

impl NeighborTable {
    pub fn new(matrix: &DistanceMatrix) -> Self {
        let n = matrix.len();
        let order = (0..n)
            .map(|from| {
                let mut others: Vec<usize> = (0..n)
                    .filter(|&to| to != from && matrix.get(from, to) != UNREACHABLE)
                    .collect();
                others.sort_by_key(|&to| (matrix.get(from, to), to));
                others
            })
            .collect();
        NeighborTable { order }
    }

    pub fn nearest(&self, from: usize) -> &[usize] {
        &self.order[from]
    }
}

/// Everything a worker reads or updates that is shared across the solve.
pub struct SearchContext<'a> {
    pub(crate) matrix: &'a DistanceMatrix,
    pub(crate) incumbent: SharedIncumbent,
    pub(crate) counters: SearchCounters,
    neighbors: Option<(NeighborTable, usize)>,
    cache: Option<RouteCache>,
    tracker: DepthTracker,
    log_interval: u64,
}

/// Private per-worker buffers and counters.
pub(crate) struct WorkerState {
    pub(crate) id: usize,
    pub(crate) stats: SearchStatistics,
    scratch: BoundScratch,
    used: Vec<bool>,
    pops: u64,
}

impl WorkerState {
    pub(crate) fn new(id: usize, n: usize) -> Self {
        WorkerState {
            id,
            stats: SearchStatistics::default(),
            scratch: BoundScratch::new(n),
            used: vec![false; n],
            pops: 0,
        }
    }
}

impl<'a> SearchContext<'a> {
    pub fn new(
        matrix: &'a DistanceMatrix,
        config: &SolverConfig,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Self {
        let n = matrix.len();
        let neighbors = match config.expansion {
            Expansion::Full => None,
            Expansion::Nearest(k) => Some((NeighborTable::new(matrix), k.clamp(1, n.max(1)))),
        };
        SearchContext {
            matrix,
            incumbent: SharedIncumbent::new(),
            counters: SearchCounters::new(),
            neighbors,
            cache: config.use_route_cache.then(RouteCache::new),
            tracker: DepthTracker::new(n, progress),
            log_interval: config.log_interval,
        }
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub(crate) fn finish_worker(&self, worker: &WorkerState) {
        debug!(
            "worker {} finished after {} pops, {} expanded",
            worker.id, worker.pops, worker.stats.nodes_expanded
        );
        self.counters.absorb(&worker.stats);
    }

    /// Processes one popped node, handing surviving children to `emit`.
    ///
    /// Returns `false` when the node's bound already exceeds the incumbent:
    /// since frontiers pop in bound order, nothing left in the caller's
    /// frontier can improve either.
    pub(crate) fn visit(
        &self,
        node: SearchNode,
        worker: &mut WorkerState,
        frontier_len: usize,
        mut emit: impl FnMut(SearchNode),
    ) -> bool {
        let n = self.matrix.len();
        worker.pops += 1;
        worker.stats.on_depth(node.len());
        self.incumbent.observe_partial(node.path());

        if self.log_interval > 0 && worker.pops % self.log_interval == 0 {
            self.log_state(worker, &node, frontier_len);
        }

        if !self.incumbent.admits(node.bound()) {
            worker.stats.on_pruned();
            return false;
        }

        if node.remaining(n) == 0 {
            if node.ending().is_some() {
                let full = node.full_path();
                let cost = worker.scratch.bound(self.matrix, &full);
                self.install(worker, cost, &full);
            } else {
                let cost = node.bound();
                self.install(worker, cost, node.path());
            }
            return true;
        }

        let Some(last) = node.last() else {
            return true;
        };

        worker.used.fill(false);
        for &s in node.path() {
            worker.used[s] = true;
        }
        if let Some(ending) = node.ending() {
            for &s in ending.iter() {
                worker.used[s] = true;
            }
        }

        if let (Some(cache), None) = (&self.cache, node.ending()) {
            let others = sector_set((0..n).filter(|&s| !worker.used[s]));
            if let Some(completion) = cache.lookup(last, others) {
                let mut full = node.path().to_vec();
                full.extend_from_slice(&completion);
                let cost = worker.scratch.bound(self.matrix, &full);
                worker.stats.on_cache_hit();
                if self.install(worker, cost, &full) {
                    return true;
                }
            }
        }

        worker.stats.on_node_expanded();
        match &self.neighbors {
            None => {
                for next in 0..n {
                    if !worker.used[next] {
                        self.branch(worker, &node, next, &mut emit);
                    }
                }
            }
            Some((table, k)) => {
                let candidates = table.nearest(last);
                let mut taken = 0;
                for &next in candidates {
                    if worker.used[next] {
                        continue;
                    }
                    self.branch(worker, &node, next, &mut emit);
                    taken += 1;
                    if taken == *k {
                        break;
                    }
                }
            }
        }
        true
    }

    fn branch(
        &self,
        worker: &mut WorkerState,
        parent: &SearchNode,
        next: usize,
        emit: &mut impl FnMut(SearchNode),
    ) {
        let path = parent.extended_path(next);
        let bound = worker.scratch.bound(self.matrix, &path);
        worker.stats.on_child_generated();
        if self.incumbent.admits(bound) {
            self.tracker.observe(path.len());
            emit(SearchNode::new(path, bound, parent.ending().cloned()));
        } else {
            worker.stats.on_pruned();
        }
    }

    /// Returns whether `path` became the new incumbent.
    fn install(&self, worker: &mut WorkerState, cost: Cost, path: &[usize]) -> bool {
        if !self.incumbent.try_install(cost, path) {
            return false;
        }
        worker.stats.on_tour_installed();
        info!("Cost {} route found, saving", cost);
        info!("{}", self.route_names(path));
        self.tracker.observe(path.len());
        if let Some(cache) = &self.cache {
            cache.record(self.matrix, path);
        }
        true
    }

    fn route_names(&self, path: &[usize]) -> String {
        let names: Vec<&str> = path.iter().map(|&s| self.matrix.name(s)).collect();
        route_string(&names)
    }

    fn log_state(&self, worker: &WorkerState, node: &SearchNode, frontier_len: usize) {
        let best = match self.incumbent.snapshot() {
            Some(best) => format!("{} ({})", best.cost, self.route_names(&best.path)),
            None => "none".to_string(),
        };
        debug!(
            "worker {}: frontier {} | bound {} | best {} | longest {}",
            worker.id,
            frontier_len,
            node.bound(),
            best,
            self.route_names(&self.incumbent.longest_partial())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_neighbor_table_orders_by_distance_then_index() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let table = NeighborTable::new(&m);
        // From A: B=2, C=3, D=3.
        assert_eq!(table.nearest(0), &[1, 2, 3]);
        // From D: C=2, A=3, B=3.
        assert_eq!(table.nearest(3), &[2, 0, 1]);
    }

    #[test]
    fn test_neighbor_table_skips_unreachable() {
        let m = DistanceMatrix::transitive(&testing::two_cliques());
        let table = NeighborTable::new(&m);
        assert_eq!(table.nearest(0), &[1, 2]);
        assert_eq!(table.nearest(5), &[4, 3]);
    }

    #[test]
    fn test_visit_prunes_and_expands() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let ctx = SearchContext::new(&m, &SolverConfig::default(), None);
        let mut worker = WorkerState::new(0, m.len());

        let mut children = Vec::new();
        let root = SearchNode::new(vec![0], 0, None);
        assert!(ctx.visit(root, &mut worker, 0, |c| children.push(c)));
        assert_eq!(children.len(), 3);
        assert!(children.iter().all(|c| c.len() == 2));

        assert!(ctx.incumbent.try_install(4, &[3, 2, 1, 0]));
        let hopeless = SearchNode::new(vec![1], 9, None);
        assert!(!ctx.visit(hopeless, &mut worker, 0, |_| panic!("pruned node expanded")));
        assert_eq!(worker.stats.pruned, 1);
    }

    #[test]
    fn test_visit_appends_ending_when_complete() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let ctx = SearchContext::new(&m, &SolverConfig::default(), None);
        let mut worker = WorkerState::new(0, m.len());

        let ending: Arc<[usize]> = Arc::from(vec![2, 3]);
        let node = SearchNode::new(vec![0, 1], 0, Some(ending));
        assert!(ctx.visit(node, &mut worker, 0, |_| panic!("complete node expanded")));
        let best = ctx.incumbent.snapshot().unwrap();
        assert_eq!(best.path, vec![0, 1, 2, 3]);
        assert_eq!(best.cost, 5);
    }

    #[test]
    fn test_cache_hit_that_does_not_improve_still_expands() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let config = SolverConfig {
            use_route_cache: true,
            ..Default::default()
        };
        let ctx = SearchContext::new(&m, &config, None);
        let mut worker = WorkerState::new(0, m.len());

        // Completion B -> C -> D is cached, and A-B-C-D (5) is already the incumbent.
        ctx.cache.as_ref().unwrap().record(&m, &[0, 1, 2, 3]);
        assert!(ctx.incumbent.try_install(5, &[0, 1, 2, 3]));

        let mut children = Vec::new();
        let node = SearchNode::new(vec![0, 1], 3, None);
        assert!(ctx.visit(node, &mut worker, 0, |c| children.push(c)));
        assert_eq!(worker.stats.cache_hits, 1);
        assert_eq!(worker.stats.nodes_expanded, 1);
        // [A, B, C] bounds at 5; [A, B, D] at 8 is pruned.
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path(), &[0, 1, 2]);
    }

    #[test]
    fn test_nearest_expansion_limits_children() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let config = SolverConfig {
            expansion: Expansion::Nearest(1),
            ..Default::default()
        };
        let ctx = SearchContext::new(&m, &config, None);
        let mut worker = WorkerState::new(0, m.len());

        let mut children = Vec::new();
        ctx.visit(SearchNode::new(vec![0], 0, None), &mut worker, 0, |c| children.push(c));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path(), &[0, 1]);
    }
}
