//! Branch-and-bound route search.
//!
//! One search core ([`engine`]) is parameterised along two axes:
//!
//! - [`Expansion`]: which children a node generates (every unvisited sector,
//!   or only the `k` nearest unvisited ones).
//! - [`Execution`]: how frontiers are scheduled (one thread, a fixed pool of
//!   workers each owning a slice of the initial frontier, or fork-join tasks
//!   on a work-stealing pool).
//!
//! Full expansion is exact under every execution policy. Nearest-k expansion
//! trades optimality for speed.
//!
//! # Example
//!
//! ```no_run
//! use sector_route_solver::graph::SectorGraph;
//! use sector_route_solver::solver::{Solver, SolverConfig};
//!
//! let graph = SectorGraph::from_json_file("map.json").unwrap();
//! let solution = Solver::new(SolverConfig::default()).solve(&graph).unwrap();
//! println!("{}", solution);
//! ```

pub mod engine;
mod fork_join;
mod pool;
mod sequential;

use crate::constraint::{initial_frontier, Constraint, Seeds};
use crate::distance::{DistanceMatrix, PathPolicy};
use crate::error::Result;
use crate::graph::SectorGraph;
use crate::progress::ProgressSink;
use crate::solution::RouteSolution;
use engine::SearchContext;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

pub use engine::NeighborTable;

/// Remaining-sector count at which fork-join expansion spawns tasks.
pub const DEFAULT_DEPTH_THRESHOLD: usize = 19;

/// Frontier pops between periodic debug traces of each worker.
pub const DEFAULT_LOG_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expansion {
    /// Every unvisited sector becomes a child.
    #[default]
    Full,
    /// Only the `k` nearest unvisited sectors become children.
    Nearest(usize),
}

impl std::fmt::Display for Expansion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expansion::Full => write!(f, "full"),
            Expansion::Nearest(k) => write!(f, "nearest-{}", k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    Sequential,
    /// One worker per slice of the initial frontier. `None` sizes the pool
    /// to twice the available parallelism, capped by the frontier size.
    WorkerPool { threads: Option<usize> },
    /// Tasks fork when a node has exactly `depth_threshold` sectors left.
    ForkJoin {
        depth_threshold: usize,
        threads: Option<usize>,
    },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::WorkerPool { threads: None }
    }
}

impl Execution {
    pub fn fork_join() -> Self {
        Execution::ForkJoin {
            depth_threshold: DEFAULT_DEPTH_THRESHOLD,
            threads: None,
        }
    }
}

impl std::fmt::Display for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Execution::Sequential => write!(f, "sequential"),
            Execution::WorkerPool { .. } => write!(f, "pool"),
            Execution::ForkJoin { .. } => write!(f, "fork-join"),
        }
    }
}

/// Branch-and-bound configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub expansion: Expansion,
    pub execution: Execution,
    pub path_policy: PathPolicy,
    /// Finish nodes from completions of earlier incumbents. May miss the optimum.
    pub use_route_cache: bool,
    /// Pops between debug traces; 0 disables them.
    pub log_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            expansion: Expansion::Full,
            execution: Execution::default(),
            path_policy: PathPolicy::Transitive,
            use_route_cache: false,
            log_interval: DEFAULT_LOG_INTERVAL,
        }
    }
}

/// A configured search, ready to run on any number of maps.
#[derive(Clone, Default)]
pub struct Solver {
    config: SolverConfig,
    constraints: Vec<Constraint>,
    seeds: Seeds,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver {
            config,
            ..Default::default()
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_seeds(mut self, seeds: Seeds) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn name(&self) -> String {
        format!(
            "branch-and-bound/{}/{}",
            self.config.expansion, self.config.execution
        )
    }

    /// Builds the distance matrix for `graph` and searches it.
    pub fn solve(&self, graph: &SectorGraph) -> Result<RouteSolution> {
        let matrix = DistanceMatrix::build(graph, self.config.path_policy);
        self.solve_matrix(&matrix)
    }

    pub fn solve_matrix(&self, matrix: &DistanceMatrix) -> Result<RouteSolution> {
        let start = Instant::now();
        let frontier = initial_frontier(matrix, &self.constraints, &self.seeds)?;
        let ctx = SearchContext::new(matrix, &self.config, self.progress.clone());

        info!(
            "{}: {} sectors, {} initial nodes",
            self.name(),
            matrix.len(),
            frontier.len()
        );

        match self.config.execution {
            Execution::Sequential => sequential::run(&ctx, frontier),
            Execution::WorkerPool { threads } => pool::run(&ctx, frontier, threads)?,
            Execution::ForkJoin {
                depth_threshold,
                threads,
            } => fork_join::run(&ctx, frontier, depth_threshold, threads)?,
        }

        let statistics = ctx.counters.snapshot();
        let mut solution = match ctx.incumbent.snapshot() {
            Some(best) => {
                info!("Processing finished, best cost {}", best.cost);
                RouteSolution::complete(matrix, &best.path, self.name())
            }
            None => {
                warn!("No complete route found, returning longest partial path");
                RouteSolution::incomplete(matrix, &ctx.incumbent.longest_partial(), self.name())
            }
        };
        solution.statistics = statistics;
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::solution::RouteStatus;
    use crate::testing;

    fn all_executions() -> Vec<Execution> {
        vec![
            Execution::Sequential,
            Execution::WorkerPool { threads: None },
            Execution::WorkerPool { threads: Some(2) },
            Execution::fork_join(),
            Execution::ForkJoin {
                depth_threshold: 3,
                threads: Some(3),
            },
        ]
    }

    fn config(expansion: Expansion, execution: Execution) -> SolverConfig {
        SolverConfig {
            expansion,
            execution,
            ..Default::default()
        }
    }

    #[test]
    fn test_square_optimum_is_five() {
        let graph = testing::square_graph();
        let matrix = DistanceMatrix::transitive(&graph);
        let (expected, _) = testing::brute_force_route(&matrix, &[], &[]).unwrap();
        assert_eq!(expected, 5);

        for execution in all_executions() {
            let solution = Solver::new(config(Expansion::Full, execution))
                .solve(&graph)
                .unwrap();
            assert_eq!(solution.status, RouteStatus::Complete, "{}", execution);
            assert_eq!(solution.cost, Some(5), "{}", execution);
            assert_eq!(solution.route.len(), 4);
            assert!(solution.visits_every_sector(&matrix));
        }
    }

    #[test]
    fn test_engines_agree_with_brute_force() {
        for n in 4..=7 {
            for seed in 0..4 {
                let graph = testing::random_digraph(n, seed, 0.6);
                let matrix = DistanceMatrix::transitive(&graph);
                let expected = testing::brute_force_route(&matrix, &[], &[]).map(|(c, _)| c);
                for execution in all_executions() {
                    let solution = Solver::new(config(Expansion::Full, execution))
                        .solve_matrix(&matrix)
                        .unwrap();
                    assert_eq!(
                        solution.cost, expected,
                        "n={} seed={} {}",
                        n, seed, execution
                    );
                }
            }
        }
    }

    #[test]
    fn test_required_start_prefixes_every_route() {
        let graph = testing::random_digraph(6, 11, 0.8);
        let matrix = DistanceMatrix::transitive(&graph);
        let expected = testing::brute_force_route(&matrix, &[4, 1], &[]).map(|(c, _)| c);
        for execution in all_executions() {
            let solution = Solver::new(config(Expansion::Full, execution))
                .with_constraints(vec![Constraint::starting_with(["S4", "S1"])])
                .solve_matrix(&matrix)
                .unwrap();
            assert_eq!(solution.cost, expected);
            if solution.status == RouteStatus::Complete {
                assert_eq!(&solution.route[..2], &["S4", "S1"]);
            }
        }
    }

    #[test]
    fn test_required_end_suffixes_every_route() {
        let graph = testing::random_digraph(6, 5, 0.8);
        let matrix = DistanceMatrix::transitive(&graph);
        let expected = testing::brute_force_route(&matrix, &[], &[2, 0]).map(|(c, _)| c);
        for execution in all_executions() {
            let solution = Solver::new(config(Expansion::Full, execution))
                .with_constraints(vec![Constraint::ending_with(["S2", "S0"])])
                .solve_matrix(&matrix)
                .unwrap();
            assert_eq!(solution.cost, expected);
            if solution.status == RouteStatus::Complete {
                assert_eq!(&solution.route[4..], &["S2", "S0"]);
            }
        }
    }

    #[test]
    fn test_start_and_end_together() {
        let graph = testing::square_graph();
        let solution = Solver::new(config(Expansion::Full, Execution::Sequential))
            .with_constraints(vec![Constraint::new(["D"], ["A"])])
            .solve(&graph)
            .unwrap();
        // D-C-B-A = 2 + 1 + 2.
        assert_eq!(solution.route, vec!["D", "C", "B", "A"]);
        assert_eq!(solution.cost, Some(5));

        let solution = Solver::new(config(Expansion::Full, Execution::Sequential))
            .with_constraints(vec![Constraint::new(["B", "D"], ["A", "C"])])
            .solve(&graph)
            .unwrap();
        assert_eq!(solution.route, vec!["B", "D", "A", "C"]);
        assert_eq!(solution.cost, Some(3 + 3 + 3));
    }

    #[test]
    fn test_ending_covering_every_sector_is_the_route() {
        let graph = testing::square_graph();
        for execution in all_executions() {
            let solution = Solver::new(config(Expansion::Full, execution))
                .with_constraints(vec![Constraint::ending_with(["D", "A", "C", "B"])])
                .solve(&graph)
                .unwrap();
            assert_eq!(solution.route, vec!["D", "A", "C", "B"]);
            // D-A-C-B = 3 + 3 + 1.
            assert_eq!(solution.cost, Some(7));
        }
    }

    #[test]
    fn test_unsatisfiable_ending_stays_incomplete() {
        let graph = testing::two_cliques();
        let solution = Solver::new(config(Expansion::Full, Execution::Sequential))
            .with_constraints(vec![Constraint::ending_with(["A", "B", "C", "D", "E", "F"])])
            .solve(&graph)
            .unwrap();
        assert_eq!(solution.status, RouteStatus::Incomplete);
        assert_eq!(solution.cost, None);
        assert!(solution.route.len() <= 1);
    }

    #[test]
    fn test_disconnected_graph_is_incomplete() {
        let graph = testing::two_cliques();
        for execution in all_executions() {
            let solution = Solver::new(config(Expansion::Full, execution))
                .solve(&graph)
                .unwrap();
            assert_eq!(solution.status, RouteStatus::Incomplete);
            assert_eq!(solution.cost, None);
            assert_eq!(solution.route.len(), 3);
        }
    }

    #[test]
    fn test_nearest_never_beats_optimum_and_matches_at_full_width() {
        for seed in 0..5 {
            let graph = testing::random_digraph(6, seed, 0.9);
            let matrix = DistanceMatrix::transitive(&graph);
            let Some((optimum, _)) = testing::brute_force_route(&matrix, &[], &[]) else {
                continue;
            };
            for k in 1..=4 {
                let solution = Solver::new(config(Expansion::Nearest(k), Execution::Sequential))
                    .solve_matrix(&matrix)
                    .unwrap();
                if let Some(cost) = solution.cost {
                    assert!(cost >= optimum, "seed={} k={}", seed, k);
                }
            }
            for execution in all_executions() {
                let solution = Solver::new(config(Expansion::Nearest(5), execution))
                    .solve_matrix(&matrix)
                    .unwrap();
                assert_eq!(solution.cost, Some(optimum), "seed={} {}", seed, execution);
            }
        }
    }

    #[test]
    fn test_static_policy_allows_sentinel_legs() {
        let graph = testing::two_cliques();
        let solution = Solver::new(SolverConfig {
            path_policy: PathPolicy::Static,
            execution: Execution::Sequential,
            ..Default::default()
        })
        .solve(&graph)
        .unwrap();
        // Each clique walked at 1 + 2, joined by one sentinel hop of 3 + 1.
        assert_eq!(solution.status, RouteStatus::Complete);
        assert_eq!(solution.cost, Some(1 + 2 + 4 + 1 + 2));
    }

    #[test]
    fn test_route_cache_still_finds_a_complete_route() {
        let graph = testing::random_digraph(7, 3, 0.9);
        let matrix = DistanceMatrix::transitive(&graph);
        let optimum = testing::brute_force_route(&matrix, &[], &[]).map(|(c, _)| c);
        let solution = Solver::new(SolverConfig {
            use_route_cache: true,
            execution: Execution::Sequential,
            ..Default::default()
        })
        .solve_matrix(&matrix)
        .unwrap();
        assert_eq!(solution.status, RouteStatus::Complete);
        assert!(solution.cost >= optimum);
        assert!(solution.statistics.cache_hits > 0);
    }

    #[test]
    fn test_progress_reports_full_depth() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let deepest = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&deepest);
        let sink = move |depth: usize, _total: usize| {
            seen.fetch_max(depth, Ordering::Relaxed);
        };
        let solution = Solver::new(config(Expansion::Full, Execution::Sequential))
            .with_progress(Arc::new(sink))
            .solve(&testing::square_graph())
            .unwrap();
        assert_eq!(solution.cost, Some(5));
        assert_eq!(deepest.load(Ordering::Relaxed), 4);
        assert!(solution.statistics.nodes_expanded > 0);
        assert!(solution.statistics.tours_installed >= 1);
    }

    #[test]
    fn test_single_sector_route() {
        let mut b = crate::graph::GraphBuilder::new("one");
        b.add_sector("Solo").unwrap();
        let graph = b.build().unwrap();
        let solution = Solver::default().solve(&graph).unwrap();
        assert_eq!(solution.route, vec!["Solo"]);
        assert_eq!(solution.cost, Some(0));
    }
}
