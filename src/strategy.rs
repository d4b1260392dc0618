//! Strategy selection: the accuracy dial and the named strategies the CLI
//! and benchmark run.

use crate::annealing::{AnnealingConfig, SimulatedAnnealing};
use crate::constraint::{Constraint, Seeds};
use crate::error::Result;
use crate::graph::SectorGraph;
use crate::progress::ProgressSink;
use crate::solution::RouteSolution;
use crate::solver::{Execution, Expansion, Solver, SolverConfig};
use std::sync::Arc;

pub const MIN_ACCURACY: i32 = 1;
pub const MAX_ACCURACY: i32 = 5;

/// Maps an accuracy level onto a solver configuration: the maximum and
/// above search exhaustively on the worker pool, anything lower keeps only
/// the `accuracy` nearest neighbours of each node.
pub fn config_for_accuracy(accuracy: i32) -> SolverConfig {
    let expansion = if accuracy >= MAX_ACCURACY {
        Expansion::Full
    } else {
        Expansion::Nearest(accuracy.max(MIN_ACCURACY) as usize)
    };
    SolverConfig {
        expansion,
        execution: Execution::WorkerPool { threads: None },
        ..Default::default()
    }
}

#[derive(Debug, Clone)]
pub enum Strategy {
    BranchAndBound(SolverConfig),
    Annealing(AnnealingConfig),
}

impl Strategy {
    pub fn from_accuracy(accuracy: i32) -> Self {
        Strategy::BranchAndBound(config_for_accuracy(accuracy))
    }

    pub fn name(&self) -> String {
        match self {
            Strategy::BranchAndBound(config) => Solver::new(config.clone()).name(),
            Strategy::Annealing(_) => "simulated-annealing".to_string(),
        }
    }

    /// Runs the strategy. Annealing ignores seeds and honours only the
    /// first non-empty constraint.
    pub fn run(
        &self,
        graph: &SectorGraph,
        constraints: &[Constraint],
        seeds: &Seeds,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<RouteSolution> {
        match self {
            Strategy::BranchAndBound(config) => {
                let mut solver = Solver::new(config.clone())
                    .with_constraints(constraints.to_vec())
                    .with_seeds(seeds.clone());
                if let Some(sink) = progress {
                    solver = solver.with_progress(sink);
                }
                solver.solve(graph)
            }
            Strategy::Annealing(config) => SimulatedAnnealing::new(config.clone())
                .with_constraints(constraints)
                .solve(graph),
        }
    }

    /// Every engine worth comparing on one map.
    pub fn catalogue() -> Vec<Strategy> {
        let with = |expansion, execution| {
            Strategy::BranchAndBound(SolverConfig {
                expansion,
                execution,
                ..Default::default()
            })
        };
        vec![
            with(Expansion::Full, Execution::Sequential),
            with(Expansion::Full, Execution::WorkerPool { threads: None }),
            with(Expansion::Full, Execution::fork_join()),
            with(Expansion::Nearest(3), Execution::WorkerPool { threads: None }),
            with(Expansion::Nearest(1), Execution::WorkerPool { threads: None }),
            Strategy::Annealing(AnnealingConfig::default()),
        ]
    }
}
