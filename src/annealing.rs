//! Simulated annealing over complete routes.
//!
//! Starts from a random ordering, proposes random two-position swaps and
//! accepts worse routes with probability `exp(-delta / t)`. The temperature
//! cools geometrically; once it drops below the reheat threshold the route is
//! reshuffled and the temperature reset. A required start prefix and ending
//! suffix stay fixed; only the sectors between them move.

use crate::constraint::Constraint;
use crate::distance::{Cost, DistanceMatrix, PathPolicy, UNREACHABLE};
use crate::error::Result;
use crate::graph::{route_string, SectorGraph};
use crate::solution::RouteSolution;
use log::{debug, info, warn};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingConfig {
    /// Temperature at start and after every reheat
    pub initial_temp: f64,
    /// Multiplier applied to the temperature after each proposal
    pub cooling_rate: f64,
    /// Below this temperature the route is reshuffled and reheated
    pub reheat_below: f64,
    /// Total number of proposals
    pub iterations: u64,
    /// Random seed
    pub seed: u64,
    pub path_policy: PathPolicy,
    /// Proposals between debug traces; 0 disables them
    pub log_interval: u64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        AnnealingConfig {
            initial_temp: 100.0,
            cooling_rate: 0.99999,
            reheat_below: 0.1,
            iterations: 1_000_000,
            seed: 42,
            path_policy: PathPolicy::Transitive,
            log_interval: 100_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    config: AnnealingConfig,
    constraint: Option<Constraint>,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Self {
        SimulatedAnnealing {
            config,
            constraint: None,
        }
    }

    /// Uses the first non-empty constraint; annealing keeps a single fixed
    /// prefix and suffix.
    pub fn with_constraints(mut self, constraints: &[Constraint]) -> Self {
        let mut active = constraints.iter().filter(|c| !c.is_empty());
        self.constraint = active.next().cloned();
        if active.next().is_some() {
            warn!("Simulated annealing honours only the first constraint");
        }
        self
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        "simulated-annealing"
    }

    pub fn solve(&self, graph: &SectorGraph) -> Result<RouteSolution> {
        let matrix = DistanceMatrix::build(graph, self.config.path_policy);
        self.solve_matrix(&matrix)
    }

    pub fn solve_matrix(&self, matrix: &DistanceMatrix) -> Result<RouteSolution> {
        let start = Instant::now();
        let n = matrix.len();
        let (prefix, suffix) = match &self.constraint {
            Some(c) => c.resolve(matrix)?,
            None => (Vec::new(), Vec::new()),
        };

        let middle: Vec<usize> = (0..n)
            .filter(|s| !prefix.contains(s) && !suffix.contains(s))
            .collect();
        let lo = prefix.len();
        let hi = lo + middle.len();

        let mut route = Vec::with_capacity(n);
        route.extend_from_slice(&prefix);
        route.extend_from_slice(&middle);
        route.extend_from_slice(&suffix);

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        route[lo..hi].shuffle(&mut rng);

        let mut current = matrix.path_cost(&route);
        let mut best = route.clone();
        let mut best_cost = current;
        info!("Starting route: {} (cost {})", self.route_names(matrix, &best), best_cost);

        let mut t = self.config.initial_temp;
        let mut accepted = 0u64;
        if hi - lo >= 2 {
            for i in 0..self.config.iterations {
                if t < self.config.reheat_below {
                    route[lo..hi].shuffle(&mut rng);
                    current = matrix.path_cost(&route);
                    t = self.config.initial_temp;
                }

                let a = rng.gen_range(lo..hi);
                let b = rng.gen_range(lo..hi);
                if a != b {
                    route.swap(a, b);
                    let candidate = matrix.path_cost(&route);
                    if accept(current, candidate, t, &mut rng) {
                        current = candidate;
                        accepted += 1;
                        if current < best_cost {
                            best_cost = current;
                            best.copy_from_slice(&route);
                            info!("Best route: {} (cost {})", self.route_names(matrix, &best), best_cost);
                        }
                    } else {
                        route.swap(a, b);
                    }
                }

                t *= self.config.cooling_rate;
                if self.config.log_interval > 0 && i % self.config.log_interval == 0 {
                    debug!("i({}) t({:.4}) current({}) best({})", i, t, current, best_cost);
                }
            }
        }

        let mut solution = if best_cost == UNREACHABLE {
            warn!("Annealing found no route with a finite cost");
            RouteSolution::incomplete(matrix, &best, self.name())
        } else {
            RouteSolution::complete(matrix, &best, self.name())
        };
        solution.statistics.tours_installed = accepted;
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn route_names(&self, matrix: &DistanceMatrix, route: &[usize]) -> String {
        let names: Vec<&str> = route.iter().map(|&s| matrix.name(s)).collect();
        route_string(&names)
    }
}

/// Metropolis acceptance.
fn accept(current: Cost, candidate: Cost, t: f64, rng: &mut impl Rng) -> bool {
    if candidate <= current {
        return true;
    }
    let delta = (candidate - current) as f64;
    rng.gen::<f64>() < (-delta / t).exp()
}
