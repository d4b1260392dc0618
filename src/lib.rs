//! Sector Route Solver Library
//!
//! Finds cheap open routes that visit every sector of a weighted directed map
//! exactly once.
//!
//! # Features
//!
//! - All-pairs travel costs, transitive (Floyd-Warshall) or direct-edge only
//! - Admissible lower bound for partial routes
//! - Branch-and-bound search, sequential, on a worker pool, or fork-join
//! - Nearest-neighbour restricted expansion for faster approximate routes
//! - Required start/end sectors and caller-supplied seed routes
//! - Simulated annealing as an independent heuristic
//! - Strategy benchmarking with CSV export
//!
//! # Example
//!
//! ```no_run
//! use sector_route_solver::constraint::Constraint;
//! use sector_route_solver::graph::SectorGraph;
//! use sector_route_solver::solver::{Solver, SolverConfig};
//!
//! let graph = SectorGraph::from_json_file("map.json").unwrap();
//!
//! let solution = Solver::new(SolverConfig::default())
//!     .with_constraints(vec![Constraint::starting_with(["Sol"])])
//!     .solve(&graph)
//!     .unwrap();
//!
//! println!("Route: {}", solution.route_string());
//! ```

pub mod annealing;
pub mod benchmark;
pub mod bound;
pub mod cache;
pub mod constraint;
pub mod distance;
pub mod error;
pub mod graph;
pub mod incumbent;
pub mod node;
pub mod progress;
pub mod solution;
pub mod solver;
pub mod stats;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use distance::{Cost, DistanceMatrix, PathPolicy};
pub use error::{Result, RouteError};
pub use graph::SectorGraph;
pub use solution::{RouteSolution, RouteStatus};
pub use solver::{Solver, SolverConfig};
