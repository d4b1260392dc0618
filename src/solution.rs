//! Route solution representation.

use crate::bound::BoundScratch;
use crate::distance::{Cost, DistanceMatrix};
use crate::graph::route_string;
use crate::stats::SearchStatistics;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteStatus {
    /// The route visits every sector exactly once.
    Complete,
    /// No complete route was found; the route is the longest partial path seen.
    Incomplete,
}

/// Outcome of one solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSolution {
    /// Sector names in visiting order
    pub route: Vec<String>,
    pub status: RouteStatus,
    /// Travel cost of the route, present only when it is complete
    pub cost: Option<Cost>,
    /// Strategy that produced this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    #[serde(default)]
    pub statistics: SearchStatistics,
}

impl RouteSolution {
    /// A complete route; the cost is recomputed from the matrix.
    pub fn complete(matrix: &DistanceMatrix, path: &[usize], algorithm: impl Into<String>) -> Self {
        let cost = BoundScratch::new(matrix.len()).bound(matrix, path);
        RouteSolution {
            route: names(matrix, path),
            status: RouteStatus::Complete,
            cost: Some(cost),
            algorithm: algorithm.into(),
            computation_time: 0.0,
            statistics: SearchStatistics::default(),
        }
    }

    pub fn incomplete(matrix: &DistanceMatrix, path: &[usize], algorithm: impl Into<String>) -> Self {
        RouteSolution {
            route: names(matrix, path),
            status: RouteStatus::Incomplete,
            cost: None,
            algorithm: algorithm.into(),
            computation_time: 0.0,
            statistics: SearchStatistics::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RouteStatus::Complete
    }

    /// `A, B, C` formatting of the route.
    pub fn route_string(&self) -> String {
        route_string(&self.route)
    }

    /// Whether the route names every sector of the matrix exactly once.
    pub fn visits_every_sector(&self, matrix: &DistanceMatrix) -> bool {
        if self.route.len() != matrix.len() {
            return false;
        }
        let unique: HashSet<&str> = self.route.iter().map(String::as_str).collect();
        unique.len() == matrix.len() && unique.iter().all(|s| matrix.index_of(s).is_some())
    }
}

fn names(matrix: &DistanceMatrix, path: &[usize]) -> Vec<String> {
    path.iter().map(|&s| matrix.name(s).to_string()).collect()
}

impl std::fmt::Display for RouteSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        match self.cost {
            Some(cost) => writeln!(f, "  Cost: {}", cost)?,
            None => writeln!(f, "  Cost: -")?,
        }
        writeln!(f, "  Status: {:?}", self.status)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        write!(f, "  Route: {}", self.route_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_complete_solution_recomputes_cost() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let sol = RouteSolution::complete(&m, &[0, 1, 2, 3], "test");
        assert!(sol.is_complete());
        assert_eq!(sol.cost, Some(5));
        assert_eq!(sol.route_string(), "A, B, C, D");
        assert!(sol.visits_every_sector(&m));
    }

    #[test]
    fn test_incomplete_solution_has_no_cost() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let sol = RouteSolution::incomplete(&m, &[0, 1], "test");
        assert!(!sol.is_complete());
        assert_eq!(sol.cost, None);
        assert!(!sol.visits_every_sector(&m));
        assert!(sol.to_string().contains("Cost: -"));
    }

    #[test]
    fn test_json_shape() {
        let m = DistanceMatrix::transitive(&testing::square_graph());
        let sol = RouteSolution::complete(&m, &[3, 2, 1, 0], "test");
        let json = serde_json::to_value(&sol).unwrap();
        assert_eq!(json["status"], "Complete");
        assert_eq!(json["cost"], 5);
        assert_eq!(json["route"][0], "D");
    }
}
