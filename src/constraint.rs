//! Required start/end sectors, caller seeds, and the initial frontier.

use crate::bound::BoundScratch;
use crate::distance::DistanceMatrix;
use crate::error::{Result, RouteError};
use crate::node::{Frontier, SearchNode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Sectors a route must begin with and sectors it must end with, in order.
/// Either list may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub starting: Vec<String>,
    #[serde(default)]
    pub ending: Vec<String>,
}

impl Constraint {
    pub fn new<A: Into<String>, B: Into<String>>(
        starting: impl IntoIterator<Item = A>,
        ending: impl IntoIterator<Item = B>,
    ) -> Self {
        Constraint {
            starting: starting.into_iter().map(Into::into).collect(),
            ending: ending.into_iter().map(Into::into).collect(),
        }
    }

    pub fn starting_with<S: Into<String>>(starting: impl IntoIterator<Item = S>) -> Self {
        Self::new(starting, Vec::<String>::new())
    }

    pub fn ending_with<S: Into<String>>(ending: impl IntoIterator<Item = S>) -> Self {
        Self::new(Vec::<String>::new(), ending)
    }

    pub fn is_empty(&self) -> bool {
        self.starting.is_empty() && self.ending.is_empty()
    }

    pub(crate) fn resolve(&self, matrix: &DistanceMatrix) -> Result<(Vec<usize>, Vec<usize>)> {
        let starting = resolve_names(matrix, &self.starting, RouteError::InvalidConstraint)?;
        let ending = resolve_names(matrix, &self.ending, RouteError::InvalidConstraint)?;
        if let Some(&shared) = starting.iter().find(|s| ending.contains(s)) {
            return Err(RouteError::invalid_constraint(format!(
                "'{}' is both a required start and a required end",
                matrix.name(shared)
            )));
        }
        Ok((starting, ending))
    }
}

/// Whether caller seeds are added next to the one-sector starting nodes or
/// replace them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedMode {
    #[default]
    Optional,
    Required,
}

/// Caller-supplied partial routes to start the search from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seeds {
    pub paths: Vec<Vec<String>>,
    pub mode: SeedMode,
}

impl Seeds {
    pub fn optional(paths: Vec<Vec<String>>) -> Self {
        Seeds {
            paths,
            mode: SeedMode::Optional,
        }
    }

    pub fn required(paths: Vec<Vec<String>>) -> Self {
        Seeds {
            paths,
            mode: SeedMode::Required,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn resolve_names(
    matrix: &DistanceMatrix,
    names: &[String],
    error: fn(String) -> RouteError,
) -> Result<Vec<usize>> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .iter()
        .map(|name| {
            let idx = matrix
                .index_of(name)
                .ok_or_else(|| error(format!("unknown sector '{}'", name)))?;
            if !seen.insert(idx) {
                return Err(error(format!("sector '{}' listed twice", name)));
            }
            Ok(idx)
        })
        .collect()
}

/// Builds the frontier the search starts from.
///
/// Constraint translation:
/// - ending only: one seed per sector outside the ending, each carrying it;
/// - starting only: the starting prefix;
/// - both: the starting prefix carrying the ending.
///
/// Any constraint seed, or a non-empty required seed set, restricts the
/// frontier to the seeds. Otherwise every sector also gets a one-sector node.
pub fn initial_frontier(
    matrix: &DistanceMatrix,
    constraints: &[Constraint],
    seeds: &Seeds,
) -> Result<Frontier> {
    let n = matrix.len();
    let mut scratch = BoundScratch::new(n);
    let mut frontier = Frontier::new();
    let mut seeds_only = seeds.mode == SeedMode::Required && !seeds.is_empty();

    for path in &seeds.paths {
        if path.is_empty() {
            return Err(RouteError::invalid_seed("empty seed path"));
        }
        let path = resolve_names(matrix, path, RouteError::InvalidSeed)?;
        let bound = scratch.bound(matrix, &path);
        frontier.push(SearchNode::new(path, bound, None));
    }

    for constraint in constraints {
        let (starting, ending) = constraint.resolve(matrix)?;
        match (starting.is_empty(), ending.is_empty()) {
            (true, true) => continue,
            (true, false) if ending.len() == n => {
                // The ending alone is the whole route.
                let bound = scratch.bound(matrix, &ending);
                frontier.push(SearchNode::new(vec![ending[0]], bound, Some(Arc::from(&ending[1..]))));
            }
            (true, false) => {
                let ending: Arc<[usize]> = Arc::from(ending);
                for s in (0..n).filter(|s| !ending.contains(s)) {
                    let bound = scratch.bound(matrix, &[s]);
                    frontier.push(SearchNode::new(vec![s], bound, Some(ending.clone())));
                }
            }
            (false, true) => {
                let bound = scratch.bound(matrix, &starting);
                frontier.push(SearchNode::new(starting, bound, None));
            }
            (false, false) => {
                let bound = scratch.bound(matrix, &starting);
                frontier.push(SearchNode::new(starting, bound, Some(Arc::from(ending))));
            }
        }
        seeds_only = true;
    }

    if seeds_only {
        return Ok(frontier);
    }

    for s in 0..n {
        let bound = scratch.bound(matrix, &[s]);
        frontier.push(SearchNode::new(vec![s], bound, None));
    }
    Ok(frontier)
}
