//! Module for building and loading sector maps.
//!
//! A map is a set of named sectors, each owning a list of outgoing edges to
//! neighbouring sectors with a non-negative integer travel weight. Edges are
//! directed: `A -> B` says nothing about `B -> A`.

use crate::error::{Result, RouteError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Maximum number of sectors in a single map.
///
/// Remaining-sector sets are packed into a `u128` for route cache keys.
pub const MAX_SECTORS: usize = 128;

/// A named location with its outgoing edges.
///
/// Identity is the name: two sectors with equal names are equal regardless of
/// their edge lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
    name: String,
    edges: BTreeMap<String, u32>,
}

impl Sector {
    pub fn new(name: impl Into<String>) -> Self {
        Sector {
            name: name.into(),
            edges: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing edges keyed by neighbour name.
    pub fn edges(&self) -> &BTreeMap<String, u32> {
        &self.edges
    }

    pub fn edge_to(&self, neighbour: &str) -> Option<u32> {
        self.edges.get(neighbour).copied()
    }
}

impl PartialEq for Sector {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Sector {}

impl Hash for Sector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Assembles a [`SectorGraph`]. Sectors keep their insertion order, which is
/// also the index order used by the solver.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    name: String,
    sectors: Vec<Sector>,
    index: HashMap<String, usize>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        GraphBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a sector and returns its index.
    pub fn add_sector(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RouteError::DuplicateSector(name));
        }
        let idx = self.sectors.len();
        self.index.insert(name.clone(), idx);
        self.sectors.push(Sector::new(name));
        Ok(idx)
    }

    /// Adds (or overwrites) the directed edge `from -> to`.
    ///
    /// Self-loops carry no travel cost in a route and are dropped.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: u32) -> Result<&mut Self> {
        if !self.index.contains_key(to) {
            return Err(RouteError::UnknownSector(to.to_string()));
        }
        let idx = *self
            .index
            .get(from)
            .ok_or_else(|| RouteError::UnknownSector(from.to_string()))?;
        if from != to {
            self.sectors[idx].edges.insert(to.to_string(), weight);
        }
        Ok(self)
    }

    /// Adds `a -> b` and `b -> a` with the same weight.
    pub fn add_undirected_edge(&mut self, a: &str, b: &str, weight: u32) -> Result<&mut Self> {
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)
    }

    pub fn build(self) -> Result<SectorGraph> {
        if self.sectors.is_empty() {
            return Err(RouteError::EmptyGraph);
        }
        if self.sectors.len() > MAX_SECTORS {
            return Err(RouteError::TooManySectors {
                count: self.sectors.len(),
                max: MAX_SECTORS,
            });
        }
        Ok(SectorGraph {
            name: self.name,
            sectors: self.sectors,
            index: self.index,
        })
    }
}

/// A read-only sector map.
#[derive(Debug, Clone)]
pub struct SectorGraph {
    name: String,
    sectors: Vec<Sector>,
    index: HashMap<String, usize>,
}

/// On-disk JSON layout of a map file.
#[derive(Debug, Serialize, Deserialize)]
struct MapFile {
    #[serde(default)]
    name: String,
    sectors: Vec<MapSector>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MapSector {
    name: String,
    #[serde(default)]
    edges: BTreeMap<String, u32>,
}

impl SectorGraph {
    pub fn builder(name: impl Into<String>) -> GraphBuilder {
        GraphBuilder::new(name)
    }

    /// Parse a map from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let mut graph = Self::from_json_str(&text)?;
        if graph.name.is_empty() {
            graph.name = path
                .as_ref()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(graph)
    }

    /// Parse a map from JSON text.
    ///
    /// Edges that point at sectors missing from the map are skipped with a
    /// warning; duplicate sector names are rejected.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: MapFile = serde_json::from_str(text)?;
        let mut builder = GraphBuilder::new(file.name);

        for sector in &file.sectors {
            builder.add_sector(sector.name.clone())?;
        }

        for sector in &file.sectors {
            for (neighbour, &weight) in &sector.edges {
                if !builder.index.contains_key(neighbour) {
                    warn!(
                        "Unknown edge for {} linking to {}, skipping",
                        sector.name, neighbour
                    );
                    continue;
                }
                builder.add_edge(&sector.name, neighbour, weight)?;
            }
        }

        builder.build()
    }

    /// Serialize the map back to the JSON layout accepted by [`Self::from_json_str`].
    pub fn to_json(&self) -> Result<String> {
        let file = MapFile {
            name: self.name.clone(),
            sectors: self
                .sectors
                .iter()
                .map(|s| MapSector {
                    name: s.name.clone(),
                    edges: s.edges.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector(&self, idx: usize) -> &Sector {
        &self.sectors[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`Self::index_of`] but fails with [`RouteError::UnknownSector`].
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| RouteError::UnknownSector(name.to_string()))
    }

    /// Direct edge weight between two sector indices, if the edge exists.
    #[inline]
    pub fn edge_weight(&self, from: usize, to: usize) -> Option<u32> {
        self.sectors[from].edge_to(&self.sectors[to].name)
    }

    pub fn edge_count(&self) -> usize {
        self.sectors.iter().map(|s| s.edges.len()).sum()
    }

    pub fn max_edge_weight(&self) -> u32 {
        self.sectors
            .iter()
            .flat_map(|s| s.edges.values().copied())
            .max()
            .unwrap_or(0)
    }

    /// Get statistics about the map
    pub fn statistics(&self) -> GraphStatistics {
        let weights: Vec<u32> = self
            .sectors
            .iter()
            .flat_map(|s| s.edges.values().copied())
            .collect();

        let asymmetric_edges = self
            .sectors
            .iter()
            .flat_map(|s| s.edges.iter().map(move |(to, &w)| (s, to, w)))
            .filter(|(from, to, w)| {
                self.index_of(to)
                    .map(|t| self.sectors[t].edge_to(&from.name) != Some(*w))
                    .unwrap_or(true)
            })
            .count();

        let avg_weight = if weights.is_empty() {
            0.0
        } else {
            weights.iter().map(|&w| w as f64).sum::<f64>() / weights.len() as f64
        };

        GraphStatistics {
            name: self.name.clone(),
            sectors: self.len(),
            edges: weights.len(),
            asymmetric_edges,
            min_weight: weights.iter().copied().min().unwrap_or(0),
            max_weight: weights.iter().copied().max().unwrap_or(0),
            avg_weight,
        }
    }
}

/// Statistics about a sector map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub name: String,
    pub sectors: usize,
    pub edges: usize,
    /// Edges whose reverse edge is missing or has a different weight.
    pub asymmetric_edges: usize,
    pub min_weight: u32,
    pub max_weight: u32,
    pub avg_weight: f64,
}

impl std::fmt::Display for GraphStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Map: {}", self.name)?;
        writeln!(f, "  Sectors: {}", self.sectors)?;
        writeln!(f, "  Edges: {} ({} asymmetric)", self.edges, self.asymmetric_edges)?;
        writeln!(f, "  Min weight: {}", self.min_weight)?;
        writeln!(f, "  Max weight: {}", self.max_weight)?;
        writeln!(f, "  Avg weight: {:.2}", self.avg_weight)
    }
}

/// Readable `A, B, C` form of a route.
pub fn route_string<S: AsRef<str>>(route: &[S]) -> String {
    route
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
