//! Completion cache keyed by (current sector, set of sectors still to visit).
//!
//! Every installed incumbent contributes one entry per position: the suffix
//! after that position, keyed by the sector at the position and the set of
//! sectors in the suffix. A later node ending at the same sector with the same
//! unvisited set can finish with the cached suffix instead of branching.
//!
//! Entries come from incumbents, which are not necessarily optimal when they
//! are recorded, so a cache-assisted search can miss the true optimum.

use crate::distance::{Cost, DistanceMatrix};
use crate::graph::MAX_SECTORS;
use log::trace;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Bitset of sector indices; [`MAX_SECTORS`] bounds the index range.
pub type SectorSet = u128;

pub fn sector_set(sectors: impl IntoIterator<Item = usize>) -> SectorSet {
    sectors.into_iter().fold(0, |set, s| {
        debug_assert!(s < MAX_SECTORS);
        set | (1u128 << s)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub start: usize,
    pub others: SectorSet,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    cost: Cost,
    completion: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct RouteCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records every suffix of a complete route. A key already holding a
    /// cheaper or equal completion keeps it.
    pub fn record(&self, matrix: &DistanceMatrix, route: &[usize]) {
        if route.len() < 2 {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for i in 0..route.len() - 1 {
            let completion = &route[i + 1..];
            let key = CacheKey {
                start: route[i],
                others: sector_set(completion.iter().copied()),
            };
            let cost = matrix.path_cost(&route[i..]);
            let better = entries.get(&key).map_or(true, |e| cost < e.cost);
            if better {
                trace!("caching completion from {} over {} sectors", matrix.name(route[i]), completion.len());
                entries.insert(
                    key,
                    CacheEntry {
                        cost,
                        completion: completion.to_vec(),
                    },
                );
            }
        }
    }

    /// Cached completion for a path ending at `start` with `others` unvisited.
    pub fn lookup(&self, start: usize, others: SectorSet) -> Option<Vec<usize>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&CacheKey { start, others })
            .map(|e| e.completion.clone())
    }
}
