//! Search statistics.
//!
//! Workers count into a private [`SearchStatistics`] and fold it into the
//! shared [`SearchCounters`] when they finish, so the hot loop never touches
//! a shared cache line.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Nodes popped and expanded.
    pub nodes_expanded: u64,
    /// Children generated during expansion, before pruning.
    pub children_generated: u64,
    /// Children and frontier nodes discarded against the incumbent.
    pub pruned: u64,
    /// Complete routes that became the incumbent.
    pub tours_installed: u64,
    /// Nodes finished from the route cache.
    pub cache_hits: u64,
    /// Fork-join tasks spawned.
    pub tasks_forked: u64,
    /// Longest partial path seen.
    pub max_depth: u64,
}

impl SearchStatistics {
    #[inline]
    pub fn on_node_expanded(&mut self) {
        self.nodes_expanded = self.nodes_expanded.saturating_add(1);
    }

    #[inline]
    pub fn on_child_generated(&mut self) {
        self.children_generated = self.children_generated.saturating_add(1);
    }

    #[inline]
    pub fn on_pruned(&mut self) {
        self.pruned = self.pruned.saturating_add(1);
    }

    #[inline]
    pub fn on_tour_installed(&mut self) {
        self.tours_installed = self.tours_installed.saturating_add(1);
    }

    #[inline]
    pub fn on_cache_hit(&mut self) {
        self.cache_hits = self.cache_hits.saturating_add(1);
    }

    #[inline]
    pub fn on_task_forked(&mut self) {
        self.tasks_forked = self.tasks_forked.saturating_add(1);
    }

    #[inline]
    pub fn on_depth(&mut self, depth: usize) {
        self.max_depth = self.max_depth.max(depth as u64);
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(f, "  Nodes expanded:      {}", self.nodes_expanded)?;
        writeln!(f, "  Children generated:  {}", self.children_generated)?;
        writeln!(f, "  Pruned:              {}", self.pruned)?;
        writeln!(f, "  Tours installed:     {}", self.tours_installed)?;
        writeln!(f, "  Cache hits:          {}", self.cache_hits)?;
        writeln!(f, "  Tasks forked:        {}", self.tasks_forked)?;
        write!(f, "  Max depth:           {}", self.max_depth)
    }
}

/// Shared totals across all workers of one solve.
#[derive(Debug, Default)]
pub struct SearchCounters {
    nodes_expanded: AtomicU64,
    children_generated: AtomicU64,
    pruned: AtomicU64,
    tours_installed: AtomicU64,
    cache_hits: AtomicU64,
    tasks_forked: AtomicU64,
    max_depth: AtomicU64,
}

impl SearchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&self, local: &SearchStatistics) {
        self.nodes_expanded
            .fetch_add(local.nodes_expanded, Ordering::Relaxed);
        self.children_generated
            .fetch_add(local.children_generated, Ordering::Relaxed);
        self.pruned.fetch_add(local.pruned, Ordering::Relaxed);
        self.tours_installed
            .fetch_add(local.tours_installed, Ordering::Relaxed);
        self.cache_hits.fetch_add(local.cache_hits, Ordering::Relaxed);
        self.tasks_forked
            .fetch_add(local.tasks_forked, Ordering::Relaxed);
        self.max_depth.fetch_max(local.max_depth, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SearchStatistics {
        SearchStatistics {
            nodes_expanded: self.nodes_expanded.load(Ordering::Relaxed),
            children_generated: self.children_generated.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            tours_installed: self.tours_installed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            tasks_forked: self.tasks_forked.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}
