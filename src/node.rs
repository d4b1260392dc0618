//! Search nodes and the best-first frontier.

use crate::distance::Cost;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

/// A partial route awaiting expansion.
///
/// Nodes are never mutated after construction; expanding one produces new
/// children. The optional `ending` is a fixed suffix shared by every
/// descendant of a constrained seed.
#[derive(Debug, Clone)]
pub struct SearchNode {
    path: Vec<usize>,
    bound: Cost,
    ending: Option<Arc<[usize]>>,
}

impl SearchNode {
    pub fn new(path: Vec<usize>, bound: Cost, ending: Option<Arc<[usize]>>) -> Self {
        SearchNode {
            path,
            bound,
            ending: ending.filter(|e| !e.is_empty()),
        }
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn bound(&self) -> Cost {
        self.bound
    }

    /// Number of sectors on the path, the ending excluded.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn ending(&self) -> Option<&Arc<[usize]>> {
        self.ending.as_ref()
    }

    pub fn ending_len(&self) -> usize {
        self.ending.as_ref().map_or(0, |e| e.len())
    }

    pub fn last(&self) -> Option<usize> {
        self.path.last().copied()
    }

    /// Sectors still to place before the ending can be appended.
    pub fn remaining(&self, n: usize) -> usize {
        n.saturating_sub(self.path.len() + self.ending_len())
    }

    /// Path with `next` appended, sharing this node's ending.
    pub fn extended_path(&self, next: usize) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(next);
        path
    }

    /// Path followed by the ending.
    pub fn full_path(&self) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.path.len() + self.ending_len());
        path.extend_from_slice(&self.path);
        if let Some(ending) = &self.ending {
            path.extend_from_slice(ending);
        }
        path
    }

    pub fn into_path(self) -> Vec<usize> {
        self.path
    }
}

/// Lower bound first; on equal bounds the longer path comes first so the
/// search dives toward complete routes.
impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound
            .cmp(&other.bound)
            .then_with(|| other.path.len().cmp(&self.path.len()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

/// Min-priority queue of search nodes.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<SearchNode>>,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, node: SearchNode) {
        self.heap.push(Reverse(node));
    }

    pub fn pop(&mut self) -> Option<SearchNode> {
        self.heap.pop().map(|Reverse(node)| node)
    }

    pub fn peek(&self) -> Option<&SearchNode> {
        self.heap.peek().map(|Reverse(node)| node)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Deals the nodes round-robin, in priority order, into `parts` frontiers.
    pub fn partition(mut self, parts: usize) -> Vec<Frontier> {
        let parts = parts.max(1);
        let mut out: Vec<Frontier> = (0..parts).map(|_| Frontier::new()).collect();
        let mut i = 0;
        while let Some(node) = self.pop() {
            out[i % parts].push(node);
            i += 1;
        }
        out
    }
}

impl FromIterator<SearchNode> for Frontier {
    fn from_iter<I: IntoIterator<Item = SearchNode>>(iter: I) -> Self {
        Frontier {
            heap: iter.into_iter().map(Reverse).collect(),
        }
    }
}

impl Extend<SearchNode> for Frontier {
    fn extend<I: IntoIterator<Item = SearchNode>>(&mut self, iter: I) {
        self.heap.extend(iter.into_iter().map(Reverse));
    }
}
