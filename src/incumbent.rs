//! Best route found so far, shared by every worker of a solve.
//!
//! A relaxed atomic holds the incumbent cost so that pruning never takes a
//! lock. The route itself lives behind a mutex and is the source of truth:
//! installs re-check against it under the lock, so the stored cost only ever
//! decreases.

use crate::distance::{Cost, UNREACHABLE};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A complete route and its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    pub cost: Cost,
    pub path: Vec<usize>,
}

#[derive(Debug)]
pub struct SharedIncumbent {
    upper_bound: AtomicI64,
    best: Mutex<Option<Incumbent>>,
    longest_len: AtomicUsize,
    longest: Mutex<Vec<usize>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SharedIncumbent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upper_bound() {
            UNREACHABLE => write!(f, "Incumbent(none)"),
            ub => write!(f, "Incumbent(upper_bound: {})", ub),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SharedIncumbent {
    pub fn new() -> Self {
        SharedIncumbent {
            upper_bound: AtomicI64::new(UNREACHABLE),
            best: Mutex::new(None),
            longest_len: AtomicUsize::new(0),
            longest: Mutex::new(Vec::new()),
        }
    }

    /// Cost of the current incumbent, or [`UNREACHABLE`] when there is none.
    #[inline]
    pub fn upper_bound(&self) -> Cost {
        self.upper_bound.load(Ordering::Relaxed)
    }

    /// Whether a node with this bound can still lead to an improvement.
    #[inline]
    pub fn admits(&self, bound: Cost) -> bool {
        bound != UNREACHABLE && bound <= self.upper_bound()
    }

    pub fn snapshot(&self) -> Option<Incumbent> {
        lock(&self.best).clone()
    }

    /// Installs `path` if `cost` is strictly below the current incumbent.
    pub fn try_install(&self, cost: Cost, path: &[usize]) -> bool {
        if cost == UNREACHABLE || cost >= self.upper_bound() {
            return false;
        }

        let mut guard = lock(&self.best);
        // Another worker may have installed while we waited for the lock.
        if let Some(current) = guard.as_ref() {
            if cost >= current.cost {
                return false;
            }
        }

        *guard = Some(Incumbent {
            cost,
            path: path.to_vec(),
        });
        self.upper_bound.store(cost, Ordering::Relaxed);
        true
    }

    /// Records `path` if it is longer than any partial path seen so far.
    pub fn observe_partial(&self, path: &[usize]) {
        if path.len() <= self.longest_len.load(Ordering::Relaxed) {
            return;
        }
        let mut guard = lock(&self.longest);
        if path.len() > guard.len() {
            guard.clear();
            guard.extend_from_slice(path);
            self.longest_len.store(path.len(), Ordering::Relaxed);
        }
    }

    /// Longest partial path observed, for incomplete outcomes.
    pub fn longest_partial(&self) -> Vec<usize> {
        lock(&self.longest).clone()
    }
}
