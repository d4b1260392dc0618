//! Fork-join search on a work-stealing pool.
//!
//! A task drains its own frontier. When it expands a node with exactly
//! `depth_threshold` sectors left, each surviving child becomes a new task
//! with a fresh frontier instead of joining the current one. The call returns
//! once every spawned task has finished.

use super::engine::{SearchContext, WorkerState};
use crate::error::Result;
use crate::node::{Frontier, SearchNode};
use log::{info, trace};
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn run(
    ctx: &SearchContext<'_>,
    frontier: Frontier,
    depth_threshold: usize,
    threads: Option<usize>,
) -> Result<()> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("route-fork-{}", i));
    if let Some(threads) = threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;
    info!(
        "Fork-join over {} threads, forking at {} remaining sectors",
        pool.current_num_threads(),
        depth_threshold
    );

    let ids = AtomicUsize::new(1);
    pool.install(|| {
        rayon::scope(|s| run_task(ctx, s, frontier, depth_threshold, &ids, 0));
    });
    Ok(())
}

fn run_task<'s>(
    ctx: &'s SearchContext<'s>,
    scope: &rayon::Scope<'s>,
    mut frontier: Frontier,
    depth_threshold: usize,
    ids: &'s AtomicUsize,
    id: usize,
) {
    let n = ctx.len();
    let mut worker = WorkerState::new(id, n);
    let mut forked: Vec<SearchNode> = Vec::new();

    while let Some(node) = frontier.pop() {
        let fork = node.remaining(n) == depth_threshold;
        let remaining = frontier.len();
        let keep_going = ctx.visit(node, &mut worker, remaining, |child| {
            if fork {
                forked.push(child);
            } else {
                frontier.push(child);
            }
        });

        for child in forked.drain(..) {
            worker.stats.on_task_forked();
            let child_id = ids.fetch_add(1, Ordering::Relaxed);
            trace!("task {} forks task {} at depth {}", id, child_id, child.len());
            let single: Frontier = std::iter::once(child).collect();
            scope.spawn(move |s| run_task(ctx, s, single, depth_threshold, ids, child_id));
        }

        if !keep_going {
            break;
        }
    }

    ctx.finish_worker(&worker);
}
