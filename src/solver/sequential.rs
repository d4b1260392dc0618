//! Single-threaded best-first search.

use super::engine::{SearchContext, WorkerState};
use crate::node::Frontier;

/// Drains `frontier` on the calling thread.
pub(crate) fn run(ctx: &SearchContext<'_>, frontier: Frontier) {
    drain(ctx, frontier, 0);
}

/// Pops until the frontier is empty or its best bound can no longer improve
/// the incumbent. Shared with the worker pool, where each worker drains its
/// own slice.
pub(crate) fn drain(ctx: &SearchContext<'_>, mut frontier: Frontier, id: usize) {
    let mut worker = WorkerState::new(id, ctx.len());
    while let Some(node) = frontier.pop() {
        let remaining = frontier.len();
        if !ctx.visit(node, &mut worker, remaining, |child| frontier.push(child)) {
            break;
        }
    }
    ctx.finish_worker(&worker);
}
