//! Fixed worker pool: the initial frontier is dealt round-robin to the
//! workers, and each worker searches its slice independently against the
//! shared incumbent.

use super::engine::SearchContext;
use super::sequential::drain;
use crate::error::Result;
use crate::node::Frontier;
use log::info;

pub(crate) fn worker_count(requested: Option<usize>, initial: usize) -> usize {
    let wanted = requested.unwrap_or_else(|| 2 * rayon::current_num_threads());
    wanted.min(initial).max(1)
}

pub(crate) fn run(ctx: &SearchContext<'_>, frontier: Frontier, threads: Option<usize>) -> Result<()> {
    let workers = worker_count(threads, frontier.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("route-worker-{}", i))
        .build()?;
    info!("Starting {} workers", workers);

    let parts = frontier.partition(workers);
    pool.scope(|s| {
        for (id, part) in parts.into_iter().enumerate() {
            s.spawn(move |_| drain(ctx, part, id));
        }
    });
    Ok(())
}
