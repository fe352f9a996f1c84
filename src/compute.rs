//! A module for spreading per-source work over worker threads.
//!
//! Betweenness, closeness and efficiency all run one traversal per source vertex and fold the
//! results together. The sources are cut into fixed blocks whose size only depends on the number
//! of sources. Worker threads grab the next unprocessed block, fold it into a fresh accumulator
//! and hand it back. Accumulators are returned in block order so that the caller's reduction, and
//! therefore the floating point result, doesn't depend on the thread count or on scheduling.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use crate::config::{MAX_NUM_THREADS, MIN_NUM_THREADS};

/// Upper bound on the number of blocks, which bounds the accumulators alive at once.
const MAX_BLOCKS: usize = 64;
/// Smallest block worth handing to a thread.
const MIN_BLOCK_LEN: usize = 16;

/// Runs `task(source, &mut acc)` for every source in `0..num_sources` and returns one accumulator
/// per block, in block order.
pub(crate) fn fold_sources<A, I, F>(
    num_sources: usize,
    num_threads: usize,
    init: I,
    task: F,
) -> Vec<A>
where
    A: Send,
    I: Fn() -> A + Sync,
    F: Fn(usize, &mut A) + Sync,
{
    let blocks = block_ranges(num_sources);
    let num_threads = num_threads
        .clamp(MIN_NUM_THREADS, MAX_NUM_THREADS)
        .min(blocks.len().max(1));

    let run_block = |(start, end): (usize, usize)| {
        let mut acc = init();
        for source in start..end {
            task(source, &mut acc);
        }
        acc
    };

    if num_threads == 1 {
        return blocks.into_iter().map(&run_block).collect();
    }

    let counter = AtomicUsize::new(0);
    let mut done: Vec<(usize, A)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let (blocks, counter, run_block) = (&blocks, &counter, &run_block);
                scope.spawn(move || {
                    // Each worker keeps its own list of folded blocks, these are returned when the
                    // thread finishes and merged by the caller.
                    let mut folded = Vec::new();
                    loop {
                        let index = counter.fetch_add(1, Ordering::Relaxed);
                        match blocks.get(index) {
                            Some(&range) => folded.push((index, run_block(range))),
                            None => break,
                        }
                    }
                    folded
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    });

    done.sort_unstable_by_key(|(index, _)| *index);
    done.into_iter().map(|(_, acc)| acc).collect()
}

/// Cuts `0..n` into contiguous `(start, end)` ranges.
fn block_ranges(n: usize) -> Vec<(usize, usize)> {
    if n == 0 {
        return Vec::new();
    }

    let len = n.div_ceil(MAX_BLOCKS).max(MIN_BLOCK_LEN);
    (0..n)
        .step_by(len)
        .map(|start| (start, (start + len).min(n)))
        .collect()
}
