//! The depth calibrator (C6, spec.md §4.6): picks the shallowest
//! enumeration depth whose work-unit count gives every worker something to
//! do, without overshooting [`crate::workunit::WORK_UNIT_CAP`].
//!
//! The depth search itself (`grow_depth`) only ever *counts* leaves via
//! [`crate::workunit::count_prefixes`] — it materializes [`WorkUnit`]s
//! exactly once, at the depth the search settles on.

use tracing::debug;

use crate::puzzle::Puzzle;
use crate::workunit::{count_prefixes, count_prefixes_from, enumerate, refine, WorkUnit, WORK_UNIT_CAP};

/// spec.md §4.6's size-dependent ceiling on how deep C6 will grow the
/// enumeration, regardless of how far short of the target it falls —
/// larger boards branch so much faster per cell that a shallow cap still
/// yields plenty of units.
fn max_depth_for_size(size: usize) -> usize {
    if size <= 9 {
        5
    } else if size <= 15 {
        4
    } else {
        3
    }
}

/// spec.md §4.6's target unit count for `workers` consumers and task
/// multiplier `f`: `T = max(1, ceil(W * f))`, additionally floored at
/// `workers` once `f >= 1` so every worker is guaranteed at least one unit.
pub fn target_units(workers: usize, factor: f64) -> usize {
    let workers = workers.max(1);
    let raw = (workers as f64 * factor).ceil().max(1.0) as usize;
    if factor >= 1.0 {
        raw.max(workers)
    } else {
        raw
    }
}

/// Grows `depth` from 0 while `count(depth) < target`, stopping at the
/// earlier of: target reached, [`WORK_UNIT_CAP`] reached, the board's own
/// empty-cell count exhausted, or `max_depth_for_size` reached. `count`
/// abstracts over enumerating from scratch (`calibrate`) versus refining an
/// existing unit (`calibrate_from`).
fn grow_depth(target: usize, max_depth: usize, mut count: impl FnMut(usize) -> usize) -> (usize, usize) {
    let mut depth = 0;
    let mut n = count(depth);

    while n < target && n < WORK_UNIT_CAP && depth < max_depth {
        let next_depth = depth + 1;
        let next_n = count(next_depth);
        if next_n == 0 {
            // every branch died before reaching this depth: the previous
            // depth's (possibly empty) count is final.
            break;
        }
        depth = next_depth;
        n = next_n;
    }

    (depth, n)
}

/// Walks depths `0, 1, 2, ...` until the live-leaf count is at least
/// `target_units(workers, factor)` (or growth stops early per
/// `grow_depth`), returning the chosen depth together with the units
/// materialized at it.
///
/// `workers` is the number of consumers the calling scheduler will hand
/// units out to — C7's thread count, or C8/C9's rank count minus the
/// master.
pub fn calibrate(puzzle: &Puzzle, workers: usize, factor: f64) -> (usize, Vec<WorkUnit>) {
    let target = target_units(workers, factor);
    let max_depth = max_depth_for_size(puzzle.size()).min(puzzle.empty_cell_count());

    let (depth, count) = grow_depth(target, max_depth, |d| count_prefixes(puzzle, d));
    let units = enumerate(puzzle, depth);

    debug!(depth, units = count, workers, factor, "calibrated work-unit depth");
    (depth, units)
}

/// The [`calibrate`] analogue for C9's per-rank worker tier: grows a
/// refinement depth from `unit.depth` instead of from an empty board, for
/// the rank's own sub-problem.
pub fn calibrate_from(
    puzzle: &Puzzle,
    unit: &WorkUnit,
    workers: usize,
    factor: f64,
) -> (usize, Vec<WorkUnit>) {
    let target = target_units(workers, factor);
    // `step` counts cells beyond `unit.depth`; the cap on how many more
    // cells this tier may grow into is the same size-dependent budget,
    // bounded by how much board is actually left to descend into.
    let max_step = max_depth_for_size(puzzle.size()).min(puzzle.size() * puzzle.size() - unit.depth);

    let (step, count) = grow_depth(target, max_step, |s| {
        count_prefixes_from(puzzle, unit, unit.depth + s)
    });
    let depth = unit.depth + step;
    let units = refine(puzzle, unit, depth);

    debug!(depth, units = count, workers, factor, "calibrated worker-tier refinement depth");
    (depth, units)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
