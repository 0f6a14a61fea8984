//! The work-unit enumerator (C5, spec.md §4.5): walks the search tree
//! row-major down to a fixed depth, emitting one [`WorkUnit`] per live leaf
//! of that partial tree — the granules C7/C8/C9 hand out to workers.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::kernel::safe;
use crate::puzzle::Puzzle;

/// The largest number of work units this crate will ever materialize for a
/// single run (`SPEC_FULL.md`, Open Question decision #3) — the larger of
/// the two historical values named in spec.md §9, fixed as a constant
/// rather than exposed as a CLI flag.
pub const WORK_UNIT_CAP: usize = 100_000;

/// A partial coloring of the first `prefix.len()` cells in row-major order,
/// every one of which is either a pre-set value or a value this unit's
/// enumeration chose — everything after it is still open for whichever
/// worker receives the unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkUnit {
    pub size: usize,
    pub depth: usize,
    pub prefix: Vec<u8>,
}

impl WorkUnit {
    /// Reconstructs the `size x size` grid this unit describes: the first
    /// `depth` cells (row-major) filled from `prefix`, every pre-set cell
    /// beyond `depth` filled from `puzzle` (a worker resuming this unit
    /// must still see them — they were never part of the search, so this
    /// unit's own `prefix` never recorded them), everything else 0.
    pub fn to_grid(&self, puzzle: &Puzzle) -> Vec<Vec<u8>> {
        let mut grid = puzzle.empty_grid();
        for (index, &value) in self.prefix.iter().enumerate() {
            let (row, col) = cell_index_to_rc(index, self.size);
            grid[row][col] = value;
        }
        grid
    }

    /// The `(row, col)` at which a backtracker resuming this unit should
    /// continue, i.e. just past the prefix.
    pub fn resume_at(&self) -> (usize, usize) {
        cell_index_to_rc(self.depth, self.size)
    }
}

#[inline]
fn cell_index_to_rc(index: usize, size: usize) -> (usize, usize) {
    (index / size, index % size)
}

/// Enumerates work units at `depth` (cells, row-major, pre-set cells
/// included in the count but contributing no branching). Returns up to
/// [`WORK_UNIT_CAP`] units; if the true number of live leaves at `depth`
/// exceeds the cap, enumeration stops early and a `tracing::warn!` records
/// how many were dropped, matching spec.md §4.5's "a resource cap is
/// reached" case (explicitly not an error, §7).
pub fn enumerate(puzzle: &Puzzle, depth: usize) -> Vec<WorkUnit> {
    let size = puzzle.size();
    let depth = depth.min(size * size);
    let mut units = Vec::new();
    let mut grid = puzzle.empty_grid();
    let mut truncated = false;

    enumerate_rec(puzzle, &mut grid, 0, depth, &mut units, &mut truncated);

    if truncated {
        warn!(
            cap = WORK_UNIT_CAP,
            "work-unit enumeration hit the resource cap; remaining leaves at this depth were dropped"
        );
    }
    units
}

fn enumerate_rec(
    puzzle: &Puzzle,
    grid: &mut Vec<Vec<u8>>,
    index: usize,
    depth: usize,
    units: &mut Vec<WorkUnit>,
    truncated: &mut bool,
) {
    if units.len() >= WORK_UNIT_CAP {
        *truncated = true;
        return;
    }
    if index == depth {
        units.push(WorkUnit {
            size: puzzle.size(),
            depth,
            prefix: flatten_prefix(grid, depth, puzzle.size()),
        });
        return;
    }

    let (row, col) = cell_index_to_rc(index, puzzle.size());
    if grid[row][col] != 0 {
        enumerate_rec(puzzle, grid, index + 1, depth, units, truncated);
        return;
    }

    for &value in puzzle.candidates().get(row, col) {
        if units.len() >= WORK_UNIT_CAP {
            *truncated = true;
            return;
        }
        if safe(puzzle, grid, row, col, value) {
            grid[row][col] = value;
            enumerate_rec(puzzle, grid, index + 1, depth, units, truncated);
            grid[row][col] = 0;
        }
    }
}

fn flatten_prefix(grid: &[Vec<u8>], depth: usize, size: usize) -> Vec<u8> {
    (0..depth)
        .map(|index| {
            let (row, col) = cell_index_to_rc(index, size);
            grid[row][col]
        })
        .collect()
}

/// Counts the live leaves `enumerate(puzzle, depth)` would produce, without
/// materializing a single [`WorkUnit`] — the cost model C6's depth search
/// needs, since it only ever wants a count, not the leaves themselves.
/// Counting stops (and the return value saturates) at [`WORK_UNIT_CAP`] so a
/// degenerate board can't make the search itself unbounded.
pub fn count_prefixes(puzzle: &Puzzle, depth: usize) -> usize {
    let depth = depth.min(puzzle.size() * puzzle.size());
    let mut grid = puzzle.empty_grid();
    let mut count = 0usize;
    count_rec(puzzle, &mut grid, 0, depth, &mut count);
    count
}

/// The [`count_prefixes`] analogue of [`refine`]: counts the live leaves a
/// refinement of `unit` down to `new_depth` would produce, without
/// materializing them.
pub fn count_prefixes_from(puzzle: &Puzzle, unit: &WorkUnit, new_depth: usize) -> usize {
    let new_depth = new_depth.max(unit.depth).min(puzzle.size() * puzzle.size());
    let mut grid = unit.to_grid(puzzle);
    let mut count = 0usize;
    count_rec(puzzle, &mut grid, unit.depth, new_depth, &mut count);
    count
}

fn count_rec(puzzle: &Puzzle, grid: &mut Vec<Vec<u8>>, index: usize, depth: usize, count: &mut usize) {
    if *count >= WORK_UNIT_CAP {
        return;
    }
    if index == depth {
        *count += 1;
        return;
    }

    let (row, col) = cell_index_to_rc(index, puzzle.size());
    if grid[row][col] != 0 {
        count_rec(puzzle, grid, index + 1, depth, count);
        return;
    }

    for &value in puzzle.candidates().get(row, col) {
        if *count >= WORK_UNIT_CAP {
            return;
        }
        if safe(puzzle, grid, row, col, value) {
            grid[row][col] = value;
            count_rec(puzzle, grid, index + 1, depth, count);
            grid[row][col] = 0;
        }
    }
}

/// Sub-divides `unit` down to `new_depth` (which must be `>= unit.depth`),
/// the same enumeration [`enumerate`] performs from an empty board, but
/// starting from `unit`'s own prefix. Used by the hybrid scheduler (C9) to
/// hand each worker rank's thread pool its own, finer-grained fan-out
/// within the coarse unit the master already assigned it.
pub fn refine(puzzle: &Puzzle, unit: &WorkUnit, new_depth: usize) -> Vec<WorkUnit> {
    let new_depth = new_depth.max(unit.depth).min(puzzle.size() * puzzle.size());
    let mut units = Vec::new();
    let mut grid = unit.to_grid(puzzle);
    let mut truncated = false;
    enumerate_rec(puzzle, &mut grid, unit.depth, new_depth, &mut units, &mut truncated);
    if truncated {
        warn!(
            cap = WORK_UNIT_CAP,
            "work-unit refinement hit the resource cap; remaining leaves were dropped"
        );
    }
    units
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
