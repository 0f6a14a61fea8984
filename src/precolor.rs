//! Pre-coloring (C3, spec.md §4.3): a fixed-point arc-consistency and
//! singleton-propagation pass over the candidate arena, run once before any
//! scheduler starts its search.

use tracing::debug;

use crate::kernel::has_valid_neighbor;
use crate::puzzle::Puzzle;

/// Runs pre-coloring to a fixed point, returning the total number of
/// candidates removed across every round.
///
/// Each round:
/// 1. **Uniqueness propagation** — any cell whose candidate list has
///    collapsed to a singleton has that value removed from every other
///    cell in its row and column (spec.md §4.3, "singleton propagation").
/// 2. **Arc consistency** — any candidate at `(row, col)` that cannot
///    satisfy its inequality constraint against *any* remaining candidate
///    of an adjacent cell is removed (spec.md §4.3, "arc consistency").
///
/// Rounds repeat until neither step removes anything, i.e. a fixed point.
pub fn pre_color(puzzle: &mut Puzzle) -> usize {
    let size = puzzle.size();
    let mut total_removed = 0;

    loop {
        let mut removed_this_round = 0;
        removed_this_round += propagate_singletons(puzzle, size);
        removed_this_round += enforce_arc_consistency(puzzle, size);

        debug!(removed = removed_this_round, "pre-coloring round");
        total_removed += removed_this_round;
        if removed_this_round == 0 {
            break;
        }
    }

    total_removed
}

fn propagate_singletons(puzzle: &mut Puzzle, size: usize) -> usize {
    let mut removed = 0;
    for row in 0..size {
        for col in 0..size {
            let Some(value) = puzzle.candidates().is_singleton(row, col) else {
                continue;
            };
            for c in 0..size {
                if c != col && puzzle.candidates_mut().remove(row, c, value) {
                    removed += 1;
                }
            }
            for r in 0..size {
                if r != row && puzzle.candidates_mut().remove(r, col, value) {
                    removed += 1;
                }
            }
        }
    }
    removed
}

fn enforce_arc_consistency(puzzle: &mut Puzzle, size: usize) -> usize {
    let mut removed = 0;

    for row in 0..size {
        for col in 0..size {
            let h = puzzle.h_constraint(row, col);
            if h == crate::puzzle::Constraint::None || col + 1 >= size {
                continue;
            }
            let right_candidates: Vec<u8> = puzzle.candidates().get(row, col + 1).to_vec();
            let left_candidates: Vec<u8> = puzzle.candidates().get(row, col).to_vec();

            for &value in &left_candidates {
                if !right_candidates.iter().any(|&r| h.holds(value, r)) {
                    if puzzle.candidates_mut().remove(row, col, value) {
                        removed += 1;
                    }
                }
            }
            for &value in &right_candidates {
                if !left_candidates.iter().any(|&l| h.holds(l, value)) {
                    if puzzle.candidates_mut().remove(row, col + 1, value) {
                        removed += 1;
                    }
                }
            }
        }
    }

    for row in 0..size {
        for col in 0..size {
            let v = puzzle.v_constraint(row, col);
            if v == crate::puzzle::Constraint::None || row + 1 >= size {
                continue;
            }
            let down_candidates: Vec<u8> = puzzle.candidates().get(row + 1, col).to_vec();
            let up_candidates: Vec<u8> = puzzle.candidates().get(row, col).to_vec();

            for &value in &up_candidates {
                if !down_candidates.iter().any(|&d| v.holds(value, d)) {
                    if puzzle.candidates_mut().remove(row, col, value) {
                        removed += 1;
                    }
                }
            }
            for &value in &down_candidates {
                if !up_candidates.iter().any(|&u| v.holds(u, value)) {
                    if puzzle.candidates_mut().remove(row + 1, col, value) {
                        removed += 1;
                    }
                }
            }
        }
    }

    removed
}

/// `true` iff every remaining candidate at `(row, col)` can be reconciled
/// against at least one remaining candidate of every adjacent cell with an
/// inequality constraint — used by property tests (P-arc-consistent) to
/// confirm [`pre_color`] actually reached a fixed point.
pub fn is_arc_consistent(puzzle: &Puzzle) -> bool {
    let size = puzzle.size();
    for row in 0..size {
        for col in 0..size {
            let h = puzzle.h_constraint(row, col);
            if h != crate::puzzle::Constraint::None && col + 1 < size {
                let right = puzzle.candidates().get(row, col + 1);
                for &value in puzzle.candidates().get(row, col) {
                    if !has_valid_neighbor(h, value, right) {
                        return false;
                    }
                }
            }
            let v = puzzle.v_constraint(row, col);
            if v != crate::puzzle::Constraint::None && row + 1 < size {
                let down = puzzle.candidates().get(row + 1, col);
                for &value in puzzle.candidates().get(row, col) {
                    if !has_valid_neighbor(v, value, down) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
