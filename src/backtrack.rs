//! The sequential backtracker (C4, spec.md §4.4): given a puzzle (already
//! pre-colored or not) and a starting cell, searches row-major for a
//! complete, legal coloring.
//!
//! Per `SPEC_FULL.md`'s "Open Question decisions" (#2), the strict
//! row-major continuation `(row, col + 1)` is used rather than a
//! most-constrained-cell variant, for determinism and testability.

use crate::kernel::safe;
use crate::puzzle::{Puzzle, Solution};

/// Searches `grid` row-major starting at `(row, col)`, mutating `grid` in
/// place and trying each candidate still listed in `puzzle`'s candidate
/// arena at every empty cell. Returns the completed grid on success.
///
/// `should_abort` is polled before each candidate is tried, so callers (the
/// intra-node scheduler's cooperative cancellation, C7) can interrupt a
/// long search once another worker has already found a solution elsewhere.
pub fn color_g_seq(
    puzzle: &Puzzle,
    grid: &mut Vec<Vec<u8>>,
    row: usize,
    col: usize,
    should_abort: &dyn Fn() -> bool,
) -> Option<()> {
    let size = puzzle.size();
    if row == size {
        return Some(());
    }
    let (next_row, next_col) = if col + 1 == size { (row + 1, 0) } else { (row, col + 1) };

    if grid[row][col] != 0 {
        if !safe(puzzle, grid, row, col, grid[row][col]) {
            return None;
        }
        return color_g_seq(puzzle, grid, next_row, next_col, should_abort);
    }

    for &value in puzzle.candidates().get(row, col) {
        if should_abort() {
            return None;
        }
        if safe(puzzle, grid, row, col, value) {
            grid[row][col] = value;
            if color_g_seq(puzzle, grid, next_row, next_col, should_abort).is_some() {
                return Some(());
            }
            grid[row][col] = 0;
        }
    }

    None
}

/// Runs [`color_g_seq`] from `(0, 0)` over a fresh grid derived from
/// `puzzle`'s pre-set cells, the whole-board entry point used by the
/// `sequential` CLI mode and as C7/C8's per-work-unit leaf search.
pub fn solve_whole_board(puzzle: &Puzzle) -> Option<Solution> {
    let mut grid = puzzle.empty_grid();
    let never_abort = || false;
    color_g_seq(puzzle, &mut grid, 0, 0, &never_abort).map(|_| Solution::from_grid(grid))
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precolor::pre_color;
    use crate::puzzle::Constraint;

    #[test]
    fn solves_a_trivial_2x2_with_no_constraints() {
        let board = vec![vec![0u8; 2]; 2];
        let h = vec![vec![Constraint::None]; 2];
        let v = vec![vec![Constraint::None; 2]; 1];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        let solution = solve_whole_board(&puzzle).expect("2x2 latin square must be solvable");
        assert_eq!(solution.grid[0][0] != solution.grid[0][1], true);
        assert_ne!(solution.grid[0][0], solution.grid[1][0]);
    }

    #[test]
    fn honors_an_inequality_constraint() {
        let board = vec![vec![0u8; 2]; 2];
        let h = vec![vec![Constraint::Smaller], vec![Constraint::None]];
        let v = vec![vec![Constraint::None; 2]; 1];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        let solution = solve_whole_board(&puzzle).unwrap();
        assert!(solution.grid[0][0] < solution.grid[0][1]);
    }

    #[test]
    fn respects_pre_set_cells() {
        let mut board = vec![vec![0u8; 3]; 3];
        board[0][0] = 3;
        let h = vec![vec![Constraint::None; 2]; 3];
        let v = vec![vec![Constraint::None; 3]; 2];
        let mut puzzle = Puzzle::new(board, h, v).unwrap();
        pre_color(&mut puzzle);
        let solution = solve_whole_board(&puzzle).unwrap();
        assert_eq!(solution.grid[0][0], 3);
    }

    #[test]
    fn conflicting_preset_values_are_rejected_not_ignored() {
        let mut board = vec![vec![0u8; 2]; 2];
        board[0][0] = 2;
        board[0][1] = 1;
        let h = vec![vec![Constraint::Smaller]; 2];
        let v = vec![vec![Constraint::None; 2]; 1];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        assert!(solve_whole_board(&puzzle).is_none());
    }

    #[test]
    fn cooperative_abort_stops_the_search() {
        let board = vec![vec![0u8; 4]; 4];
        let h = vec![vec![Constraint::None; 3]; 4];
        let v = vec![vec![Constraint::None; 4]; 3];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        let mut grid = puzzle.empty_grid();
        let abort_now = || true;
        assert!(color_g_seq(&puzzle, &mut grid, 0, 0, &abort_now).is_none());
    }
}
