//! The sequential fallback scheduler: runs C4 once, single-threaded,
//! single-process, over the whole board. This is both the `sequential`
//! `--mode` and the leaf search every work unit eventually bottoms out in
//! under C7/C8/C9.

use std::time::Instant;

use crate::backtrack::color_g_seq;
use crate::puzzle::{Puzzle, Solution};
use crate::stats::{ScheduleKind, SolverStats};

pub fn solve(puzzle: &Puzzle) -> SolverStats {
    let start = Instant::now();
    let mut grid = puzzle.empty_grid();
    let never_abort = || false;
    let found = color_g_seq(puzzle, &mut grid, 0, 0, &never_abort).is_some();
    let coloring_time = start.elapsed();

    SolverStats {
        schedule: ScheduleKind::Sequential,
        solution: found.then(|| Solution::from_grid(grid)),
        colors_removed: 0,
        work_units: 0,
        calibrated_depth: 0,
        pre_coloring_time: std::time::Duration::ZERO,
        coloring_time,
        work_unit_cap_hit: false,
        remaining_colors: 0,
        total_processed: 1,
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Constraint;

    #[test]
    fn sequential_schedule_solves_a_trivial_board() {
        let board = vec![vec![0u8; 2]; 2];
        let h = vec![vec![Constraint::None]; 2];
        let v = vec![vec![Constraint::None; 2]; 1];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        let stats = solve(&puzzle);
        assert!(stats.is_solved());
        assert_eq!(stats.schedule, ScheduleKind::Sequential);
    }

    #[test]
    fn sequential_schedule_reports_unsolvable_without_erroring() {
        let mut board = vec![vec![0u8; 2]; 2];
        board[0][0] = 1;
        board[0][1] = 1;
        let h = vec![vec![Constraint::None]; 2];
        let v = vec![vec![Constraint::None; 2]; 1];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        let stats = solve(&puzzle);
        assert!(!stats.is_solved());
    }
}
