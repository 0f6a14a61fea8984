//! End-to-end scenario tests: load a puzzle file, pre-color it, run every
//! scheduler over it, and check the results agree with each other and with
//! the puzzle's own constraints.

use std::path::Path;
use std::sync::Arc;

use futoshiki_solver::calibrate::calibrate;
use futoshiki_solver::cluster::{make_thread_cluster, LocalCluster};
use futoshiki_solver::precolor::{is_arc_consistent, pre_color};
use futoshiki_solver::runtime::RuntimeContext;
use futoshiki_solver::solver::{self, Mode};
use futoshiki_solver::{parser, Puzzle, Solution};

fn load(name: &str) -> Puzzle {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    parser::parse_file(&path).unwrap_or_else(|e| panic!("failed to parse {name}: {e}"))
}

/// Checks every row, column and inequality constraint the puzzle declares,
/// independent of whichever scheduler produced `solution`.
fn assert_is_a_valid_solution(puzzle: &Puzzle, solution: &Solution) {
    let size = puzzle.size();
    assert_eq!(solution.size, size);

    for row in 0..size {
        let mut seen = vec![false; size + 1];
        for col in 0..size {
            let value = solution.grid[row][col] as usize;
            assert!((1..=size).contains(&value), "value {value} out of range");
            assert!(!seen[value], "duplicate value {value} in row {row}");
            seen[value] = true;
            if puzzle.is_preset(row, col) {
                assert_eq!(puzzle.board(row, col), solution.grid[row][col]);
            }
        }
    }
    for col in 0..size {
        let mut seen = vec![false; size + 1];
        for row in 0..size {
            let value = solution.grid[row][col] as usize;
            assert!(!seen[value], "duplicate value {value} in column {col}");
            seen[value] = true;
        }
    }
    for row in 0..size {
        for col in 0..size {
            let h = puzzle.h_constraint(row, col);
            if col + 1 < size {
                assert!(h.holds(solution.grid[row][col], solution.grid[row][col + 1]));
            }
            let v = puzzle.v_constraint(row, col);
            if row + 1 < size {
                assert!(v.holds(solution.grid[row][col], solution.grid[row + 1][col]));
            }
        }
    }
}

fn run_single_rank(mode: Mode, puzzle: &Puzzle, threads: usize) -> Option<Solution> {
    let ctx = RuntimeContext::new(Arc::new(LocalCluster), threads);
    solver::solve(mode, puzzle, &ctx).solution
}

fn run_single_rank_with_factor(mode: Mode, puzzle: &Puzzle, threads: usize, factor: f64) -> Option<Solution> {
    let ctx = RuntimeContext::with_factors(Arc::new(LocalCluster), threads, factor, factor, 4.0);
    solver::solve(mode, puzzle, &ctx).solution
}

fn run_multi_rank(mode: Mode, puzzle: &Puzzle, ranks: usize, threads: usize) -> Option<Solution> {
    let mut result = None;
    std::thread::scope(|scope| {
        let mut handles = make_thread_cluster(ranks);
        let rank0 = handles.remove(0);
        let mut joins = Vec::new();
        for handle in handles {
            joins.push(scope.spawn(|| {
                let ctx = RuntimeContext::new(Arc::new(handle), threads);
                solver::solve(mode, puzzle, &ctx).solution
            }));
        }
        let ctx = RuntimeContext::new(Arc::new(rank0), threads);
        result = solver::solve(mode, puzzle, &ctx).solution;
        for join in joins {
            join.join().unwrap();
        }
    });
    result
}

#[test]
fn pre_coloring_reaches_a_fixed_point_on_every_fixture() {
    for fixture in ["basic_4x4.txt", "unsolvable_2x2.txt", "extreme_6x6.txt"] {
        let mut puzzle = load(fixture);
        pre_color(&mut puzzle);
        assert!(is_arc_consistent(&puzzle), "{fixture} not arc-consistent after pre-coloring");
    }
}

#[test]
fn every_schedule_agrees_on_a_solvable_board() {
    let mut puzzle = load("basic_4x4.txt");
    pre_color(&mut puzzle);

    let sequential = run_single_rank(Mode::Sequential, &puzzle, 1).expect("sequential must solve it");
    assert_is_a_valid_solution(&puzzle, &sequential);

    let intra = run_single_rank(Mode::Intra, &puzzle, 4).expect("intra must solve it");
    assert_is_a_valid_solution(&puzzle, &intra);

    let inter = run_multi_rank(Mode::Inter, &puzzle, 3, 1).expect("inter must solve it");
    assert_is_a_valid_solution(&puzzle, &inter);

    let hybrid = run_multi_rank(Mode::Hybrid, &puzzle, 3, 2).expect("hybrid must solve it");
    assert_is_a_valid_solution(&puzzle, &hybrid);
}

#[test]
fn every_schedule_reports_unsolvable_without_erroring() {
    let mut puzzle = load("unsolvable_2x2.txt");
    pre_color(&mut puzzle);

    assert!(run_single_rank(Mode::Sequential, &puzzle, 1).is_none());
    assert!(run_single_rank(Mode::Intra, &puzzle, 2).is_none());
    assert!(run_multi_rank(Mode::Inter, &puzzle, 2, 1).is_none());
    assert!(run_multi_rank(Mode::Hybrid, &puzzle, 2, 2).is_none());
}

#[test]
fn a_larger_board_solves_under_every_schedule() {
    let mut puzzle = load("extreme_6x6.txt");
    pre_color(&mut puzzle);

    let sequential = run_single_rank(Mode::Sequential, &puzzle, 1).expect("must be solvable");
    assert_is_a_valid_solution(&puzzle, &sequential);

    let intra = run_single_rank(Mode::Intra, &puzzle, 8).expect("must be solvable");
    assert_is_a_valid_solution(&puzzle, &intra);

    let hybrid = run_multi_rank(Mode::Hybrid, &puzzle, 4, 2).expect("must be solvable");
    assert_is_a_valid_solution(&puzzle, &hybrid);
}

#[test]
fn skipping_pre_coloring_still_yields_a_valid_solution() {
    let mut puzzle = load("basic_4x4.txt");
    puzzle.reset_candidates_unconstrained();
    let solution = run_single_rank(Mode::Sequential, &puzzle, 1).expect("must be solvable");
    assert_is_a_valid_solution(&puzzle, &solution);
}

#[test]
fn repeated_runs_of_the_same_mode_are_deterministic() {
    let mut puzzle = load("basic_4x4.txt");
    pre_color(&mut puzzle);

    let first = run_single_rank(Mode::Sequential, &puzzle, 1).unwrap();
    let second = run_single_rank(Mode::Sequential, &puzzle, 1).unwrap();
    assert_eq!(first, second);
}

// ############################################################################
// #### spec.md §8 SCENARIOS ##################################################
// ############################################################################

/// S1: a puzzle file that is literally `"1"` parses as a 1x1 board with a
/// single blank cell, and every scheduler finds the only possible solution.
#[test]
fn s1_a_bare_single_cell_puzzle_solves_under_every_schedule() {
    let mut puzzle = parser::parse_str("1").unwrap();
    assert_eq!(puzzle.size(), 1);
    pre_color(&mut puzzle);

    let sequential = run_single_rank(Mode::Sequential, &puzzle, 1).expect("must solve");
    assert_eq!(sequential.grid, vec![vec![1]]);

    let intra = run_single_rank(Mode::Intra, &puzzle, 2).expect("must solve");
    assert_eq!(intra.grid, vec![vec![1]]);

    let inter = run_multi_rank(Mode::Inter, &puzzle, 2, 1).expect("must solve");
    assert_eq!(inter.grid, vec![vec![1]]);

    let hybrid = run_multi_rank(Mode::Hybrid, &puzzle, 2, 2).expect("must solve");
    assert_eq!(hybrid.grid, vec![vec![1]]);
}

/// S2: inline horizontal constraints and a proximity-matched vertical
/// constraint line together narrow a 4x4 board to a valid solution.
#[test]
fn s2_inline_and_vertical_constraints_narrow_the_board() {
    let mut puzzle = load("s2_vertical_inline.txt");
    assert_eq!(puzzle.v_constraint(0, 0), futoshiki_solver::Constraint::Greater);
    assert_eq!(puzzle.v_constraint(0, 3), futoshiki_solver::Constraint::Greater);
    pre_color(&mut puzzle);

    let solution = run_single_rank(Mode::Sequential, &puzzle, 1).expect("must be solvable");
    assert_is_a_valid_solution(&puzzle, &solution);
}

/// S3: a fully-preset 9x9 board solves to the unique grid it already names.
#[test]
fn s3_a_9x9_board_solves_under_every_schedule() {
    let mut puzzle = load("s3_9x9_extreme.txt");
    pre_color(&mut puzzle);

    let sequential = run_single_rank(Mode::Sequential, &puzzle, 1).expect("must solve");
    assert_is_a_valid_solution(&puzzle, &sequential);

    let intra = run_single_rank(Mode::Intra, &puzzle, 4).expect("must solve");
    assert_eq!(intra, sequential);
}

/// S4: a deliberately unsolvable 3x3 board reports `found_solution = false`
/// on every scheduler, with no hang.
#[test]
fn s4_an_unsolvable_board_fails_cleanly_on_every_schedule() {
    let mut puzzle = load("s4_unsolvable_3x3.txt");
    pre_color(&mut puzzle);

    assert!(run_single_rank(Mode::Sequential, &puzzle, 1).is_none());
    assert!(run_single_rank(Mode::Intra, &puzzle, 2).is_none());
    assert!(run_multi_rank(Mode::Inter, &puzzle, 3, 1).is_none());
    assert!(run_multi_rank(Mode::Hybrid, &puzzle, 3, 2).is_none());
}

/// S5: pre-coloring alone reduces every empty cell to a singleton, so
/// `colors_removed` equals the total initial candidate count minus `size^2`
/// and the coloring phase has essentially nothing left to search.
#[test]
fn s5_pre_coloring_alone_solves_the_board() {
    let mut puzzle = load("s5_fully_propagated_3x3.txt");
    let size = puzzle.size();
    let initial_candidates = puzzle.total_candidates();

    let colors_removed = pre_color(&mut puzzle);
    assert_eq!(colors_removed, initial_candidates - size * size);

    for row in 0..size {
        for col in 0..size {
            assert!(puzzle.candidates().is_singleton(row, col).is_some());
        }
    }

    let ctx = RuntimeContext::new(Arc::new(LocalCluster), 1);
    let stats = solver::solve(Mode::Sequential, &puzzle, &ctx);
    assert!(stats.coloring_time.as_millis() < 50);
}

/// S6: growing the task-count factor `f` never shrinks the number of work
/// units C6 calibrates, and every factor still yields a working solve.
#[test]
fn s6_growing_the_factor_never_shrinks_the_task_count() {
    let mut puzzle = load("s2_vertical_inline.txt");
    pre_color(&mut puzzle);

    let (_d1, units1) = calibrate(&puzzle, 8, 1.0);
    let (_d4, units4) = calibrate(&puzzle, 8, 4.0);
    let (_d16, units16) = calibrate(&puzzle, 8, 16.0);
    assert!(units1.len() <= units4.len());
    assert!(units4.len() <= units16.len());

    for factor in [1.0, 4.0, 16.0] {
        let solution = run_single_rank_with_factor(Mode::Intra, &puzzle, 8, factor).expect("must solve");
        assert_is_a_valid_solution(&puzzle, &solution);
    }
}
