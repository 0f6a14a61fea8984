//! The inter-node scheduler (C8, spec.md §4.8): a master (rank 0) hands out
//! calibrated work units to worker ranks over [`crate::cluster::ClusterHandle`]
//! using pull-based dispatch (`RequestWork`/`Work`/`NoMoreWork`), and
//! propagates an `Abort` to every worker the moment any of them reports a
//! solution.
//!
//! Every rank runs single-threaded here; [`crate::solver::hybrid`] combines
//! this with C7's thread pool per rank.

use std::time::Instant;

use crate::backtrack::color_g_seq;
use crate::calibrate::calibrate;
use crate::cluster::WireMessage;
use crate::puzzle::{Puzzle, Solution};
use crate::runtime::RuntimeContext;
use crate::stats::{ScheduleKind, SolverStats};

pub fn solve(puzzle: &Puzzle, ctx: &RuntimeContext) -> SolverStats {
    let start = Instant::now();

    if ctx.size() == 1 {
        let mut stats = super::sequential::solve(puzzle);
        stats.schedule = ScheduleKind::Inter;
        return stats;
    }

    let (solution, total_processed) = if ctx.is_master() {
        run_master(puzzle, ctx)
    } else {
        run_worker(puzzle, ctx);
        (None, 0)
    };
    let coloring_time = start.elapsed();

    SolverStats {
        schedule: ScheduleKind::Inter,
        solution,
        colors_removed: 0,
        work_units: 0,
        calibrated_depth: 0,
        pre_coloring_time: std::time::Duration::ZERO,
        coloring_time,
        work_unit_cap_hit: false,
        remaining_colors: 0,
        total_processed,
    }
}

/// Runs the master side of C8's state machine (spec.md §4.7). Every rank
/// is accounted for exactly once in `retired`: a rank that requests work
/// after the queue and solution are both exhausted is retired via
/// `NoMoreWork`; a rank whose `Found` we receive is retired right there,
/// since it never sends another `RequestWork` of its own.
fn run_master(puzzle: &Puzzle, ctx: &RuntimeContext) -> (Option<Solution>, usize) {
    let worker_count = ctx.size() - 1;
    let (depth, units) = calibrate(puzzle, worker_count, ctx.factor);
    ctx.logger.info(&format!(
        "inter: calibrated depth {depth}, {} work units for {worker_count} workers",
        units.len()
    ));

    let mut queue: std::collections::VecDeque<_> = units.into_iter().collect();
    let mut retired = 0usize;
    let mut solution = None;
    let mut total_processed = 0usize;

    while retired < worker_count {
        let (from, msg) = match ctx.cluster.recv_any() {
            Ok(pair) => pair,
            Err(err) => {
                ctx.logger.warn(&format!("master recv failed: {err}"));
                break;
            }
        };

        match msg {
            WireMessage::RequestWork => {
                if let Some(found) = &solution {
                    let _ = ctx.cluster.send(from, WireMessage::Found(clone_solution(found)));
                    retired += 1;
                } else if let Some(unit) = queue.pop_front() {
                    let _ = ctx.cluster.send(from, WireMessage::Work(unit));
                } else {
                    let _ = ctx.cluster.send(from, WireMessage::NoMoreWork);
                    retired += 1;
                }
            }
            WireMessage::NoSolution { units_completed } => {
                total_processed += units_completed;
            }
            WireMessage::Found(found) => {
                total_processed += 1;
                if solution.is_none() {
                    solution = Some(found);
                    for rank in 1..ctx.size() {
                        if rank != from {
                            let _ = ctx.cluster.send(rank, WireMessage::Abort);
                        }
                    }
                }
                // `from` found a solution and will not ask for more work;
                // its only further message, if any, would be this rank's
                // own `Found` again, never `RequestWork` — count it done.
                retired += 1;
            }
            other => {
                ctx.logger.debug(&format!("master ignoring unexpected message: {other:?}"));
            }
        }
    }

    (solution, total_processed)
}

fn run_worker(puzzle: &Puzzle, ctx: &RuntimeContext) {
    loop {
        if ctx.cluster.send(0, WireMessage::RequestWork).is_err() {
            return;
        }
        let (_from, msg) = match ctx.cluster.recv_any() {
            Ok(pair) => pair,
            Err(_) => return,
        };

        match msg {
            WireMessage::Work(unit) => {
                let mut grid = unit.to_grid(puzzle);
                let (row, col) = unit.resume_at();
                let never_abort = || false;
                match color_g_seq(puzzle, &mut grid, row, col, &never_abort) {
                    Some(()) => {
                        let _ = ctx
                            .cluster
                            .send(0, WireMessage::Found(Solution::from_grid(grid)));
                        return;
                    }
                    None => {
                        let _ = ctx.cluster.send(0, WireMessage::NoSolution { units_completed: 1 });
                    }
                }
            }
            WireMessage::NoMoreWork | WireMessage::Abort | WireMessage::Found(_) => return,
            other => {
                ctx.logger.debug(&format!("worker ignoring unexpected message: {other:?}"));
            }
        }
    }
}

fn clone_solution(solution: &Solution) -> Solution {
    Solution::from_grid(solution.grid.clone())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
