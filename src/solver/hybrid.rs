//! The hybrid scheduler (C9, spec.md §4.9): C8's master/worker dispatch
//! across ranks, with each worker rank fanning its assigned unit back out
//! across its own local thread pool (C7) instead of searching it
//! single-threaded.

use std::time::Instant;

use crate::backtrack::color_g_seq;
use crate::calibrate::{calibrate, calibrate_from};
use crate::cluster::WireMessage;
use crate::puzzle::{Puzzle, Solution};
use crate::runtime::RuntimeContext;
use crate::stats::{ScheduleKind, SolverStats};

use super::intra::{run_pool, PoolOutcome};

pub fn solve(puzzle: &Puzzle, ctx: &RuntimeContext) -> SolverStats {
    let start = Instant::now();

    if ctx.size() == 1 {
        let mut stats = super::intra::solve(puzzle, ctx);
        stats.schedule = ScheduleKind::Hybrid;
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
        schedule: ScheduleKind::Hybrid,
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

fn run_master(puzzle: &Puzzle, ctx: &RuntimeContext) -> (Option<Solution>, usize) {
    let worker_count = ctx.size() - 1;
    // one coarse unit per worker rank: each rank fans its own unit back out
    // across its local threads via `calibrate_from` + `run_pool`.
    let (depth, units) = calibrate(puzzle, worker_count, ctx.master_factor);
    ctx.logger.info(&format!(
        "hybrid: calibrated depth {depth}, {} coarse units for {worker_count} worker ranks",
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
                // fan this rank's one coarse unit back out across its own
                // thread pool, calibrated with this rank's own `-of` factor.
                let (_local_depth, sub_units) =
                    calibrate_from(puzzle, &unit, ctx.threads.max(1), ctx.worker_factor);
                let outcome = if sub_units.is_empty() {
                    // spec.md §4.9: a worker whose local C5 yields zero
                    // units for its sub-problem solves it sequentially
                    // from the continuation point instead.
                    let mut grid = unit.to_grid(puzzle);
                    let (row, col) = unit.resume_at();
                    let never_abort = || false;
                    let solution = color_g_seq(puzzle, &mut grid, row, col, &never_abort)
                        .map(|_| Solution::from_grid(grid));
                    PoolOutcome { solution, processed: 1 }
                } else {
                    run_pool(puzzle, ctx.threads, sub_units)
                };
                match outcome.solution {
                    Some(solution) => {
                        let _ = ctx.cluster.send(0, WireMessage::Found(solution));
                        return;
                    }
                    None => {
                        let units_completed = outcome.processed.max(1);
                        let _ = ctx.cluster.send(0, WireMessage::NoSolution { units_completed });
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::make_thread_cluster;
    use crate::puzzle::Constraint;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn hybrid_schedule_solves_across_ranks_and_threads() {
        let board = vec![vec![0u8; 4]; 4];
        let h = vec![vec![Constraint::None; 3]; 4];
        let v = vec![vec![Constraint::None; 4]; 3];
        let puzzle = Puzzle::new(board, h, v).unwrap();

        let cluster = make_thread_cluster(3);
        thread::scope(|scope| {
            let mut handles = Vec::new();
            for handle in cluster {
                let puzzle = &puzzle;
                handles.push(scope.spawn(move || {
                    let ctx = RuntimeContext::new(Arc::new(handle), 2);
                    solve(puzzle, &ctx)
                }));
            }
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert!(results[0].is_solved());
        });
    }

    #[test]
    fn hybrid_schedule_falls_back_to_intra_for_a_single_rank() {
        let board = vec![vec![0u8; 3]; 3];
        let h = vec![vec![Constraint::None; 2]; 3];
        let v = vec![vec![Constraint::None; 3]; 2];
        let puzzle = Puzzle::new(board, h, v).unwrap();
        let ctx = RuntimeContext::new(Arc::new(crate::cluster::LocalCluster), 2);
        let stats = solve(&puzzle, &ctx);
        assert!(stats.is_solved());
        assert_eq!(stats.schedule, ScheduleKind::Hybrid);
    }
}
