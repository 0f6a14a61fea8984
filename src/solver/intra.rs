//! The intra-node scheduler (C7, spec.md §4.7): a shared-memory thread pool
//! that calibrates a work-unit depth, fills a shared queue, and lets
//! `ctx.threads` workers pull from it until the queue is dry or a solution
//! is found.
//!
//! Grounded directly on the template crate's parallel solver: a
//! `parking_lot`-guarded `Critical` section wrapped in a `Shared` struct,
//! woken by a `Condvar`, with workers spawned in a `std::thread::scope` and
//! a `WorkLoad` enum telling each worker whether it got work, should keep
//! waiting, or should retire.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::backtrack::color_g_seq;
use crate::calibrate::calibrate;
use crate::puzzle::{Puzzle, Solution};
use crate::runtime::RuntimeContext;
use crate::stats::{ScheduleKind, SolverStats};
use crate::workunit::WorkUnit;

/// What a worker got back when it asked the shared queue for something to
/// do.
enum WorkLoad {
    /// Take this unit and search it.
    Item(WorkUnit),
    /// The queue is empty but other workers are still producing results
    /// that might matter (here: might still find a solution) — wait.
    Starvation,
    /// Nothing left to do and nobody else is working either: retire.
    Complete,
    /// Another worker already found a solution: retire immediately.
    Aborted,
}

struct Critical {
    queue: VecDeque<WorkUnit>,
    ongoing: usize,
    solution: Option<Solution>,
    processed: usize,
}

/// What a finished pool run produced: the solution, if any, plus how many
/// work units were actually searched to completion (spec.md §3's
/// `total_processed`).
pub struct PoolOutcome {
    pub solution: Option<Solution>,
    pub processed: usize,
}

struct Shared {
    critical: Mutex<Critical>,
    monitor: Condvar,
    abort: AtomicBool,
}

impl Shared {
    fn get_workload(&self) -> WorkLoad {
        let mut critical = self.critical.lock();
        loop {
            if self.abort.load(Ordering::Relaxed) {
                return WorkLoad::Aborted;
            }
            if let Some(unit) = critical.queue.pop_front() {
                critical.ongoing += 1;
                return WorkLoad::Item(unit);
            }
            if critical.ongoing == 0 {
                return WorkLoad::Complete;
            }
            self.monitor.wait(&mut critical);
        }
    }

    fn notify_unit_finished(&self, found: Option<Solution>) {
        let mut critical = self.critical.lock();
        critical.ongoing -= 1;
        critical.processed += 1;
        if let Some(solution) = found {
            critical.solution.get_or_insert(solution);
            self.abort.store(true, Ordering::Relaxed);
        }
        self.monitor.notify_all();
    }
}

/// Runs the calibrated work units across `ctx.threads` worker threads,
/// stopping as soon as any one of them reports a solution.
pub fn solve(puzzle: &Puzzle, ctx: &RuntimeContext) -> SolverStats {
    let start = Instant::now();
    let threads = ctx.threads.max(1);
    let (depth, units) = calibrate(puzzle, threads, ctx.factor);
    let work_units = units.len();
    ctx.logger.info(&format!(
        "intra: calibrated depth {depth}, {work_units} work units across {threads} threads"
    ));

    let outcome = run_pool(puzzle, threads, units);
    let coloring_time = start.elapsed();

    SolverStats {
        schedule: ScheduleKind::Intra,
        solution: outcome.solution,
        colors_removed: 0,
        work_units,
        calibrated_depth: depth,
        pre_coloring_time: std::time::Duration::ZERO,
        coloring_time,
        work_unit_cap_hit: work_units >= crate::workunit::WORK_UNIT_CAP,
        remaining_colors: 0,
        total_processed: outcome.processed,
    }
}

/// Runs `units` across `threads` workers, the core of [`solve`] factored
/// out so the hybrid scheduler (C9) can reuse this same thread pool over a
/// set of units it refined itself from a single work unit the inter-node
/// master (C8) handed this rank.
pub fn run_pool(puzzle: &Puzzle, threads: usize, units: Vec<WorkUnit>) -> PoolOutcome {
    let shared = Shared {
        critical: Mutex::new(Critical {
            queue: units.into_iter().collect(),
            ongoing: 0,
            solution: None,
            processed: 0,
        }),
        monitor: Condvar::new(),
        abort: AtomicBool::new(false),
    };

    std::thread::scope(|scope| {
        for _ in 0..threads.max(1) {
            scope.spawn(|| worker_loop(puzzle, &shared));
        }
    });

    let critical = shared.critical.into_inner();
    PoolOutcome {
        solution: critical.solution,
        processed: critical.processed,
    }
}

fn worker_loop(puzzle: &Puzzle, shared: &Shared) {
    loop {
        match shared.get_workload() {
            WorkLoad::Item(unit) => {
                let mut grid = unit.to_grid(puzzle);
                let (row, col) = unit.resume_at();
                let should_abort = || shared.abort.load(Ordering::Relaxed);
                let found = color_g_seq(puzzle, &mut grid, row, col, &should_abort)
                    .map(|_| Solution::from_grid(grid));
                shared.notify_unit_finished(found);
            }
            WorkLoad::Starvation => continue,
            WorkLoad::Complete | WorkLoad::Aborted => return,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
