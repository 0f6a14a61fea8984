//! Solve-run statistics (spec.md §3's `SolverStats`, extended by
//! `SPEC_FULL.md` with a `schedule` field mirroring the template crate's
//! `Completion { is_exact, best_value }` plus its solver-level `explored()`
//! accessor).

use std::time::Duration;

use crate::puzzle::Solution;

/// Which of C4/C7/C8/C9 produced a run's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Sequential,
    Intra,
    Inter,
    Hybrid,
}

impl std::fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScheduleKind::Sequential => "sequential",
            ScheduleKind::Intra => "intra",
            ScheduleKind::Inter => "inter",
            ScheduleKind::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Everything a run reports back to the CLI, regardless of which scheduler
/// produced it.
#[derive(Debug, Clone)]
pub struct SolverStats {
    /// The scheduler that ran this solve (spec.md §6's `--mode`).
    pub schedule: ScheduleKind,
    /// `Some` iff a solution was found; `None` means the puzzle is
    /// unsolvable — not an error condition (spec.md §7).
    pub solution: Option<Solution>,
    /// Candidates removed by pre-coloring (C3), 0 if `-n` skipped it.
    pub colors_removed: usize,
    /// Work units generated by C5/C6, 0 for the sequential schedule.
    pub work_units: usize,
    /// Depth chosen by C6, 0 for the sequential schedule.
    pub calibrated_depth: usize,
    /// Wall-clock spent in pre-coloring (C3).
    pub pre_coloring_time: Duration,
    /// Wall-clock spent in the coloring search proper (C4/C7/C8/C9).
    pub coloring_time: Duration,
    /// `true` iff [`crate::workunit::WORK_UNIT_CAP`] was hit during
    /// enumeration (spec.md §4.5's resource-cap case).
    pub work_unit_cap_hit: bool,
    /// Candidates still standing across the whole board once the run
    /// finished (`Puzzle::total_candidates()` after pre-coloring) — 0 until
    /// the CLI fills it in post-hoc, mirroring `colors_removed`.
    pub remaining_colors: usize,
    /// Work units this run actually searched to completion: 1 for the
    /// sequential schedule, the pool's processed count for intra, and the
    /// sum of every worker's completed-unit reports for inter/hybrid.
    pub total_processed: usize,
}

impl SolverStats {
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    pub fn total_time(&self) -> Duration {
        self.pre_coloring_time + self.coloring_time
    }
}
