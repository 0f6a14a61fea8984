//! The four schedulers (C4/C7/C8/C9) that can turn a pre-colored [`Puzzle`]
//! into a [`crate::stats::SolverStats`], and the `--mode` dispatch that
//! picks among them.

pub mod hybrid;
pub mod inter;
pub mod intra;
pub mod sequential;

use std::str::FromStr;

use crate::puzzle::Puzzle;
use crate::runtime::RuntimeContext;
use crate::stats::SolverStats;

/// The `--mode` flag of spec.md §6: "one executable with a mode flag"
/// selecting among the sequential fallback, the intra-node thread pool, the
/// inter-node message-passing scheduler, or both combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sequential,
    Intra,
    Inter,
    Hybrid,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Mode::Sequential),
            "intra" => Ok(Mode::Intra),
            "inter" => Ok(Mode::Inter),
            "hybrid" => Ok(Mode::Hybrid),
            other => Err(format!(
                "unknown mode {other:?}, expected one of: sequential, intra, inter, hybrid"
            )),
        }
    }
}

/// Runs `puzzle` under `mode`, routing to the matching scheduler. `puzzle`
/// is expected to already have gone through [`crate::precolor::pre_color`]
/// (or [`Puzzle::reset_candidates_unconstrained`] for `-n`) before this is
/// called; this function only measures and runs the coloring phase.
pub fn solve(mode: Mode, puzzle: &Puzzle, ctx: &RuntimeContext) -> SolverStats {
    match mode {
        Mode::Sequential => sequential::solve(puzzle),
        Mode::Intra => intra::solve(puzzle, ctx),
        Mode::Inter => inter::solve(puzzle, ctx),
        Mode::Hybrid => hybrid::solve(puzzle, ctx),
    }
}
