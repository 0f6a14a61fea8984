//! A two-tier parallel/distributed constraint-satisfaction solver for the
//! N x N Futoshiki puzzle: a row/column Latin-square grid additionally
//! constrained by a sparse set of `<`/`>` inequalities between adjacent
//! cells.
//!
//! The pipeline is always the same five stages, only the last one
//! (coloring) changes shape with `--mode`:
//!
//! 1. [`parser`] reads a puzzle file into a [`puzzle::Puzzle`].
//! 2. [`precolor`] runs arc-consistency and singleton propagation to a
//!    fixed point, shrinking every cell's candidate list (C3).
//! 3. [`calibrate`] and [`workunit`] pick a depth and enumerate the
//!    work units a parallel or distributed run will hand out (C5/C6).
//! 4. [`solver`] dispatches to the sequential, intra-node, inter-node or
//!    hybrid scheduler (C4/C7/C8/C9).
//! 5. [`stats`] carries the result and timing back to the caller.
//!
//! [`runtime`] and [`cluster`] provide the ambient collaborators (logging,
//! thread budget, cluster transport) every scheduler is handed explicitly
//! rather than reaching for global state.

pub mod backtrack;
pub mod calibrate;
pub mod cluster;
pub mod error;
pub mod kernel;
pub mod parser;
pub mod precolor;
pub mod puzzle;
pub mod runtime;
pub mod solver;
pub mod stats;
pub mod workunit;

pub use error::{SolveError, SolveResult};
pub use puzzle::{Constraint, Puzzle, Solution};
pub use solver::Mode;
pub use stats::{ScheduleKind, SolverStats};
