//! Error kinds surfaced across the crate (spec.md §7).
//!
//! The constraint kernel, the pre-coloring pass and the sequential
//! backtracker never surface errors: they return booleans, and an
//! unsolvable puzzle is not an error (see [`crate::stats::SolverStats`]).
//! Everything that *can* fail — reading a puzzle file, parsing it,
//! routing a message between cluster ranks — is collected here.

use thiserror::Error;

/// Errors that can abort a solve before or during scheduling.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("could not read puzzle file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("puzzle file {path} is malformed: {reason}")]
    Parse { path: String, reason: String },

    #[error("puzzle size {size} is out of range (expected 1..={max})")]
    SizeOutOfRange { size: usize, max: usize },

    #[error("cluster fault: {0}")]
    Cluster(#[from] crate::cluster::ClusterError),

    #[error("requested MPI thread-support level {requested:?} but the runtime only provides {provided:?}")]
    InsufficientThreadSupport {
        requested: &'static str,
        provided: &'static str,
    },
}

pub type SolveResult<T> = Result<T, SolveError>;
