//! The inter-node transport abstraction (spec.md §9's design note, promoted
//! to component C14 by `SPEC_FULL.md`).
//!
//! C8 and C9 are written against the [`ClusterHandle`] trait only; they
//! never know whether they are running as the single local process, as
//! thread-simulated "virtual ranks" inside one process (used by the CLI's
//! single-machine mode and by the integration tests), or as real MPI ranks.

mod channel;
mod local;
#[cfg(feature = "mpi-transport")]
mod mpi;

pub use channel::{make_thread_cluster, ThreadClusterHandle};
pub use local::LocalCluster;
#[cfg(feature = "mpi-transport")]
pub use mpi::MpiClusterHandle;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::puzzle::Solution;
use crate::workunit::WorkUnit;

/// Failures that can occur while routing a message between ranks.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("rank {0} is not a known peer")]
    UnknownPeer(usize),

    #[error("no peers to talk to (running with a single rank)")]
    NoPeers,

    #[error("peer channel disconnected")]
    Disconnected,

    #[error("failed to encode/decode a wire message: {0}")]
    Codec(#[from] bincode::Error),

    #[cfg(feature = "mpi-transport")]
    #[error("MPI runtime error: {0}")]
    Mpi(String),
}

/// The messages exchanged between the master and worker ranks of C8/C9
/// (spec.md §4.7/§4.8: work dispatch, solution reporting, termination).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WireMessage {
    /// Master → worker: here is a unit of work to color.
    Work(WorkUnit),
    /// Worker → master: this rank found nothing in the unit(s) it was given.
    NoSolution { units_completed: usize },
    /// Worker → master: a solution was found.
    Found(Solution),
    /// Master → worker: stop searching, someone already found a solution.
    Abort,
    /// Worker → master: requesting the next unit of work (pull-based
    /// dispatch, spec.md §4.7).
    RequestWork,
    /// Master → worker: there is no more work left to hand out.
    NoMoreWork,
}

/// Abstracts over "how do I talk to the other ranks" so C8/C9 can be
/// written once and run against a trivial single-rank stub, a
/// thread-simulated cluster, or a real MPI deployment.
pub trait ClusterHandle: Send + Sync {
    /// This process's rank, `0..size()`.
    fn rank(&self) -> usize;

    /// Total number of ranks participating in this run.
    fn size(&self) -> usize;

    /// Sends `msg` to rank `to`. Blocks only as long as the underlying
    /// transport's send call does (for the thread transport: until the
    /// peer's inbox accepts it; for MPI: per `Communicator::send`'s own
    /// semantics).
    fn send(&self, to: usize, msg: WireMessage) -> Result<(), ClusterError>;

    /// Blocks until a message arrives from any peer, returning its origin
    /// rank alongside the decoded message.
    fn recv_any(&self) -> Result<(usize, WireMessage), ClusterError>;

    /// `true` iff this rank is the master (rank 0) of C8/C9's master/worker
    /// split.
    fn is_master(&self) -> bool {
        self.rank() == 0
    }
}
