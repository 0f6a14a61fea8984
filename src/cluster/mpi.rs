//! The real multi-process transport, behind the `mpi-transport` feature
//! (spec.md §4.8: inter-node scheduling over MPI; §9: "the actual MPI
//! deployment is an implementation detail behind `ClusterHandle`").
//!
//! `WireMessage` values are not fixed-layout C structs, so each one is
//! `bincode`-encoded to a single contiguous byte buffer before being
//! handed to `Communicator::send`, and decoded back on receipt — the
//! "single contiguous buffer, one message per logical transition" shape
//! spec.md §9 asks for, without requiring a frozen wire ABI.

use mpi::topology::Communicator;
use mpi::Threading;

use super::{ClusterError, ClusterHandle, WireMessage};

pub struct MpiClusterHandle {
    world: mpi::topology::SystemCommunicator,
}

impl MpiClusterHandle {
    /// Initializes the MPI runtime with `MPI_THREAD_FUNNELED` support, per
    /// spec.md §4.8's requirement that only each process's main thread touch
    /// the network (worker threads within a rank hand their messages to the
    /// main thread rather than calling into MPI directly).
    pub fn init() -> Result<Self, ClusterError> {
        let (_universe, threading) = mpi::initialize_with_threading(Threading::Funneled)
            .ok_or_else(|| ClusterError::Mpi("mpi::initialize_with_threading failed".into()))?;
        if threading < Threading::Funneled {
            return Err(ClusterError::Mpi(format!(
                "requested Funneled thread support, runtime only provided {:?}",
                threading
            )));
        }
        let world = mpi::environment::universe()
            .ok_or_else(|| ClusterError::Mpi("no active MPI universe".into()))?
            .world();
        Ok(MpiClusterHandle { world })
    }
}

impl ClusterHandle for MpiClusterHandle {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn send(&self, to: usize, msg: WireMessage) -> Result<(), ClusterError> {
        let bytes = bincode::serialize(&msg)?;
        let peer = self.world.process_at_rank(to as i32);
        peer.send(&bytes[..]);
        Ok(())
    }

    fn recv_any(&self) -> Result<(usize, WireMessage), ClusterError> {
        let (bytes, status): (Vec<u8>, _) = self.world.any_process().receive_vec();
        let msg = bincode::deserialize(&bytes)?;
        Ok((status.source_rank() as usize, msg))
    }
}
