//! A test-and-single-machine [`ClusterHandle`] that simulates MPI ranks as
//! `crossbeam-channel`-connected OS threads within one process (spec.md §9's
//! design note, extended by `SPEC_FULL.md`'s C14 with a third
//! implementation beyond the note's trivial/MPI pair — the same trick the
//! template crate uses to give its parallel solver a deterministic,
//! single-process test harness).

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{ClusterError, ClusterHandle, WireMessage};

/// One virtual rank's view of the cluster: its own inbox and every peer's
/// (including its own) outbox.
pub struct ThreadClusterHandle {
    rank: usize,
    inbox: Receiver<(usize, WireMessage)>,
    peers: Vec<Sender<(usize, WireMessage)>>,
}

impl ClusterHandle for ThreadClusterHandle {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, to: usize, msg: WireMessage) -> Result<(), ClusterError> {
        let sender = self.peers.get(to).ok_or(ClusterError::UnknownPeer(to))?;
        sender
            .send((self.rank, msg))
            .map_err(|_| ClusterError::Disconnected)
    }

    fn recv_any(&self) -> Result<(usize, WireMessage), ClusterError> {
        self.inbox.recv().map_err(|_| ClusterError::Disconnected)
    }
}

/// Builds `size` [`ThreadClusterHandle`]s, fully wired to talk to one
/// another, indexed `0..size` the way real MPI ranks would be. Rank 0 plays
/// the master of C8/C9's protocol.
pub fn make_thread_cluster(size: usize) -> Vec<ThreadClusterHandle> {
    let mut senders = Vec::with_capacity(size);
    let mut receivers = Vec::with_capacity(size);
    for _ in 0..size {
        let (tx, rx) = unbounded();
        senders.push(tx);
        receivers.push(rx);
    }

    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| ThreadClusterHandle {
            rank,
            inbox,
            peers: senders.clone(),
        })
        .collect()
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_can_exchange_messages() {
        let mut cluster = make_thread_cluster(3);
        let worker = cluster.pop().unwrap();
        let master = &cluster[0];

        master.send(worker.rank(), WireMessage::RequestWork).unwrap();
        let (from, msg) = worker.recv_any().unwrap();
        assert_eq!(from, 0);
        assert!(matches!(msg, WireMessage::RequestWork));
    }

    #[test]
    fn sending_to_an_unknown_rank_errors() {
        let cluster = make_thread_cluster(2);
        assert!(matches!(
            cluster[0].send(99, WireMessage::Abort),
            Err(ClusterError::UnknownPeer(99))
        ));
    }
}
