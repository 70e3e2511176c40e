//! Thin façade over intra-process (Rayon-style threads) or inter-process (MPI)
//! message passing.
//!
//! Messages are contiguous byte slices. Handles are waitable; callers always
//! `.wait()` a handle before trusting the data it returns. Receives deliver at
//! most `buf.len()` bytes on the in-process backend, so callers size their
//! buffers for the largest message they accept and check the length they get.

use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::collections::VecDeque;

/// Message tag, kept distinct per protocol phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Tag `by` places above this one (wrapping).
    pub const fn offset(self, by: u16) -> Self {
        Self(self.0.wrapping_add(by))
    }
}

/// Tags used by one run of the element-graph pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphCommTags {
    /// Zero-payload handshake before each global-id exchange.
    pub handshake: CommTag,
    /// Global-id arrays.
    pub data: CommTag,
    /// Block-shape reduction.
    pub reduce: CommTag,
}

impl GraphCommTags {
    pub const fn from_base(base: CommTag) -> Self {
        Self {
            handshake: base,
            data: base.offset(1),
            reduce: base.offset(2),
        }
    }
}

impl Default for GraphCommTags {
    fn default() -> Self {
        Self::from_base(CommTag::new(0x4500))
    }
}

/// Point-to-point communication interface.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// Rank of this process.
    fn rank(&self) -> usize;
    /// Number of processes.
    fn size(&self) -> usize;

    /// `true` for the serial stand-in that never moves data.
    fn is_no_comm(&self) -> bool {
        false
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Serial communicator: rank 0 of 1. Receives never produce data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}

    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- RayonComm: several ranks as threads of one process ---
type Key = (usize, usize, u16); // (src, dst, tag)

static MAILBOX: Lazy<DashMap<Key, VecDeque<Bytes>>> = Lazy::new(DashMap::new);

/// Pending receive on the in-process mailbox.
#[derive(Debug)]
pub struct LocalHandle {
    key: Key,
    len: usize,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        loop {
            if let Some(mut queue) = MAILBOX.get_mut(&self.key) {
                if let Some(bytes) = queue.pop_front() {
                    let n = bytes.len().min(self.len);
                    return Some(bytes[..n].to_vec());
                }
            }
            std::thread::yield_now();
        }
    }
}

/// In-process communicator; one instance per simulated rank, one thread each.
///
/// Messages between the same `(src, dst, tag)` are delivered in send order.
#[derive(Clone, Debug)]
pub struct RayonComm {
    rank: usize,
    size: usize,
}

impl RayonComm {
    pub fn new(rank: usize, size: usize) -> Self {
        Self { rank, size }
    }
}

impl Communicator for RayonComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        MAILBOX
            .entry((self.rank, peer, tag))
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            key: (peer, self.rank, tag),
            len: buf.len(),
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use crate::mesh_error::MeshError;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, Destination, Source};

    /// MPI communicator over `MPI_COMM_WORLD`.
    ///
    /// Both operations complete eagerly: `isend` is a blocking standard-mode
    /// send and `irecv` a blocking receive of the whole message. The
    /// rank-ordered pairwise protocol never has both ends of a pair sending.
    pub struct MpiComm {
        _universe: Universe,
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, MeshError> {
            let universe = mpi::initialize().ok_or_else(|| MeshError::CommError {
                neighbor: 0,
                message: "MPI was already initialized".into(),
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    /// Completed MPI operation; holds the received bytes for receives.
    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
            MpiHandle(None)
        }

        fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> MpiHandle {
            let (data, _status) = self
                .world
                .process_at_rank(peer as i32)
                .receive_vec_with_tag::<u8>(i32::from(tag));
            MpiHandle(Some(data))
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::{MpiComm, MpiHandle};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_derive_from_one_base() {
        let tags = GraphCommTags::from_base(CommTag::new(0x10));
        assert_eq!(tags.handshake.as_u16(), 0x10);
        assert_eq!(tags.data.as_u16(), 0x11);
        assert_eq!(tags.reduce.as_u16(), 0x12);
        assert_eq!(CommTag::new(u16::MAX).offset(1), CommTag::new(0));
    }

    #[test]
    fn no_comm_is_single_rank() {
        let c = NoComm;
        assert_eq!((c.rank(), c.size()), (0, 1));
        assert!(c.is_no_comm());
        let mut buf = [0u8; 4];
        assert!(c.irecv(0, 1, &mut buf).wait().is_none());
    }

    #[test]
    fn rayon_zero_length_message_arrives() {
        let c0 = RayonComm::new(0, 2);
        let c1 = RayonComm::new(1, 2);
        c0.isend(1, 0x7A01, &[]);
        let mut buf = [0u8; 0];
        assert_eq!(c1.irecv(0, 0x7A01, &mut buf).wait(), Some(Vec::new()));
        assert!(!c1.is_no_comm());
    }

    #[test]
    fn rayon_across_threads() {
        let h = std::thread::spawn(|| {
            let c1 = RayonComm::new(1, 2);
            let mut buf = [0u8; 3];
            c1.irecv(0, 0x7A02, &mut buf).wait()
        });
        RayonComm::new(0, 2).isend(1, 0x7A02, &[9, 8, 7]);
        assert_eq!(h.join().unwrap(), Some(vec![9, 8, 7]));
    }
}
