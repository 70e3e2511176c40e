//! Rank-ordered pairwise exchange.
//!
//! Within a pair the lower rank sends first and the higher rank receives
//! first, so a blocking backend never has both ends of a pair sending. As long
//! as every process visits its peers in ascending rank order, the exchanges
//! of all processes form one global sequence and cannot deadlock.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::{decode_global_ids, encode_global_ids, global_ids_len};
use crate::mesh_error::MeshError;

fn check_peer<C: Communicator>(comm: &C, peer: usize) -> Result<(), MeshError> {
    if peer == comm.rank() || peer >= comm.size() {
        return Err(MeshError::CommError {
            neighbor: peer,
            message: format!(
                "rank {} cannot exchange with rank {peer} (communicator size {})",
                comm.rank(),
                comm.size()
            ),
        });
    }
    Ok(())
}

/// Send `payload` to `peer` and receive at most `recv_len` bytes back.
pub fn exchange_with_peer<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
    payload: &[u8],
    recv_len: usize,
) -> Result<Vec<u8>, MeshError> {
    check_peer(comm, peer)?;
    let mut buf = vec![0u8; recv_len];
    let received = if comm.rank() < peer {
        let _ = comm.isend(peer, tag.as_u16(), payload).wait();
        comm.irecv(peer, tag.as_u16(), &mut buf).wait()
    } else {
        let got = comm.irecv(peer, tag.as_u16(), &mut buf).wait();
        let _ = comm.isend(peer, tag.as_u16(), payload).wait();
        got
    };
    received.ok_or_else(|| MeshError::CommError {
        neighbor: peer,
        message: format!("no message from rank {peer} on tag {:#x}", tag.as_u16()),
    })
}

/// Zero-payload handshake with `peer`.
pub fn handshake<C: Communicator>(comm: &C, peer: usize, tag: CommTag) -> Result<(), MeshError> {
    let got = exchange_with_peer(comm, peer, tag, &[], 0)?;
    if !got.is_empty() {
        return Err(MeshError::CommError {
            neighbor: peer,
            message: format!("handshake carried {} bytes", got.len()),
        });
    }
    Ok(())
}

/// Exchange global-id arrays with `peer`; the peer must send exactly as many
/// ids as we do.
pub fn exchange_global_ids<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
    ids: &[u64],
) -> Result<Vec<u64>, MeshError> {
    let payload = encode_global_ids(ids);
    let bytes = exchange_with_peer(comm, peer, tag, &payload, global_ids_len(ids.len()))?;
    decode_global_ids(&bytes, ids.len()).map_err(|message| MeshError::CommError {
        neighbor: peer,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, RayonComm};

    #[test]
    fn self_and_out_of_range_peers_are_rejected() {
        assert!(matches!(
            handshake(&NoComm, 0, CommTag::new(1)),
            Err(MeshError::CommError { neighbor: 0, .. })
        ));
        let c = RayonComm::new(0, 2);
        assert!(matches!(
            exchange_with_peer(&c, 2, CommTag::new(1), &[], 0),
            Err(MeshError::CommError { neighbor: 2, .. })
        ));
    }

    #[test]
    fn pair_swaps_ids() {
        let tag = CommTag::new(0x7B00);
        let h = std::thread::spawn(move || {
            let c1 = RayonComm::new(1, 2);
            handshake(&c1, 0, tag)?;
            exchange_global_ids(&c1, 0, tag.offset(1), &[20, 21])
        });
        let c0 = RayonComm::new(0, 2);
        handshake(&c0, 1, tag).unwrap();
        let got0 = exchange_global_ids(&c0, 1, tag.offset(1), &[10, 11]).unwrap();
        assert_eq!(got0, vec![20, 21]);
        assert_eq!(h.join().unwrap().unwrap(), vec![10, 11]);
    }

    #[test]
    fn short_reply_is_a_comm_error() {
        let tag = CommTag::new(0x7B10);
        let h = std::thread::spawn(move || {
            let c1 = RayonComm::new(1, 2);
            exchange_global_ids(&c1, 0, tag, &[20])
        });
        let c0 = RayonComm::new(0, 2);
        let err = exchange_global_ids(&c0, 1, tag, &[10, 11]).unwrap_err();
        assert!(matches!(err, MeshError::CommError { neighbor: 1, .. }));
        assert!(h.join().unwrap().is_err());
    }
}
