//! Global agreement on block shapes.
//!
//! A process that owns no element of a block does not know its element type.
//! Every process exchanges its locally known shapes with every other process,
//! in ascending peer order, and merges them: nodes per element by `max`,
//! element type code by `min` with [`NULL_ELEMENT_CODE`] standing for "none".

use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::completion::peer_exchange::exchange_with_peer;
use crate::algs::wire::{WireBlockShape, cast_slice, decode_records};
use crate::data::block::BlockShape;
use crate::mesh_error::MeshError;
use crate::topology::ElementType;
use crate::topology::element_type::NULL_ELEMENT_CODE;
use std::mem::size_of;

fn to_wire(shape: &BlockShape) -> Result<WireBlockShape, MeshError> {
    let nodes = u32::try_from(shape.nodes_per_element).map_err(|_| {
        MeshError::InvalidConfig(format!(
            "{} nodes per element does not fit the wire format",
            shape.nodes_per_element
        ))
    })?;
    let code = shape.element_type.map_or(NULL_ELEMENT_CODE, ElementType::wire_code);
    Ok(WireBlockShape::new(nodes, code))
}

fn from_wire(w: &WireBlockShape, peer: usize) -> Result<BlockShape, MeshError> {
    let element_type = match w.type_code() {
        NULL_ELEMENT_CODE => None,
        code => Some(ElementType::from_wire_code(code).ok_or_else(|| {
            MeshError::CommError {
                neighbor: peer,
                message: format!("unknown element type code {code}"),
            }
        })?),
    };
    Ok(BlockShape {
        nodes_per_element: w.nodes() as usize,
        element_type,
    })
}

/// Reduce `local` (one shape per block) over all processes of `comm`.
///
/// Every process must pass the same number of blocks.
pub fn all_reduce_block_shapes<C: Communicator>(
    comm: &C,
    tag: CommTag,
    local: &[BlockShape],
) -> Result<Vec<BlockShape>, MeshError> {
    let wire = local.iter().map(to_wire).collect::<Result<Vec<_>, _>>()?;
    let payload = cast_slice(&wire);
    let mut reduced = local.to_vec();

    for peer in (0..comm.size()).filter(|&p| p != comm.rank()) {
        // one spare record so a peer with more blocks is detected
        let recv_len = payload.len() + size_of::<WireBlockShape>();
        let bytes = exchange_with_peer(comm, peer, tag, payload, recv_len)?;
        let theirs = decode_records::<WireBlockShape>(&bytes).map_err(|message| {
            MeshError::CommError {
                neighbor: peer,
                message,
            }
        })?;
        if theirs.len() != local.len() {
            return Err(MeshError::BlockCountMismatch {
                expected: local.len(),
                found: theirs.len(),
            });
        }
        for (mine, w) in reduced.iter_mut().zip(&theirs) {
            *mine = mine.merge(from_wire(w, peer)?);
        }
    }

    log::debug!(
        "[rank {}] reduced {} block shapes over {} processes",
        comm.rank(),
        reduced.len(),
        comm.size()
    );
    Ok(reduced)
}
