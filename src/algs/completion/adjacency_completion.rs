//! Cross-process adjacency: fill the boundary slots named by the elemental
//! communication maps with the global ids of the elements across the boundary.

use crate::algs::communicator::{Communicator, GraphCommTags};
use crate::algs::completion::peer_exchange::{exchange_global_ids, handshake};
use crate::data::catalog::ElementCatalog;
use crate::data::comm_map::ElemCommMap;
use crate::data::element::{Adjacency, NeighborId};
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;

/// Counters reported by [`resolve_remote_adjacency`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletionStats {
    /// Maps (neighbor processes) exchanged with.
    pub maps: usize,
    /// Remote adjacency slots filled.
    pub sides: usize,
}

/// Global ids of the map's elements, in map order.
fn map_global_ids(catalog: &ElementCatalog, map: &ElemCommMap) -> Result<Vec<u64>, MeshError> {
    map.entries
        .iter()
        .map(|entry| {
            catalog
                .element(entry.element)
                .map(|e| e.global_id)
                .ok_or(MeshError::ElementOutOfRange {
                    element: entry.element,
                    num_elements: catalog.len(),
                })
        })
        .collect()
}

/// Exchange global ids over every map and record the remote neighbors.
///
/// `maps` must be sorted by ascending neighbor rank, as produced by
/// [`CommMapArrays::elem_comm_maps`](crate::data::comm_map::CommMapArrays::elem_comm_maps).
/// All exchanges complete before any slot is written.
pub fn resolve_remote_adjacency<C: Communicator>(
    catalog: &mut ElementCatalog,
    maps: &[ElemCommMap],
    comm: &C,
    tags: &GraphCommTags,
) -> Result<CompletionStats, MeshError> {
    if !maps.is_sorted_by_key(|m| m.neighbor) {
        return Err(MeshError::CommMapParams(
            "elemental maps are not ordered by neighbor rank".into(),
        ));
    }
    let rank = comm.rank();

    let mut received = Vec::with_capacity(maps.len());
    for map in maps {
        let ours = map_global_ids(catalog, map)?;
        handshake(comm, map.neighbor, tags.handshake)?;
        let theirs = exchange_global_ids(comm, map.neighbor, tags.data, &ours)?;
        log::debug!(
            "[rank {rank}] exchanged {} boundary sides with rank {}",
            theirs.len(),
            map.neighbor
        );
        received.push(theirs);
    }

    let mut stats = CompletionStats {
        maps: maps.len(),
        sides: 0,
    };
    for (map, theirs) in maps.iter().zip(received) {
        for (entry, remote) in map.entries.iter().zip(theirs) {
            let weight = catalog
                .element_type(entry.element)
                .map_or(0, |t| t.side_node_count(entry.side));
            catalog.element_mut(entry.element)?.set_adjacency(
                entry.element,
                entry.side,
                Adjacency {
                    neighbor: NeighborId::Remote(remote),
                    owner: map.neighbor,
                    edge_weight: weight as f32,
                },
            )?;
            stats.sides += 1;
        }
    }

    log::info!(
        "[rank {rank}] remote adjacency: {} sides over {} neighbor processes",
        stats.sides,
        stats.maps
    );
    catalog.debug_assert_invariants();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{CommTag, NoComm};
    use crate::data::comm_map::CommMapEntry;
    use crate::data::mesh_arrays::{MeshArrays, RawBlock};

    fn one_quad() -> ElementCatalog {
        let mesh = MeshArrays {
            dimension: 2,
            num_nodes: 4,
            coordinates: Vec::new(),
            node_map: vec![1, 2, 3, 4],
            element_map: vec![5],
            blocks: vec![RawBlock {
                id: 1,
                type_name: "QUAD".into(),
                count: 1,
                nodes_per_element: 4,
                attributes: 0,
                connectivity: vec![1, 2, 3, 4],
            }],
        };
        let shapes = mesh.local_block_shapes().unwrap();
        ElementCatalog::from_arrays(0, &mesh, &shapes).unwrap()
    }

    #[test]
    fn no_maps_is_a_no_op() {
        let mut cat = one_quad();
        let tags = GraphCommTags::from_base(CommTag::new(0x10));
        let stats = resolve_remote_adjacency(&mut cat, &[], &NoComm, &tags).unwrap();
        assert_eq!(stats, CompletionStats::default());
        assert_eq!(cat.element(0).unwrap().neighbor_count(), 0);
    }

    #[test]
    fn unsorted_maps_are_rejected() {
        let mut cat = one_quad();
        let map = |neighbor| ElemCommMap {
            neighbor,
            entries: vec![CommMapEntry { element: 0, side: 1 }],
        };
        let tags = GraphCommTags::default();
        assert!(matches!(
            resolve_remote_adjacency(&mut cat, &[map(2), map(1)], &NoComm, &tags),
            Err(MeshError::CommMapParams(_))
        ));
    }

    #[test]
    fn map_element_out_of_range_is_reported() {
        let cat = one_quad();
        let map = ElemCommMap {
            neighbor: 1,
            entries: vec![CommMapEntry { element: 3, side: 1 }],
        };
        assert!(matches!(
            map_global_ids(&cat, &map),
            Err(MeshError::ElementOutOfRange { element: 3, num_elements: 1 })
        ));
    }
}
