//! Local face adjacency by node-set intersection.
//!
//! For each side of each element, the elements touching the first few side
//! nodes are intersected. Every surviving candidate is asked, through its own
//! element type, whether it holds the mirrored side.

use crate::algs::node_elements::NodeElementIndex;
use crate::data::catalog::ElementCatalog;
use crate::data::element::{Adjacency, NeighborId};
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::{ElementType, SideMatch};

/// Counters reported by [`find_local_adjacency`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalAdjacencyStats {
    /// Adjacency slots filled.
    pub filled: usize,
    /// Extra matches dropped because the side already had a neighbor.
    pub non_manifold: usize,
}

/// Number of side nodes whose element sets are intersected, minus one.
///
/// `None` when no intersection is performed, which leaves single-node sides
/// (and anything else with `min(dimension, side_len) <= 1`) without candidates.
pub fn required_intersections(dimension: usize, side_len: usize) -> Option<usize> {
    dimension.min(side_len).checked_sub(1).filter(|&k| k > 0)
}

/// Candidate elements sharing side `side_nodes`: the elements common to side
/// nodes `0..=k`, intersecting in order and stopping once fewer than two remain.
pub fn side_candidates(index: &NodeElementIndex, side_nodes: &[usize], k: usize) -> Vec<usize> {
    let Some(&first) = side_nodes.first() else {
        return Vec::new();
    };
    let mut candidates = index.elements(first).to_vec();
    for &node in side_nodes.iter().take(k + 1).skip(1) {
        if candidates.len() < 2 {
            break;
        }
        let set = index.elements(node);
        candidates.retain(|e| set.binary_search(e).is_ok());
    }
    candidates
}

/// Fill the local adjacency slots of every element of `catalog`.
///
/// Slots are filled from the element's own side only; the reverse slot is
/// filled when the neighbor is visited. A candidate holding the side with the
/// same orientation means an inverted element and aborts the pass, except on
/// the two faces of a shell, which name the same nodes in opposite order.
pub fn find_local_adjacency(
    catalog: &mut ElementCatalog,
    index: &NodeElementIndex,
) -> Result<LocalAdjacencyStats, MeshError> {
    let rank = catalog.rank();
    let dimension = catalog.dimension();
    let mut stats = LocalAdjacencyStats::default();

    for element in 0..catalog.len() {
        let found = element_neighbors(catalog, index, element, dimension)?;
        for (side, neighbor, weight) in found {
            let record = catalog.element_mut(element)?;
            if record.has_neighbor(side) {
                log::warn!(
                    "[rank {rank}] element {element} side {side}: extra neighbor {neighbor} ignored (non-manifold face)"
                );
                stats.non_manifold += 1;
                continue;
            }
            record.set_adjacency(
                element,
                side,
                Adjacency {
                    neighbor: NeighborId::Local(neighbor),
                    owner: rank,
                    edge_weight: weight,
                },
            )?;
            stats.filled += 1;
        }
    }

    log::debug!(
        "[rank {rank}] local adjacency: {} slots filled, {} non-manifold matches",
        stats.filled,
        stats.non_manifold
    );
    catalog.debug_assert_invariants();
    Ok(stats)
}

/// `(side, neighbor, weight)` for every matching candidate of `element`.
fn element_neighbors(
    catalog: &ElementCatalog,
    index: &NodeElementIndex,
    element: usize,
    dimension: usize,
) -> Result<Vec<(usize, usize, f32)>, MeshError> {
    let Some(block) = catalog.block_of(element) else {
        return Ok(Vec::new());
    };
    let Some(ty) = block.element_type().filter(|_| block.has_sides()) else {
        return Ok(Vec::new());
    };
    let Some(record) = catalog.element(element) else {
        return Ok(Vec::new());
    };

    let mut found = Vec::new();
    for side in 1..=ty.num_sides() {
        let side_nodes = ty.side_nodes(&record.connectivity, side).ok_or(
            MeshError::InvalidSide {
                element,
                side,
                sides: ty.num_sides(),
            },
        )?;
        let Some(k) = required_intersections(dimension, side_nodes.len()) else {
            continue;
        };
        let candidates = side_candidates(index, &side_nodes, k);
        if candidates.len() < 2 {
            continue;
        }
        let Some(mirrored) = ty.mirror_side(side, &side_nodes) else {
            continue;
        };
        for &candidate in candidates.iter().filter(|&&c| c != element) {
            match candidate_match(catalog, candidate, &mirrored) {
                SideMatch::Side(_) => {
                    found.push((side, candidate, side_nodes.len() as f32));
                }
                SideMatch::NoMatch => {}
                // a shell face sits on a solid in both orientations; only the
                // mirrored one is a neighbor
                SideMatch::Inverted(_) if ty.is_shell() && side <= 2 => {}
                SideMatch::Inverted(_) => {
                    return Err(MeshError::InvertedSide {
                        element,
                        side,
                        neighbor: candidate,
                    });
                }
            }
        }
    }
    Ok(found)
}

fn candidate_match(catalog: &ElementCatalog, candidate: usize, mirrored: &[usize]) -> SideMatch {
    let ty: Option<ElementType> = catalog.element_type(candidate);
    match (ty, catalog.element(candidate)) {
        (Some(ty), Some(record)) => ty.matching_side(&record.connectivity, mirrored),
        _ => SideMatch::NoMatch,
    }
}
