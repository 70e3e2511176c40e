//! Per-element record: connectivity, geometry and the face adjacency slots.

use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

/// Identity of a face neighbor.
///
/// A neighbor on the same process is stored by its local index; a neighbor on
/// another process is stored by its global id. [`Adjacency::owner`] names the
/// process either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeighborId {
    /// Local element index on this process.
    Local(usize),
    /// Global element id of an element on another process.
    Remote(u64),
}

/// One populated adjacency slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adjacency {
    pub neighbor: NeighborId,
    /// Rank owning the neighbor.
    pub owner: usize,
    /// Number of nodes on the shared side.
    pub edge_weight: f32,
}

/// An element owned by this process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub global_id: u64,
    /// Index of the element's block in the catalog.
    pub block: usize,
    /// 0-based local node indices.
    pub connectivity: Vec<usize>,
    /// Interleaved node coordinates, `dimension` values per connectivity entry.
    /// Empty when no geometry was loaded.
    pub coordinates: Vec<f64>,
    /// True when the element appears in an inter-process communication map.
    pub border: bool,
    pub cpu_weight: f32,
    pub mem_weight: f32,
    adjacency: Vec<Option<Adjacency>>,
    neighbor_count: usize,
}

impl ElementRecord {
    /// New element with `sides` empty adjacency slots.
    pub fn new(
        global_id: u64,
        block: usize,
        connectivity: Vec<usize>,
        coordinates: Vec<f64>,
        sides: usize,
    ) -> Self {
        Self {
            global_id,
            block,
            connectivity,
            coordinates,
            border: false,
            cpu_weight: 1.0,
            mem_weight: 1.0,
            adjacency: vec![None; sides],
            neighbor_count: 0,
        }
    }

    /// Adjacency slots, one per side; `None` means no neighbor across that side.
    pub fn adjacency(&self) -> &[Option<Adjacency>] {
        &self.adjacency
    }

    /// Number of populated adjacency slots.
    pub fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    /// Number of sides (adjacency slots).
    pub fn num_sides(&self) -> usize {
        self.adjacency.len()
    }

    /// Adjacency across side `side` (1-based).
    pub fn neighbor(&self, side: usize) -> Option<&Adjacency> {
        side.checked_sub(1)
            .and_then(|s| self.adjacency.get(s))
            .and_then(Option::as_ref)
    }

    /// Populated slots with their 1-based side ids.
    pub fn neighbors(&self) -> impl Iterator<Item = (usize, &Adjacency)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .filter_map(|(s, a)| a.as_ref().map(|a| (s + 1, a)))
    }

    /// `true` when slot `side` (1-based) is populated.
    pub fn has_neighbor(&self, side: usize) -> bool {
        self.neighbor(side).is_some()
    }

    /// Fill the empty slot for `side` (1-based).
    ///
    /// `element` is this record's local index, used only for error context.
    /// Fails when the side is out of range, when the slot is already
    /// populated, or when the element would hold more neighbors than sides.
    pub fn set_adjacency(
        &mut self,
        element: usize,
        side: usize,
        adjacency: Adjacency,
    ) -> Result<(), MeshError> {
        let sides = self.adjacency.len();
        let slot = side
            .checked_sub(1)
            .filter(|&s| s < sides)
            .ok_or(MeshError::InvalidSide {
                element,
                side,
                sides,
            })?;
        if self.neighbor_count + 1 > sides {
            return Err(MeshError::AdjacencyOverflow {
                element,
                side,
                neighbor_count: self.neighbor_count,
                sides,
            });
        }
        if self.adjacency[slot].is_some() {
            return Err(MeshError::SideAlreadyResolved { element, side });
        }
        self.adjacency[slot] = Some(adjacency);
        self.neighbor_count += 1;
        debug_assert_eq!(self.neighbor_count, self.populated_slots());
        Ok(())
    }

    /// Count of `Some` slots, recomputed.
    pub fn populated_slots(&self) -> usize {
        self.adjacency.iter().filter(|a| a.is_some()).count()
    }

    /// Coordinates of connectivity node `i`.
    pub fn node_coordinates(&self, i: usize, dimension: usize) -> Option<&[f64]> {
        self.coordinates.get(i * dimension..(i + 1) * dimension)
    }

    /// `true` when coordinate data is attached.
    pub fn has_geometry(&self) -> bool {
        !self.coordinates.is_empty()
    }
}
