//! ElementCatalog: the per-process array of element records.
//!
//! Built once per mesh load from [`MeshArrays`] and the globally reduced block
//! shapes. Afterwards only the adjacency passes mutate it.

use crate::data::block::{BlockInfo, BlockShape};
use crate::data::comm_map::CommMapArrays;
use crate::data::element::{ElementRecord, NeighborId};
use crate::data::mesh_arrays::MeshArrays;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::ElementType;
use serde::{Deserialize, Serialize};

/// All elements known to one process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementCatalog {
    rank: usize,
    dimension: usize,
    num_nodes: usize,
    blocks: Vec<BlockInfo>,
    elements: Vec<ElementRecord>,
    node_global_ids: Vec<u64>,
}

impl ElementCatalog {
    /// Build the catalog of process `rank`.
    ///
    /// `shapes` must hold one globally reduced shape per block of `mesh`.
    /// Connectivity is converted to 0-based local node indices and per-node
    /// coordinates are copied into each record when present. Elements whose
    /// block has more than one node get one empty adjacency slot per side.
    pub fn from_arrays(
        rank: usize,
        mesh: &MeshArrays,
        shapes: &[BlockShape],
    ) -> Result<Self, MeshError> {
        mesh.validate()?;
        if shapes.len() != mesh.blocks.len() {
            return Err(MeshError::BlockCountMismatch {
                expected: mesh.blocks.len(),
                found: shapes.len(),
            });
        }

        let dim = mesh.dimension;
        let mut elements = Vec::new();
        elements
            .try_reserve_exact(mesh.num_elements())
            .map_err(|e| MeshError::exhausted("allocating element records", e))?;
        let mut blocks = Vec::with_capacity(mesh.blocks.len());

        for (iblk, (raw, shape)) in mesh.blocks.iter().zip(shapes).enumerate() {
            blocks.push(BlockInfo {
                id: raw.id,
                name: shape
                    .element_type
                    .map_or_else(|| "NULL".to_string(), |t| t.name().to_string()),
                count: raw.count,
                attributes: raw.attributes,
                shape: *shape,
            });
            if raw.count == 0 {
                continue;
            }

            let nnodes = raw.nodes_per_element;
            if nnodes == 0 {
                return Err(MeshError::UnknownElementType {
                    name: raw.type_name.clone(),
                    nodes: 0,
                    dimension: dim,
                });
            }
            if nnodes != shape.nodes_per_element {
                return Err(MeshError::ConnectivityLength {
                    block: iblk,
                    expected: raw.count * shape.nodes_per_element,
                    found: raw.connectivity.len(),
                });
            }
            let sides = match shape.element_type {
                Some(t) if nnodes > 1 => t.num_sides(),
                _ => 0,
            };

            for conn in raw.connectivity.chunks_exact(nnodes) {
                let element = elements.len();
                let connectivity = conn
                    .iter()
                    .map(|&n| {
                        n.checked_sub(1)
                            .filter(|&l| l < mesh.num_nodes)
                            .ok_or(MeshError::NodeOutOfRange {
                                element,
                                node: n,
                                num_nodes: mesh.num_nodes,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let coordinates = if mesh.coordinates.is_empty() {
                    Vec::new()
                } else {
                    connectivity
                        .iter()
                        .flat_map(|&n| mesh.coordinates.iter().map(move |axis| axis[n]))
                        .collect()
                };
                elements.push(ElementRecord::new(
                    mesh.element_map[element],
                    iblk,
                    connectivity,
                    coordinates,
                    sides,
                ));
            }
        }

        log::debug!(
            "[rank {rank}] catalog: {} elements in {} blocks, {} nodes, {}-D",
            elements.len(),
            blocks.len(),
            mesh.num_nodes,
            dim
        );

        Ok(Self {
            rank,
            dimension: dim,
            num_nodes: mesh.num_nodes,
            blocks,
            elements,
            node_global_ids: mesh.node_map.clone(),
        })
    }

    /// Mark the border elements listed in the communication-map arrays.
    pub fn apply_border_flags(&mut self, maps: &CommMapArrays) -> Result<usize, MeshError> {
        let border = maps.border_element_indices(self.elements.len())?;
        for &e in &border {
            self.elements[e].border = true;
        }
        Ok(border.len())
    }

    /// Rank of the owning process.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Spatial dimension of the mesh.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of local nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    pub fn elements(&self) -> &[ElementRecord] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&ElementRecord> {
        self.elements.get(index)
    }

    /// Mutable access for the adjacency passes.
    pub(crate) fn element_mut(&mut self, index: usize) -> Result<&mut ElementRecord, MeshError> {
        let num_elements = self.elements.len();
        self.elements
            .get_mut(index)
            .ok_or(MeshError::ElementOutOfRange {
                element: index,
                num_elements,
            })
    }

    /// Block of element `index`.
    pub fn block_of(&self, index: usize) -> Option<&BlockInfo> {
        self.elements.get(index).and_then(|e| self.blocks.get(e.block))
    }

    /// Element type of element `index`.
    pub fn element_type(&self, index: usize) -> Option<ElementType> {
        self.block_of(index).and_then(BlockInfo::element_type)
    }

    /// Local index of the element with global id `gid`, by linear scan.
    pub fn search_by_global_id(&self, gid: u64) -> Option<usize> {
        self.elements.iter().position(|e| e.global_id == gid)
    }

    /// Global node ids of the connectivity of element `index`.
    pub fn global_connectivity(&self, index: usize) -> Option<Vec<u64>> {
        let e = self.elements.get(index)?;
        e.connectivity
            .iter()
            .map(|&n| self.node_global_ids.get(n).copied())
            .collect()
    }

    /// Global id of the neighbor behind `neighbor`.
    pub fn neighbor_global_id(&self, neighbor: NeighborId) -> Option<u64> {
        match neighbor {
            NeighborId::Local(i) => self.elements.get(i).map(|e| e.global_id),
            NeighborId::Remote(gid) => Some(gid),
        }
    }
}

impl DebugInvariants for ElementCatalog {
    fn validate_invariants(&self) -> Result<(), MeshError> {
        for (i, e) in self.elements.iter().enumerate() {
            let populated = e.populated_slots();
            if populated != e.neighbor_count() {
                return Err(MeshError::NeighborCountMismatch {
                    element: i,
                    neighbor_count: e.neighbor_count(),
                    populated,
                });
            }
            let block = self.blocks.get(e.block).ok_or_else(|| {
                MeshError::InvariantViolation(format!("element {i}: block {} missing", e.block))
            })?;
            if e.connectivity.len() != block.nodes_per_element() {
                return Err(MeshError::InvariantViolation(format!(
                    "element {i}: {} connectivity entries, block has {} nodes per element",
                    e.connectivity.len(),
                    block.nodes_per_element()
                )));
            }
            let expected_sides = if block.has_sides() {
                block.element_type().map_or(0, ElementType::num_sides)
            } else {
                0
            };
            if e.num_sides() != expected_sides {
                return Err(MeshError::InvariantViolation(format!(
                    "element {i}: {} adjacency slots, type has {expected_sides} sides",
                    e.num_sides()
                )));
            }
            for (side, adj) in e.neighbors() {
                match adj.neighbor {
                    NeighborId::Local(n) if n >= self.elements.len() || n == i => {
                        return Err(MeshError::InvariantViolation(format!(
                            "element {i} side {side}: bad local neighbor {n}"
                        )));
                    }
                    NeighborId::Local(_) if adj.owner != self.rank => {
                        return Err(MeshError::InvariantViolation(format!(
                            "element {i} side {side}: local neighbor owned by rank {}",
                            adj.owner
                        )));
                    }
                    NeighborId::Remote(_) if adj.owner == self.rank => {
                        return Err(MeshError::InvariantViolation(format!(
                            "element {i} side {side}: remote neighbor owned by own rank"
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
