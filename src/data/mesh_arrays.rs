//! Raw per-process mesh arrays, as handed over by the mesh reader.
//!
//! Numbering follows the file format: connectivity is 1-based into the local
//! node arrays. Nothing here is validated until the catalog is built.

use crate::data::block::BlockShape;
use crate::mesh_error::MeshError;
use crate::topology::ElementType;
use serde::{Deserialize, Serialize};

/// One element block as read from the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub id: i64,
    /// Element type name, e.g. `"HEX8"`, `"QUAD"`, `"TETRA"`.
    pub type_name: String,
    /// Number of elements of this block on this process.
    pub count: usize,
    /// Nodes per element as reported locally (0 when `count == 0`).
    pub nodes_per_element: usize,
    pub attributes: usize,
    /// `count * nodes_per_element` 1-based node numbers.
    pub connectivity: Vec<usize>,
}

/// All mesh arrays of one process.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshArrays {
    pub dimension: usize,
    pub num_nodes: usize,
    /// Per-axis coordinate arrays (`dimension` arrays of `num_nodes` values),
    /// or empty when no geometry is available.
    pub coordinates: Vec<Vec<f64>>,
    /// Global node ids, one per local node.
    pub node_map: Vec<u64>,
    /// Global element ids, one per local element in block order.
    pub element_map: Vec<u64>,
    pub blocks: Vec<RawBlock>,
}

impl MeshArrays {
    /// Total number of local elements.
    pub fn num_elements(&self) -> usize {
        self.blocks.iter().map(|b| b.count).sum()
    }

    /// Shapes as seen from this process alone; blocks without local elements
    /// report no type.
    pub fn local_block_shapes(&self) -> Result<Vec<BlockShape>, MeshError> {
        self.blocks
            .iter()
            .map(|b| {
                let element_type = if b.count > 0 {
                    Some(ElementType::classify(
                        &b.type_name,
                        b.nodes_per_element,
                        self.dimension,
                    )?)
                } else {
                    None
                };
                Ok(BlockShape {
                    nodes_per_element: b.nodes_per_element,
                    element_type,
                })
            })
            .collect()
    }

    /// Check array lengths against the declared counts.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.element_map.len() != self.num_elements() {
            return Err(MeshError::InputLength {
                what: "element_map",
                expected: self.num_elements(),
                found: self.element_map.len(),
            });
        }
        if self.node_map.len() != self.num_nodes {
            return Err(MeshError::InputLength {
                what: "node_map",
                expected: self.num_nodes,
                found: self.node_map.len(),
            });
        }
        if !self.coordinates.is_empty() {
            if self.coordinates.len() != self.dimension {
                return Err(MeshError::InputLength {
                    what: "coordinates",
                    expected: self.dimension,
                    found: self.coordinates.len(),
                });
            }
            if let Some(axis) = self.coordinates.iter().find(|a| a.len() != self.num_nodes) {
                return Err(MeshError::InputLength {
                    what: "coordinate axis",
                    expected: self.num_nodes,
                    found: axis.len(),
                });
            }
        }
        for (i, b) in self.blocks.iter().enumerate() {
            let expected = b.count * b.nodes_per_element;
            if b.connectivity.len() != expected {
                return Err(MeshError::ConnectivityLength {
                    block: i,
                    expected,
                    found: b.connectivity.len(),
                });
            }
        }
        Ok(())
    }
}
