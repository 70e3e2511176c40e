//! Element block metadata and its process-independent shape.

use crate::topology::ElementType;
use serde::{Deserialize, Serialize};

/// Block shape that every process must agree on, even for blocks it owns no
/// element of. Produced locally, then reduced across processes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockShape {
    /// Nodes per element (reduced with `max`).
    pub nodes_per_element: usize,
    /// Element type, `None` when no element of the block is known (reduced with `min`
    /// over wire codes, where "none" is the largest code).
    pub element_type: Option<ElementType>,
}

impl BlockShape {
    /// Combine the shapes two processes report for the same block.
    pub fn merge(self, other: BlockShape) -> BlockShape {
        let element_type = match (self.element_type, other.element_type) {
            (Some(a), Some(b)) => Some(if a.wire_code() <= b.wire_code() { a } else { b }),
            (a, b) => a.or(b),
        };
        BlockShape {
            nodes_per_element: self.nodes_per_element.max(other.nodes_per_element),
            element_type,
        }
    }
}

/// Per-block metadata held by the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block identifier from the mesh file.
    pub id: i64,
    /// Canonical name derived from the reduced element type.
    pub name: String,
    /// Number of local elements in the block.
    pub count: usize,
    /// Number of attributes per element.
    pub attributes: usize,
    /// Globally agreed shape.
    pub shape: BlockShape,
}

impl BlockInfo {
    /// Nodes per element.
    pub fn nodes_per_element(&self) -> usize {
        self.shape.nodes_per_element
    }

    /// Element type (`None` only for blocks empty on every process).
    pub fn element_type(&self) -> Option<ElementType> {
        self.shape.element_type
    }

    /// `true` when elements of this block take part in face adjacency.
    pub fn has_sides(&self) -> bool {
        self.nodes_per_element() > 1
            && self.element_type().is_some_and(|t| t.num_sides() > 0)
    }
}
