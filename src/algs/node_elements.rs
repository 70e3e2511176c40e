//! Node-to-element index: for every local node, the local elements touching it.

use crate::data::catalog::ElementCatalog;
use crate::mesh_error::MeshError;

/// Initial capacity of each per-node list, and the step it grows by.
pub const LIST_ALLOC: usize = 10;

/// Per-node sets of incident local elements.
///
/// Elements are visited in catalog order, so every set is sorted ascending and
/// holds each element at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeElementIndex {
    sets: Vec<Vec<usize>>,
    max_incidence: usize,
}

impl NodeElementIndex {
    /// Build the index with the default growth step [`LIST_ALLOC`].
    pub fn build(catalog: &ElementCatalog) -> Result<Self, MeshError> {
        Self::build_with_increment(catalog, LIST_ALLOC)
    }

    /// Build the index; each set starts with `increment` slots and grows by
    /// `increment` whenever it is full.
    pub fn build_with_increment(
        catalog: &ElementCatalog,
        increment: usize,
    ) -> Result<Self, MeshError> {
        if increment == 0 {
            return Err(MeshError::InvalidConfig(
                "node list growth increment must be positive".into(),
            ));
        }
        let num_nodes = catalog.num_nodes();
        let mut sets: Vec<Vec<usize>> = Vec::new();
        sets.try_reserve_exact(num_nodes)
            .map_err(|e| MeshError::exhausted("allocating node-to-element index", e))?;
        for _ in 0..num_nodes {
            let mut set = Vec::new();
            set.try_reserve_exact(increment)
                .map_err(|e| MeshError::exhausted("allocating node-to-element list", e))?;
            sets.push(set);
        }

        let mut max_incidence = 0;
        for (element, record) in catalog.elements().iter().enumerate() {
            for &node in &record.connectivity {
                let set = sets.get_mut(node).ok_or(MeshError::NodeOutOfRange {
                    element,
                    node,
                    num_nodes,
                })?;
                // degenerate connectivity lists a node twice
                if set.last() == Some(&element) {
                    continue;
                }
                if set.len() == set.capacity() {
                    set.try_reserve_exact(increment)
                        .map_err(|e| MeshError::exhausted("growing node-to-element list", e))?;
                }
                set.push(element);
                max_incidence = max_incidence.max(set.len());
            }
        }

        log::debug!(
            "[rank {}] node index: {num_nodes} nodes, max incidence {max_incidence}",
            catalog.rank()
        );
        Ok(Self {
            sets,
            max_incidence,
        })
    }

    /// Elements touching `node`, ascending; empty for an unknown node.
    pub fn elements(&self, node: usize) -> &[usize] {
        self.sets.get(node).map_or(&[], Vec::as_slice)
    }

    /// Number of nodes indexed.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Size of the largest set.
    pub fn max_incidence(&self) -> usize {
        self.max_incidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mesh_arrays::{MeshArrays, RawBlock};

    fn tris(connectivity: Vec<usize>, count: usize, num_nodes: usize) -> ElementCatalog {
        let mesh = MeshArrays {
            dimension: 2,
            num_nodes,
            coordinates: Vec::new(),
            node_map: (1..=num_nodes as u64).collect(),
            element_map: (1..=count as u64).collect(),
            blocks: vec![RawBlock {
                id: 1,
                type_name: "TRI3".into(),
                count,
                nodes_per_element: 3,
                attributes: 0,
                connectivity,
            }],
        };
        let shapes = mesh.local_block_shapes().unwrap();
        ElementCatalog::from_arrays(0, &mesh, &shapes).unwrap()
    }

    #[test]
    fn sets_are_sorted_and_track_max_incidence() {
        // fan of three triangles around node 0
        let cat = tris(vec![1, 2, 3, 1, 3, 4, 1, 4, 5], 3, 5);
        let idx = NodeElementIndex::build(&cat).unwrap();
        assert_eq!(idx.len(), 5);
        assert_eq!(idx.elements(0), &[0, 1, 2]);
        assert_eq!(idx.elements(2), &[0, 1]);
        assert_eq!(idx.elements(4), &[2]);
        assert_eq!(idx.max_incidence(), 3);
        assert!(idx.elements(99).is_empty());
    }

    #[test]
    fn degenerate_nodes_are_listed_once() {
        let cat = tris(vec![1, 2, 2], 1, 2);
        let idx = NodeElementIndex::build(&cat).unwrap();
        assert_eq!(idx.elements(1), &[0]);
        assert_eq!(idx.max_incidence(), 1);
    }

    #[test]
    fn lists_grow_past_the_initial_allocation() {
        // 12 triangles share node 0
        let mut conn = Vec::new();
        for i in 0..12 {
            conn.extend_from_slice(&[1, i + 2, i + 3]);
        }
        let cat = tris(conn, 12, 14);
        let idx = NodeElementIndex::build_with_increment(&cat, 5).unwrap();
        assert_eq!(idx.elements(0).len(), 12);
        assert_eq!(idx.max_incidence(), 12);
    }

    #[test]
    fn zero_increment_is_rejected() {
        let cat = tris(vec![1, 2, 3], 1, 3);
        assert!(matches!(
            NodeElementIndex::build_with_increment(&cat, 0),
            Err(MeshError::InvalidConfig(_))
        ));
    }
}
