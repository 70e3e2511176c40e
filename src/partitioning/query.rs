//! Read-only query contract consumed by graph/geometric partitioners.
//!
//! Objects are the elements of one process. They can be addressed by local
//! index or, when the caller configures zero local-id entries, by global id
//! alone; the latter falls back to a linear scan of the catalog.

use crate::data::catalog::ElementCatalog;
use crate::data::element::NeighborId;
use crate::mesh_error::MeshError;

/// Identifier widths and weight options of the partitioner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryConfig {
    /// Entries per global id; the id occupies the last entry.
    pub num_gid_entries: usize,
    /// Entries per local id; `0` makes every lookup go through the global id.
    pub num_lid_entries: usize,
    /// Report the element cpu weight with every object.
    pub object_weights: bool,
    /// Report shared-side node counts as edge weights (uniform `1.0` otherwise).
    pub edge_weights: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            num_gid_entries: 1,
            num_lid_entries: 1,
            object_weights: true,
            edge_weights: true,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.num_gid_entries == 0 {
            return Err(MeshError::InvalidConfig(
                "global ids need at least one entry".into(),
            ));
        }
        Ok(())
    }
}

/// One object as handed to the partitioner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectHandle {
    pub global_id: u64,
    /// Local index; `None` when local ids are disabled.
    pub local_id: Option<usize>,
    /// Object weight; `None` when weights are disabled.
    pub weight: Option<f32>,
}

/// One graph edge of an object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphEdge {
    /// Global id of the neighbor element.
    pub global_id: u64,
    /// Rank owning the neighbor.
    pub rank: usize,
    pub weight: f32,
}

/// Partitioner view over a finished catalog.
#[derive(Clone, Copy, Debug)]
pub struct ElementGraphQuery<'a> {
    catalog: &'a ElementCatalog,
    config: QueryConfig,
}

impl<'a> ElementGraphQuery<'a> {
    pub fn new(catalog: &'a ElementCatalog, config: QueryConfig) -> Result<Self, MeshError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Number of objects on this process.
    pub fn num_objects(&self) -> usize {
        self.catalog.len()
    }

    /// Handle of the element at local index `index`.
    pub fn handle(&self, index: usize) -> Option<ObjectHandle> {
        let e = self.catalog.element(index)?;
        Some(ObjectHandle {
            global_id: e.global_id,
            local_id: (self.config.num_lid_entries > 0).then_some(index),
            weight: self.config.object_weights.then_some(e.cpu_weight),
        })
    }

    /// First object, or `None` when this process owns no element.
    pub fn first(&self) -> Option<ObjectHandle> {
        self.handle(0)
    }

    /// Object following `current` in catalog order.
    pub fn next(&self, current: &ObjectHandle) -> Result<Option<ObjectHandle>, MeshError> {
        let index = self.resolve(current)?;
        Ok(self.handle(index + 1))
    }

    /// All objects in catalog order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        (0..self.num_objects()).filter_map(move |i| self.handle(i))
    }

    /// Local index of `object`: the local id when local ids are enabled,
    /// otherwise a scan for its global id.
    pub fn resolve(&self, object: &ObjectHandle) -> Result<usize, MeshError> {
        match object.local_id {
            Some(index) if self.config.num_lid_entries > 0 => {
                if index < self.catalog.len() {
                    Ok(index)
                } else {
                    Err(MeshError::ElementOutOfRange {
                        element: index,
                        num_elements: self.catalog.len(),
                    })
                }
            }
            _ => self.lookup(object.global_id),
        }
    }

    /// Local index of the element with global id `gid`.
    pub fn lookup(&self, gid: u64) -> Result<usize, MeshError> {
        self.catalog
            .search_by_global_id(gid)
            .ok_or(MeshError::ElementNotFound(gid))
    }

    /// Number of coordinates per centroid.
    pub fn num_geometry(&self) -> usize {
        self.catalog.dimension()
    }

    /// Centroid of `object`: the unweighted average of its node coordinates.
    pub fn geometry(&self, object: &ObjectHandle) -> Result<Vec<f64>, MeshError> {
        self.centroid(self.resolve(object)?)
    }

    /// Centroid of the element at local index `index`.
    pub fn centroid(&self, index: usize) -> Result<Vec<f64>, MeshError> {
        let dim = self.catalog.dimension();
        let e = self.catalog.element(index).ok_or(MeshError::ElementOutOfRange {
            element: index,
            num_elements: self.catalog.len(),
        })?;
        let n = e.connectivity.len();
        if !e.has_geometry() || n == 0 || e.coordinates.len() != n * dim {
            return Err(MeshError::MissingGeometry { element: index });
        }
        let mut c = vec![0.0; dim];
        for node in e.coordinates.chunks_exact(dim.max(1)) {
            for (acc, x) in c.iter_mut().zip(node) {
                *acc += x;
            }
        }
        for acc in &mut c {
            *acc /= n as f64;
        }
        Ok(c)
    }

    /// Number of graph edges of `object`.
    pub fn num_edges(&self, object: &ObjectHandle) -> Result<usize, MeshError> {
        let index = self.resolve(object)?;
        Ok(self.catalog.elements()[index].neighbor_count())
    }

    /// Edges of `object` in side order; local neighbors are reported by
    /// global id.
    pub fn edges(&self, object: &ObjectHandle) -> Result<Vec<GraphEdge>, MeshError> {
        let index = self.resolve(object)?;
        self.edges_of(index)
    }

    /// Edges of the element at local index `index`.
    pub fn edges_of(&self, index: usize) -> Result<Vec<GraphEdge>, MeshError> {
        let e = self.catalog.element(index).ok_or(MeshError::ElementOutOfRange {
            element: index,
            num_elements: self.catalog.len(),
        })?;
        e.neighbors()
            .map(|(side, adj)| {
                let global_id = match adj.neighbor {
                    NeighborId::Local(i) => self
                        .catalog
                        .element(i)
                        .map(|n| n.global_id)
                        .ok_or_else(|| {
                            MeshError::InvariantViolation(format!(
                                "element {index} side {side}: local neighbor {i} missing"
                            ))
                        })?,
                    NeighborId::Remote(gid) => gid,
                };
                Ok(GraphEdge {
                    global_id,
                    rank: adj.owner,
                    weight: if self.config.edge_weights {
                        adj.edge_weight
                    } else {
                        1.0
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::adjacency::find_local_adjacency;
    use crate::algs::node_elements::NodeElementIndex;
    use crate::data::mesh_arrays::{MeshArrays, RawBlock};

    fn strip(with_geometry: bool) -> ElementCatalog {
        // 3 ---- 4 ---- 5
        // | 100  | 101  |
        // 0 ---- 1 ---- 2
        let mesh = MeshArrays {
            dimension: 2,
            num_nodes: 6,
            coordinates: if with_geometry {
                vec![
                    vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
                    vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
                ]
            } else {
                Vec::new()
            },
            node_map: vec![1, 2, 3, 4, 5, 6],
            element_map: vec![100, 101],
            blocks: vec![RawBlock {
                id: 1,
                type_name: "QUAD".into(),
                count: 2,
                nodes_per_element: 4,
                attributes: 0,
                connectivity: vec![1, 2, 5, 4, 2, 3, 6, 5],
            }],
        };
        let shapes = mesh.local_block_shapes().unwrap();
        let mut cat = ElementCatalog::from_arrays(0, &mesh, &shapes).unwrap();
        let idx = NodeElementIndex::build(&cat).unwrap();
        find_local_adjacency(&mut cat, &idx).unwrap();
        cat
    }

    #[test]
    fn iterates_objects_with_weights() {
        let cat = strip(true);
        let q = ElementGraphQuery::new(&cat, QueryConfig::default()).unwrap();
        assert_eq!(q.num_objects(), 2);
        let first = q.first().unwrap();
        assert_eq!(first.global_id, 100);
        assert_eq!(first.local_id, Some(0));
        assert_eq!(first.weight, Some(1.0));
        let second = q.next(&first).unwrap().unwrap();
        assert_eq!(second.global_id, 101);
        assert!(q.next(&second).unwrap().is_none());
        assert_eq!(q.objects().count(), 2);
    }

    #[test]
    fn zero_local_ids_fall_back_to_global_lookup() {
        let cat = strip(true);
        let cfg = QueryConfig {
            num_lid_entries: 0,
            object_weights: false,
            ..QueryConfig::default()
        };
        let q = ElementGraphQuery::new(&cat, cfg).unwrap();
        let first = q.first().unwrap();
        assert_eq!(first.local_id, None);
        assert_eq!(first.weight, None);
        assert_eq!(q.next(&first).unwrap().unwrap().global_id, 101);
        let ghost = ObjectHandle {
            global_id: 7,
            local_id: None,
            weight: None,
        };
        assert!(matches!(q.num_edges(&ghost), Err(MeshError::ElementNotFound(7))));
    }

    #[test]
    fn centroid_and_edges() {
        let cat = strip(true);
        let q = ElementGraphQuery::new(&cat, QueryConfig::default()).unwrap();
        assert_eq!(q.num_geometry(), 2);
        let second = q.handle(1).unwrap();
        assert_eq!(q.geometry(&second).unwrap(), vec![1.5, 0.5]);
        assert_eq!(q.num_edges(&second).unwrap(), 1);
        assert_eq!(
            q.edges(&second).unwrap(),
            vec![GraphEdge {
                global_id: 100,
                rank: 0,
                weight: 2.0
            }]
        );
    }

    #[test]
    fn uniform_edge_weights_when_disabled() {
        let cat = strip(true);
        let cfg = QueryConfig {
            edge_weights: false,
            ..QueryConfig::default()
        };
        let q = ElementGraphQuery::new(&cat, cfg).unwrap();
        assert_eq!(q.edges_of(0).unwrap()[0].weight, 1.0);
    }

    #[test]
    fn centroid_without_geometry_is_an_error() {
        let cat = strip(false);
        let q = ElementGraphQuery::new(&cat, QueryConfig::default()).unwrap();
        let h = q.first().unwrap();
        assert!(matches!(
            q.geometry(&h),
            Err(MeshError::MissingGeometry { element: 0 })
        ));
    }

    #[test]
    fn config_is_validated() {
        let cat = strip(false);
        let cfg = QueryConfig {
            num_gid_entries: 0,
            ..QueryConfig::default()
        };
        assert!(matches!(
            ElementGraphQuery::new(&cat, cfg),
            Err(MeshError::InvalidConfig(_))
        ));
    }
}
