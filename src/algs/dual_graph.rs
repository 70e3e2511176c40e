//! Distributed CSR (compressed-sparse-row) export of the element graph.
//
// Each locally owned element is a vertex, each populated adjacency slot an
// edge. Neighbors are named by global element id so the rows of all processes
// together describe one distributed graph:
//
// * `xadj[i] .. xadj[i+1]`   = neighbour range of element *i*
// * `adjncy`                 = concatenated neighbour global ids
// * `adjwgt`                 = shared side node counts, parallel to `adjncy`
// * `owners`                 = owning rank of each neighbour, parallel to `adjncy`
// * `vwgt[i]`                = element cpu weight
//
// Rows list neighbours in side order and never contain the element itself.

use crate::data::catalog::ElementCatalog;
use crate::mesh_error::MeshError;

/// CSR view of one process's part of the element graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DualGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<u64>,
    pub adjwgt: Vec<f32>,
    pub owners: Vec<usize>,
    pub vwgt: Vec<f32>,
    /// Global id of each row's element.
    pub vertex_ids: Vec<u64>,
}

impl DualGraph {
    /// Build the CSR rows for every element of `catalog`.
    pub fn from_catalog(catalog: &ElementCatalog) -> Result<Self, MeshError> {
        let n = catalog.len();
        let nnz: usize = catalog.elements().iter().map(|e| e.neighbor_count()).sum();

        let mut xadj = Vec::with_capacity(n + 1);
        let mut adjncy = Vec::new();
        adjncy
            .try_reserve_exact(nnz)
            .map_err(|e| MeshError::exhausted("allocating CSR adjacency", e))?;
        let mut adjwgt = Vec::with_capacity(nnz);
        let mut owners = Vec::with_capacity(nnz);

        xadj.push(0);
        for (i, element) in catalog.elements().iter().enumerate() {
            for (side, adj) in element.neighbors() {
                let gid = catalog.neighbor_global_id(adj.neighbor).ok_or_else(|| {
                    MeshError::InvariantViolation(format!(
                        "element {i} side {side}: neighbor {:?} not in catalog",
                        adj.neighbor
                    ))
                })?;
                adjncy.push(gid);
                adjwgt.push(adj.edge_weight);
                owners.push(adj.owner);
            }
            xadj.push(adjncy.len());
        }

        Ok(DualGraph {
            xadj,
            adjncy,
            adjwgt,
            owners,
            vwgt: catalog.elements().iter().map(|e| e.cpu_weight).collect(),
            vertex_ids: catalog.elements().iter().map(|e| e.global_id).collect(),
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.xadj.len().saturating_sub(1)
    }

    /// Number of directed edges stored (each local pair appears twice).
    pub fn num_edges(&self) -> usize {
        self.adjncy.len()
    }

    /// Neighbour global ids of row `i`.
    pub fn neighbors(&self, i: usize) -> &[u64] {
        match (self.xadj.get(i), self.xadj.get(i + 1)) {
            (Some(&a), Some(&b)) => &self.adjncy[a..b],
            _ => &[],
        }
    }

    /// `true` when every edge between two rows of this graph appears in both
    /// rows with the same weight. Edges to other processes are not checked.
    pub fn is_locally_symmetric(&self) -> bool {
        let row_of = |gid: u64| self.vertex_ids.iter().position(|&v| v == gid);
        (0..self.num_vertices()).all(|u| {
            (self.xadj[u]..self.xadj[u + 1]).all(|k| {
                let Some(v) = row_of(self.adjncy[k]) else {
                    return true;
                };
                (self.xadj[v]..self.xadj[v + 1]).any(|j| {
                    self.adjncy[j] == self.vertex_ids[u] && self.adjwgt[j] == self.adjwgt[k]
                })
            })
        })
    }
}
