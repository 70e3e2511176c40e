//! Elemental communication maps between process pairs.
//!
//! By convention the identifier of a map is the rank of the process on the
//! other side. Entries of the two maps describing one process pair are listed
//! in the same logical side order on both processes.

use crate::mesh_error::MeshError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Load-balance parameters of one process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalanceParams {
    pub internal_nodes: usize,
    pub border_nodes: usize,
    pub external_nodes: usize,
    pub internal_elements: usize,
    pub border_elements: usize,
    pub node_maps: usize,
    pub elem_maps: usize,
}

/// Raw elemental map as read from the file (1-based element and side ids).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawElemCommMap {
    /// Map id; the neighbor's rank.
    pub id: usize,
    pub element_ids: Vec<usize>,
    pub side_ids: Vec<usize>,
}

/// Communication-map arrays of one process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommMapArrays {
    pub params: LoadBalanceParams,
    /// 1-based ids of elements touching no other process.
    pub internal_elements: Vec<usize>,
    /// 1-based ids of elements touching another process.
    pub border_elements: Vec<usize>,
    pub elem_maps: Vec<RawElemCommMap>,
}

/// One boundary side: a local element and one of its sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommMapEntry {
    /// 0-based local element index.
    pub element: usize,
    /// 1-based side id.
    pub side: usize,
}

/// The boundary sides shared with one neighbor process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElemCommMap {
    pub neighbor: usize,
    pub entries: Vec<CommMapEntry>,
}

impl CommMapArrays {
    /// Arrays for a process that shares no boundary with anybody.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check the element lists and maps against the load-balance parameters.
    pub fn validate(&self) -> Result<(), MeshError> {
        let p = &self.params;
        if self.internal_elements.len() != p.internal_elements {
            return Err(MeshError::CommMapParams(format!(
                "{} internal elements listed, parameters say {}",
                self.internal_elements.len(),
                p.internal_elements
            )));
        }
        if self.border_elements.len() != p.border_elements {
            return Err(MeshError::CommMapParams(format!(
                "{} border elements listed, parameters say {}",
                self.border_elements.len(),
                p.border_elements
            )));
        }
        if self.elem_maps.len() != p.elem_maps {
            return Err(MeshError::CommMapParams(format!(
                "{} elemental maps supplied, parameters say {}",
                self.elem_maps.len(),
                p.elem_maps
            )));
        }
        for m in &self.elem_maps {
            if m.element_ids.len() != m.side_ids.len() {
                return Err(MeshError::CommMapParams(format!(
                    "map {}: {} element ids but {} side ids",
                    m.id,
                    m.element_ids.len(),
                    m.side_ids.len()
                )));
            }
        }
        if let Some(dup) = self.elem_maps.iter().map(|m| m.id).duplicates().next() {
            return Err(MeshError::CommMapParams(format!(
                "two elemental maps for rank {dup}"
            )));
        }
        Ok(())
    }

    /// Convert the raw maps to 0-based element indices, ordered by neighbor
    /// rank. Every process must walk its maps in this order.
    pub fn elem_comm_maps(&self, num_elements: usize) -> Result<Vec<ElemCommMap>, MeshError> {
        self.validate()?;
        self.elem_maps
            .iter()
            .sorted_by_key(|m| m.id)
            .map(|m| {
                let entries = m
                    .element_ids
                    .iter()
                    .zip(&m.side_ids)
                    .map(|(&e, &side)| {
                        let element = to_local(e, num_elements)?;
                        Ok(CommMapEntry { element, side })
                    })
                    .collect::<Result<Vec<_>, MeshError>>()?;
                Ok(ElemCommMap {
                    neighbor: m.id,
                    entries,
                })
            })
            .collect()
    }

    /// 0-based border element indices.
    pub fn border_element_indices(&self, num_elements: usize) -> Result<Vec<usize>, MeshError> {
        self.border_elements
            .iter()
            .map(|&e| to_local(e, num_elements))
            .collect()
    }
}

fn to_local(id: usize, num_elements: usize) -> Result<usize, MeshError> {
    id.checked_sub(1)
        .filter(|&e| e < num_elements)
        .ok_or(MeshError::ElementOutOfRange {
            element: id,
            num_elements,
        })
}
