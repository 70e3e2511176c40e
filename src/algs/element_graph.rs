//! End-to-end build of the element adjacency graph on one process.

use crate::algs::adjacency::{LocalAdjacencyStats, find_local_adjacency};
use crate::algs::communicator::{CommTag, Communicator, GraphCommTags};
use crate::algs::completion::{CompletionStats, all_reduce_block_shapes, resolve_remote_adjacency};
use crate::algs::node_elements::{LIST_ALLOC, NodeElementIndex};
use crate::data::catalog::ElementCatalog;
use crate::data::comm_map::CommMapArrays;
use crate::data::mesh_arrays::MeshArrays;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;

/// Settings of [`build_element_graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphConfig {
    /// Base of the message tags; the pipeline uses three consecutive tags.
    pub tag_base: CommTag,
    /// Growth step of the node-to-element lists.
    pub list_increment: usize,
    /// Validate catalog invariants after every phase (always done once at the end).
    pub check_invariants: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tag_base: GraphCommTags::default().handshake,
            list_increment: LIST_ALLOC,
            check_invariants: cfg!(any(debug_assertions, feature = "check-invariants")),
        }
    }
}

impl GraphConfig {
    pub fn tags(&self) -> GraphCommTags {
        GraphCommTags::from_base(self.tag_base)
    }
}

/// What [`build_element_graph`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphBuildReport {
    pub border_elements: usize,
    pub max_incidence: usize,
    pub local: LocalAdjacencyStats,
    pub remote: CompletionStats,
}

/// Build the adjacency-complete catalog of this process.
///
/// Runs block-shape reduction, catalog construction, border flagging, the
/// node-to-element index, local inference and cross-process resolution, then
/// validates the catalog invariants. Every process of `comm` must call this
/// collectively.
pub fn build_element_graph<C: Communicator>(
    mesh: &MeshArrays,
    maps: &CommMapArrays,
    comm: &C,
    config: &GraphConfig,
) -> Result<(ElementCatalog, GraphBuildReport), MeshError> {
    let rank = comm.rank();
    let tags = config.tags();

    let local_shapes = mesh.local_block_shapes()?;
    let shapes = all_reduce_block_shapes(comm, tags.reduce, &local_shapes)?;

    let mut catalog = ElementCatalog::from_arrays(rank, mesh, &shapes)?;
    let border_elements = catalog.apply_border_flags(maps)?;
    let comm_maps = maps.elem_comm_maps(catalog.len())?;
    check(&catalog, config, "after load")?;

    let index = NodeElementIndex::build_with_increment(&catalog, config.list_increment)?;
    let local = find_local_adjacency(&mut catalog, &index)?;
    let max_incidence = index.max_incidence();
    drop(index);
    check(&catalog, config, "after local adjacency")?;

    let remote = resolve_remote_adjacency(&mut catalog, &comm_maps, comm, &tags)?;
    catalog.validate_invariants()?;

    log::info!(
        "[rank {rank}] element graph: {} elements, {} local + {} remote adjacencies",
        catalog.len(),
        local.filled,
        remote.sides
    );
    Ok((
        catalog,
        GraphBuildReport {
            border_elements,
            max_incidence,
            local,
            remote,
        },
    ))
}

fn check(catalog: &ElementCatalog, config: &GraphConfig, phase: &str) -> Result<(), MeshError> {
    if config.check_invariants {
        catalog.validate_invariants().map_err(|e| {
            log::error!("[rank {}] invariants broken {phase}: {e}", catalog.rank());
            e
        })?;
    }
    Ok(())
}
