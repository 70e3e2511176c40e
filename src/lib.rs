#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-dualgraph
//!
//! mesh-dualgraph computes the element adjacency graph (dual graph) of a
//! partitioned finite-element mesh, ready to be handed to a graph or geometric
//! partitioner. Each process owns a subset of the elements; the crate finds,
//! for every owned element, the elements sharing a face with it, whether they
//! live on the same process or across a partition boundary.
//!
//! ## Pipeline
//! 1. Block shapes are reduced over all processes so every process agrees on
//!    the element type of every block.
//! 2. The [`ElementCatalog`](data::ElementCatalog) is built from the raw mesh
//!    arrays.
//! 3. A node-to-element index drives local face adjacency by node-set
//!    intersection and mirrored-side matching.
//! 4. Global element ids are exchanged over the elemental communication maps
//!    to fill the boundary sides.
//! 5. [`ElementGraphQuery`](partitioning::ElementGraphQuery) and
//!    [`DualGraph`](algs::DualGraph) expose the result read-only.
//!
//! [`build_element_graph`](algs::build_element_graph) runs steps 1–4.
//!
//! ## Communication backends
//! - [`NoComm`](algs::communicator::NoComm): a single process.
//! - [`RayonComm`](algs::communicator::RayonComm): several ranks as threads of
//!   one process, for tests.
//! - `MpiComm`: MPI, behind the `mpi-support` feature.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mesh-dualgraph = "0.1"
//! # features = ["mpi-support"]
//! ```
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod mesh_error;
pub mod partitioning;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, GraphCommTags, NoComm, RayonComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::{DualGraph, GraphConfig, build_element_graph};
    pub use crate::data::{
        CommMapArrays, ElementCatalog, ElementRecord, MeshArrays, NeighborId, RawBlock,
        RawElemCommMap,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::{ErrorKind, MeshError};
    pub use crate::partitioning::{ElementGraphQuery, QueryConfig};
    pub use crate::topology::ElementType;
}
