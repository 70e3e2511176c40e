//! MeshError: unified error type for mesh-dualgraph public APIs
//!
//! Every component-level operation returns `Result<_, MeshError>`. None of these
//! errors are recoverable at this layer: the caller is expected to abort the
//! whole distributed run. "No neighbor across a side" is *not* an error and is
//! represented by an empty adjacency slot instead.

use std::collections::TryReserveError;
use thiserror::Error;

/// Coarse classification of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An allocation failed.
    ResourceExhaustion,
    /// The input mesh or a communication map is malformed.
    StructuralInconsistency,
    /// A peer message was missing or malformed.
    Communication,
    /// A partitioner query could not be answered.
    Query,
}

/// Unified error type for mesh-dualgraph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Memory could not be reserved.
    #[error("allocation failed while {context}: {source}")]
    ResourceExhaustion {
        context: &'static str,
        #[source]
        source: TryReserveError,
    },
    /// A block's type name / node count / dimension combination is not supported.
    #[error("unknown element type `{name}` with {nodes} nodes in {dimension}-D")]
    UnknownElementType {
        name: String,
        nodes: usize,
        dimension: usize,
    },
    /// A block's connectivity table does not have `count * nodes_per_element` entries.
    #[error("block {block}: connectivity has {found} entries, expected {expected}")]
    ConnectivityLength {
        block: usize,
        expected: usize,
        found: usize,
    },
    /// A mesh input array has the wrong length.
    #[error("mesh input `{what}` has length {found}, expected {expected}")]
    InputLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// The number of blocks differs between processes or between input and reduced shapes.
    #[error("block count mismatch: expected {expected}, found {found}")]
    BlockCountMismatch { expected: usize, found: usize },
    /// Connectivity references a node outside the local node range.
    #[error("element {element}: node {node} out of range (num_nodes = {num_nodes})")]
    NodeOutOfRange {
        element: usize,
        node: usize,
        num_nodes: usize,
    },
    /// A communication map or element list references an element outside the catalog.
    #[error("element {element} out of range (num_elements = {num_elements})")]
    ElementOutOfRange { element: usize, num_elements: usize },
    /// A side id outside `1..=sides` for the element's type.
    #[error("element {element}: side {side} invalid, element has {sides} sides")]
    InvalidSide {
        element: usize,
        side: usize,
        sides: usize,
    },
    /// A candidate neighbor holds the face with the same orientation (inverted element).
    #[error("element {element} side {side}: neighbor {neighbor} shares the face with inverted orientation")]
    InvertedSide {
        element: usize,
        side: usize,
        neighbor: usize,
    },
    /// A communication map claims more adjacencies than the element has sides.
    #[error("element {element}: adjacency overflow on side {side} ({neighbor_count} neighbors, {sides} sides)")]
    AdjacencyOverflow {
        element: usize,
        side: usize,
        neighbor_count: usize,
        sides: usize,
    },
    /// A communication map names a side that already has a neighbor.
    #[error("element {element}: side {side} already has a neighbor")]
    SideAlreadyResolved { element: usize, side: usize },
    /// Load-balance parameters disagree with the supplied element lists or maps.
    #[error("communication map parameters inconsistent: {0}")]
    CommMapParams(String),
    /// `neighbor_count` no longer matches the populated adjacency slots.
    #[error("element {element}: neighbor_count {neighbor_count} but {populated} populated slots")]
    NeighborCountMismatch {
        element: usize,
        neighbor_count: usize,
        populated: usize,
    },
    /// Any other broken catalog invariant.
    #[error("catalog invariant violated: {0}")]
    InvariantViolation(String),
    /// Point-to-point communication with a neighbor failed.
    #[error("communication with rank {neighbor} failed: {message}")]
    CommError { neighbor: usize, message: String },
    /// Centroid requested for an element with no coordinate data.
    #[error("element {element} has no geometry loaded")]
    MissingGeometry { element: usize },
    /// Global id lookup found no element.
    #[error("no element with global id {0}")]
    ElementNotFound(u64),
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MeshError {
    /// Wrap a failed reservation.
    pub fn exhausted(context: &'static str, source: TryReserveError) -> Self {
        MeshError::ResourceExhaustion { context, source }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::ResourceExhaustion { .. } => ErrorKind::ResourceExhaustion,
            MeshError::CommError { .. } => ErrorKind::Communication,
            MeshError::MissingGeometry { .. }
            | MeshError::ElementNotFound(_)
            | MeshError::InvalidConfig(_) => ErrorKind::Query,
            _ => ErrorKind::StructuralInconsistency,
        }
    }

    /// `true` for malformed-mesh / malformed-map errors.
    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::StructuralInconsistency
    }
}
