//! Element-graph algorithms and the communication layer they run on.

pub mod adjacency;
pub mod communicator;
pub mod completion;
pub mod dual_graph;
pub mod element_graph;
pub mod node_elements;
pub mod wire;

pub use adjacency::find_local_adjacency;
pub use dual_graph::DualGraph;
pub use element_graph::{GraphBuildReport, GraphConfig, build_element_graph};
pub use node_elements::NodeElementIndex;
