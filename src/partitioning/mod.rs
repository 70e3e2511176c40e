//! Partitioner-facing views of the finished element graph.

pub mod query;

pub use query::{ElementGraphQuery, GraphEdge, ObjectHandle, QueryConfig};
