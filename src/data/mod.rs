//! Data module: raw mesh input and the element catalog built from it.

pub mod block;
pub mod catalog;
pub mod comm_map;
pub mod element;
pub mod mesh_arrays;

pub use block::{BlockInfo, BlockShape};
pub use catalog::ElementCatalog;
pub use comm_map::{CommMapArrays, CommMapEntry, ElemCommMap, LoadBalanceParams, RawElemCommMap};
pub use element::{Adjacency, ElementRecord, NeighborId};
pub use mesh_arrays::{MeshArrays, RawBlock};
