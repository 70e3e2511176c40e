//! Cross-process phases of the element-graph build.
pub mod adjacency_completion;
pub mod block_reduction;
pub mod peer_exchange;

pub use adjacency_completion::{CompletionStats, resolve_remote_adjacency};
pub use block_reduction::all_reduce_block_shapes;
pub use peer_exchange::{exchange_global_ids, exchange_with_peer, handshake};
