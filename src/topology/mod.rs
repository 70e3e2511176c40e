//! Element topology: types, sides and side matching.

pub mod element_type;

pub use element_type::{ElementType, SideMatch, SideShape};
