//! Structural invariant checks for the element graph.
//!
//! `validate_invariants` is always available and returns the first broken
//! invariant. `debug_assert_invariants` panics on it, but only in debug
//! builds or with the `strict-invariants` / `check-invariants` features.

use crate::mesh_error::MeshError;

/// Types whose internal consistency can be checked after each mutation phase.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshError>;

    /// Panic on a broken invariant when invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), std::any::type_name::<Self>());
    }
}

/// Run a fallible check and panic on error when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $ctx:expr) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!("[invariants] {}: {}", $ctx, e);
        }
    };
}
