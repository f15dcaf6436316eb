//! Deferred references between declared infrastructure resources.
//!

pub use stratum_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use stratum_internal::prelude::*;
}
