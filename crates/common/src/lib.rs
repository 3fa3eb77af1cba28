//! Crate includes reusable utils shared by the deposit crates and binaries, such as initializing
//! the tracing framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
