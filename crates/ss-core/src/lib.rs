//! ss-core: stable foundation for surgestat.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for mesh nodes and storm runs)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{SsError, SsResult};
pub use ids::*;
pub use numeric::*;
