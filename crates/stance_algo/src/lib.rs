// crates/stance_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure algorithms over `stance_core` types. No I/O, no logging, no caches:
//! every entry point is a deterministic function of its arguments.

pub mod impact;
pub mod preference;
pub mod consensus;

// Convenience re-exports (pipeline imports these from crate root)
pub use consensus::aggregate;
pub use impact::{normalized_weights, score};
pub use preference::{infer, rescale_dimension};
