//! crates/stance_io/src/lib.rs
//! Content provider and rating-store adapters for the stance engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Offline only: every input is a local path; URLs are rejected.
//! - Details live in the file modules; this root only wires them together.

#![forbid(unsafe_code)]

use stance_core::EngineError;
use thiserror::Error;

/// Unified error for stance_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON parse or shape errors, with a JSON Pointer when one is known.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeded a size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Manifest shape, offline policy or digest verification failures.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Content that parsed but violates an engine rule (range, duplicates, ...).
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; callers enrich where they can.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, or bare http(s):).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    let t = s.trim();
    t.contains("://") || t.starts_with("http:") || t.starts_with("https:")
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod manifest;

pub use loader::{BundleDigests, ContentBundle, Population};

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json;
    pub use crate::hasher;
    pub use crate::loader;
    pub use crate::manifest;

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{sha256_canonical, sha256_hex};
    pub use crate::loader::{ContentBundle, Population};
}
