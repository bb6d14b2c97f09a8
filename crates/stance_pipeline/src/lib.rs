//! stance_pipeline: the engine facade.
//!
//! An `Engine` owns a frozen `Registry` and a validated `EngineConfig`, both
//! injected at construction, and orchestrates the pure algorithms in
//! `stance_algo`. It also assembles the display-layer views (the radar
//! comparison and "you vs everyone") from those results.
//!
//! The engine holds no mutable state and no caches; it is `Send + Sync` and
//! may be shared across threads by reference.

#![forbid(unsafe_code)]

pub mod engine;
pub mod view;
pub mod alignment;

pub use alignment::{you_vs_everyone, Alignment, PopulationSummary};
pub use engine::Engine;
pub use view::{ComparisonView, PolicyTrace};

pub use stance_core::{EngineError, EngineResult};
