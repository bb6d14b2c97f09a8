//! stance_core: core types, vocabulary, configuration and rounding helpers.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`stance_algo`, `stance_io`, `stance_pipeline`, `stance_cli`).
//!
//! - Tokens: `PolicyId`, `GroupId`, `ArchetypeId`
//! - Closed vocabularies: `NeedCategory` (5), `Dimension` (4)
//! - Validated values: `Score` (0..=10), `Rating` (-2..=2)
//! - Policy content: `ImpactScore`, `Policy`, `Catalog`
//! - Weighting: `WeightProfile`, archetypes and the frozen `Registry`
//! - Engine configuration (`variables`) with safe defaults
//! - Integer-first percent helpers (`rounding`)
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use thiserror::Error;

    /// Token parsing failures (ids and closed vocabularies).
    #[derive(Clone, Debug, Eq, PartialEq, Error)]
    pub enum CoreError {
        #[error("invalid token: {0:?}")]
        InvalidToken(String),
        #[error("unknown need category: {0:?}")]
        UnknownCategory(String),
        #[error("unknown dimension: {0:?}")]
        UnknownDimension(String),
    }

    /// Engine error taxonomy.
    ///
    /// "No signal yet" is not an error: the preference engine returns `None`
    /// for it, and an empty consensus input yields a zeroed snapshot.
    #[derive(Clone, Debug, PartialEq, Error)]
    pub enum EngineError {
        /// Malformed or empty registry/catalog/config input that leaves a result
        /// undefined in principle.
        #[error("configuration error: {0}")]
        Configuration(String),
        /// A score or rating outside its closed range. Rejected, never clamped.
        #[error("range error: {field} = {value} is outside {min}..={max}")]
        Range {
            field: String,
            value: f64,
            min: f64,
            max: f64,
        },
    }

    impl EngineError {
        pub fn config(msg: impl Into<String>) -> Self {
            EngineError::Configuration(msg.into())
        }

        pub fn range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
            EngineError::Range { field: field.into(), value, min, max }
        }
    }
}

pub mod tokens;
pub mod domain;
pub mod rating;
pub mod weights;
pub mod registry;
pub mod variables;
pub mod rounding;
pub mod outcome;

pub use errors::{CoreError, EngineError};
pub use tokens::{ArchetypeId, GroupId, PolicyId};
pub use domain::{Catalog, CategoryScore, Dimension, ImpactScore, NeedCategory, Policy, Score};
pub use rating::{PopulationRating, Rating, RatingEntry, Stance};
pub use weights::WeightProfile;
pub use registry::{Archetype, ArchetypeRegistry, CategoryInfo, DimensionInfo, Registry, ScaleAnchor};
pub use variables::{ConsensusConfig, EngineConfig, LabelBand, LabelBands, PreferenceConfig};
pub use outcome::{
    ConsensusLevel, ConsensusSnapshot, Counts, Distribution, GroupBreakdown, PreferenceProfile,
    ScoreOutcome,
};

/// Convenience alias used across the engine crates.
pub type EngineResult<T> = Result<T, EngineError>;
