//! Per-category weight profiles.
//!
//! Weights need not sum to 1: the impact scorer renormalizes them over the
//! categories actually present in a given assessment. A profile is immutable;
//! `with_weight` returns an edited copy (copy-on-write for callers that let a
//! user tweak a seeded profile).

use std::collections::BTreeMap;

use crate::domain::NeedCategory;
use crate::errors::EngineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default weights, in `NeedCategory::ALL` order.
pub const DEFAULT_WEIGHTS: [(NeedCategory, f64); 5] = [
    (NeedCategory::Physiological, 0.25),
    (NeedCategory::Safety, 0.30),
    (NeedCategory::Community, 0.15),
    (NeedCategory::Opportunity, 0.20),
    (NeedCategory::SelfActualization, 0.10),
];

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "BTreeMap<NeedCategory, f64>", into = "BTreeMap<NeedCategory, f64>")
)]
pub struct WeightProfile(BTreeMap<NeedCategory, f64>);

impl WeightProfile {
    /// Validate and wrap a weight map: every weight finite and ≥ 0, at least
    /// one strictly positive.
    pub fn new(weights: BTreeMap<NeedCategory, f64>) -> Result<Self, EngineError> {
        for (c, &w) in &weights {
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::config(format!(
                    "weight for {c} must be a finite non-negative number, got {w}"
                )));
            }
        }
        if !weights.values().any(|&w| w > 0.0) {
            return Err(EngineError::config("weight profile has no positive weight"));
        }
        Ok(WeightProfile(weights))
    }

    pub fn from_pairs<I: IntoIterator<Item = (NeedCategory, f64)>>(pairs: I) -> Result<Self, EngineError> {
        Self::new(pairs.into_iter().collect())
    }

    /// Raw (un-normalized) weight; absent categories weigh 0.
    pub fn weight(&self, c: NeedCategory) -> f64 {
        self.0.get(&c).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NeedCategory, f64)> + '_ {
        self.0.iter().map(|(c, w)| (*c, *w))
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Copy of this profile with one weight replaced.
    pub fn with_weight(&self, c: NeedCategory, w: f64) -> Result<Self, EngineError> {
        let mut next = self.0.clone();
        next.insert(c, w);
        Self::new(next)
    }

    pub fn as_map(&self) -> &BTreeMap<NeedCategory, f64> {
        &self.0
    }
}

impl Default for WeightProfile {
    fn default() -> Self {
        WeightProfile(DEFAULT_WEIGHTS.iter().copied().collect())
    }
}

impl TryFrom<BTreeMap<NeedCategory, f64>> for WeightProfile {
    type Error = EngineError;
    fn try_from(m: BTreeMap<NeedCategory, f64>) -> Result<Self, Self::Error> {
        WeightProfile::new(m)
    }
}

impl From<WeightProfile> for BTreeMap<NeedCategory, f64> {
    fn from(w: WeightProfile) -> Self {
        w.0
    }
}
