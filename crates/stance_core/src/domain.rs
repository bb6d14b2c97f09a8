//! Closed vocabularies and policy content: need categories, dimensions,
//! validated scores, impact assessments and the policy catalog.

use std::collections::BTreeMap;
use core::fmt;
use core::str::FromStr;

use crate::errors::{CoreError, EngineError};
use crate::tokens::PolicyId;

#[cfg(feature = "serde")]
use serde::{de::Error as DeError, de::Unexpected, Deserialize, Deserializer, Serialize};

/* ----------------------------- NeedCategory ----------------------------- */

/// One of the five fixed top-level need categories. Declaration order is the
/// canonical display order (and the `Ord` order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NeedCategory {
    Physiological,
    Safety,
    Community,
    Opportunity,
    #[cfg_attr(feature = "serde", serde(alias = "selfActualization"))]
    SelfActualization,
}

impl NeedCategory {
    pub const ALL: [NeedCategory; 5] = [
        NeedCategory::Physiological,
        NeedCategory::Safety,
        NeedCategory::Community,
        NeedCategory::Opportunity,
        NeedCategory::SelfActualization,
    ];

    /// Wire token.
    pub fn as_str(self) -> &'static str {
        match self {
            NeedCategory::Physiological => "physiological",
            NeedCategory::Safety => "safety",
            NeedCategory::Community => "community",
            NeedCategory::Opportunity => "opportunity",
            NeedCategory::SelfActualization => "self_actualization",
        }
    }
}

impl fmt::Display for NeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeedCategory {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physiological" => Ok(NeedCategory::Physiological),
            "safety" => Ok(NeedCategory::Safety),
            "community" => Ok(NeedCategory::Community),
            "opportunity" => Ok(NeedCategory::Opportunity),
            "self_actualization" | "selfActualization" => Ok(NeedCategory::SelfActualization),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}

/* ------------------------------- Dimension ------------------------------- */

/// One of the four policy-scoring axes, distinct from need categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Dimension {
    #[cfg_attr(feature = "serde", serde(alias = "populationReached"))]
    PopulationReached,
    Essentiality,
    #[cfg_attr(feature = "serde", serde(alias = "timeToOutcome"))]
    TimeToOutcome,
    Feasibility,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::PopulationReached,
        Dimension::Essentiality,
        Dimension::TimeToOutcome,
        Dimension::Feasibility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::PopulationReached => "population_reached",
            Dimension::Essentiality => "essentiality",
            Dimension::TimeToOutcome => "time_to_outcome",
            Dimension::Feasibility => "feasibility",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "population_reached" | "populationReached" => Ok(Dimension::PopulationReached),
            "essentiality" => Ok(Dimension::Essentiality),
            "time_to_outcome" | "timeToOutcome" => Ok(Dimension::TimeToOutcome),
            "feasibility" => Ok(Dimension::Feasibility),
            other => Err(CoreError::UnknownDimension(other.to_string())),
        }
    }
}

/* --------------------------------- Score --------------------------------- */

/// A category or dimension value on the shared 0..=10 scale (5 is neutral).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Score(f64);

impl Score {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 10.0;
    pub const NEUTRAL: f64 = 5.0;

    pub fn new(value: f64) -> Result<Self, EngineError> {
        Self::checked("score", value)
    }

    /// Like `new`, naming the offending field in the error.
    pub fn checked(field: &str, value: f64) -> Result<Self, EngineError> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Score(value))
        } else {
            Err(EngineError::range(field, value, Self::MIN, Self::MAX))
        }
    }

    pub const fn neutral() -> Self {
        Score(Self::NEUTRAL)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Signed distance from the neutral midpoint (-5..=5).
    #[inline]
    pub fn deviation(self) -> f64 {
        self.0 - Self::NEUTRAL
    }
}

impl TryFrom<f64> for Score {
    type Error = EngineError;
    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Score::new(v)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(d)?;
        Score::new(v).map_err(|_| D::Error::invalid_value(Unexpected::Float(v), &"a number in 0..=10"))
    }
}

/* ---------------------------- Impact content ---------------------------- */

/// Score for one need category plus its hand-written rationale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryScore {
    pub value: Score,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rationale: String,
}

impl CategoryScore {
    pub fn new(value: f64, rationale: impl Into<String>) -> Result<Self, EngineError> {
        Ok(CategoryScore { value: Score::new(value)?, rationale: rationale.into() })
    }
}

/// Static impact assessment of one policy. Both maps are partial; absence
/// means "not assessed", never zero.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpactScore {
    #[cfg_attr(feature = "serde", serde(default))]
    categories: BTreeMap<NeedCategory, CategoryScore>,
    #[cfg_attr(feature = "serde", serde(default))]
    dimensions: BTreeMap<Dimension, Score>,
    #[cfg_attr(feature = "serde", serde(default))]
    rationale: String,
}

impl ImpactScore {
    pub fn new(rationale: impl Into<String>) -> Self {
        ImpactScore { rationale: rationale.into(), ..Default::default() }
    }

    /// Builder: attach a category score (range-checked).
    pub fn with_category(
        mut self,
        category: NeedCategory,
        value: f64,
        rationale: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let score = Score::checked(category.as_str(), value)?;
        self.categories.insert(category, CategoryScore { value: score, rationale: rationale.into() });
        Ok(self)
    }

    /// Builder: attach a dimension score (range-checked).
    pub fn with_dimension(mut self, dimension: Dimension, value: f64) -> Result<Self, EngineError> {
        let score = Score::checked(dimension.as_str(), value)?;
        self.dimensions.insert(dimension, score);
        Ok(self)
    }

    pub fn categories(&self) -> &BTreeMap<NeedCategory, CategoryScore> {
        &self.categories
    }

    pub fn dimensions(&self) -> &BTreeMap<Dimension, Score> {
        &self.dimensions
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn category(&self, c: NeedCategory) -> Option<&CategoryScore> {
        self.categories.get(&c)
    }

    pub fn dimension(&self, d: Dimension) -> Option<Score> {
        self.dimensions.get(&d).copied()
    }
}

/// One policy approach with its static impact content.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Policy {
    pub id: PolicyId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    pub impact: ImpactScore,
}

/// Read-only policy catalog keyed by `PolicyId` (stable id order).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Catalog {
    policies: BTreeMap<PolicyId, Policy>,
}

impl Catalog {
    /// Build a catalog; a repeated policy id is a configuration error.
    pub fn from_policies<I: IntoIterator<Item = Policy>>(policies: I) -> Result<Self, EngineError> {
        let mut map = BTreeMap::new();
        for p in policies {
            if map.contains_key(&p.id) {
                return Err(EngineError::config(format!("duplicate policy id {}", p.id)));
            }
            map.insert(p.id.clone(), p);
        }
        Ok(Catalog { policies: map })
    }

    pub fn get(&self, id: &PolicyId) -> Option<&Policy> {
        self.policies.get(id)
    }

    pub fn impact(&self, id: &PolicyId) -> Option<&ImpactScore> {
        self.policies.get(id).map(|p| &p.impact)
    }

    pub fn contains(&self, id: &PolicyId) -> bool {
        self.policies.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
