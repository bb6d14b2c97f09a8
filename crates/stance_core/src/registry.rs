//! Category/dimension registry and the archetype (named weight profile) set.
//!
//! A `Registry` is built once at start-up and never mutated afterwards; it is
//! handed to the engine as an explicit constructor argument.

use std::collections::BTreeMap;

use crate::domain::{Dimension, NeedCategory};
use crate::errors::EngineError;
use crate::tokens::ArchetypeId;
use crate::weights::{WeightProfile, DEFAULT_WEIGHTS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Human-readable text pinned to a point on the 0..=10 scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleAnchor {
    pub value: f64,
    pub text: String,
}

fn anchors(low: &str, mid: &str, high: &str) -> Vec<ScaleAnchor> {
    vec![
        ScaleAnchor { value: 0.0, text: low.to_string() },
        ScaleAnchor { value: 5.0, text: mid.to_string() },
        ScaleAnchor { value: 10.0, text: high.to_string() },
    ]
}

/// Highest anchor at or below `value` (anchors are kept sorted ascending).
fn anchor_at(anchors: &[ScaleAnchor], value: f64) -> Option<&ScaleAnchor> {
    anchors.iter().rev().find(|a| a.value <= value)
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CategoryInfo {
    pub category: NeedCategory,
    pub name: String,
    pub description: String,
    pub default_weight: f64,
    pub anchors: Vec<ScaleAnchor>,
}

impl CategoryInfo {
    pub fn describe(&self, value: f64) -> Option<&str> {
        anchor_at(&self.anchors, value).map(|a| a.text.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DimensionInfo {
    pub dimension: Dimension,
    pub name: String,
    pub description: String,
    pub anchors: Vec<ScaleAnchor>,
}

impl DimensionInfo {
    pub fn describe(&self, value: f64) -> Option<&str> {
        anchor_at(&self.anchors, value).map(|a| a.text.as_str())
    }
}

/* ------------------------------ Archetypes ------------------------------ */

/// A named alternative weight profile ("survivalist", "idealist", ...).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Archetype {
    pub id: ArchetypeId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub weights: WeightProfile,
}

/// Immutable set of archetypes, looked up by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArchetypeRegistry {
    by_id: BTreeMap<ArchetypeId, Archetype>,
}

impl ArchetypeRegistry {
    /// Build from a list; duplicate ids are a configuration error.
    pub fn new<I: IntoIterator<Item = Archetype>>(archetypes: I) -> Result<Self, EngineError> {
        let mut by_id = BTreeMap::new();
        for a in archetypes {
            if by_id.contains_key(&a.id) {
                return Err(EngineError::config(format!("duplicate archetype id {}", a.id)));
            }
            by_id.insert(a.id.clone(), a);
        }
        Ok(ArchetypeRegistry { by_id })
    }

    /// The six built-in archetypes. Fails only if the static tables are malformed.
    pub fn builtin() -> Result<Self, EngineError> {
        let archetypes = BUILTIN_ARCHETYPES
            .iter()
            .map(|(id, name, description, weights)| {
                let id: ArchetypeId = id
                    .parse()
                    .map_err(|e| EngineError::config(format!("built-in archetype {id}: {e}")))?;
                let weights =
                    WeightProfile::from_pairs(NeedCategory::ALL.iter().copied().zip(weights.iter().copied()))?;
                Ok(Archetype { id, name: name.to_string(), description: description.to_string(), weights })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        ArchetypeRegistry::new(archetypes)
    }

    pub fn get(&self, id: &ArchetypeId) -> Result<&Archetype, EngineError> {
        self.by_id
            .get(id)
            .ok_or_else(|| EngineError::config(format!("unknown archetype {id}")))
    }

    /// Owned copy of an archetype's weights, for seeding a personal profile.
    pub fn seed(&self, id: &ArchetypeId) -> Result<WeightProfile, EngineError> {
        self.get(id).map(|a| a.weights.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// (id, name, description, weights in `NeedCategory::ALL` order)
const BUILTIN_ARCHETYPES: [(&str, &str, &str, [f64; 5]); 6] = [
    (
        "balanced",
        "Balanced",
        "The default weighting across all five needs.",
        [0.25, 0.30, 0.15, 0.20, 0.10],
    ),
    (
        "survivalist",
        "Survivalist",
        "Food, shelter and health come first; everything else is secondary.",
        [0.40, 0.35, 0.10, 0.10, 0.05],
    ),
    (
        "guardian",
        "Guardian",
        "Security and stability above all.",
        [0.20, 0.45, 0.15, 0.15, 0.05],
    ),
    (
        "communitarian",
        "Communitarian",
        "Belonging and mutual support define a good society.",
        [0.15, 0.15, 0.40, 0.15, 0.15],
    ),
    (
        "striver",
        "Striver",
        "Open doors and fair chances matter most.",
        [0.10, 0.15, 0.10, 0.45, 0.20],
    ),
    (
        "idealist",
        "Idealist",
        "Policies should let people become who they want to be.",
        [0.10, 0.10, 0.20, 0.20, 0.40],
    ),
];

/* ------------------------------- Registry ------------------------------- */

/// Frozen vocabulary: category and dimension metadata, the default weight
/// profile and the archetype set.
#[derive(Clone, Debug, PartialEq)]
pub struct Registry {
    categories: Vec<CategoryInfo>,
    dimensions: Vec<DimensionInfo>,
    default_weights: WeightProfile,
    archetypes: ArchetypeRegistry,
}

impl Registry {
    pub fn builtin() -> Result<Self, EngineError> {
        let categories = NeedCategory::ALL
            .iter()
            .zip(DEFAULT_WEIGHTS.iter())
            .map(|(&c, &(_, w))| {
                let (name, description) = category_text(c);
                CategoryInfo {
                    category: c,
                    name: name.to_string(),
                    description: description.to_string(),
                    default_weight: w,
                    anchors: anchors("maximally harmful", "neutral", "maximally beneficial"),
                }
            })
            .collect();

        let dimensions = Dimension::ALL
            .iter()
            .map(|&d| {
                let (name, description, low, mid, high) = dimension_text(d);
                DimensionInfo {
                    dimension: d,
                    name: name.to_string(),
                    description: description.to_string(),
                    anchors: anchors(low, mid, high),
                }
            })
            .collect();

        Ok(Registry {
            categories,
            dimensions,
            default_weights: WeightProfile::default(),
            archetypes: ArchetypeRegistry::builtin()?,
        })
    }

    /// Same vocabulary with a content-provider supplied archetype set.
    pub fn with_archetypes(mut self, archetypes: ArchetypeRegistry) -> Self {
        self.archetypes = archetypes;
        self
    }

    pub fn category(&self, c: NeedCategory) -> &CategoryInfo {
        // `categories` always holds one entry per variant in `ALL` order.
        &self.categories[NeedCategory::ALL.iter().position(|&x| x == c).unwrap_or(0)]
    }

    pub fn dimension(&self, d: Dimension) -> &DimensionInfo {
        &self.dimensions[Dimension::ALL.iter().position(|&x| x == d).unwrap_or(0)]
    }

    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn dimensions(&self) -> &[DimensionInfo] {
        &self.dimensions
    }

    pub fn default_weights(&self) -> &WeightProfile {
        &self.default_weights
    }

    pub fn archetypes(&self) -> &ArchetypeRegistry {
        &self.archetypes
    }
}

fn category_text(c: NeedCategory) -> (&'static str, &'static str) {
    match c {
        NeedCategory::Physiological => ("Physiological", "Food, water, shelter, health and rest."),
        NeedCategory::Safety => ("Safety", "Personal security, stability, protection from harm."),
        NeedCategory::Community => ("Community", "Belonging, relationships, civic participation."),
        NeedCategory::Opportunity => ("Opportunity", "Education, work, mobility and fair access."),
        NeedCategory::SelfActualization => ("Self-actualization", "Autonomy, purpose, creativity and growth."),
    }
}

fn dimension_text(d: Dimension) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
    match d {
        Dimension::PopulationReached => (
            "Population reached",
            "How many people the policy affects.",
            "reaches almost no one",
            "reaches a sizeable share",
            "reaches nearly everyone",
        ),
        Dimension::Essentiality => (
            "Essentiality",
            "How essential the affected need is to survival.",
            "irrelevant to survival",
            "supports wellbeing",
            "essential to survival",
        ),
        Dimension::TimeToOutcome => (
            "Time to outcome",
            "How quickly benefits materialize (higher is faster).",
            "outcomes take generations",
            "outcomes within years",
            "immediate outcomes",
        ),
        Dimension::Feasibility => (
            "Feasibility",
            "How practical the policy is to enact and sustain.",
            "practically impossible",
            "achievable with broad effort",
            "readily achievable",
        ),
    }
}
