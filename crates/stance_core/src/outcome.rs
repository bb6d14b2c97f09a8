//! Derived results. These are produced by the algorithms, never loaded, so
//! they only serialize.

use std::collections::BTreeMap;

use crate::domain::{Dimension, NeedCategory};
use crate::rating::Stance;
use crate::tokens::GroupId;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Weighted 0..=10 score of one policy plus its qualitative label.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScoreOutcome {
    pub overall: f64,
    pub label: String,
    /// Normalized weights actually applied (present categories only).
    pub weights_used: BTreeMap<NeedCategory, f64>,
}

/// Continuous per-dimension profile inferred from a rater's ratings, on the
/// configured display scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PreferenceProfile {
    pub values: BTreeMap<Dimension, f64>,
    pub contributing_policies: usize,
    pub signal_weight: f64,
}

impl PreferenceProfile {
    pub fn value(&self, d: Dimension) -> Option<f64> {
        self.values.get(&d).copied()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Distribution {
    pub support: u8,
    pub neutral: u8,
    pub oppose: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Counts {
    pub support: u64,
    pub neutral: u64,
    pub oppose: u64,
}

impl Counts {
    pub fn total(&self) -> u64 {
        self.support + self.neutral + self.oppose
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GroupBreakdown {
    pub support: u8,
    pub oppose: u8,
    pub participants: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConsensusLevel {
    Strong,
    Moderate,
    Divided,
}

/// Population statistics for one policy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConsensusSnapshot {
    pub support_percent: u8,
    pub oppose_percent: u8,
    pub distribution: Distribution,
    pub total_participants: u64,
    pub counts: Counts,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub by_group: Option<BTreeMap<GroupId, GroupBreakdown>>,
    pub consensus_level: ConsensusLevel,
    pub majority: Option<Stance>,
}

impl ConsensusSnapshot {
    /// Snapshot of an empty population.
    pub fn empty() -> Self {
        ConsensusSnapshot {
            support_percent: 0,
            oppose_percent: 0,
            distribution: Distribution::default(),
            total_participants: 0,
            counts: Counts::default(),
            by_group: None,
            consensus_level: ConsensusLevel::Divided,
            majority: None,
        }
    }

    pub fn percent_of(&self, stance: Stance) -> u8 {
        match stance {
            Stance::Support => self.distribution.support,
            Stance::Neutral => self.distribution.neutral,
            Stance::Oppose => self.distribution.oppose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_zeroed_and_divided() {
        let s = ConsensusSnapshot::empty();
        assert_eq!(s.total_participants, 0);
        assert_eq!(s.counts.total(), 0);
        assert_eq!(s.consensus_level, ConsensusLevel::Divided);
        assert!(s.majority.is_none());
        assert_eq!(s.percent_of(Stance::Neutral), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_snake_case_and_omits_missing_groups() {
        let v = serde_json::to_value(ConsensusSnapshot::empty()).unwrap();
        assert_eq!(v["consensus_level"], "divided");
        assert!(v.get("by_group").is_none());
        assert!(v["majority"].is_null());
    }
}
