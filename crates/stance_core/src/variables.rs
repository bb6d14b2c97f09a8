//! Engine configuration: label bands, consensus thresholds and preference
//! coefficients, with safe defaults and explicit validation.
//!
//! Nothing here is read from the environment; the content provider loads an
//! `EngineConfig` (every section optional) and hands it to the engine.

use crate::errors::EngineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ------------------------------ Label bands ------------------------------ */

/// One label band: scores `< upper` (or `<= upper` when `inclusive`) that did
/// not fall into an earlier band receive `label`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelBand {
    pub label: String,
    pub upper: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inclusive: bool,
}

impl LabelBand {
    pub fn new(label: impl Into<String>, upper: f64, inclusive: bool) -> Self {
        LabelBand { label: label.into(), upper, inclusive }
    }

    #[inline]
    fn admits(&self, score: f64) -> bool {
        score < self.upper || (self.inclusive && score == self.upper)
    }
}

/// Ordered, non-overlapping bands covering 0..=10.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<LabelBand>", into = "Vec<LabelBand>"))]
pub struct LabelBands(Vec<LabelBand>);

impl LabelBands {
    pub fn new(bands: Vec<LabelBand>) -> Result<Self, EngineError> {
        if bands.is_empty() {
            return Err(EngineError::config("label bands are empty"));
        }
        let mut prev: Option<&LabelBand> = None;
        for b in &bands {
            if b.label.trim().is_empty() {
                return Err(EngineError::config("label band has an empty label"));
            }
            if !b.upper.is_finite() {
                return Err(EngineError::config(format!("label band {:?} has a non-finite bound", b.label)));
            }
            if let Some(p) = prev {
                // Equal bounds only make sense as "< x" followed by "== x".
                let ordered = b.upper > p.upper || (b.upper == p.upper && !p.inclusive && b.inclusive);
                if !ordered {
                    return Err(EngineError::config(format!(
                        "label band {:?} overlaps or precedes {:?}",
                        b.label, p.label
                    )));
                }
            }
            prev = Some(b);
        }
        if let Some(last) = prev {
            if !last.admits(10.0) {
                return Err(EngineError::config("label bands do not cover a score of 10"));
            }
        }
        Ok(LabelBands(bands))
    }

    /// Label for `score`. Scores past the last band fall back to the last label.
    pub fn classify(&self, score: f64) -> &str {
        self.0
            .iter()
            .find(|b| b.admits(score))
            .or_else(|| self.0.last())
            .map(|b| b.label.as_str())
            .unwrap_or("")
    }

    pub fn bands(&self) -> &[LabelBand] {
        &self.0
    }
}

impl Default for LabelBands {
    fn default() -> Self {
        LabelBands(vec![
            LabelBand::new("extremely harmful", 2.0, true),
            LabelBand::new("very harmful", 3.5, false),
            LabelBand::new("somewhat harmful", 5.0, false),
            LabelBand::new("neutral", 5.0, true),
            LabelBand::new("somewhat beneficial", 6.5, true),
            LabelBand::new("very beneficial", 8.0, false),
            LabelBand::new("extremely beneficial", 10.0, true),
        ])
    }
}

impl TryFrom<Vec<LabelBand>> for LabelBands {
    type Error = EngineError;
    fn try_from(v: Vec<LabelBand>) -> Result<Self, Self::Error> {
        LabelBands::new(v)
    }
}

impl From<LabelBands> for Vec<LabelBand> {
    fn from(b: LabelBands) -> Self {
        b.0
    }
}

/* ------------------------------- Consensus ------------------------------- */

/// Majority thresholds in whole percent: `Strong` at `strong_pct`, `Moderate`
/// at `moderate_pct`, otherwise `Divided`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsensusConfig {
    pub strong_pct: u8,
    pub moderate_pct: u8,
}

impl ConsensusConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.moderate_pct == 0 || self.moderate_pct > self.strong_pct || self.strong_pct > 100 {
            return Err(EngineError::config(format!(
                "consensus thresholds must satisfy 0 < moderate ({}) <= strong ({}) <= 100",
                self.moderate_pct, self.strong_pct
            )));
        }
        Ok(())
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig { strong_pct: 70, moderate_pct: 55 }
    }
}

/* ------------------------------ Preference ------------------------------ */

/// Display range and per-direction coefficients of the preference engine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PreferenceConfig {
    pub display_min: f64,
    pub display_max: f64,
    pub support_weight: f64,
    pub oppose_weight: f64,
}

impl PreferenceConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.display_min.is_finite() || !self.display_max.is_finite() {
            return Err(EngineError::config("preference display range must be finite"));
        }
        if self.display_max <= self.display_min {
            return Err(EngineError::range(
                "preference.display_max",
                self.display_max,
                self.display_min,
                f64::INFINITY,
            ));
        }
        for (name, w) in [("support_weight", self.support_weight), ("oppose_weight", self.oppose_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::config(format!(
                    "preference.{name} must be a finite non-negative number, got {w}"
                )));
            }
        }
        if self.support_weight == 0.0 && self.oppose_weight == 0.0 {
            return Err(EngineError::config("preference coefficients are both zero"));
        }
        Ok(())
    }
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        PreferenceConfig { display_min: 0.0, display_max: 100.0, support_weight: 1.0, oppose_weight: 1.0 }
    }
}

/* --------------------------------- Engine -------------------------------- */

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub labels: LabelBands,
    pub consensus: ConsensusConfig,
    pub preference: PreferenceConfig,
}

impl EngineConfig {
    /// Label bands are validated on construction; this checks the rest.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.consensus.validate()?;
        self.preference.validate()?;
        Ok(())
    }
}
