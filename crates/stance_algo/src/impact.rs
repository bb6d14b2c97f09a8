//! Impact scoring: per-category scores + weight profile → one 0..=10 score and
//! a label.
//!
//! Rules in this layer:
//! - Weights for categories the assessment does not cover are dropped; the
//!   remainder is renormalized to sum to 1.
//! - No categories at all, or zero weight mass over the present ones, is a
//!   configuration error (the result would be undefined, not neutral).
//! - The weighted mean is taken around the neutral midpoint, so an all-5
//!   assessment scores exactly 5 under any profile.
//! - The overall score is snapped to `SNAP_DIGITS` decimals before labelling:
//!   band edges are exact decimals, and float noise must not move a score
//!   across one.

use std::collections::BTreeMap;

use stance_core::{
    EngineError, ImpactScore, LabelBands, NeedCategory, Score, ScoreOutcome, WeightProfile,
};

/// Decimal places kept in `ScoreOutcome::overall`.
pub const SNAP_DIGITS: i32 = 9;

/// Round to `SNAP_DIGITS` decimals, removing accumulated float error.
#[inline]
pub fn snap(x: f64) -> f64 {
    let scale = 10f64.powi(SNAP_DIGITS);
    (x * scale).round() / scale
}

/// Weights renormalized over the categories present in `impact`.
pub fn normalized_weights(
    impact: &ImpactScore,
    weights: &WeightProfile,
) -> Result<BTreeMap<NeedCategory, f64>, EngineError> {
    if impact.categories().is_empty() {
        return Err(EngineError::config("impact assessment has no category scores"));
    }
    let mass: f64 = impact.categories().keys().map(|&c| weights.weight(c)).sum();
    if mass <= 0.0 {
        return Err(EngineError::config(
            "weight profile gives zero weight to every assessed category",
        ));
    }
    Ok(impact
        .categories()
        .keys()
        .map(|&c| (c, weights.weight(c) / mass))
        .collect())
}

/// Weighted overall score and label for one assessment.
pub fn score(
    impact: &ImpactScore,
    weights: &WeightProfile,
    bands: &LabelBands,
) -> Result<ScoreOutcome, EngineError> {
    let weights_used = normalized_weights(impact, weights)?;

    let deviation: f64 = impact
        .categories()
        .iter()
        .map(|(c, cs)| weights_used.get(c).copied().unwrap_or(0.0) * cs.value.deviation())
        .sum();
    let overall = snap(Score::NEUTRAL + deviation).clamp(Score::MIN, Score::MAX);

    Ok(ScoreOutcome {
        overall,
        label: bands.classify(overall).to_string(),
        weights_used,
    })
}
