//! Preference inference: a rater's sparse -2..=2 ratings → a continuous
//! per-dimension profile on the same axes as policy dimension vectors.
//!
//! Each non-neutral rating pulls the profile toward (support) or away from
//! (oppose) the rated policy's dimension vector, in proportion to its
//! magnitude:
//!
//! ```text
//! w     = |r| × (support_weight | oppose_weight)
//! dev_d = Σ sign(r)·w·(s_d − 5) / Σ w      (over contributors scoring d)
//! value = rescale(5 + dev_d)
//! ```
//!
//! A lone +2 therefore reproduces the policy's vector and a lone −2 mirrors
//! it about the midpoint. Neutral ratings, ids missing from the catalog and
//! policies without dimension scores carry no signal; when nothing carries
//! signal the result is `None`.

use std::collections::BTreeMap;

use stance_core::{
    Catalog, Dimension, PolicyId, PreferenceConfig, PreferenceProfile, Rating, RatingEntry, Score,
};

/// Collapse a rating sequence to one rating per policy; later rows win.
pub fn collapse(ratings: &[RatingEntry]) -> BTreeMap<&PolicyId, Rating> {
    let mut out = BTreeMap::new();
    for e in ratings {
        out.insert(&e.policy_id, e.rating);
    }
    out
}

/// Linear map of a 0..=10 value onto the configured display range.
#[inline]
pub fn rescale_dimension(value: f64, cfg: &PreferenceConfig) -> f64 {
    let t = (value - Score::MIN) / (Score::MAX - Score::MIN);
    cfg.display_min + t * (cfg.display_max - cfg.display_min)
}

/// Infer a preference profile, or `None` when the ratings carry no signal.
pub fn infer(
    ratings: &[RatingEntry],
    catalog: &Catalog,
    cfg: &PreferenceConfig,
) -> Option<PreferenceProfile> {
    // Per dimension: (Σ sign·w·dev, Σ w)
    let mut acc: BTreeMap<Dimension, (f64, f64)> = BTreeMap::new();
    let mut contributing = 0usize;
    let mut signal = 0.0f64;

    for (id, rating) in collapse(ratings) {
        if rating.is_neutral() {
            continue;
        }
        let Some(impact) = catalog.impact(id) else {
            continue;
        };
        if impact.dimensions().is_empty() {
            continue;
        }
        let coeff = if rating.is_support() { cfg.support_weight } else { cfg.oppose_weight };
        let w = rating.magnitude() as f64 * coeff;
        if w <= 0.0 {
            continue;
        }
        let sign = if rating.is_support() { 1.0 } else { -1.0 };

        contributing += 1;
        signal += w;
        for (&d, s) in impact.dimensions() {
            let slot = acc.entry(d).or_insert((0.0, 0.0));
            slot.0 += sign * w * s.deviation();
            slot.1 += w;
        }
    }

    if contributing == 0 || signal <= 0.0 || acc.is_empty() {
        return None;
    }

    let values = acc
        .into_iter()
        .map(|(d, (num, den))| {
            let v = (Score::NEUTRAL + num / den).clamp(Score::MIN, Score::MAX);
            (d, rescale_dimension(v, cfg))
        })
        .collect();

    Some(PreferenceProfile { values, contributing_policies: contributing, signal_weight: signal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::{ImpactScore, Policy};

    fn pid(s: &str) -> PolicyId {
        s.parse().unwrap()
    }

    fn policy(id: &str, dims: &[(Dimension, f64)]) -> Policy {
        let impact = dims
            .iter()
            .try_fold(ImpactScore::new(""), |acc, &(d, v)| acc.with_dimension(d, v))
            .unwrap();
        Policy { id: pid(id), title: id.to_string(), impact }
    }

    fn catalog() -> Catalog {
        Catalog::from_policies(vec![
            policy("A", &[(Dimension::PopulationReached, 8.0), (Dimension::Feasibility, 3.0)]),
            policy("B", &[(Dimension::PopulationReached, 2.0), (Dimension::Essentiality, 9.0)]),
        ])
        .unwrap()
    }

    fn entry(id: &str, r: i8) -> RatingEntry {
        RatingEntry::new(pid(id), Rating::new(r).unwrap())
    }

    #[test]
    fn strong_support_reproduces_policy_vector() {
        let p = infer(&[entry("A", 2)], &catalog(), &PreferenceConfig::default()).unwrap();
        assert!((p.values[&Dimension::PopulationReached] - 80.0).abs() < 1e-9);
        assert!((p.values[&Dimension::Feasibility] - 30.0).abs() < 1e-9);
        assert!(p.value(Dimension::Essentiality).is_none());
        assert_eq!(p.contributing_policies, 1);
        assert_eq!(p.signal_weight, 2.0);
    }

    #[test]
    fn strong_opposition_mirrors_policy_vector() {
        let p = infer(&[entry("A", -2)], &catalog(), &PreferenceConfig::default()).unwrap();
        assert!((p.values[&Dimension::PopulationReached] - 20.0).abs() < 1e-9);
        assert!((p.values[&Dimension::Feasibility] - 70.0).abs() < 1e-9);
    }

    #[test]
    fn magnitude_weights_the_blend() {
        // A at +2 (dev +3), B at +1 (dev -3) on population_reached: (6 - 3) / 3 = +1.
        let p = infer(&[entry("A", 2), entry("B", 1)], &catalog(), &PreferenceConfig::default()).unwrap();
        assert!((p.values[&Dimension::PopulationReached] - 60.0).abs() < 1e-9);
        // Only B scores essentiality.
        assert!((p.values[&Dimension::Essentiality] - 90.0).abs() < 1e-9);
        assert_eq!(p.contributing_policies, 2);
        assert_eq!(p.signal_weight, 3.0);
    }

    #[test]
    fn no_signal_is_none_not_neutral() {
        let cat = catalog();
        let cfg = PreferenceConfig::default();
        assert!(infer(&[], &cat, &cfg).is_none());
        assert!(infer(&[entry("A", 0), entry("B", 0)], &cat, &cfg).is_none());
        assert!(infer(&[entry("ZZZ", 2)], &cat, &cfg).is_none());
    }

    #[test]
    fn policies_without_dimensions_are_not_counted() {
        let bare = ImpactScore::new("").with_category(stance_core::NeedCategory::Safety, 9.0, "").unwrap();
        let cat = Catalog::from_policies(vec![
            policy("A", &[(Dimension::PopulationReached, 8.0), (Dimension::Feasibility, 3.0)]),
            Policy { id: pid("C"), title: "C".into(), impact: bare },
        ])
        .unwrap();
        let cfg = PreferenceConfig::default();
        assert!(infer(&[entry("C", 2)], &cat, &cfg).is_none());

        let p = infer(&[entry("A", 2), entry("C", -2)], &cat, &cfg).unwrap();
        assert_eq!(p.contributing_policies, 1);
        assert_eq!(p.signal_weight, 2.0);
        assert_eq!(p, infer(&[entry("A", 2)], &cat, &cfg).unwrap());
    }

    #[test]
    fn duplicates_collapse_to_last_rating() {
        let cat = catalog();
        let cfg = PreferenceConfig::default();
        let twice = infer(&[entry("A", -2), entry("A", 2)], &cat, &cfg).unwrap();
        let once = infer(&[entry("A", 2)], &cat, &cfg).unwrap();
        assert_eq!(twice, once);
        // Last row neutral removes the policy entirely.
        assert!(infer(&[entry("A", 2), entry("A", 0)], &cat, &cfg).is_none());
    }

    #[test]
    fn coefficients_and_display_range_are_configurable() {
        let cfg = PreferenceConfig { display_min: -1.0, display_max: 1.0, support_weight: 1.0, oppose_weight: 0.0 };
        // Opposition carries no weight under this config.
        assert!(infer(&[entry("A", -2)], &catalog(), &cfg).is_none());
        let p = infer(&[entry("A", 2)], &catalog(), &cfg).unwrap();
        assert!((p.values[&Dimension::PopulationReached] - 0.6).abs() < 1e-9);
        assert_eq!(rescale_dimension(5.0, &cfg), 0.0);
        assert_eq!(rescale_dimension(10.0, &PreferenceConfig::default()), 100.0);
    }
}
