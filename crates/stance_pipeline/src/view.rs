//! Radar comparison view: the rater's inferred profile and each rated
//! policy's dimension vector on the same axes and display scale.

use serde::Serialize;

use stance_algo::{preference::collapse, rescale_dimension};
use stance_core::{
    Catalog, Dimension, PolicyId, PreferenceConfig, PreferenceProfile, Rating, RatingEntry, Registry,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolicyTrace {
    pub policy_id: PolicyId,
    pub title: String,
    pub rating: Rating,
    /// One entry per axis; `None` where the policy is not assessed.
    pub values: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonView {
    /// Axis names in `Dimension::ALL` order.
    pub axes: Vec<String>,
    /// `None`: insufficient signal. Inner `None`: no contributor scores that axis.
    pub profile: Option<Vec<Option<f64>>>,
    pub policies: Vec<PolicyTrace>,
}

pub(crate) fn build(
    registry: &Registry,
    cfg: &PreferenceConfig,
    profile: Option<&PreferenceProfile>,
    ratings: &[RatingEntry],
    catalog: &Catalog,
) -> ComparisonView {
    let axes = Dimension::ALL.iter().map(|&d| registry.dimension(d).name.clone()).collect();

    let profile = profile.map(|p| Dimension::ALL.iter().map(|&d| p.value(d)).collect());

    let policies = collapse(ratings)
        .into_iter()
        .filter_map(|(id, rating)| {
            let policy = catalog.get(id)?;
            let values = Dimension::ALL
                .iter()
                .map(|&d| policy.impact.dimension(d).map(|s| rescale_dimension(s.value(), cfg)))
                .collect();
            Some(PolicyTrace { policy_id: id.clone(), title: policy.title.clone(), rating, values })
        })
        .collect();

    ComparisonView { axes, profile, policies }
}
