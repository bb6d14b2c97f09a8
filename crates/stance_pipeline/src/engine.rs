//! Engine: frozen registry + config, and the operations callers invoke.

use std::collections::{BTreeMap, BTreeSet};

use stance_algo::{aggregate, infer, preference::collapse, score};
use stance_core::{
    ArchetypeId, Catalog, ConsensusSnapshot, EngineConfig, EngineError, ImpactScore, PolicyId,
    PopulationRating, PreferenceProfile, Rating, RatingEntry, Registry, ScoreOutcome, WeightProfile,
};
use stance_io::ContentBundle;

use crate::alignment::{you_vs_everyone, Alignment};
use crate::view::{self, ComparisonView};

#[derive(Clone, Debug)]
pub struct Engine {
    registry: Registry,
    config: EngineConfig,
}

impl Engine {
    /// Validate `config` once; the engine is immutable afterwards.
    pub fn new(registry: Registry, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        tracing::debug!(
            archetypes = registry.archetypes().len(),
            bands = config.labels.bands().len(),
            "engine constructed"
        );
        Ok(Engine { registry, config })
    }

    /// Engine over a loaded content release (registry and config copied out).
    pub fn from_bundle(bundle: &ContentBundle) -> Result<Self, EngineError> {
        Engine::new(bundle.registry.clone(), bundle.config.clone())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /* -------------------------------- Scoring ------------------------------- */

    /// Score under the registry's default profile.
    pub fn score(&self, impact: &ImpactScore) -> Result<ScoreOutcome, EngineError> {
        self.score_with(impact, self.registry.default_weights())
    }

    pub fn score_with(&self, impact: &ImpactScore, weights: &WeightProfile) -> Result<ScoreOutcome, EngineError> {
        score(impact, weights, &self.config.labels)
    }

    /// Re-score under a named archetype.
    pub fn score_as(&self, impact: &ImpactScore, archetype: &ArchetypeId) -> Result<ScoreOutcome, EngineError> {
        let a = self.registry.archetypes().get(archetype)?;
        self.score_with(impact, &a.weights)
    }

    /// Score every policy; the first failure aborts and names the policy.
    pub fn score_catalog(
        &self,
        catalog: &Catalog,
        weights: &WeightProfile,
    ) -> Result<BTreeMap<PolicyId, ScoreOutcome>, EngineError> {
        let mut out = BTreeMap::new();
        for p in catalog.iter() {
            let outcome = self.score_with(&p.impact, weights).map_err(|e| match e {
                EngineError::Configuration(msg) => EngineError::Configuration(format!("policy {}: {msg}", p.id)),
                EngineError::Range { value, min, max, field } => {
                    EngineError::Range { field: format!("{}.{field}", p.id), value, min, max }
                }
            })?;
            out.insert(p.id.clone(), outcome);
        }
        tracing::debug!(policies = out.len(), "scored catalog");
        Ok(out)
    }

    /* ------------------------------ Preference ------------------------------ */

    /// Preference profile for one rater, or `None` for insufficient signal.
    pub fn infer(&self, ratings: &[RatingEntry], catalog: &Catalog) -> Option<PreferenceProfile> {
        let distinct = collapse(ratings);
        let duplicates = ratings.len() - distinct.len();
        let unknown: BTreeSet<&PolicyId> = distinct.keys().copied().filter(|id| !catalog.contains(id)).collect();
        tracing::debug!(
            rows = ratings.len(),
            collapsed_duplicates = duplicates,
            ignored_unknown = unknown.len(),
            "inferring preference profile"
        );

        let profile = infer(ratings, catalog, &self.config.preference);
        if profile.is_none() {
            tracing::debug!("insufficient signal for a preference profile");
        }
        profile
    }

    /// Radar comparison of the rater's profile against the policies they rated.
    pub fn compare(&self, ratings: &[RatingEntry], catalog: &Catalog) -> ComparisonView {
        let profile = self.infer(ratings, catalog);
        self.comparison_view(profile.as_ref(), ratings, catalog)
    }

    /// Comparison view around an already inferred profile.
    pub fn comparison_view(
        &self,
        profile: Option<&PreferenceProfile>,
        ratings: &[RatingEntry],
        catalog: &Catalog,
    ) -> ComparisonView {
        view::build(&self.registry, &self.config.preference, profile, ratings, catalog)
    }

    /* ------------------------------- Consensus ------------------------------ */

    pub fn aggregate(&self, rows: &[PopulationRating]) -> ConsensusSnapshot {
        let snapshot = aggregate(rows, &self.config.consensus);
        tracing::debug!(
            participants = snapshot.total_participants,
            level = ?snapshot.consensus_level,
            "aggregated population"
        );
        snapshot
    }

    /// Where `user` stands relative to a population snapshot.
    pub fn you_vs_everyone(&self, user: Option<Rating>, snapshot: &ConsensusSnapshot) -> Alignment {
        you_vs_everyone(user, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::{ConsensusConfig, NeedCategory, Policy};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_send_and_sync() {
        assert_send_sync::<Engine>();
        assert_send_sync::<Registry>();
        assert_send_sync::<Catalog>();
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let cfg = EngineConfig {
            consensus: ConsensusConfig { strong_pct: 40, moderate_pct: 60 },
            ..Default::default()
        };
        assert!(matches!(Engine::new(Registry::builtin().unwrap(), cfg), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn score_catalog_names_the_failing_policy() {
        let engine = Engine::new(Registry::builtin().unwrap(), EngineConfig::default()).unwrap();
        let ok = ImpactScore::new("").with_category(NeedCategory::Safety, 6.0, "").unwrap();
        let catalog = Catalog::from_policies(vec![
            Policy { id: "good".parse().unwrap(), title: String::new(), impact: ok },
            Policy { id: "empty".parse().unwrap(), title: String::new(), impact: ImpactScore::new("") },
        ])
        .unwrap();
        match engine.score_catalog(&catalog, &WeightProfile::default()) {
            Err(EngineError::Configuration(msg)) => assert!(msg.starts_with("policy empty:"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_archetype_is_configuration_error() {
        let engine = Engine::new(Registry::builtin().unwrap(), EngineConfig::default()).unwrap();
        let impact = ImpactScore::new("").with_category(NeedCategory::Safety, 6.0, "").unwrap();
        let err = engine.score_as(&impact, &"nobody".parse().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
