//! Loader: read local JSON content (catalog, archetypes, config, weights) and
//! rating-store exports (a rater's ratings, one policy's population), check
//! them against the engine's closed ranges, and return typed values.
//!
//! Files are first parsed into plain wire structs so that a range violation
//! can be reported with the JSON Pointer of the offending value. No network I/O.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use stance_core::{
    Archetype, ArchetypeId, ArchetypeRegistry, Catalog, Dimension, EngineConfig, EngineError,
    GroupId, ImpactScore, NeedCategory, Policy, PolicyId, PopulationRating, Rating, RatingEntry,
    Registry, WeightProfile,
};

use crate::{hasher, looks_like_url_strict, manifest, IoError, IoResult};

/// Per-file size cap.
pub const MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/* ------------------------------ Wire shapes ------------------------------ */

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    policies: Vec<PolicyWire>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyWire {
    id: PolicyId,
    #[serde(default)]
    title: String,
    impact: ImpactWire,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ImpactWire {
    #[serde(default)]
    categories: BTreeMap<NeedCategory, CategoryWire>,
    #[serde(default)]
    dimensions: BTreeMap<Dimension, f64>,
    #[serde(default)]
    rationale: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryWire {
    value: f64,
    #[serde(default)]
    rationale: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArchetypesFile {
    archetypes: Vec<ArchetypeWire>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArchetypeWire {
    id: ArchetypeId,
    name: String,
    #[serde(default)]
    description: String,
    weights: BTreeMap<NeedCategory, f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RatingsFile {
    ratings: Vec<RatingWire>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RatingWire {
    policy_id: PolicyId,
    rating: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PopulationFile {
    policy_id: PolicyId,
    ratings: Vec<PopulationRowWire>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PopulationRowWire {
    rating: i64,
    #[serde(default)]
    group: Option<GroupId>,
}

/* ------------------------------ Public types ------------------------------ */

/// One policy's population ratings, as exported by the rating store.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub policy_id: PolicyId,
    pub ratings: Vec<PopulationRating>,
}

/// Canonical-content digests of a loaded bundle (lowercase sha256 hex).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BundleDigests {
    pub catalog_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetypes_sha256: Option<String>,
    pub config_sha256: String,
}

/// Everything the engine needs from a content release.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub catalog: Catalog,
    pub registry: Registry,
    pub config: EngineConfig,
    pub digests: BundleDigests,
}

/* --------------------------------- Reading -------------------------------- */

/// Read a local JSON file into a `Value`, enforcing the offline policy and
/// `MAX_FILE_BYTES`.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Path(format!("URLs are not accepted: {}", path.display())));
    }
    let md = fs::metadata(path).map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    if !md.is_file() {
        return Err(IoError::Path(format!("not a file: {}", path.display())));
    }
    if md.len() > MAX_FILE_BYTES {
        return Err(IoError::Limit(format!(
            "{} is {} bytes (max {MAX_FILE_BYTES})",
            path.display(),
            md.len()
        )));
    }
    let f = File::open(path).map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    let mut buf = Vec::with_capacity(md.len() as usize);
    f.take(MAX_FILE_BYTES + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_FILE_BYTES {
        return Err(IoError::Limit(format!("{} grew past {MAX_FILE_BYTES} bytes", path.display())));
    }
    serde_json::from_slice(&buf).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })
}

fn from_value<T: for<'de> Deserialize<'de>>(v: Value, what: &str) -> IoResult<T> {
    serde_json::from_value(v).map_err(|e| IoError::Json { pointer: "/".into(), msg: format!("{what}: {e}") })
}

/// Re-anchor an engine error at a JSON Pointer inside the source file.
fn at(pointer: String) -> impl FnOnce(EngineError) -> EngineError {
    move |e| match e {
        EngineError::Range { value, min, max, .. } => EngineError::Range { field: pointer, value, min, max },
        EngineError::Configuration(msg) => EngineError::Configuration(format!("{pointer}: {msg}")),
    }
}

/* --------------------------------- Parsers -------------------------------- */

pub fn parse_catalog(v: Value) -> IoResult<Catalog> {
    let file: CatalogFile = from_value(v, "catalog")?;
    let mut policies = Vec::with_capacity(file.policies.len());
    for (i, p) in file.policies.into_iter().enumerate() {
        let mut impact = ImpactScore::new(p.impact.rationale);
        for (c, cw) in p.impact.categories {
            impact = impact
                .with_category(c, cw.value, cw.rationale)
                .map_err(at(format!("/policies/{i}/impact/categories/{c}/value")))?;
        }
        for (d, s) in p.impact.dimensions {
            impact = impact
                .with_dimension(d, s)
                .map_err(at(format!("/policies/{i}/impact/dimensions/{d}")))?;
        }
        policies.push(Policy { id: p.id, title: p.title, impact });
    }
    Ok(Catalog::from_policies(policies)?)
}

pub fn parse_archetypes(v: Value) -> IoResult<ArchetypeRegistry> {
    let file: ArchetypesFile = from_value(v, "archetypes")?;
    let mut out = Vec::with_capacity(file.archetypes.len());
    for (i, a) in file.archetypes.into_iter().enumerate() {
        let weights = WeightProfile::new(a.weights).map_err(at(format!("/archetypes/{i}/weights")))?;
        out.push(Archetype { id: a.id, name: a.name, description: a.description, weights });
    }
    Ok(ArchetypeRegistry::new(out)?)
}

pub fn parse_config(v: Value) -> IoResult<EngineConfig> {
    let cfg: EngineConfig = from_value(v, "config")?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn parse_weights(v: Value) -> IoResult<WeightProfile> {
    let raw: BTreeMap<NeedCategory, f64> = from_value(v, "weights")?;
    Ok(WeightProfile::new(raw).map_err(at("/".to_string()))?)
}

pub fn parse_ratings(v: Value) -> IoResult<Vec<RatingEntry>> {
    let file: RatingsFile = from_value(v, "ratings")?;
    file.ratings
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> IoResult<RatingEntry> {
            let rating = Rating::try_from(r.rating).map_err(at(format!("/ratings/{i}/rating")))?;
            Ok(RatingEntry::new(r.policy_id, rating))
        })
        .collect()
}

pub fn parse_population(v: Value) -> IoResult<Population> {
    let file: PopulationFile = from_value(v, "population")?;
    let ratings = file
        .ratings
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> IoResult<PopulationRating> {
            let rating = Rating::try_from(r.rating).map_err(at(format!("/ratings/{i}/rating")))?;
            Ok(PopulationRating { rating, group: r.group })
        })
        .collect::<IoResult<Vec<_>>>()?;
    Ok(Population { policy_id: file.policy_id, ratings })
}

/* ------------------------------ File loaders ------------------------------ */

pub fn load_catalog(path: &Path) -> IoResult<Catalog> {
    let catalog = parse_catalog(read_json_value_with_limits(path)?)?;
    tracing::info!(path = %path.display(), policies = catalog.len(), "loaded catalog");
    Ok(catalog)
}

pub fn load_archetypes(path: &Path) -> IoResult<ArchetypeRegistry> {
    let archetypes = parse_archetypes(read_json_value_with_limits(path)?)?;
    tracing::info!(path = %path.display(), archetypes = archetypes.len(), "loaded archetypes");
    Ok(archetypes)
}

pub fn load_config(path: &Path) -> IoResult<EngineConfig> {
    let cfg = parse_config(read_json_value_with_limits(path)?)?;
    tracing::info!(path = %path.display(), "loaded engine config");
    Ok(cfg)
}

pub fn load_weights(path: &Path) -> IoResult<WeightProfile> {
    parse_weights(read_json_value_with_limits(path)?)
}

pub fn load_ratings(path: &Path) -> IoResult<Vec<RatingEntry>> {
    let ratings = parse_ratings(read_json_value_with_limits(path)?)?;
    tracing::info!(path = %path.display(), rows = ratings.len(), "loaded ratings");
    Ok(ratings)
}

pub fn load_population(path: &Path) -> IoResult<Population> {
    let pop = parse_population(read_json_value_with_limits(path)?)?;
    tracing::info!(path = %path.display(), policy = %pop.policy_id, rows = pop.ratings.len(), "loaded population");
    Ok(pop)
}

/* ------------------------------ Orchestration ----------------------------- */

/// Assemble a bundle from explicit paths; absent archetypes/config fall back
/// to the built-in set and defaults.
pub fn load_bundle(
    catalog_path: &Path,
    archetypes_path: Option<&Path>,
    config_path: Option<&Path>,
) -> IoResult<ContentBundle> {
    let catalog = load_catalog(catalog_path)?;

    let mut registry = Registry::builtin()?;
    let mut archetypes_sha256 = None;
    if let Some(p) = archetypes_path {
        let archetypes = load_archetypes(p)?;
        let listed: Vec<&Archetype> = archetypes.iter().collect();
        archetypes_sha256 = Some(hasher::sha256_canonical(&listed)?);
        registry = registry.with_archetypes(archetypes);
    }

    let config = match config_path {
        Some(p) => load_config(p)?,
        None => EngineConfig::default(),
    };

    let digests = BundleDigests {
        catalog_sha256: hasher::sha256_canonical(&catalog)?,
        archetypes_sha256,
        config_sha256: hasher::sha256_canonical(&config)?,
    };
    tracing::debug!(catalog = %digests.catalog_sha256, config = %digests.config_sha256, "content digests");

    Ok(ContentBundle { catalog, registry, config, digests })
}

/// Load everything named by a manifest file.
pub fn load_bundle_from_manifest(path: &Path) -> IoResult<ContentBundle> {
    let resolved = manifest::load_manifest(path)?;
    load_bundle(
        &resolved.catalog_path,
        resolved.archetypes_path.as_deref(),
        resolved.config_path.as_deref(),
    )
}

/// Paths named by a manifest, for callers that want to override one of them.
pub fn manifest_paths(path: &Path) -> IoResult<(PathBuf, Option<PathBuf>, Option<PathBuf>)> {
    let r = manifest::load_manifest(path)?;
    Ok((r.catalog_path, r.archetypes_path, r.config_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_range_error_carries_pointer() {
        let v = json!({"policies":[
            {"id":"A","impact":{"categories":{"safety":{"value":8}}}},
            {"id":"B","impact":{"categories":{"community":{"value":10.5}}}}
        ]});
        match parse_catalog(v) {
            Err(IoError::Engine(EngineError::Range { field, value, .. })) => {
                assert_eq!(field, "/policies/1/impact/categories/community/value");
                assert_eq!(value, 10.5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn duplicate_policy_ids_are_configuration_errors() {
        let v = json!({"policies":[
            {"id":"A","impact":{}},
            {"id":"A","impact":{}}
        ]});
        assert!(matches!(parse_catalog(v), Err(IoError::Engine(EngineError::Configuration(_)))));
    }

    #[test]
    fn unknown_category_is_a_json_error() {
        let v = json!({"policies":[{"id":"A","impact":{"categories":{"wealth":{"value":1}}}}]});
        assert!(matches!(parse_catalog(v), Err(IoError::Json { .. })));
    }

    #[test]
    fn ratings_out_of_scale_are_rejected_with_pointer() {
        let v = json!({"ratings":[{"policy_id":"A","rating":2},{"policy_id":"B","rating":3}]});
        match parse_ratings(v) {
            Err(IoError::Engine(EngineError::Range { field, .. })) => assert_eq!(field, "/ratings/1/rating"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn population_groups_are_optional() {
        let v = json!({"policy_id":"A","ratings":[{"rating":1,"group":"north"},{"rating":-2}]});
        let p = parse_population(v).unwrap();
        assert_eq!(p.policy_id.as_str(), "A");
        assert_eq!(p.ratings.len(), 2);
        assert!(p.ratings[1].group.is_none());
    }

    #[test]
    fn archetype_weights_are_validated() {
        let v = json!({"archetypes":[{"id":"x","name":"X","weights":{"safety":-1}}]});
        match parse_archetypes(v) {
            Err(IoError::Engine(EngineError::Configuration(msg))) => assert!(msg.starts_with("/archetypes/0/weights")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_validation_runs_after_parse() {
        let bad = json!({"consensus":{"strong_pct":50,"moderate_pct":60}});
        assert!(matches!(parse_config(bad), Err(IoError::Engine(_))));
        assert_eq!(parse_config(json!({})).unwrap(), EngineConfig::default());
    }

    #[test]
    fn oversized_and_url_paths_are_refused() {
        assert!(matches!(
            read_json_value_with_limits(Path::new("https://example.org/c.json")),
            Err(IoError::Path(_))
        ));
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("big.json");
        let f = File::create(&p).unwrap();
        f.set_len(MAX_FILE_BYTES + 1).unwrap();
        assert!(matches!(read_json_value_with_limits(&p), Err(IoError::Limit(_))));
    }
}
