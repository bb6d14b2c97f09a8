// crates/stance_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, CLI parsing, and the four
// subcommands. Every command loads local JSON through stance_io, runs the
// engine, and emits one JSON document.

mod args;
mod telemetry;

mod exitcodes {
    pub const OK: u8 = 0;
    /// Usage, shape, range and configuration failures.
    pub const VALIDATION: u8 = 2;
    /// Missing files, unreadable paths, size limits, failed writes.
    pub const IO: u8 = 4;
}

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};

use stance_core::{ArchetypeId, EngineError, Rating, Registry};
use stance_io::canonical_json::write_canonical_file;
use stance_io::hasher::{catalog_id, impact_id, weights_id};
use stance_io::loader::{self, ContentBundle};
use stance_io::IoError;
use stance_pipeline::Engine;

use args::{ArchetypesArgs, Cli, Command, ConsensusArgs, ContentArgs, ProfileArgs, ScoreArgs};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
}

impl MainError {
    fn code(&self) -> u8 {
        match self {
            MainError::Validation(_) => exitcodes::VALIDATION,
            MainError::Io(_) => exitcodes::IO,
        }
    }

    fn message(&self) -> &str {
        match self {
            MainError::Validation(m) | MainError::Io(m) => m,
        }
    }
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Path(_) | IoError::Limit(_) => MainError::Io(e.to_string()),
            IoError::Json { .. } | IoError::Manifest(_) | IoError::Engine(_) | IoError::Hash(_) => {
                MainError::Validation(e.to_string())
            }
        }
    }
}

impl From<EngineError> for MainError {
    fn from(e: EngineError) -> Self {
        MainError::Validation(e.to_string())
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { exitcodes::VALIDATION } else { exitcodes::OK });
        }
    };

    if let Err(e) = telemetry::init(cli.quiet) {
        eprintln!("stance: warning: {e}");
    }

    if let Err(e) = cli.validate() {
        eprintln!("stance: error: {e}");
        return ExitCode::from(exitcodes::VALIDATION);
    }

    let result = match &cli.command {
        Command::Score(a) => run_score(a),
        Command::Profile(a) => run_profile(a),
        Command::Consensus(a) => run_consensus(a),
        Command::Archetypes(a) => run_archetypes(a),
    }
    .and_then(|doc| emit(&doc, cli.out.as_deref(), cli.quiet));

    match result {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("stance: error: {}", e.message());
            ExitCode::from(e.code())
        }
    }
}

/* ------------------------------- Content ------------------------------- */

/// Resolve content from --manifest and/or explicit paths; explicit
/// --archetypes/--config win over the manifest's entries.
fn load_content(c: &ContentArgs) -> Result<ContentBundle, MainError> {
    let (catalog, archetypes, config) = match &c.manifest {
        Some(m) => {
            let (cat, arch, cfg) = loader::manifest_paths(m)?;
            (cat, c.archetypes.clone().or(arch), c.config.clone().or(cfg))
        }
        None => {
            let cat = c.catalog.clone().ok_or_else(|| MainError::Validation("missing --catalog".into()))?;
            (cat, c.archetypes.clone(), c.config.clone())
        }
    };
    Ok(loader::load_bundle(&catalog, archetypes.as_deref(), config.as_deref())?)
}

/// Optional manifest entry plus an explicit override.
fn pick(manifest: Option<&Path>, explicit: Option<&PathBuf>, which: Entry) -> Result<Option<PathBuf>, MainError> {
    if let Some(p) = explicit {
        return Ok(Some(p.clone()));
    }
    match manifest {
        Some(m) => {
            let (_, arch, cfg) = loader::manifest_paths(m)?;
            Ok(match which {
                Entry::Archetypes => arch,
                Entry::Config => cfg,
            })
        }
        None => Ok(None),
    }
}

enum Entry {
    Archetypes,
    Config,
}

/* ------------------------------ Commands ------------------------------ */

fn run_score(a: &ScoreArgs) -> Result<Value, MainError> {
    let bundle = load_content(&a.content)?;
    let engine = Engine::from_bundle(&bundle)?;

    let (profile_name, weights) = match (&a.archetype, &a.weights) {
        (Some(id), _) => {
            let id: ArchetypeId = id.parse().map_err(|e| MainError::Validation(format!("--archetype: {e}")))?;
            (id.as_str().to_string(), engine.registry().archetypes().seed(&id)?)
        }
        (None, Some(path)) => ("custom".to_string(), loader::load_weights(path)?),
        (None, None) => ("default".to_string(), engine.registry().default_weights().clone()),
    };

    let scores = engine.score_catalog(&bundle.catalog, &weights)?;
    let mut impact_ids = serde_json::Map::new();
    for p in bundle.catalog.iter() {
        impact_ids.insert(p.id.as_str().to_string(), Value::String(impact_id(&p.impact)?));
    }
    tracing::info!(policies = scores.len(), profile = %profile_name, "scored catalog");
    Ok(json!({
        "catalog_id": catalog_id(&bundle.catalog)?,
        "content": to_value(&bundle.digests)?,
        "impact_ids": impact_ids,
        "profile": profile_name,
        "weights_id": weights_id(&weights)?,
        "weights": to_value(&weights)?,
        "scores": to_value(&scores)?,
    }))
}

fn run_profile(a: &ProfileArgs) -> Result<Value, MainError> {
    let bundle = load_content(&a.content)?;
    let engine = Engine::from_bundle(&bundle)?;
    let ratings = loader::load_ratings(&a.ratings)?;

    let profile = engine.infer(&ratings, &bundle.catalog);
    let comparison = engine.comparison_view(profile.as_ref(), &ratings, &bundle.catalog);
    Ok(json!({
        "profile": to_value(&profile)?,
        "comparison": to_value(&comparison)?,
    }))
}

fn run_consensus(a: &ConsensusArgs) -> Result<Value, MainError> {
    let config = match pick(a.manifest.as_deref(), a.config.as_ref(), Entry::Config)? {
        Some(p) => loader::load_config(&p)?,
        None => Default::default(),
    };
    let engine = Engine::new(Registry::builtin()?, config)?;
    let population = loader::load_population(&a.population)?;
    let user = a.rating.map(Rating::try_from).transpose()?;

    let snapshot = engine.aggregate(&population.ratings);
    tracing::info!(policy = %population.policy_id, participants = snapshot.total_participants, "consensus");
    let mut doc = json!({
        "policy_id": population.policy_id.as_str(),
        "snapshot": to_value(&snapshot)?,
    });
    if user.is_some() {
        doc["you"] = to_value(&engine.you_vs_everyone(user, &snapshot))?;
    }
    Ok(doc)
}

fn run_archetypes(a: &ArchetypesArgs) -> Result<Value, MainError> {
    let registry = match pick(a.manifest.as_deref(), a.archetypes.as_ref(), Entry::Archetypes)? {
        Some(p) => Registry::builtin()?.with_archetypes(loader::load_archetypes(&p)?),
        None => Registry::builtin()?,
    };
    let list: Vec<_> = registry.archetypes().iter().collect();
    Ok(json!({ "archetypes": to_value(&list)? }))
}

/* ------------------------------- Output ------------------------------- */

fn to_value<T: Serialize + ?Sized>(v: &T) -> Result<Value, MainError> {
    serde_json::to_value(v).map_err(|e| MainError::Validation(format!("serialize: {e}")))
}

fn emit(doc: &Value, out: Option<&Path>, quiet: bool) -> Result<(), MainError> {
    match out {
        Some(path) => {
            write_canonical_file(path, doc).map_err(|e| MainError::Io(e.to_string()))?;
            if !quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        None => {
            let text = serde_json::to_string_pretty(doc).map_err(|e| MainError::Validation(e.to_string()))?;
            println!("{text}");
        }
    }
    Ok(())
}
