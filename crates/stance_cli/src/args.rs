// crates/stance_cli/src/args.rs
//
// Offline CLI argument surface.
// - No networked paths (any scheme:// or http(s): is rejected before loading)
// - Content comes from --manifest, or from --catalog (+ optional --archetypes/--config)
// - --archetypes/--config given next to --manifest override the manifest's entries
// - Output: pretty JSON on stdout, or canonical JSON at --out

use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "stance",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic policy scoring and preference inference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Write canonical JSON to this file instead of printing to stdout.
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Suppress non-essential stderr output (log filter drops to `error`).
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Score every catalog policy under the default profile, an archetype or a weights file.
    Score(ScoreArgs),
    /// Infer a preference profile from a rater's ratings and print the comparison view.
    Profile(ProfileArgs),
    /// Summarize one policy's population ratings.
    Consensus(ConsensusArgs),
    /// List the available archetypes.
    Archetypes(ArchetypesArgs),
}

/// Where content (catalog, archetypes, config) comes from.
#[derive(Debug, ClapArgs, Clone)]
pub struct ContentArgs {
    /// Content manifest JSON (paths resolved relative to it).
    #[arg(long, conflicts_with = "catalog")]
    pub manifest: Option<PathBuf>,
    /// Policy catalog JSON.
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// Archetype set JSON (replaces the built-in archetypes).
    #[arg(long)]
    pub archetypes: Option<PathBuf>,
    /// Engine config JSON.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub content: ContentArgs,
    /// Score under this archetype instead of the default profile.
    #[arg(long, conflicts_with = "weights")]
    pub archetype: Option<String>,
    /// Weight profile JSON (`{"<category>": weight, ...}`).
    #[arg(long)]
    pub weights: Option<PathBuf>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub content: ContentArgs,
    /// Ratings JSON (`{"ratings":[{"policy_id":..,"rating":..}]}`).
    #[arg(long)]
    pub ratings: PathBuf,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ConsensusArgs {
    /// Population JSON (`{"policy_id":..,"ratings":[{"rating":..,"group":..}]}`).
    #[arg(long)]
    pub population: PathBuf,
    /// Content manifest; only its config entry is used.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Engine config JSON (overrides the manifest's).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Your own rating (-2..=2) for a you-vs-everyone summary.
    #[arg(long, allow_hyphen_values = true)]
    pub rating: Option<i64>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ArchetypesArgs {
    /// Content manifest; only its archetypes entry is used.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Archetype set JSON (overrides the manifest's).
    #[arg(long)]
    pub archetypes: Option<PathBuf>,
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Missing(s) => write!(f, "missing required flag: {s}"),
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
        }
    }
}
impl std::error::Error for CliError {}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

impl Cli {
    fn paths(&self) -> Vec<&Path> {
        let mut v: Vec<Option<&Path>> = vec![self.out.as_deref()];
        match &self.command {
            Command::Score(s) => {
                v.extend(s.content.paths());
                v.push(s.weights.as_deref());
            }
            Command::Profile(p) => {
                v.extend(p.content.paths());
                v.push(Some(p.ratings.as_path()));
            }
            Command::Consensus(c) => {
                v.extend([Some(c.population.as_path()), c.manifest.as_deref(), c.config.as_deref()]);
            }
            Command::Archetypes(a) => v.extend([a.manifest.as_deref(), a.archetypes.as_deref()]),
        }
        v.into_iter().flatten().collect()
    }

    /// Checks clap cannot express: local paths only, and a content source for
    /// the commands that need a catalog.
    pub fn validate(&self) -> Result<(), CliError> {
        for p in self.paths() {
            ensure_local_path(p)?;
        }
        match &self.command {
            Command::Score(ScoreArgs { content, .. }) | Command::Profile(ProfileArgs { content, .. }) => {
                if content.manifest.is_none() && content.catalog.is_none() {
                    return Err(CliError::Missing("--manifest or --catalog"));
                }
            }
            Command::Consensus(_) | Command::Archetypes(_) => {}
        }
        Ok(())
    }
}

impl ContentArgs {
    fn paths(&self) -> [Option<&Path>; 4] {
        [self.manifest.as_deref(), self.catalog.as_deref(), self.archetypes.as_deref(), self.config.as_deref()]
    }
}
