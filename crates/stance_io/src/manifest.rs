//! crates/stance_io/src/manifest.rs
//!
//! Content manifest: one small JSON file naming the catalog and (optionally)
//! archetype and config files of a content release.
//!
//! - Paths are resolved relative to the manifest's own directory.
//! - Offline only: any path with a scheme is rejected.
//! - Optional digests (lowercase 64-hex) are checked against the canonical
//!   JSON of the referenced file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hasher::{is_lower_hex_64, sha256_canonical};
use crate::loader::read_json_value_with_limits;
use crate::{looks_like_url_strict, IoError, IoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Optional, non-normative identifier.
    #[serde(default)]
    pub id: Option<String>,
    pub catalog_path: String,
    #[serde(default)]
    pub archetypes_path: Option<String>,
    #[serde(default)]
    pub config_path: Option<String>,
    #[serde(default)]
    pub inputs_sha256: Option<InputDigests>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDigests {
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub archetypes_path: Option<String>,
    #[serde(default)]
    pub config_path: Option<String>,
}

/// Manifest with every path resolved against the manifest directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedManifest {
    pub catalog_path: PathBuf,
    pub archetypes_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub digests: Option<InputDigests>,
}

fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn check_path_field(label: &str, s: &str) -> IoResult<()> {
    if s.trim().is_empty() {
        return Err(IoError::Manifest(format!("{label} must not be empty")));
    }
    if looks_like_url_strict(s) {
        return Err(IoError::Manifest(format!("{label} must be a local path, got {s}")));
    }
    Ok(())
}

fn must_exist_file(label: &str, p: &Path) -> IoResult<()> {
    let md = fs::metadata(p).map_err(|e| IoError::Path(format!("cannot access {label} {} ({e})", p.display())))?;
    if !md.is_file() {
        return Err(IoError::Path(format!("{label} is not a file: {}", p.display())));
    }
    Ok(())
}

/// Shape and offline checks. No I/O.
pub fn validate_manifest(man: &Manifest) -> IoResult<()> {
    check_path_field("catalog_path", &man.catalog_path)?;
    if let Some(s) = &man.archetypes_path {
        check_path_field("archetypes_path", s)?;
    }
    if let Some(s) = &man.config_path {
        check_path_field("config_path", s)?;
    }
    if let Some(d) = &man.inputs_sha256 {
        for (label, digest, present) in [
            ("catalog_path", &d.catalog_path, true),
            ("archetypes_path", &d.archetypes_path, man.archetypes_path.is_some()),
            ("config_path", &d.config_path, man.config_path.is_some()),
        ] {
            if let Some(h) = digest {
                if !present {
                    return Err(IoError::Manifest(format!("digest supplied for missing input {label}")));
                }
                if !is_lower_hex_64(h) {
                    return Err(IoError::Manifest(format!("invalid sha256 for {label}: {h}")));
                }
            }
        }
    }
    Ok(())
}

/// Resolve every path against `base_dir` and check the files exist.
pub fn resolve_paths(base_dir: &Path, man: &Manifest) -> IoResult<ResolvedManifest> {
    let catalog_path = join_under(base_dir, &man.catalog_path);
    let archetypes_path = man.archetypes_path.as_deref().map(|s| join_under(base_dir, s));
    let config_path = man.config_path.as_deref().map(|s| join_under(base_dir, s));

    must_exist_file("catalog_path", &catalog_path)?;
    if let Some(p) = &archetypes_path {
        must_exist_file("archetypes_path", p)?;
    }
    if let Some(p) = &config_path {
        must_exist_file("config_path", p)?;
    }

    Ok(ResolvedManifest { catalog_path, archetypes_path, config_path, digests: man.inputs_sha256.clone() })
}

/// Check supplied digests over the canonical JSON of each referenced file.
pub fn verify_digests(resolved: &ResolvedManifest) -> IoResult<()> {
    let Some(d) = &resolved.digests else { return Ok(()) };

    let check = |path: &Path, expect: &str, label: &str| -> IoResult<()> {
        let v = read_json_value_with_limits(path)?;
        let got = sha256_canonical(&v)?;
        if got != expect {
            return Err(IoError::Manifest(format!("sha256 mismatch for {label}: expected={expect} got={got}")));
        }
        Ok(())
    };

    if let Some(h) = &d.catalog_path {
        check(&resolved.catalog_path, h, "catalog_path")?;
    }
    if let (Some(h), Some(p)) = (&d.archetypes_path, &resolved.archetypes_path) {
        check(p, h, "archetypes_path")?;
    }
    if let (Some(h), Some(p)) = (&d.config_path, &resolved.config_path) {
        check(p, h, "config_path")?;
    }
    Ok(())
}

/// Read, validate, resolve and verify a manifest file.
pub fn load_manifest(path: &Path) -> IoResult<ResolvedManifest> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Manifest(format!("manifest must be a local path: {}", path.display())));
    }
    let v = read_json_value_with_limits(path)?;
    let man: Manifest = serde_json::from_value(v)
        .map_err(|e| IoError::Manifest(format!("{}: {e}", path.display())))?;
    validate_manifest(&man)?;

    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let resolved = resolve_paths(&base, &man)?;
    verify_digests(&resolved)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn man(catalog: &str) -> Manifest {
        Manifest {
            id: None,
            catalog_path: catalog.into(),
            archetypes_path: None,
            config_path: None,
            inputs_sha256: None,
        }
    }

    #[test]
    fn rejects_urls_and_empty_paths() {
        assert!(validate_manifest(&man("https://example.org/catalog.json")).is_err());
        assert!(validate_manifest(&man("file:///tmp/c.json")).is_err());
        assert!(validate_manifest(&man("  ")).is_err());
        assert!(validate_manifest(&man("catalog.json")).is_ok());
    }

    #[test]
    fn digest_for_absent_input_is_rejected() {
        let mut m = man("catalog.json");
        m.inputs_sha256 = Some(InputDigests { config_path: Some("0".repeat(64)), ..Default::default() });
        assert!(matches!(validate_manifest(&m), Err(IoError::Manifest(_))));
        m.config_path = Some("config.json".into());
        assert!(validate_manifest(&m).is_ok());
        m.inputs_sha256 = Some(InputDigests { catalog_path: Some("ABC".into()), ..Default::default() });
        assert!(validate_manifest(&m).is_err());
    }

    #[test]
    fn resolves_relative_to_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("content")).unwrap();
        std::fs::write(dir.path().join("content/catalog.json"), r#"{"policies":[]}"#).unwrap();
        std::fs::write(
            dir.path().join("manifest.json"),
            r#"{"catalog_path":"content/catalog.json"}"#,
        )
        .unwrap();
        let r = load_manifest(&dir.path().join("manifest.json")).unwrap();
        assert_eq!(r.catalog_path, dir.path().join("content/catalog.json"));
        assert!(r.archetypes_path.is_none());
    }

    #[test]
    fn missing_file_and_digest_mismatch_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), r#"{"catalog_path":"nope.json"}"#).unwrap();
        match load_manifest(&dir.path().join("manifest.json")) {
            Err(IoError::Path(msg)) => assert!(msg.contains("nope.json"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }

        std::fs::create_dir(dir.path().join("folder.json")).unwrap();
        std::fs::write(dir.path().join("manifest.json"), r#"{"catalog_path":"folder.json"}"#).unwrap();
        assert!(matches!(load_manifest(&dir.path().join("manifest.json")), Err(IoError::Path(_))));

        std::fs::write(dir.path().join("catalog.json"), r#"{"policies":[]}"#).unwrap();
        let body = format!(
            r#"{{"catalog_path":"catalog.json","inputs_sha256":{{"catalog_path":"{}"}}}}"#,
            "0".repeat(64)
        );
        std::fs::write(dir.path().join("manifest.json"), body).unwrap();
        let err = load_manifest(&dir.path().join("manifest.json")).unwrap_err();
        assert!(err.to_string().contains("sha256 mismatch"));
    }
}
