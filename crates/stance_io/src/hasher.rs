//! crates/stance_io/src/hasher.rs
//!
//! SHA-256 fingerprints over canonical JSON. These are the memoisation
//! identities of catalogs, impact assessments and weight profiles: equal
//! content gives an equal id regardless of key order in the source file.
//!
//! - `sha256_canonical(..)` for values/structs (goes through canonical_json).
//! - `sha256_hex(..)` for raw bytes.
//! - Hex digests are lowercase.

use serde::Serialize;
use sha2::{Digest, Sha256};
use stance_core::{Catalog, ImpactScore, WeightProfile};

use crate::canonical_json::to_canonical_bytes;
use crate::{IoError, IoResult};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize + ?Sized>(value: &T) -> IoResult<String> {
    let bytes = to_canonical_bytes(value).map_err(|e| IoError::Hash(e.to_string()))?;
    Ok(sha256_hex(&bytes))
}

/// Validate a lowercase 64-hex digest.
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/* ----------------------------- Fingerprint ids ----------------------------- */

/// `CAT:<hex>`
pub fn catalog_id(catalog: &Catalog) -> IoResult<String> {
    Ok(format!("CAT:{}", sha256_canonical(catalog)?))
}

/// `IMP:<hex>`
pub fn impact_id(impact: &ImpactScore) -> IoResult<String> {
    Ok(format!("IMP:{}", sha256_canonical(impact)?))
}

/// `W:<hex>`
pub fn weights_id(weights: &WeightProfile) -> IoResult<String> {
    Ok(format!("W:{}", sha256_canonical(weights)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stance_core::NeedCategory;

    #[test]
    fn hex_encoding_is_lowercase() {
        let h = sha256_hex(b"abc");
        assert_eq!(h, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
        assert!(is_lower_hex_64(&h));
        assert!(!is_lower_hex_64(&h.to_uppercase()));
    }

    #[test]
    fn canonical_hash_ignores_key_order() {
        let a = sha256_canonical(&json!({"safety": 1, "community": 2})).unwrap();
        let b = sha256_canonical(&json!({"community": 2, "safety": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn weight_fingerprints_track_content() {
        let base = WeightProfile::default();
        let same = WeightProfile::default();
        let edited = base.with_weight(NeedCategory::Community, 0.5).unwrap();
        assert_eq!(weights_id(&base).unwrap(), weights_id(&same).unwrap());
        assert_ne!(weights_id(&base).unwrap(), weights_id(&edited).unwrap());
        assert!(weights_id(&base).unwrap().starts_with("W:"));
    }

    #[test]
    fn impact_fingerprints_track_content() {
        let impact = |v: f64| {
            ImpactScore::new("")
                .with_category(NeedCategory::Safety, v, "")
                .unwrap()
        };
        let id = impact_id(&impact(8.0)).unwrap();
        assert!(id.starts_with("IMP:"));
        assert!(is_lower_hex_64(&id["IMP:".len()..]));
        assert_eq!(id, impact_id(&impact(8.0)).unwrap());
        assert_ne!(id, impact_id(&impact(7.5)).unwrap());
    }
}
