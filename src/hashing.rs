//! Hashing - SHA-256 Digests for Audit Records
//!
//! Composed kernels and generated labels are stored by the caller. Digests
//! let them prove which text was sent to the model or the printer.

use sha2::{Digest, Sha256};

use crate::label::LabelSpec;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// label_hash = sha256(spec_json + ":" + zpl + ":" + engine_version)
///
/// `spec_json` is the spec's compact serde form. Field order follows the
/// struct declaration, so equal specs always serialize identically.
pub fn compute_label_hash(
    spec: &LabelSpec,
    zpl: &str,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let spec_json = serde_json::to_string(spec)?;
    Ok(sha256_hex(
        format!("{}:{}:{}", spec_json, zpl, engine_version).as_bytes(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelVariant;
    use chrono::{TimeZone, Utc};

    fn spec(quantity: u32) -> LabelSpec {
        LabelSpec {
            product_name: "Acetone".to_string(),
            cas_number: Some("67-64-1".to_string()),
            signal_word: "Danger".to_string(),
            manufacturer: "Solvents Inc".to_string(),
            pictogram_codes: vec!["GHS02".to_string()],
            hazard_statements: vec!["H225".to_string()],
            precautionary_statements: vec![],
            variant: LabelVariant::Secondary,
            quantity,
            generated_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_label_hash_covers_spec_and_zpl() {
        let h1 = compute_label_hash(&spec(1), "^XA^XZ", "1.0.0").unwrap();
        assert_eq!(h1, compute_label_hash(&spec(1), "^XA^XZ", "1.0.0").unwrap());
        assert_ne!(h1, compute_label_hash(&spec(1), "^XA^PQ2^XZ", "1.0.0").unwrap());
        assert_ne!(h1, compute_label_hash(&spec(2), "^XA^XZ", "1.0.0").unwrap());
        assert_ne!(h1, compute_label_hash(&spec(1), "^XA^XZ", "1.0.1").unwrap());
        assert_eq!(h1.len(), 64);
    }
}
