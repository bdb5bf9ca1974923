//! Storage/registry encryption compliance.

use serde::Deserialize;

use super::PolicyFinding;

/// Declared encryption configuration of a bucket or registry.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EncryptionConfig {
    /// `AES256` or `aws:kms`; absent means unencrypted.
    #[serde(default)]
    pub sse_algorithm: Option<String>,
    #[serde(default)]
    pub kms_key_id: Option<String>,
}

/// A syntactically valid KMS key identifier: a key ARN, a bare key UUID,
/// or an alias.
fn valid_kms_key_id(id: &str) -> bool {
    if id.starts_with("alias/") {
        return id.len() > "alias/".len();
    }
    let uuid_part = id
        .strip_prefix("arn:aws:kms:")
        .and_then(|rest| rest.split_once(":key/").map(|(_, key)| key))
        .unwrap_or(id);
    let segments: Vec<&str> = uuid_part.split('-').collect();
    segments.len() == 5
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Validate encryption configuration. Absent encryption rejects; a KMS
/// declaration without a valid key identifier rejects.
pub fn validate_encryption(config: &EncryptionConfig) -> Vec<PolicyFinding> {
    let mut findings = Vec::new();
    match config.sse_algorithm.as_deref() {
        None | Some("") => {
            findings.push(PolicyFinding::critical(
                "encryption_absent",
                "No server-side encryption configured",
            ));
        }
        Some("AES256") => {}
        Some("aws:kms") => match config.kms_key_id.as_deref() {
            Some(id) if valid_kms_key_id(id) => {}
            _ => findings.push(PolicyFinding::critical(
                "invalid_kms_key",
                "KMS mode declared without a valid key identifier",
            )),
        },
        Some(other) => {
            findings.push(PolicyFinding::warning(
                "unknown_encryption_mode",
                format!("Unrecognized encryption mode {other}"),
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_encryption_is_rejected() {
        let findings = validate_encryption(&EncryptionConfig::default());
        assert!(findings.iter().any(|f| f.code == "encryption_absent"));
    }

    #[test]
    fn aes256_is_compliant() {
        let config = EncryptionConfig {
            sse_algorithm: Some("AES256".into()),
            kms_key_id: None,
        };
        assert!(validate_encryption(&config).is_empty());
    }

    #[test]
    fn kms_requires_key_id() {
        let config = EncryptionConfig {
            sse_algorithm: Some("aws:kms".into()),
            kms_key_id: None,
        };
        let findings = validate_encryption(&config);
        assert!(findings.iter().any(|f| f.code == "invalid_kms_key"));
    }

    #[test]
    fn kms_key_forms() {
        assert!(valid_kms_key_id("1234abcd-12ab-34cd-56ef-1234567890ab"));
        assert!(valid_kms_key_id(
            "arn:aws:kms:eu-west-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab"
        ));
        assert!(valid_kms_key_id("alias/build-artifacts"));
        assert!(!valid_kms_key_id("not-a-key"));
        assert!(!valid_kms_key_id(""));
    }

    #[test]
    fn kms_with_valid_arn_is_compliant() {
        let config = EncryptionConfig {
            sse_algorithm: Some("aws:kms".into()),
            kms_key_id: Some(
                "arn:aws:kms:eu-west-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab"
                    .into(),
            ),
        };
        assert!(validate_encryption(&config).is_empty());
    }
}
