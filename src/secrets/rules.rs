//! The credential signature table.
//!
//! Ordered most-specific-first: a labeled AWS key is reported as
//! `aws_access_key`, not swallowed by the generic long-token shape at the
//! bottom of the table.

use super::{Confidence, SecretKind, SecretRule};
use regex::Regex;

struct RuleDef {
    pattern: &'static str,
    kind: SecretKind,
    confidence: Confidence,
}

const RULE_TABLE: &[RuleDef] = &[
    RuleDef {
        pattern: r"AKIA[0-9A-Z]{16}",
        kind: SecretKind::AwsAccessKey,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r#"(?i)aws[_-]?secret[_-]?(access[_-]?)?key\s*[:=]\s*["']?(?P<secret>[A-Za-z0-9/+=]{40})"#,
        kind: SecretKind::AwsSecretKey,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r"gh[pousr]_[A-Za-z0-9]{36,}",
        kind: SecretKind::GithubPat,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r"xox[baprs]-[A-Za-z0-9-]{10,}",
        kind: SecretKind::SlackToken,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r"eyJ[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}",
        kind: SecretKind::Jwt,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r"-----BEGIN (RSA |EC |DSA |OPENSSH |PGP )?PRIVATE KEY( BLOCK)?-----",
        kind: SecretKind::PrivateKey,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r"(?i)\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|amqps?)://[^\s/@:]+:[^\s@]+@[^\s\x22']+",
        kind: SecretKind::DbConnection,
        confidence: Confidence::High,
    },
    RuleDef {
        pattern: r#"(?i)\b(?:password|passwd|pwd)\s*[:=]\s*["']?(?P<secret>[^\s"',;]{6,})"#,
        kind: SecretKind::Password,
        confidence: Confidence::Medium,
    },
    RuleDef {
        pattern: r#"(?i)\b(?:api[_-]?key|apikey|auth[_-]?token|access[_-]?token)\s*[:=]\s*["']?(?P<secret>[A-Za-z0-9_\-\.]{16,})"#,
        kind: SecretKind::ApiKey,
        confidence: Confidence::Medium,
    },
    // Long unstructured tokens; last so labeled rules claim their spans.
    RuleDef {
        pattern: r"\b[A-Za-z0-9+/=_-]{40,}\b",
        kind: SecretKind::GenericToken,
        confidence: Confidence::Low,
    },
];

pub fn compile() -> Vec<SecretRule> {
    RULE_TABLE
        .iter()
        .map(|def| SecretRule {
            regex: Regex::new(def.pattern).expect("invalid secret pattern"),
            kind: def.kind,
            confidence: def.confidence,
        })
        .collect()
}
