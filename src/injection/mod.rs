//! Injection defense engine.
//!
//! # Data Flow
//! ```text
//! raw input ──┬────────────────────────────┐
//!             └─▶ normalize (≤3 passes) ───┴─▶ scan(raw, normalized)
//!                                               │
//! parsed body ─▶ structural pre-guards ─▶ recursive walk ─▶ reject/accept
//! ```
//!
//! # Design Decisions
//! - Rules are data: an ordered, append-only table in `rules.rs`
//! - Both raw and normalized forms are scanned; some signatures only
//!   exist pre-decode (literal CRLF), others only post-decode
//! - Any match is a hard reject; no repair, no partial sanitization
//! - Structural DoS guards run before any parser state is allocated

pub mod rules;
pub mod structured;

use regex::Regex;

use crate::normalize::normalize;

pub use structured::{StructuralLimits, StructuredViolation};

/// Attack class a rule belongs to. The category string is what rejection
/// bodies and audit events carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Sql,
    Command,
    EnvVar,
    PathTraversal,
    Code,
    Template,
    Nosql,
    YamlUnsafe,
    Xss,
    Ldap,
    HeaderCrlf,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sql => "sql_injection",
            Category::Command => "command_injection",
            Category::EnvVar => "env_var_injection",
            Category::PathTraversal => "path_traversal",
            Category::Code => "code_injection",
            Category::Template => "template_injection",
            Category::Nosql => "nosql_injection",
            Category::YamlUnsafe => "yaml_unsafe",
            Category::Xss => "xss",
            Category::Ldap => "ldap_injection",
            Category::HeaderCrlf => "header_crlf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// A compiled signature. Registry entries are append-only; order matters
/// only for reporting, never for pass/fail.
pub struct InjectionRule {
    pub regex: Regex,
    pub category: Category,
    pub severity: Severity,
    pub description: &'static str,
}

/// A single signature hit. Carries no input text: rejection logging is
/// category/signature only, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionMatch {
    pub category: Category,
    pub severity: Severity,
    pub description: &'static str,
}

/// The signature registry plus scan entry points.
pub struct InjectionEngine {
    rules: Vec<InjectionRule>,
}

impl InjectionEngine {
    pub fn new() -> Self {
        Self {
            rules: rules::compile(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Match every rule against both the raw and the normalized form.
    /// Returns all matches in registry order.
    pub fn scan(&self, raw: &str, normalized: &str) -> Vec<InjectionMatch> {
        let mut matches = Vec::new();
        for rule in &self.rules {
            if rule.regex.is_match(raw) || rule.regex.is_match(normalized) {
                matches.push(InjectionMatch {
                    category: rule.category,
                    severity: rule.severity,
                    description: rule.description,
                });
            }
        }
        matches
    }

    /// Normalize then scan. The common entry point for path segments,
    /// query strings, and string leaves of parsed bodies.
    pub fn scan_input(&self, raw: &str) -> Vec<InjectionMatch> {
        let normalized = normalize(raw);
        self.scan(raw, &normalized)
    }

    /// First match only, for callers that reject on any hit.
    pub fn first_match(&self, raw: &str) -> Option<InjectionMatch> {
        let normalized = normalize(raw);
        for rule in &self.rules {
            if rule.regex.is_match(raw) || rule.regex.is_match(&normalized) {
                return Some(InjectionMatch {
                    category: rule.category,
                    severity: rule.severity,
                    description: rule.description,
                });
            }
        }
        None
    }
}

impl Default for InjectionEngine {
    fn default() -> Self {
        Self::new()
    }
}
