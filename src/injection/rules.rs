//! The injection signature table.
//!
//! Rules are declarative data, compiled once at engine construction.
//! The table is append-only; ordering is stable so reports are
//! deterministic, but any single match rejects regardless of position.

use super::{Category, InjectionRule, Severity};
use regex::Regex;

struct RuleDef {
    pattern: &'static str,
    category: Category,
    severity: Severity,
    description: &'static str,
}

const RULE_TABLE: &[RuleDef] = &[
    // SQL
    RuleDef {
        pattern: r"(?i)'\s*(or|and)\s*'",
        category: Category::Sql,
        severity: Severity::Critical,
        description: "quoted boolean tautology",
    },
    RuleDef {
        pattern: r"(?i)\bunion\s+(all\s+)?select\b",
        category: Category::Sql,
        severity: Severity::Critical,
        description: "UNION SELECT extraction",
    },
    RuleDef {
        pattern: r"(?i);\s*(drop|delete|truncate|alter)\b",
        category: Category::Sql,
        severity: Severity::Critical,
        description: "stacked destructive statement",
    },
    RuleDef {
        pattern: r"(?i)\bor\s+1\s*=\s*1\b",
        category: Category::Sql,
        severity: Severity::Critical,
        description: "numeric tautology",
    },
    RuleDef {
        pattern: r"(?i)\b(sleep|benchmark|pg_sleep|waitfor\s+delay)\s*\(",
        category: Category::Sql,
        severity: Severity::High,
        description: "time-based probe",
    },
    // NoSQL operator smuggling in serialized form
    RuleDef {
        pattern: r#"(?i)"\$(where|ne|gt|gte|lt|lte|regex|in|nin|or|and|not|exists)""#,
        category: Category::Nosql,
        severity: Severity::Critical,
        description: "serialized operator key",
    },
    RuleDef {
        pattern: r"(?i)\$where\b",
        category: Category::Nosql,
        severity: Severity::Critical,
        description: "$where evaluation",
    },
    // Path traversal
    RuleDef {
        pattern: r"\.\./|\.\.\\",
        category: Category::PathTraversal,
        severity: Severity::Critical,
        description: "parent-directory traversal",
    },
    RuleDef {
        pattern: r"(?i)/etc/(passwd|shadow|hosts)",
        category: Category::PathTraversal,
        severity: Severity::Critical,
        description: "system file target",
    },
    RuleDef {
        pattern: r"(?i)(/proc/self|/var/run/secrets)",
        category: Category::PathTraversal,
        severity: Severity::Critical,
        description: "runtime secret mount target",
    },
    // Command injection
    RuleDef {
        pattern: r"(?i)[;&|]+\s*(cat|ls|rm|curl|wget|nc|bash|sh|chmod|chown|python|perl)\b",
        category: Category::Command,
        severity: Severity::Critical,
        description: "chained shell command",
    },
    RuleDef {
        pattern: r"\$\([^)]{0,512}\)",
        category: Category::Command,
        severity: Severity::Critical,
        description: "command substitution",
    },
    RuleDef {
        pattern: r"`[^`]{1,512}`",
        category: Category::Command,
        severity: Severity::High,
        description: "backtick substitution",
    },
    RuleDef {
        pattern: r"(?i)\brm\s+-rf?\b",
        category: Category::Command,
        severity: Severity::Critical,
        description: "recursive delete",
    },
    // Environment variable exfiltration
    RuleDef {
        pattern: r"\$\{?(AWS|SECRET|TOKEN|PASSWORD|API_KEY|KUBECONFIG|LD_PRELOAD|LD_LIBRARY_PATH)[A-Z_]*\}?",
        category: Category::EnvVar,
        severity: Severity::High,
        description: "sensitive environment reference",
    },
    // Unsafe YAML tags (deserialization gadgets)
    RuleDef {
        pattern: r"(?i)!!(python|ruby|java[a-z]*)[/.:]",
        category: Category::YamlUnsafe,
        severity: Severity::Critical,
        description: "language-native YAML tag",
    },
    RuleDef {
        pattern: r"(?i)!!\s*(new|construct):",
        category: Category::YamlUnsafe,
        severity: Severity::High,
        description: "constructor YAML tag",
    },
    // Code injection
    RuleDef {
        pattern: r"(?i)\b(eval|exec|system|popen|execfile)\s*\(",
        category: Category::Code,
        severity: Severity::Critical,
        description: "dynamic evaluation call",
    },
    RuleDef {
        pattern: r"(?i)__import__\s*\(|\bos\.system\b|\bsubprocess\.(run|call|popen)",
        category: Category::Code,
        severity: Severity::Critical,
        description: "interpreter escape",
    },
    // Template injection
    RuleDef {
        pattern: r"\{\{.+?\}\}|\{%.+?%\}",
        category: Category::Template,
        severity: Severity::High,
        description: "template expression delimiters",
    },
    RuleDef {
        pattern: r"<%.+?%>",
        category: Category::Template,
        severity: Severity::High,
        description: "ERB/JSP expression delimiters",
    },
    // XSS
    RuleDef {
        pattern: r"(?i)<script[\s>]",
        category: Category::Xss,
        severity: Severity::Critical,
        description: "script tag",
    },
    RuleDef {
        pattern: r"(?i)\bjavascript\s*:",
        category: Category::Xss,
        severity: Severity::High,
        description: "javascript: URI",
    },
    RuleDef {
        pattern: r"(?i)\bon(error|load|click|mouseover|focus|submit)\s*=",
        category: Category::Xss,
        severity: Severity::High,
        description: "inline event handler",
    },
    RuleDef {
        pattern: r"(?i)<iframe[\s>]",
        category: Category::Xss,
        severity: Severity::High,
        description: "iframe embed",
    },
    // LDAP filter injection
    RuleDef {
        pattern: r"\*\)\(|\(\|\(|\(&\(",
        category: Category::Ldap,
        severity: Severity::High,
        description: "filter metacharacter sequence",
    },
    // Header / CRLF response splitting
    RuleDef {
        pattern: r"(?i)%0d%0a",
        category: Category::HeaderCrlf,
        severity: Severity::Critical,
        description: "encoded CRLF pair",
    },
    RuleDef {
        pattern: r"(?i)[\r\n]\s*(set-cookie|location|content-length|transfer-encoding)\s*:",
        category: Category::HeaderCrlf,
        severity: Severity::Critical,
        description: "smuggled response header",
    },
];

/// Compile the rule table. Patterns are static and known-good; a failure
/// here is a programming error caught by the registry test below.
pub fn compile() -> Vec<InjectionRule> {
    RULE_TABLE
        .iter()
        .map(|def| InjectionRule {
            regex: Regex::new(def.pattern).expect("invalid signature pattern"),
            category: def.category,
            severity: def.severity,
            description: def.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        let rules = compile();
        assert_eq!(rules.len(), RULE_TABLE.len());
    }

    #[test]
    fn table_covers_every_category() {
        use super::Category::*;
        let rules = compile();
        for category in [
            Sql, Command, EnvVar, PathTraversal, Code, Template, Nosql, YamlUnsafe, Xss, Ldap,
            HeaderCrlf,
        ] {
            assert!(
                rules.iter().any(|r| r.category == category),
                "no rule for {:?}",
                category
            );
        }
    }
}
