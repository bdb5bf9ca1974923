//! Secrets-store access scoping.
//!
//! A role may only reach secrets whose path-namespace equals the role's
//! own namespace. The namespace is derived structurally: secret paths are
//! `<namespace>/<name>` and role names carry the `<namespace>-` prefix.

use super::PolicyFinding;

/// Validate that every secret path a role is granted stays inside the
/// role's own namespace.
pub fn validate_secrets_access(role_name: &str, secret_paths: &[String]) -> Vec<PolicyFinding> {
    let mut findings = Vec::new();
    for path in secret_paths {
        let Some((namespace, _rest)) = path.split_once('/') else {
            findings.push(PolicyFinding::warning(
                "unscoped_secret_path",
                format!("Secret path {path} has no namespace segment"),
            ));
            continue;
        };
        if !role_name.starts_with(&format!("{namespace}-")) {
            findings.push(PolicyFinding::critical(
                "cross_namespace_secret",
                format!("Role {role_name} may not read secrets under {namespace}/"),
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn own_namespace_paths_are_clean() {
        let findings =
            validate_secrets_access("ns-a-build-role", &paths(&["ns-a/db-password", "ns-a/api-key"]));
        assert!(findings.is_empty());
    }

    #[test]
    fn foreign_namespace_path_is_critical() {
        let findings = validate_secrets_access("ns-a-build-role", &paths(&["ns-b/db-password"]));
        assert!(findings.iter().any(|f| f.code == "cross_namespace_secret"));
    }

    #[test]
    fn unscoped_path_is_flagged() {
        let findings = validate_secrets_access("ns-a-build-role", &paths(&["global-secret"]));
        assert!(findings.iter().any(|f| f.code == "unscoped_secret_path"));
    }
}
