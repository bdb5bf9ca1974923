//! Role-assumption trust policy validation.
//!
//! A trust policy grants assume-role gated on an exact federated-subject
//! condition. Validation is deliberately stricter than the document
//! wording: even when the subject matches, the target role must be scoped
//! to the caller's own namespace and must not look administrative.

use serde_json::Value;

use super::document::PolicyDocument;
use super::PolicyFinding;

const ASSUME_ACTIONS: &[&str] = &[
    "sts:AssumeRole",
    "sts:AssumeRoleWithWebIdentity",
];

/// Extract the exact federated-subject condition (`...:sub` key under
/// `StringEquals`) from the document's assume-role statements.
pub fn federated_subject(doc: &PolicyDocument) -> Option<String> {
    for stmt in &doc.statements {
        if !stmt.is_allow() {
            continue;
        }
        if !stmt
            .actions
            .iter()
            .any(|a| ASSUME_ACTIONS.iter().any(|aa| aa.eq_ignore_ascii_case(a)))
        {
            continue;
        }
        let Some(Value::Object(condition)) = &stmt.condition else {
            continue;
        };
        let Some(Value::Object(equals)) = condition.get("StringEquals") else {
            continue;
        };
        for (key, value) in equals {
            if key.ends_with(":sub") || key.ends_with(".sub") {
                if let Value::String(subject) = value {
                    return Some(subject.clone());
                }
            }
        }
    }
    None
}

/// Namespace segment of a subject. Accepts the service-account form
/// `system:serviceaccount:<ns>:<name>` and the bare `<ns>:<identity>`.
pub fn subject_namespace(subject: &str) -> Option<&str> {
    let parts: Vec<&str> = subject.split(':').collect();
    match parts.as_slice() {
        ["system", "serviceaccount", ns, _name] => Some(ns),
        [ns, _identity] => Some(ns),
        _ => None,
    }
}

fn looks_administrative(role: &str) -> bool {
    let lowered = role.to_ascii_lowercase();
    lowered.contains("admin") || lowered.contains("cluster")
}

/// Validate a role-assumption request against a trust policy.
///
/// Allowed only when the trust policy's subject equals the caller's own
/// subject AND the target role name is scoped to the caller's namespace.
/// Cross-namespace and administrative targets are denied regardless of
/// what the trust document would permit.
pub fn validate_role_assumption(
    doc: &PolicyDocument,
    caller_subject: &str,
    target_role: &str,
) -> Result<(), PolicyFinding> {
    let bound = federated_subject(doc).ok_or_else(|| {
        PolicyFinding::critical(
            "missing_subject_condition",
            "Trust policy has no exact federated-subject condition",
        )
    })?;

    if bound != caller_subject {
        return Err(PolicyFinding::critical(
            "subject_mismatch",
            "Trust policy subject does not match the caller",
        ));
    }

    let namespace = subject_namespace(caller_subject).ok_or_else(|| {
        PolicyFinding::critical("malformed_subject", "Subject is not namespace:identity shaped")
    })?;

    if !target_role.starts_with(&format!("{namespace}-")) {
        return Err(PolicyFinding::critical(
            "cross_namespace_role",
            format!("Role {target_role} is not scoped to namespace {namespace}"),
        ));
    }
    if looks_administrative(target_role) {
        return Err(PolicyFinding::critical(
            "administrative_role",
            format!("Role {target_role} looks administrative"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trust_doc(subject: &str) -> PolicyDocument {
        PolicyDocument::parse(&format!(
            r#"{{"Statement": {{
                "Effect": "Allow",
                "Principal": {{"Federated": "arn:aws:iam::123:oidc-provider/oidc.eks.example"}},
                "Action": "sts:AssumeRoleWithWebIdentity",
                "Condition": {{"StringEquals": {{"oidc.eks.example:sub": "{subject}"}}}}
            }}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn extracts_federated_subject() {
        let doc = trust_doc("system:serviceaccount:ns-a:svc-a");
        assert_eq!(
            federated_subject(&doc).as_deref(),
            Some("system:serviceaccount:ns-a:svc-a")
        );
    }

    #[test]
    fn own_namespace_role_is_allowed() {
        let doc = trust_doc("system:serviceaccount:ns-a:svc-a");
        assert!(validate_role_assumption(
            &doc,
            "system:serviceaccount:ns-a:svc-a",
            "ns-a-svc-role"
        )
        .is_ok());
    }

    #[test]
    fn cross_namespace_admin_role_is_denied() {
        let doc = trust_doc("system:serviceaccount:ns-a:svc-a");
        let err = validate_role_assumption(
            &doc,
            "system:serviceaccount:ns-a:svc-a",
            "ns-b-admin-role",
        )
        .unwrap_err();
        assert_eq!(err.code, "cross_namespace_role");
    }

    #[test]
    fn own_namespace_admin_role_is_denied() {
        let doc = trust_doc("system:serviceaccount:ns-a:svc-a");
        let err = validate_role_assumption(
            &doc,
            "system:serviceaccount:ns-a:svc-a",
            "ns-a-admin-role",
        )
        .unwrap_err();
        assert_eq!(err.code, "administrative_role");
    }

    #[test]
    fn subject_mismatch_is_denied() {
        let doc = trust_doc("system:serviceaccount:ns-a:svc-a");
        let err = validate_role_assumption(
            &doc,
            "system:serviceaccount:ns-b:svc-b",
            "ns-b-svc-role",
        )
        .unwrap_err();
        assert_eq!(err.code, "subject_mismatch");
    }

    #[test]
    fn missing_condition_is_critical() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {"Effect": "Allow", "Action": "sts:AssumeRole"}}"#,
        )
        .unwrap();
        let err = validate_role_assumption(&doc, "ns-a:svc-a", "ns-a-role").unwrap_err();
        assert_eq!(err.code, "missing_subject_condition");
    }

    #[test]
    fn bare_namespace_identity_subjects_work() {
        let doc = trust_doc("ns-a:builder");
        assert!(validate_role_assumption(&doc, "ns-a:builder", "ns-a-build-role").is_ok());
    }
}
