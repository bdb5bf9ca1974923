//! IAM-style least-privilege analysis.

use super::document::PolicyDocument;
use super::PolicyFinding;

/// Actions that grant or extend privileges regardless of resource scope.
const ESCALATION_ACTIONS: &[&str] = &[
    "iam:PutUserPolicy",
    "iam:PutRolePolicy",
    "iam:PutGroupPolicy",
    "iam:AttachUserPolicy",
    "iam:AttachRolePolicy",
    "iam:AttachGroupPolicy",
    "iam:CreatePolicyVersion",
    "iam:SetDefaultPolicyVersion",
    "iam:UpdateAssumeRolePolicy",
    "iam:CreateAccessKey",
    "iam:PassRole",
    "sts:AssumeRole",
];

/// Analyze a policy document. Flags, per Allow statement:
/// wildcard principal; wildcard action or resource without a compensating
/// condition; known privilege-escalation actions.
pub fn analyze_policy(doc: &PolicyDocument) -> Vec<PolicyFinding> {
    let mut findings = Vec::new();

    for (idx, stmt) in doc.statements.iter().enumerate() {
        if !stmt.is_allow() {
            continue;
        }
        let sid = stmt
            .sid
            .clone()
            .unwrap_or_else(|| format!("statement[{idx}]"));

        if stmt.has_wildcard_principal() {
            findings.push(PolicyFinding::critical(
                "wildcard_principal",
                format!("{sid}: Allow with principal \"*\""),
            ));
        }

        let unconditioned = stmt.condition.is_none();
        if unconditioned && stmt.actions.iter().any(|a| a == "*" || a.ends_with(":*")) {
            findings.push(PolicyFinding::critical(
                "wildcard_action",
                format!("{sid}: wildcard action without condition"),
            ));
        }
        if unconditioned && stmt.resources.iter().any(|r| r == "*") {
            findings.push(PolicyFinding::warning(
                "wildcard_resource",
                format!("{sid}: wildcard resource without condition"),
            ));
        }

        for action in &stmt.actions {
            if ESCALATION_ACTIONS
                .iter()
                .any(|esc| esc.eq_ignore_ascii_case(action))
            {
                findings.push(PolicyFinding::critical(
                    "privilege_escalation",
                    format!("{sid}: action {action} enables privilege escalation"),
                ));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_wildcard_principal_in_allow() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {"Effect": "Allow", "Principal": {"AWS": "*"}, "Action": "s3:GetObject", "Resource": "arn:aws:s3:::b/*"}}"#,
        )
        .unwrap();
        let findings = analyze_policy(&doc);
        assert!(findings.iter().any(|f| f.code == "wildcard_principal"));
    }

    #[test]
    fn deny_statements_are_not_flagged() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {"Effect": "Deny", "Principal": "*", "Action": "*", "Resource": "*"}}"#,
        )
        .unwrap();
        assert!(analyze_policy(&doc).is_empty());
    }

    #[test]
    fn flags_wildcard_action_without_condition() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {"Effect": "Allow", "Action": "s3:*", "Resource": "arn:aws:s3:::b"}}"#,
        )
        .unwrap();
        let findings = analyze_policy(&doc);
        assert!(findings.iter().any(|f| f.code == "wildcard_action"));
    }

    #[test]
    fn condition_compensates_wildcard() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {
                "Effect": "Allow", "Action": "s3:*", "Resource": "*",
                "Condition": {"StringEquals": {"aws:SourceVpce": "vpce-123"}}
            }}"#,
        )
        .unwrap();
        let findings = analyze_policy(&doc);
        assert!(!findings.iter().any(|f| f.code == "wildcard_action"));
        assert!(!findings.iter().any(|f| f.code == "wildcard_resource"));
    }

    #[test]
    fn flags_escalation_actions_even_when_scoped() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {
                "Effect": "Allow",
                "Action": ["iam:PassRole", "s3:GetObject"],
                "Resource": "arn:aws:iam::123:role/builder",
                "Condition": {"StringEquals": {"aws:SourceAccount": "123"}}
            }}"#,
        )
        .unwrap();
        let findings = analyze_policy(&doc);
        assert!(findings.iter().any(|f| f.code == "privilege_escalation"));
    }

    #[test]
    fn least_privilege_policy_is_clean() {
        let doc = PolicyDocument::parse(
            r#"{"Statement": {
                "Effect": "Allow",
                "Action": ["s3:GetObject", "s3:PutObject"],
                "Resource": "arn:aws:s3:::builds/ns-a/*"
            }}"#,
        )
        .unwrap();
        assert!(analyze_policy(&doc).is_empty());
    }
}
