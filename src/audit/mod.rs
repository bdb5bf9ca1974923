//! Audit sink for sanitized security events.
//!
//! # Design Decisions
//! - Events carry category and matched-signature type only; redaction has
//!   already happened by the time an event is constructed
//! - The sink is a collaborator seam: production fans out to a remote
//!   collector, the default writes structured log records

use serde::Serialize;

use crate::policy::PolicyFinding;

/// A sanitized event worth keeping. Raw secrets and unredacted payloads
/// never reach this type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A live request was rejected.
    Rejection {
        category: String,
        error_code: String,
        client: String,
        principal: Option<String>,
    },
    /// The offline policy validator produced a finding.
    Policy {
        document: String,
        finding: PolicyFinding,
    },
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Default sink: structured log records under the `audit` target.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        match event {
            AuditEvent::Rejection {
                category,
                error_code,
                client,
                principal,
            } => {
                tracing::warn!(
                    target: "audit",
                    category = %category,
                    error_code = %error_code,
                    client = %client,
                    principal = principal.as_deref().unwrap_or("-"),
                    "request rejected"
                );
            }
            AuditEvent::Policy { document, finding } => {
                tracing::warn!(
                    target: "audit",
                    document = %document,
                    severity = ?finding.severity,
                    code = %finding.code,
                    detail = %finding.detail,
                    "policy finding"
                );
            }
        }
    }
}
