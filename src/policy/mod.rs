//! Cloud policy validation (offline/audit path).
//!
//! # Data Flow
//! ```text
//! stored policy documents (JSON)
//!     → document.rs (parse into the shared statement shape)
//!     → iam.rs (least-privilege analysis)
//!     → encryption.rs (bucket/registry encryption compliance)
//!     → trust.rs (role-assumption trust policies)
//!     → secrets_access.rs (secrets-store path scoping)
//!     → findings → audit sink
//! ```
//!
//! # Design Decisions
//! - Pure functions over static documents; nothing here touches the
//!   request path or blocks live traffic
//! - One statement shape serves IAM, bucket, and endpoint policies;
//!   only the accepted-principal rules differ
//! - Findings are advisory; severity tells the audit consumer how loud
//!   to be

pub mod document;
pub mod encryption;
pub mod iam;
pub mod secrets_access;
pub mod trust;

use serde::Serialize;

pub use document::{PolicyDocument, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Info,
    Warning,
    Critical,
}

/// A single compliance finding, fed to the audit sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyFinding {
    pub severity: FindingSeverity,
    pub code: String,
    pub detail: String,
}

impl PolicyFinding {
    pub fn critical(code: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: FindingSeverity::Critical,
            code: code.to_string(),
            detail: detail.into(),
        }
    }

    pub fn warning(code: &str, detail: impl Into<String>) -> Self {
        Self {
            severity: FindingSeverity::Warning,
            code: code.to_string(),
            detail: detail.into(),
        }
    }
}
