//! Permission table and namespace isolation.
//!
//! # Design Decisions
//! - Permission violations are 403, never 401: the caller is known,
//!   the action is not allowed
//! - The declared target namespace must equal the caller's bound
//!   namespace; absence means "the caller's own"
//! - `/admin` resources require the admin role regardless of verb

use axum::http::Method;

use super::identity::{Identity, Role};
use crate::error::Rejection;

/// Header through which a request declares its target namespace.
pub const NAMESPACE_HEADER: &str = "x-build-namespace";

/// Resource class of a request path, derived from the first segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Build,
    Deploy,
    Artifacts,
    Manifests,
    Admin,
    Other,
}

impl ResourceClass {
    pub fn from_path(path: &str) -> Self {
        match path.trim_start_matches('/').split('/').next() {
            Some("build" | "builds") => ResourceClass::Build,
            Some("deploy" | "deployments") => ResourceClass::Deploy,
            Some("artifacts") => ResourceClass::Artifacts,
            Some("manifests") => ResourceClass::Manifests,
            Some("admin") => ResourceClass::Admin,
            _ => ResourceClass::Other,
        }
    }
}

/// Static role/verb/resource permission table.
pub struct PermissionTable;

impl PermissionTable {
    /// Authorize a resolved identity for a verb on a path.
    pub fn authorize(identity: &Identity, method: &Method, path: &str) -> Result<(), Rejection> {
        let class = ResourceClass::from_path(path);
        if class == ResourceClass::Admin && identity.role != Role::Admin {
            return Err(Rejection::forbidden(
                "admin_resource",
                "Administrative resources require the admin role",
            ));
        }
        if !identity.role.allows(method) {
            return Err(Rejection::forbidden(
                "verb_not_permitted",
                format!("Role {} may not {}", identity.role.as_str(), method),
            ));
        }
        Ok(())
    }

    /// Enforce namespace isolation against the declared target namespace.
    pub fn check_namespace(identity: &Identity, declared: Option<&str>) -> Result<(), Rejection> {
        match declared {
            Some(ns) if ns != identity.namespace => Err(Rejection::forbidden(
                "namespace_isolation",
                "Target namespace does not match caller's namespace",
            )),
            _ => Ok(()),
        }
    }
}
