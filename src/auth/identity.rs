//! Token resolution and roles.
//!
//! The gateway never issues or stores credentials; tokens are resolved to
//! identities by an external collaborator behind [`IdentityResolver`].
//! [`StaticTokenResolver`] is the config-backed implementation used in
//! tests and single-instance deployments.

use std::collections::HashMap;

use axum::http::Method;

use crate::config::schema::TokenEntry;

/// Fixed role set. Permissions are a static table, not data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "viewer" => Some(Role::Viewer),
            "editor" => Some(Role::Editor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// The permission table: viewer reads, editor reads and writes,
    /// admin additionally deletes.
    pub fn allows(self, method: &Method) -> bool {
        match self {
            Role::Viewer => *method == Method::GET,
            Role::Editor => [Method::GET, Method::POST, Method::PUT].contains(method),
            Role::Admin => [
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ]
            .contains(method),
        }
    }
}

/// Resolved caller identity, attached to the request via extensions.
#[derive(Debug, Clone)]
pub struct Identity {
    pub principal: String,
    pub role: Role,
    pub namespace: String,
}

/// Collaborator seam: token → identity. Unresolvable tokens are
/// unauthenticated, not forbidden.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<Identity>;
}

/// Config-backed resolver over a fixed token table.
pub struct StaticTokenResolver {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenResolver {
    pub fn new(entries: &[TokenEntry]) -> Self {
        let tokens = entries
            .iter()
            .filter_map(|e| {
                let role = Role::parse(&e.role)?;
                Some((
                    e.token.clone(),
                    Identity {
                        principal: e.principal.clone(),
                        role,
                        namespace: e.namespace.clone(),
                    },
                ))
            })
            .collect();
        Self { tokens }
    }
}

impl IdentityResolver for StaticTokenResolver {
    fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).cloned()
    }
}

/// Extract the bearer token from an `Authorization` header value.
/// Rejects a malformed scheme and an empty token.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let rest = header_value.strip_prefix("Bearer ")?;
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
