//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parse)
//! - Detect duplicate token entries and unknown roles
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::auth::identity::Role;
use crate::config::schema::GatewayConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address: {0}")]
    BadBindAddress(String),
    #[error("upstream address is empty")]
    EmptyUpstream,
    #[error("limit {0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("duplicate token for principal {0}")]
    DuplicateToken(String),
    #[error("unknown role {role} for principal {principal}")]
    UnknownRole { principal: String, role: String },
}

/// Run all semantic checks, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.upstream.address.is_empty() {
        errors.push(ValidationError::EmptyUpstream);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroLimit("listener.max_connections"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("limits.max_body_bytes"));
    }
    if config.limits.max_queue_pending == 0 {
        errors.push(ValidationError::ZeroLimit("limits.max_queue_pending"));
    }
    if config.rate_limit.enabled && config.rate_limit.limit == 0 {
        errors.push(ValidationError::ZeroLimit("rate_limit.limit"));
    }
    if config.rate_limit.enabled && config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroLimit("rate_limit.window_secs"));
    }

    let mut seen = HashSet::new();
    for entry in &config.auth.tokens {
        if !seen.insert(entry.token.as_str()) {
            errors.push(ValidationError::DuplicateToken(entry.principal.clone()));
        }
        if Role::parse(&entry.role).is_none() {
            errors.push(ValidationError::UnknownRole {
                principal: entry.principal.clone(),
                role: entry.role.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TokenEntry;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.rate_limit.limit = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_unknown_role() {
        let mut config = GatewayConfig::default();
        config.auth.tokens.push(TokenEntry {
            token: "t".into(),
            principal: "p".into(),
            role: "superuser".into(),
            namespace: "ns".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnknownRole { .. }));
    }

    #[test]
    fn rejects_duplicate_tokens() {
        let mut config = GatewayConfig::default();
        for principal in ["a", "b"] {
            config.auth.tokens.push(TokenEntry {
                token: "same".into(),
                principal: principal.into(),
                role: "viewer".into(),
                namespace: "ns".into(),
            });
        }
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateToken(_))));
    }
}
