//! Authentication, authorization, and header hardening.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CRLF bytes, header count, blocked verbs)
//!     → identity.rs (bearer token → Identity via resolver)
//!     → permissions.rs (role/verb table, namespace isolation)
//!     → Pass to traffic protection
//! ```
//!
//! # Design Decisions
//! - TRACE/CONNECT are blocked before authentication: never legitimate
//! - Method-override headers are ignored; the wire verb is authoritative
//! - 401 (unauthenticated) and 403 (forbidden) are kept strictly distinct

pub mod headers;
pub mod identity;
pub mod permissions;

pub use identity::{bearer_token, Identity, IdentityResolver, Role, StaticTokenResolver};
pub use permissions::{PermissionTable, NAMESPACE_HEADER};
