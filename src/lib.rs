//! Build-Gateway: request-path security gateway for a multi-tenant
//! build/deploy API.
//!
//! Every inbound request passes through a fixed validation pipeline before
//! it may reach the wrapped build API:
//!
//! ```text
//! size guard → header validation → verb check → authn/authz →
//! rate/connection/queue admission → bounded body read →
//! structural guards → injection defense → forward →
//! secret redaction on the way out
//! ```
//!
//! The pipeline is fail-closed: any detection rejects the whole request,
//! nothing is sanitized-then-forwarded. The `policy` module is the offline
//! counterpart, linting stored IAM/bucket/trust documents into the audit
//! sink rather than blocking live traffic.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod injection;
pub mod lifecycle;
pub mod normalize;
pub mod observability;
pub mod policy;
pub mod protect;
pub mod secrets;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, Rejection};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
