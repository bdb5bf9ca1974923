//! HTTP server and request pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run every inbound request through the inspection pipeline
//! - Forward clean requests to the upstream build API
//! - Redact secrets from upstream responses before they leave
//!
//! # Data Flow
//! ```text
//! Client → size guard → header validation → verb check
//!        → authn → authz → rate limit → connection/queue admission
//!        → bounded body read → structural guards → injection scan
//!        → upstream forward → secret redaction → Client
//! ```
//!
//! # Design Decisions
//! - The pipeline order is fixed; the cheapest checks run first and the
//!   first failing check ends the request
//! - Every rejection produces a structured JSON body, a metrics increment,
//!   and an audit event

pub mod forward;
pub mod server;

pub use server::{AppState, HttpServer};
