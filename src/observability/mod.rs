//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, post-redaction)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, remote)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing; the audit target is reserved for
//!   sanitized security events
//! - Metrics are cheap (atomic increments); labels carry categories and
//!   signature types, never input text

pub mod logging;
pub mod metrics;
