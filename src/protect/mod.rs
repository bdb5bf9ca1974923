//! Resource and traffic protection.
//!
//! # Data Flow
//! ```text
//! Admitted request:
//!     → rate_limit.rs (per-client fixed window)
//!     → connections.rs (in-flight ceiling, immediate rejection)
//!     → queue.rs (pending-work ceiling)
//!     → bounded body read under timeout (http layer)
//!
//! Cluster-facing checks (invoked with collaborator-supplied state):
//!     → quota.rs (resource quotas, disruption budgets)
//! ```
//!
//! # Design Decisions
//! - Counters are sharded per client (dashmap), not one global lock
//! - At capacity the gateway rejects immediately; it never queues, to
//!   bound tail latency
//! - Counter entries older than twice the window are evicted
//!   opportunistically to bound memory under unbounded client cardinality
//! - No retries anywhere; retry policy belongs to callers

pub mod connections;
pub mod queue;
pub mod quota;
pub mod rate_limit;

pub use connections::{ConnectionLimiter, ConnectionPermit};
pub use queue::{QueueAdmission, QueuePermit};
pub use quota::{DisruptionBudget, ResourceQuota};
pub use rate_limit::{RateDecision, RateLimiter};
