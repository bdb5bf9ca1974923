//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Initialize subsystems → Bind listener
//!
//! Shutdown:
//!     Signal received → Stop accepting → Drain in-flight → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then the listener
//! - Shutdown is cooperative via a broadcast channel

pub mod shutdown;

pub use shutdown::Shutdown;
