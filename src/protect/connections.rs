//! Concurrent in-flight request ceiling.
//!
//! # Design Decisions
//! - `try_acquire`, never `acquire`: at capacity the request is rejected
//!   immediately instead of queueing, protecting availability over fairness
//! - The permit is RAII; a slot is released even if the handler panics

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded count of concurrent in-flight requests per instance.
pub struct ConnectionLimiter {
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl ConnectionLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Claim a slot, or `None` when the instance is saturated.
    pub fn try_acquire(&self) -> Option<ConnectionPermit> {
        self.slots
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| ConnectionPermit { _permit: permit })
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A held in-flight slot; dropping it releases the slot.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_at_capacity_without_waiting() {
        let limiter = ConnectionLimiter::new(2);
        let a = limiter.try_acquire().unwrap();
        let _b = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());
        drop(a);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn permits_release_on_drop() {
        let limiter = ConnectionLimiter::new(1);
        {
            let _p = limiter.try_acquire().unwrap();
            assert_eq!(limiter.available(), 0);
        }
        assert_eq!(limiter.available(), 1);
    }
}
