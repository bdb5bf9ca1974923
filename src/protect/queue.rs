//! Pending-work admission ceiling.
//!
//! Flood prevention upstream of any async processing: once the pending
//! counter hits capacity, admission is refused immediately. The counter
//! never exceeds its ceiling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct QueueAdmission {
    pending: AtomicUsize,
    capacity: usize,
}

impl QueueAdmission {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            pending: AtomicUsize::new(0),
            capacity,
        })
    }

    /// Admit one unit of pending work, or `None` at capacity.
    pub fn try_admit(self: &Arc<Self>) -> Option<QueuePermit> {
        let admitted = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.capacity).then_some(current + 1)
            })
            .is_ok();
        admitted.then(|| QueuePermit {
            queue: Arc::clone(self),
        })
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// An admitted unit of pending work; dropping it frees the slot.
pub struct QueuePermit {
    queue: Arc<QueueAdmission>,
}

impl Drop for QueuePermit {
    fn drop(&mut self) {
        self.queue.pending.fetch_sub(1, Ordering::AcqRel);
    }
}
