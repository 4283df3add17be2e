//! Organism identity allocation.

use std::sync::atomic::{AtomicU64, Ordering};
use vivarium_core::OrganismId;

/// Monotonic, never-reused source of organism ids.
///
/// Wrap it in an `Arc` to let several environments draw from one sequence.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> OrganismId {
        OrganismId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to `next_id` will return
    pub fn peek(&self) -> OrganismId {
        OrganismId(self.next.load(Ordering::Relaxed))
    }

    /// Whether `id` has already been handed out by this allocator
    pub fn has_issued(&self, id: OrganismId) -> bool {
        id < self.peek()
    }
}
