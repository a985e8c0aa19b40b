use std::sync::atomic::{AtomicU64, Ordering};

use super::base62;

/// Monotonic counter strategy
///
/// Only unique within one process: two instances sharing no state will
/// hand out the same codes.
#[derive(Debug)]
pub struct CounterGenerator {
    next: AtomicU64,
}

impl CounterGenerator {
    /// `offset` is the first value handed out; a high offset avoids short,
    /// guessable early codes.
    pub fn new(offset: u64) -> Self {
        Self {
            next: AtomicU64::new(offset),
        }
    }

    pub fn next_value(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_code(&self) -> String {
        base62::encode(self.next_value())
    }
}
