//! Connection identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for one client connection.
pub type ConnId = u64;

/// Hands out process-unique, monotonically increasing connection ids.
///
/// Monotonicity matters: room participant maps are ordered by `ConnId`,
/// which makes participant listings come out in join order.
#[derive(Debug, Default)]
pub struct ConnIdGenerator {
    counter: AtomicU64,
}

impl ConnIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next unique connection id.
    pub fn next(&self) -> ConnId {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}
