// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache construction.

use ohno::OhnoCore;

use crate::list::MAX_CAPACITY;

/// The requested capacity cannot be used to build a cache.
///
/// A cache must hold at least one entry and at most [`MAX_CAPACITY`](crate::MAX_CAPACITY)
/// entries. Capacities outside that range are rejected rather than clamped.
///
/// # Example
///
/// ```
/// use lru_cache::LruCache;
///
/// let error = LruCache::<String, i32>::new(0).expect_err("zero capacity is rejected");
/// assert_eq!(error.capacity(), 0);
/// ```
#[derive(ohno::Error)]
#[no_constructors]
#[display("cache capacity must be between 1 and {max}, got {capacity}")]
pub struct CapacityError {
    capacity: usize,
    max: usize,
    inner: OhnoCore,
}

impl CapacityError {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max: MAX_CAPACITY,
            inner: OhnoCore::default(),
        }
    }

    /// Returns the rejected capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Validates a requested capacity.
pub(crate) fn check_capacity(capacity: usize) -> Result<usize, CapacityError> {
    if (1..=MAX_CAPACITY).contains(&capacity) {
        Ok(capacity)
    } else {
        Err(CapacityError::new(capacity))
    }
}
