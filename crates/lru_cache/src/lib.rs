// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A bounded, thread-safe in-memory cache with least-recently-used eviction.
//!
//! This crate provides [`LruCache`], a fixed-capacity map that, once full, makes room for a new
//! key by evicting the entry that has gone the longest without being read or written.
//!
//! # Architecture
//!
//! The cache pairs two structures behind a single lock:
//!
//! 1. **Recency list:** A doubly-linked list of entries ordered from most to least recently used.
//!    Nodes live in a slab and link to their neighbours by `u32` index, with two permanent
//!    sentinel slots bracketing the live region.
//! 2. **Index:** A [`hashbrown`] map from each key to the slab slot holding its entry, so a hit
//!    jumps straight to its list position without a traversal.
//!
//! The cache owns every entry. Reads hand out clones of values, never references into the
//! cache; store values behind an [`Arc`](std::sync::Arc) to share them cheaply.
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity | Notes |
//! | :--- | :--- | :--- |
//! | **`get`** | $O(1)$ | Promotes the entry on a hit. Misses leave the order untouched. |
//! | **`put`** | Amortized $O(1)$ | Evicts the least recently used entry when full. |
//! | **`delete`** | $O(1)$ | No-op for absent keys. |
//! | **`keys`** | $O(n)$ | Snapshot, most recently used first. |
//! | **Concurrency** | Single `Mutex` | All operations are linearizable. |
//!
//! # Example
//!
//! ```
//! use lru_cache::LruCache;
//!
//! let cache = LruCache::<&str, i32>::new(2)?;
//!
//! cache.put("a", 1);
//! cache.put("b", 2);
//! assert_eq!(cache.keys(), ["b", "a"]);
//!
//! // A hit promotes the entry to most recently used.
//! assert_eq!(cache.get("a"), Some(1));
//! assert_eq!(cache.keys(), ["a", "b"]);
//!
//! // Inserting a third key evicts the least recently used one.
//! cache.put("c", 3);
//! assert_eq!(cache.keys(), ["c", "a"]);
//! assert_eq!(cache.get("b"), None);
//! # Ok::<(), lru_cache::CapacityError>(())
//! ```
//!
//! # Touch Policy
//!
//! - A `get` hit and a `put` on a resident key move the entry to the front.
//! - A `put` of a new key inserts it at the front.
//! - `delete` removes only its target; other entries keep their order.
//! - `keys`, `len`, `capacity`, `contains`, `peek`, `peek_lru` and formatting never reorder.
//!
//! # Logging
//!
//! The cache emits [`tracing`] events at `DEBUG` level when it is created (`cache.created`),
//! when a `put` evicts an entry (`cache.evicted`) and when it is cleared (`cache.cleared`).
//! Every event carries the `cache.name` field set through [`LruCacheBuilder::name`].

mod cache;
mod error;
mod list;

pub use cache::{CacheName, DEFAULT_CAPACITY, DEFAULT_NAME, LruCache, LruCacheBuilder};
pub use error::CapacityError;
pub use list::MAX_CAPACITY;

#[cfg(test)]
mod testing;
