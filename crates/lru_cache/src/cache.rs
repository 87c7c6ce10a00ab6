// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Thread-safe LRU cache implementation.
//!
//! This module provides the main [`LruCache`] type and its builder.

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use hashbrown::{DefaultHashBuilder, Equivalent, HashMap};
use parking_lot::Mutex;

use crate::error::{CapacityError, check_capacity};
use crate::list::{NodeIndex, RecencyList};

/// Name attached to log events emitted by a cache instance.
pub type CacheName = &'static str;

/// Capacity used by [`LruCacheBuilder`] when none is configured.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Name used by [`LruCacheBuilder`] when none is configured.
pub const DEFAULT_NAME: CacheName = "lru_cache";

/// A bounded, thread-safe in-memory cache with least-recently-used eviction.
///
/// Every operation runs under a single lock and completes in amortized O(1), except
/// [`keys`](Self::keys), [`clear`](Self::clear) and formatting, which are linear in the
/// number of entries.
///
/// Values are handed out as clones and always stay resident after a read. To share
/// large values instead of copying them, store them behind an [`Arc`](std::sync::Arc).
///
/// # Type Parameters
///
/// * `K` - The key type, must implement `Eq + Hash + Clone`.
/// * `V` - The value type. Reads require `V: Clone`.
/// * `S` - The hash builder type, defaults to `DefaultHashBuilder`.
///
/// # Examples
///
/// ```
/// use lru_cache::LruCache;
///
/// let cache = LruCache::<String, i32>::new(2)?;
/// cache.put("a".to_string(), 1);
/// cache.put("b".to_string(), 2);
///
/// // Reading "a" makes it the most recently used entry.
/// assert_eq!(cache.get("a"), Some(1));
///
/// // "b" is now the least recently used entry and gets evicted.
/// cache.put("c".to_string(), 3);
/// assert_eq!(cache.keys(), ["c", "a"]);
/// assert_eq!(cache.get("b"), None);
/// # Ok::<(), lru_cache::CapacityError>(())
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    /// The protected inner state.
    inner: Mutex<CacheInner<K, V, S>>,
    /// Name attached to log events.
    name: CacheName,
}

impl<K, V> LruCache<K, V, DefaultHashBuilder>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero or exceeds [`MAX_CAPACITY`](crate::MAX_CAPACITY).
    ///
    /// # Examples
    ///
    /// ```
    /// use lru_cache::LruCache;
    ///
    /// let cache = LruCache::<u64, String>::new(100)?;
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(LruCache::<u64, String>::new(0).is_err());
    /// # Ok::<(), lru_cache::CapacityError>(())
    /// ```
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        Self::builder().capacity(capacity).build()
    }

    /// Creates a new builder for configuring an `LruCache`.
    #[must_use]
    pub fn builder() -> LruCacheBuilder<K, V, DefaultHashBuilder> {
        LruCacheBuilder::new()
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Inserts or updates an entry, making it the most recently used.
    ///
    /// If the key is already present its value is replaced and the previous value is
    /// returned. Otherwise the entry is added; when the cache is full, the least recently
    /// used entry is evicted before the new one is linked in.
    ///
    /// # Examples
    ///
    /// ```
    /// use lru_cache::LruCache;
    ///
    /// let cache = LruCache::<&str, i32>::new(1)?;
    /// assert_eq!(cache.put("a", 1), None);
    /// assert_eq!(cache.put("a", 2), Some(1));
    ///
    /// // Capacity is 1, so "a" makes room for "b".
    /// assert_eq!(cache.put("b", 3), None);
    /// assert_eq!(cache.keys(), ["b"]);
    /// # Ok::<(), lru_cache::CapacityError>(())
    /// ```
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let outcome = self.inner.lock().put(key, value);

        match outcome {
            Upsert::Replaced(previous) => Some(previous),
            Upsert::Inserted => None,
            Upsert::Evicted => {
                tracing::debug!(cache.name = self.name, "cache.evicted");
                None
            }
        }
    }

    /// Removes an entry and returns its value.
    ///
    /// Removing an absent key does nothing. The recency of other entries is unaffected.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().delete(key)
    }

    /// Returns `true` if the key is present, without touching it.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().index.contains_key(key)
    }

    /// Returns a snapshot of the keys, most recently used first.
    ///
    /// The snapshot is allocated once under the lock and is independent of later changes.
    /// Taking it does not affect recency.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        let inner = self.inner.lock();
        inner.list.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Returns the number of entries in the cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().list.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().list.is_empty()
    }

    /// Returns the maximum number of entries the cache holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().list.capacity()
    }

    /// Removes every entry. The capacity is unchanged.
    pub fn clear(&self) {
        let dropped = self.inner.lock().clear();
        tracing::debug!(cache.name = self.name, cache.len = dropped, "cache.cleared");
    }

    /// Returns the name attached to log events emitted by this cache.
    #[must_use]
    pub const fn name(&self) -> CacheName {
        self.name
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.inner.lock().assert_consistent();
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Looks up a key, making it the most recently used entry on a hit.
    ///
    /// Returns a clone of the stored value; the entry stays in the cache. A miss returns
    /// `None` and leaves the recency order untouched, so a stored value is always
    /// distinguishable from an absent one.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().get(key)
    }

    /// Looks up a key and reports whether it was found.
    ///
    /// Behaves like [`get`](Self::get), but returns `(V::default(), false)` on a miss.
    ///
    /// # Examples
    ///
    /// ```
    /// use lru_cache::LruCache;
    ///
    /// let cache = LruCache::<&str, i32>::new(2)?;
    /// cache.put("zero", 0);
    /// assert_eq!(cache.get_or_default("zero"), (0, true));
    /// assert_eq!(cache.get_or_default("missing"), (0, false));
    /// # Ok::<(), lru_cache::CapacityError>(())
    /// ```
    #[must_use]
    pub fn get_or_default<Q>(&self, key: &Q) -> (V, bool)
    where
        Q: Hash + Equivalent<K> + ?Sized,
        V: Default,
    {
        match self.get(key) {
            Some(value) => (value, true),
            None => (V::default(), false),
        }
    }

    /// Returns a clone of the value for a key without touching it.
    #[must_use]
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let inner = self.inner.lock();
        let idx = *inner.index.get(key)?;
        inner.list.entry(idx).map(|entry| entry.value.clone())
    }

    /// Returns the entry that would be evicted next, without touching it.
    #[must_use]
    pub fn peek_lru(&self) -> Option<(K, V)> {
        let inner = self.inner.lock();
        let entry = inner.list.entry(inner.list.tail()?)?;
        Some((entry.key.clone(), entry.value.clone()))
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruCache")
            .field("name", &self.name)
            .field("len", &inner.list.len())
            .field("capacity", &inner.list.capacity())
            .finish_non_exhaustive()
    }
}

/// Renders the entries most recently used first, e.g. `[b: 2, a: 1]`.
///
/// The format is meant for diagnostics and may change.
impl<K, V, S> fmt::Display for LruCache<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.write_str("[")?;
        for (i, entry) in inner.list.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", entry.key, entry.value)?;
        }
        f.write_str("]")
    }
}

/// Builder for configuring an [`LruCache`].
///
/// # Examples
///
/// ```
/// use lru_cache::LruCache;
///
/// let cache = LruCache::<String, i32>::builder()
///     .capacity(10_000)
///     .name("sessions")
///     .build()?;
///
/// assert_eq!(cache.capacity(), 10_000);
/// assert_eq!(cache.name(), "sessions");
/// # Ok::<(), lru_cache::CapacityError>(())
/// ```
#[derive(Debug)]
pub struct LruCacheBuilder<K, V, S = DefaultHashBuilder> {
    capacity: usize,
    name: CacheName,
    hasher: S,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> Default for LruCacheBuilder<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> LruCacheBuilder<K, V, DefaultHashBuilder> {
    /// Creates a new builder with default settings.
    ///
    /// Defaults:
    /// - `capacity`: [`DEFAULT_CAPACITY`]
    /// - `name`: [`DEFAULT_NAME`]
    /// - `hasher`: [`DefaultHashBuilder`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            name: DEFAULT_NAME,
            hasher: DefaultHashBuilder::default(),
            _marker: PhantomData,
        }
    }
}

impl<K, V, S> LruCacheBuilder<K, V, S> {
    /// Sets the maximum number of entries.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the name attached to log events emitted by the cache.
    #[must_use]
    pub const fn name(mut self, name: CacheName) -> Self {
        self.name = name;
        self
    }

    /// Sets the hash builder used for the key index.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::hash::RandomState;
    ///
    /// use lru_cache::LruCache;
    ///
    /// let cache = LruCache::<u32, u32>::builder()
    ///     .hasher(RandomState::new())
    ///     .capacity(8)
    ///     .build()?;
    /// cache.put(1, 1);
    /// assert_eq!(cache.get(&1), Some(1));
    /// # Ok::<(), lru_cache::CapacityError>(())
    /// ```
    #[must_use]
    pub fn hasher<S2>(self, hasher: S2) -> LruCacheBuilder<K, V, S2> {
        LruCacheBuilder {
            capacity: self.capacity,
            name: self.name,
            hasher,
            _marker: PhantomData,
        }
    }
}

impl<K, V, S> LruCacheBuilder<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Builds the cache with the configured settings.
    ///
    /// The index and the recency list grow on demand, so a large capacity does not
    /// allocate up front.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if the capacity is zero or exceeds [`MAX_CAPACITY`](crate::MAX_CAPACITY).
    pub fn build(self) -> Result<LruCache<K, V, S>, CapacityError> {
        let capacity = check_capacity(self.capacity)?;

        let cache = LruCache {
            inner: Mutex::new(CacheInner {
                index: HashMap::with_hasher(self.hasher),
                list: RecencyList::new(capacity),
            }),
            name: self.name,
        };

        tracing::debug!(cache.name = self.name, cache.capacity = capacity, "cache.created");
        Ok(cache)
    }
}

/// Result of an upsert performed under the lock.
#[derive(Debug, PartialEq, Eq)]
enum Upsert<V> {
    /// The key was present; holds the replaced value.
    Replaced(V),
    /// A new entry was added without eviction.
    Inserted,
    /// A new entry was added after evicting the least recently used one.
    Evicted,
}

/// State protected by the cache lock.
struct CacheInner<K, V, S> {
    /// Maps each resident key to the list node holding its entry.
    index: HashMap<K, NodeIndex, S>,

    /// Entries ordered from most to least recently used.
    list: RecencyList<K, V>,
}

impl<K, V, S> CacheInner<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
        V: Clone,
    {
        let idx = *self.index.get(key)?;
        self.list.touch(idx).map(|entry| entry.value.clone())
    }

    fn put(&mut self, key: K, value: V) -> Upsert<V> {
        if let Some(&idx) = self.index.get(&key)
            && let Some(entry) = self.list.touch(idx)
        {
            return Upsert::Replaced(std::mem::replace(&mut entry.value, value));
        }

        // Evict before pushing so the list never holds more than `capacity` entries.
        let evicted = self.list.is_full() && self.evict_one();

        let (idx, overflow) = self.list.push_front(key.clone(), value);
        debug_assert!(overflow.is_none(), "room was made before pushing");
        debug_assert_eq!(self.list.head(), Some(idx));
        self.index.insert(key, idx);

        if evicted { Upsert::Evicted } else { Upsert::Inserted }
    }

    /// Evicts the least recently used entry and drops its value.
    ///
    /// Returns `false` if there was nothing to evict.
    fn evict_one(&mut self) -> bool {
        let Some(evicted) = self.list.pop_tail() else {
            return false;
        };
        self.index.remove(&evicted.key);
        true
    }

    fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.list.remove(idx).map(|entry| entry.value)
    }

    /// Drops all entries and returns how many there were.
    fn clear(&mut self) -> usize {
        let dropped = self.list.len();
        self.index.clear();
        self.list.clear();
        dropped
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let len = self.list.len();
        assert!(len <= self.list.capacity(), "len {len} exceeds capacity {}", self.list.capacity());
        assert_eq!(self.index.len(), len, "index size must match list length");
        assert_eq!(self.list.iter().count(), len, "live nodes must match list length");

        for (key, &idx) in &self.index {
            let entry = self.list.entry(idx).expect("indexed node must be live");
            assert!(entry.key == *key, "indexed node must hold its key");
        }

        for entry in self.list.iter() {
            assert!(self.index.contains_key(&entry.key), "live node must be indexed");
        }
    }
}
