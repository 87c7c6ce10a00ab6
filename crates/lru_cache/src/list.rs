// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recency list data structures.
//!
//! The list keeps every live entry in most-recently-used to least-recently-used order. Nodes live
//! in a slab and reference their neighbours by index, so the list owns all of its nodes and no
//! ownership cycle exists between neighbours. Two permanent sentinel slots bracket the live region,
//! which means linking and unlinking never have to special-case a missing neighbour.

use std::iter::FusedIterator;

/// Index type for list nodes to reduce memory footprint.
pub type NodeIndex = u32;

/// Sentinel value terminating the free list (null pointer equivalent).
const NULL_INDEX: NodeIndex = NodeIndex::MAX;

/// Slot of the "before-head" sentinel. Its `next` is the most recently used node.
const HEAD: NodeIndex = 0;

/// Slot of the "after-tail" sentinel. Its `prev` is the least recently used node.
const TAIL: NodeIndex = 1;

/// Number of slots permanently reserved for sentinels.
const SENTINELS: usize = 2;

/// The largest capacity a list can address.
///
/// Two slots of the `u32` index space are taken by the sentinels and one by [`NULL_INDEX`].
pub const MAX_CAPACITY: usize = (NodeIndex::MAX - 2) as usize;

/// A key-value pair owned by the list.
#[derive(Debug)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// A slot in the slab.
///
/// Sentinels and free slots carry no entry. Free slots are chained through `next`.
#[derive(Debug)]
struct Node<K, V> {
    entry: Option<Entry<K, V>>,
    prev: NodeIndex,
    next: NodeIndex,
}

impl<K, V> Node<K, V> {
    const fn sentinel(prev: NodeIndex, next: NodeIndex) -> Self {
        Self { entry: None, prev, next }
    }
}

/// An ordered sequence of entries from most to least recently used.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    /// Slab of nodes. Slots `HEAD` and `TAIL` are the sentinels.
    nodes: Vec<Node<K, V>>,

    /// Free list head for recycling node slots.
    free_head: Option<NodeIndex>,

    /// Current number of live entries.
    len: usize,

    /// Maximum number of live entries.
    capacity: usize,
}

impl<K, V> RecencyList<K, V> {
    /// Creates an empty list holding at most `capacity` entries.
    ///
    /// Slots are allocated lazily, so a large capacity costs nothing up front.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        debug_assert!(
            (1..=MAX_CAPACITY).contains(&capacity),
            "capacity must be validated before creating the list"
        );

        Self {
            nodes: vec![Node::sentinel(NULL_INDEX, TAIL), Node::sentinel(HEAD, NULL_INDEX)],
            free_head: None,
            len: 0,
            capacity,
        }
    }

    /// Returns the current number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the list is at capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Returns the capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the most recently used node, if any.
    #[must_use]
    pub fn head(&self) -> Option<NodeIndex> {
        (!self.is_empty()).then(|| self.node(HEAD).next)
    }

    /// Returns the least recently used node, if any.
    #[must_use]
    pub fn tail(&self) -> Option<NodeIndex> {
        (!self.is_empty()).then(|| self.node(TAIL).prev)
    }

    /// Returns the entry stored in a live node.
    #[must_use]
    pub fn entry(&self, idx: NodeIndex) -> Option<&Entry<K, V>> {
        self.nodes.get(idx as usize)?.entry.as_ref()
    }

    /// Inserts a new entry at the head of the list.
    ///
    /// When the list is full the tail is evicted first and handed back, so the list never
    /// exceeds its capacity, not even transiently.
    pub fn push_front(&mut self, key: K, value: V) -> (NodeIndex, Option<Entry<K, V>>) {
        let evicted = if self.is_full() { self.pop_tail() } else { None };

        let idx = self.alloc_node(Entry { key, value });
        self.link_front(idx);
        self.len += 1;

        (idx, evicted)
    }

    /// Unlinks a node and returns its entry.
    ///
    /// Does nothing if the list is empty or the node is not live.
    pub fn remove(&mut self, idx: NodeIndex) -> Option<Entry<K, V>> {
        if self.is_empty() || !self.is_live(idx) {
            return None;
        }

        self.unlink(idx);
        self.len -= 1;
        self.free_node(idx)
    }

    /// Unlinks the least recently used node and returns its entry.
    pub fn pop_tail(&mut self) -> Option<Entry<K, V>> {
        let idx = self.tail()?;
        self.remove(idx)
    }

    /// Relinks a live node at the head of the list.
    ///
    /// The node is already counted, so no capacity check happens here.
    pub fn move_to_front(&mut self, idx: NodeIndex) {
        if !self.is_live(idx) || self.node(HEAD).next == idx {
            return;
        }

        self.unlink(idx);
        self.link_front(idx);
    }

    /// Moves a live node to the head and returns mutable access to its entry.
    pub fn touch(&mut self, idx: NodeIndex) -> Option<&mut Entry<K, V>> {
        self.move_to_front(idx);
        self.nodes.get_mut(idx as usize)?.entry.as_mut()
    }

    /// Returns an iterator over the entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            front: self.node(HEAD).next,
            back: self.node(TAIL).prev,
            remaining: self.len,
        }
    }

    /// Drops every entry and releases all non-sentinel slots.
    pub fn clear(&mut self) {
        self.nodes.truncate(SENTINELS);
        self.nodes[HEAD as usize].next = TAIL;
        self.nodes[TAIL as usize].prev = HEAD;
        self.free_head = None;
        self.len = 0;
    }

    fn node(&self, idx: NodeIndex) -> &Node<K, V> {
        &self.nodes[idx as usize]
    }

    fn is_live(&self, idx: NodeIndex) -> bool {
        self.entry(idx).is_some()
    }

    /// Takes a slot from the free list, or grows the slab when none is free.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the slab never exceeds MAX_CAPACITY + 2 slots, which fits in NodeIndex"
    )]
    fn alloc_node(&mut self, entry: Entry<K, V>) -> NodeIndex {
        if let Some(idx) = self.free_head {
            let node = &mut self.nodes[idx as usize];
            self.free_head = (node.next != NULL_INDEX).then_some(node.next);
            node.entry = Some(entry);
            return idx;
        }

        let idx = self.nodes.len() as NodeIndex;
        self.nodes.push(Node {
            entry: Some(entry),
            prev: NULL_INDEX,
            next: NULL_INDEX,
        });
        idx
    }

    /// Returns a node slot to the free list, handing back its entry.
    fn free_node(&mut self, idx: NodeIndex) -> Option<Entry<K, V>> {
        let node = &mut self.nodes[idx as usize];
        node.prev = NULL_INDEX;
        node.next = self.free_head.unwrap_or(NULL_INDEX);
        self.free_head = Some(idx);
        node.entry.take()
    }

    fn link_front(&mut self, idx: NodeIndex) {
        let first = self.node(HEAD).next;

        let node = &mut self.nodes[idx as usize];
        node.prev = HEAD;
        node.next = first;

        self.nodes[first as usize].prev = idx;
        self.nodes[HEAD as usize].next = idx;
    }

    fn unlink(&mut self, idx: NodeIndex) {
        let Node { prev, next, .. } = *self.node(idx);
        self.nodes[prev as usize].next = next;
        self.nodes[next as usize].prev = prev;
    }
}

/// Iterator over the entries of a [`RecencyList`], most recently used first.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    front: NodeIndex,
    back: NodeIndex,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.list.node(self.front);
        self.front = node.next;
        self.remaining -= 1;
        node.entry.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.list.node(self.back);
        self.back = node.prev;
        self.remaining -= 1;
        node.entry.as_ref()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
