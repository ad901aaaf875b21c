//! Capacity- and time-bounded LRU map.
//!
//! Entries live in a slot arena linked into a doubly linked recency list by
//! index (head = most recently used, tail = least recently used). A hash
//! index maps keys to slots and each slot keeps its own key, so evicting the
//! tail drops the index entry without a scan. Expiry is lazy: an entry older
//! than its TTL is unlinked the next time it is read.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::CacheError;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: Option<V>,
    created_at: Instant,
    ttl: Duration,
    prev: usize,
    next: usize,
}

impl<K, V> Slot<K, V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.ttl
            .checked_sub(now.saturating_duration_since(self.created_at))
    }
}

#[derive(Debug)]
struct Recency<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl<K: Hash + Eq + Clone, V> Recency<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        // Capacity comes from configuration; do not trust it for a huge
        // up-front allocation.
        let reserve = capacity.min(1024);
        Self {
            index: HashMap::with_capacity(reserve),
            slots: Vec::with_capacity(reserve),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = &self.slots[idx];
            (slot.prev, slot.next)
        };

        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }

        let slot = &mut self.slots[idx];
        slot.prev = NIL;
        slot.next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let slot = &mut self.slots[idx];
            slot.prev = NIL;
            slot.next = old_head;
        }

        if old_head != NIL {
            self.slots[old_head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn allocate(&mut self, slot: Slot<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<V> {
        self.detach(idx);
        self.index.remove(&self.slots[idx].key);
        self.free.push(idx);
        self.slots[idx].value.take()
    }

    fn evict_tail(&mut self) -> Option<K> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        let key = self.slots[idx].key.clone();
        self.release(idx);
        Some(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

/// Thread-safe LRU cache whose entries also expire after a time-to-live.
///
/// Every operation that touches the recency list runs under a single mutex,
/// so the index and the list are never observed half-updated.
pub struct TtlLruCache<K, V> {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Recency<K, V>>,
}

impl<K, V> fmt::Debug for TtlLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("TtlLruCache");
        debug
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl);
        match self.inner.try_lock() {
            Ok(inner) => debug.field("len", &inner.index.len()),
            Err(_) => debug.field("len", &"<locked>"),
        };
        debug.finish()
    }
}

impl<K: Hash + Eq + Clone, V> TtlLruCache<K, V> {
    /// Build a cache holding at most `capacity` entries, each living for
    /// `ttl` unless written with an explicit TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity { capacity });
        }

        Ok(Self {
            capacity,
            ttl,
            inner: Mutex::new(Recency::with_capacity(capacity)),
        })
    }

    /// Maximum number of entries held before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lifetime given to entries inserted with [`set`](Self::set).
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Occupied slots, counting expired entries not yet reclaimed.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or replace `key`, restarting its TTL clock and making it the
    /// most recently used entry.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.ttl);
    }

    /// Same as [`TtlLruCache::set`] but with a per-entry TTL.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut inner = self.lock();

        if let Some(&idx) = inner.index.get(&key) {
            {
                let slot = &mut inner.slots[idx];
                slot.value = Some(value);
                slot.created_at = now;
                slot.ttl = ttl;
            }
            inner.detach(idx);
            inner.push_front(idx);
            return;
        }

        let idx = inner.allocate(Slot {
            key: key.clone(),
            value: Some(value),
            created_at: now,
            ttl,
            prev: NIL,
            next: NIL,
        });
        inner.push_front(idx);
        inner.index.insert(key, idx);

        while inner.len() > self.capacity {
            if inner.evict_tail().is_none() {
                break;
            }
        }
    }

    /// Remaining lifetime of `key` without touching its recency.
    pub fn remaining_ttl(&self, key: &K) -> Option<Duration> {
        let now = Instant::now();
        let mut inner = self.lock();
        let idx = *inner.index.get(key)?;

        let remaining = inner.slots[idx].remaining(now);
        if remaining.is_none() {
            inner.release(idx);
        }
        remaining
    }

    fn lock(&self) -> MutexGuard<'_, Recency<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn keys_by_recency(&self) -> Vec<K> {
        let inner = self.lock();
        let mut keys = Vec::with_capacity(inner.len());
        let mut cursor = inner.head;
        while cursor != NIL {
            keys.push(inner.slots[cursor].key.clone());
            cursor = inner.slots[cursor].next;
        }
        keys
    }
}

impl<K: Hash + Eq + Clone, V: Clone> TtlLruCache<K, V> {
    /// Look up `key`, promoting it to most recently used.
    ///
    /// Returns `None` both for keys never set and for entries past their TTL;
    /// the latter are dropped on the spot.
    pub fn try_get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();
        let idx = *inner.index.get(key)?;

        if inner.slots[idx].is_expired(now) {
            inner.release(idx);
            return None;
        }

        inner.detach(idx);
        inner.push_front(idx);
        inner.slots[idx].value.clone()
    }
}
