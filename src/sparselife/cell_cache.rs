//! Bounded recency-ordered memo of cell liveness for one generation pass.
//!
//! Entries live in a slab of slots linked into a doubly linked recency list
//! by slot index (`NIL` terminates). The head is the most recently used
//! entry, the tail the eviction candidate. Once the slab reaches capacity the
//! tail slot is recycled in place, so nothing is ever allocated mid-pass
//! after warm-up and no link can dangle.

use std::collections::HashMap;

use super::coord::{Coord, CoordBuildHasher};

pub const DEFAULT_CACHE_CAPACITY: usize = 32;

const NIL: u32 = u32::MAX;
const MAX_PREALLOC: usize = 1 << 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SlotIdx(u32);

impl SlotIdx {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Cached state of one coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub alive: bool,
    /// Set once the birth rule for this (dead) coordinate has been evaluated.
    pub processed: bool,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    coord: Coord,
    entry: CacheEntry,
    prev: u32,
    next: u32,
}

pub struct BoundedCellCache {
    slots: Vec<Slot>,
    index: HashMap<Coord, SlotIdx, CoordBuildHasher>,
    head: u32,
    tail: u32,
    capacity: usize,
}

impl Default for BoundedCellCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundedCellCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// A capacity below 1 is raised to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, NIL as usize);
        let prealloc = capacity.min(MAX_PREALLOC);
        Self {
            slots: Vec::with_capacity(prealloc),
            index: HashMap::with_capacity_and_hasher(prealloc, CoordBuildHasher),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Membership check that leaves recency untouched.
    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        self.index.contains_key(&c)
    }

    /// Whether `c` is cached with its processed flag set. Leaves recency
    /// untouched.
    #[inline]
    pub fn is_processed(&self, c: Coord) -> bool {
        self.index
            .get(&c)
            .is_some_and(|idx| self.slots[idx.index()].entry.processed)
    }

    /// Drop every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Drop every entry and switch to a new capacity.
    pub fn reset(&mut self, capacity: usize) {
        self.clear();
        self.capacity = capacity.clamp(1, NIL as usize);
    }

    /// Cached state for `c`, promoting it to most recently used on a hit.
    pub fn lookup(&mut self, c: Coord) -> Option<CacheEntry> {
        let idx = *self.index.get(&c)?;
        self.promote(idx);
        Some(self.slots[idx.index()].entry)
    }

    /// Record the liveness of `c` as most recently used. An existing entry
    /// keeps its `processed` flag.
    pub fn insert(&mut self, c: Coord, alive: bool) {
        self.write(c, alive, false);
    }

    /// Like [`insert`](Self::insert), and also flags `c` as processed.
    pub fn mark_processed(&mut self, c: Coord, alive: bool) {
        self.write(c, alive, true);
    }

    fn write(&mut self, c: Coord, alive: bool, processed: bool) {
        if let Some(&idx) = self.index.get(&c) {
            let entry = &mut self.slots[idx.index()].entry;
            entry.alive = alive;
            entry.processed |= processed;
            self.promote(idx);
            return;
        }

        let entry = CacheEntry { alive, processed };
        let idx = if self.slots.len() < self.capacity {
            let idx = SlotIdx(self.slots.len() as u32);
            self.slots.push(Slot {
                coord: c,
                entry,
                prev: NIL,
                next: NIL,
            });
            idx
        } else {
            let idx = SlotIdx(self.tail);
            self.unlink(idx);
            let slot = &mut self.slots[idx.index()];
            self.index.remove(&slot.coord);
            slot.coord = c;
            slot.entry = entry;
            idx
        };
        self.index.insert(c, idx);
        self.push_front(idx);
    }

    #[inline]
    fn promote(&mut self, idx: SlotIdx) {
        if self.head != idx.0 {
            self.unlink(idx);
            self.push_front(idx);
        }
    }

    fn unlink(&mut self, idx: SlotIdx) {
        let Slot { prev, next, .. } = self.slots[idx.index()];
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev as usize].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next as usize].prev = prev;
        }
        let slot = &mut self.slots[idx.index()];
        slot.prev = NIL;
        slot.next = NIL;
    }

    fn push_front(&mut self, idx: SlotIdx) {
        let old_head = self.head;
        {
            let slot = &mut self.slots[idx.index()];
            slot.prev = NIL;
            slot.next = old_head;
        }
        if old_head == NIL {
            self.tail = idx.0;
        } else {
            self.slots[old_head as usize].prev = idx.0;
        }
        self.head = idx.0;
    }

    /// Coordinates from most to least recently used.
    #[cfg(test)]
    fn recency(&self) -> Vec<Coord> {
        let mut out = Vec::with_capacity(self.len());
        let mut cur = self.head;
        while cur != NIL {
            let slot = &self.slots[cur as usize];
            out.push(slot.coord);
            cur = slot.next;
        }
        out
    }
}
