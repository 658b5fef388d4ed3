// The open set's priority queue: an indexed binary min-heap over node ids.
//
// Unlike a `BinaryHeap` with lazy deletion, each node appears at most once
// and its heap slot is tracked, so a cheaper path to a queued node updates
// the entry in place (decrease-key) and an evicted node can be removed
// outright. Ordering is by f-cost via `total_cmp`, ties broken by lower h
// (closer to the goal) and then by insertion sequence (earlier first), so
// extraction order is fully deterministic.
//
// See also: `node.rs` for `NodeId`, `search.rs` for the main loop.
//
// **Critical constraint: slot bookkeeping.** Every swap inside the heap
// must update `slots` for both moved ids; `contains`, `update` and `remove`
// rely on it.

use crate::node::NodeId;
use std::cmp::Ordering;

const ABSENT: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: NodeId,
    f: f64,
    h: f64,
    seq: u64,
}

impl Entry {
    fn precedes(&self, other: &Self) -> bool {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.seq.cmp(&other.seq))
            == Ordering::Less
    }
}

#[derive(Debug, Default)]
pub struct OpenQueue {
    heap: Vec<Entry>,
    /// Heap slot of each node id, or `ABSENT`.
    slots: Vec<usize>,
    next_seq: u64,
}

impl OpenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        match self.slots.get(id.index()) {
            Some(&s) if s != ABSENT => Some(s),
            _ => None,
        }
    }

    /// Insert `id`, or update its keys if it is already queued.
    pub fn push(&mut self, id: NodeId, f: f64, h: f64) {
        if self.contains(id) {
            self.update(id, f, h);
            return;
        }
        if self.slots.len() <= id.index() {
            self.slots.resize(id.index() + 1, ABSENT);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { id, f, h, seq });
        let last = self.heap.len() - 1;
        self.slots[id.index()] = last;
        self.sift_up(last);
    }

    /// Change the keys of a queued node. Returns false if it is not queued.
    /// The insertion sequence is kept, so an updated node keeps its age.
    pub fn update(&mut self, id: NodeId, f: f64, h: f64) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let entry = &mut self.heap[slot];
        let rising = f.total_cmp(&entry.f).then_with(|| h.total_cmp(&entry.h)) == Ordering::Greater;
        entry.f = f;
        entry.h = h;
        if rising {
            self.sift_down(slot);
        } else {
            self.sift_up(slot);
        }
        true
    }

    /// Extract the node with minimal f (then h, then age).
    pub fn pop_min(&mut self) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.slots[entry.id.index()] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(entry.id)
    }

    /// The node `pop_min` would return, without removing it.
    pub fn peek(&self) -> Option<NodeId> {
        self.heap.first().map(|e| e.id)
    }

    /// Drop a queued node. Returns false if it was not queued.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let last = self.heap.len() - 1;
        self.swap(slot, last);
        self.heap.pop();
        self.slots[id.index()] = ABSENT;
        if slot < self.heap.len() {
            self.sift_down(slot);
            self.sift_up(slot);
        }
        true
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots[self.heap[a].id.index()] = a;
        self.slots[self.heap[b].id.index()] = b;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i].precedes(&self.heap[parent]) {
                self.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut best = i;
            if left < len && self.heap[left].precedes(&self.heap[best]) {
                best = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[best]) {
                best = right;
            }
            if best == i {
                break;
            }
            self.swap(i, best);
            i = best;
        }
    }
}
