// Speculative voxel edits layered over ground truth.
//
// A `VirtualOverlay` maps positions to a hypothetical state: `Air` (the
// search plans to break that voxel) or `Placed` (the search plans to put a
// scaffolding voxel there). Every search node owns an overlay that is its
// parent's overlay plus the node's own mutations.
//
// Representation: a persistent singly-linked chain of small layers behind
// `Arc`s. Extending an overlay allocates one new layer holding only the new
// entries and points it at the parent's chain, so "copy on extend" costs
// O(changes), and siblings share every ancestor layer. Lookup walks the
// chain from the newest layer; the first hit wins, which is what lets a
// child re-mark a position its ancestor already marked. Chains deeper than
// `FLATTEN_DEPTH` are collapsed into a single layer on extend so lookups
// stay bounded on long bridge-building branches.
//
// Moves that mutate nothing reuse the parent's chain directly (an `Arc`
// clone), which is the common case.
//
// See also: `view.rs` which consults overlays before the oracle,
// `registry.rs` which extends overlays with each successor's edits,
// `search.rs` which keeps a separate live layer for real-world changes.
//
// **Critical constraint: append-only per branch.** A layer is never mutated
// after it is handed to a child. A child's overlay contains every key of
// its parent, with the same value unless the child re-marked it.

use crate::types::GridPosition;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Chains longer than this are flattened on the next extend.
const FLATTEN_DEPTH: usize = 32;

/// Hypothetical state of one voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayState {
    /// Broken or otherwise cleared; classifies as air.
    Air,
    /// Filled with scaffolding; classifies as solid.
    Placed,
}

#[derive(Debug)]
struct Layer {
    entries: SmallVec<[(GridPosition, OverlayState); 4]>,
    parent: Option<Arc<Layer>>,
    depth: usize,
}

/// Persistent position → state map with structural sharing.
#[derive(Clone, Debug, Default)]
pub struct VirtualOverlay {
    head: Option<Arc<Layer>>,
}

impl VirtualOverlay {
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Overlay state of `pos`, if any layer marks it.
    pub fn get(&self, pos: GridPosition) -> Option<OverlayState> {
        let mut layer = self.head.as_deref();
        while let Some(l) = layer {
            // Later entries within one layer shadow earlier ones.
            if let Some(&(_, state)) = l.entries.iter().rev().find(|(p, _)| *p == pos) {
                return Some(state);
            }
            layer = l.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        self.get(pos).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of layers in the chain.
    pub fn depth(&self) -> usize {
        self.head.as_ref().map_or(0, |l| l.depth)
    }

    /// A new overlay equal to this one plus `changes`. `self` is untouched.
    pub fn extend<I>(&self, changes: I) -> Self
    where
        I: IntoIterator<Item = (GridPosition, OverlayState)>,
    {
        let entries: SmallVec<[(GridPosition, OverlayState); 4]> = changes.into_iter().collect();
        if entries.is_empty() {
            return self.clone();
        }
        if self.depth() >= FLATTEN_DEPTH {
            let mut flat: Vec<(GridPosition, OverlayState)> = self.to_map().into_iter().collect();
            flat.extend(entries);
            return Self {
                head: Some(Arc::new(Layer {
                    entries: flat.into_iter().collect(),
                    parent: None,
                    depth: 1,
                })),
            };
        }
        Self {
            head: Some(Arc::new(Layer {
                entries,
                depth: self.depth() + 1,
                parent: self.head.clone(),
            })),
        }
    }

    /// Mark a single position.
    pub fn with(&self, pos: GridPosition, state: OverlayState) -> Self {
        self.extend([(pos, state)])
    }

    /// Resolved view of every marked position, in position order.
    pub fn to_map(&self) -> BTreeMap<GridPosition, OverlayState> {
        let mut map = BTreeMap::new();
        let mut layer = self.head.as_deref();
        while let Some(l) = layer {
            for &(pos, state) in l.entries.iter().rev() {
                // Newer layers were visited first; keep their value.
                map.entry(pos).or_insert(state);
            }
            layer = l.parent.as_deref();
        }
        map
    }

    /// Number of distinct marked positions.
    pub fn len(&self) -> usize {
        self.to_map().len()
    }

    /// Whether `self` and `other` are the same chain (no copy happened).
    pub fn shares_root_with(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32) -> GridPosition {
        GridPosition::new(x, 64, 0)
    }

    #[test]
    fn empty_overlay_marks_nothing() {
        let overlay = VirtualOverlay::new();
        assert!(overlay.is_empty());
        assert_eq!(overlay.get(p(0)), None);
        assert_eq!(overlay.len(), 0);
    }

    #[test]
    fn extend_leaves_parent_untouched() {
        let parent = VirtualOverlay::new().with(p(1), OverlayState::Air);
        let child = parent.with(p(2), OverlayState::Placed);
        assert_eq!(parent.get(p(2)), None);
        assert_eq!(child.get(p(1)), Some(OverlayState::Air));
        assert_eq!(child.get(p(2)), Some(OverlayState::Placed));
    }

    #[test]
    fn child_is_superset_of_parent() {
        let mut parent = VirtualOverlay::new();
        for x in 0..10 {
            let state = if x % 2 == 0 {
                OverlayState::Air
            } else {
                OverlayState::Placed
            };
            parent = parent.with(p(x), state);
        }
        let child = parent.extend([(p(100), OverlayState::Air)]);
        let parent_map = parent.to_map();
        let child_map = child.to_map();
        for (pos, state) in &parent_map {
            assert_eq!(child_map.get(pos), Some(state));
        }
        assert_eq!(child_map.len(), parent_map.len() + 1);
    }

    #[test]
    fn child_remark_shadows_parent() {
        let parent = VirtualOverlay::new().with(p(3), OverlayState::Air);
        let child = parent.with(p(3), OverlayState::Placed);
        assert_eq!(child.get(p(3)), Some(OverlayState::Placed));
        assert_eq!(parent.get(p(3)), Some(OverlayState::Air));
        assert_eq!(child.len(), 1);
    }

    #[test]
    fn siblings_do_not_see_each_other() {
        let parent = VirtualOverlay::new().with(p(0), OverlayState::Air);
        let left = parent.with(p(1), OverlayState::Air);
        let right = parent.with(p(2), OverlayState::Placed);
        assert_eq!(left.get(p(2)), None);
        assert_eq!(right.get(p(1)), None);
    }

    #[test]
    fn empty_extend_shares_chain() {
        let parent = VirtualOverlay::new().with(p(0), OverlayState::Air);
        let child = parent.extend(std::iter::empty());
        assert!(child.shares_root_with(&parent));
    }

    #[test]
    fn deep_chains_flatten_without_losing_entries() {
        let mut overlay = VirtualOverlay::new();
        for x in 0..(FLATTEN_DEPTH as i32 * 3) {
            overlay = overlay.with(p(x), OverlayState::Placed);
            assert!(overlay.depth() <= FLATTEN_DEPTH);
        }
        for x in 0..(FLATTEN_DEPTH as i32 * 3) {
            assert_eq!(overlay.get(p(x)), Some(OverlayState::Placed));
        }
    }

    #[test]
    fn flatten_keeps_newest_value() {
        let mut overlay = VirtualOverlay::new().with(p(0), OverlayState::Air);
        for x in 1..=(FLATTEN_DEPTH as i32) {
            overlay = overlay.with(p(x), OverlayState::Air);
        }
        // This extend flattens; the re-mark must still win.
        overlay = overlay.with(p(0), OverlayState::Placed);
        assert_eq!(overlay.get(p(0)), Some(OverlayState::Placed));
    }
}
