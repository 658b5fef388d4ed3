// Search nodes and the arena that owns them.
//
// Every node created during one search run lives in a `NodeArena`: a `Vec`
// of `SearchNode`s indexed by `NodeId`, plus a hash index from the node key
// (position + direction) to its id. Parent links are ids, not references, so
// the whole search tree is dropped wholesale with the arena when the run
// ends and path reconstruction is a walk over integers.
//
// The arena doubles as the open index and closed set: a node's `state`
// records whether it is queued (`Open`), finalized (`Closed`), or was pruned
// by a live world change (`Evicted`). An evicted key can be re-derived later
// by a fresh expansion of its parent.
//
// See also: `queue.rs` for the open priority queue over `NodeId`s,
// `search.rs` which creates and updates nodes.
//
// **Critical constraint: `f = g + h`.** Costs are only ever changed through
// `set_costs`, which recomputes `f` alongside `g` and `h`.

use crate::moves::{BreakList, MoveKind, PlaceList};
use crate::overlay::VirtualOverlay;
use crate::types::DirectedPosition;
use rustc_hash::FxHashMap;

/// Index of a node in its run's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle of a node within one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Open,
    Closed,
    Evicted,
}

#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Position plus the direction it was reached in; the dedup key.
    pub key: DirectedPosition,
    g: f64,
    h: f64,
    f: f64,
    pub parent: Option<NodeId>,
    /// The move that produced this node.
    pub kind: MoveKind,
    pub breaks: BreakList,
    pub places: PlaceList,
    /// Parent's overlay plus this node's edits.
    pub overlay: VirtualOverlay,
    /// Scaffolding placed on the path from the root to here.
    pub scaffolding_used: u32,
    pub state: NodeState,
}

impl SearchNode {
    /// The root of a search.
    pub fn root(key: DirectedPosition, h: f64) -> Self {
        Self {
            key,
            g: 0.0,
            h,
            f: h,
            parent: None,
            kind: MoveKind::Start,
            breaks: BreakList::new(),
            places: PlaceList::new(),
            overlay: VirtualOverlay::new(),
            scaffolding_used: 0,
            state: NodeState::Open,
        }
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn f(&self) -> f64 {
        self.f
    }

    pub fn set_costs(&mut self, g: f64, h: f64) {
        self.g = g;
        self.h = h;
        self.f = g + h;
    }

    pub fn is_open(&self) -> bool {
        self.state == NodeState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == NodeState::Closed
    }
}

/// Owner of every node in one search run.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
    index: FxHashMap<DirectedPosition, NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under its key. A previous node with the same key stays in
    /// the arena (descendants may still point at it) but is no longer
    /// reachable by `lookup`.
    pub fn insert(&mut self, node: SearchNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.index.insert(node.key, id);
        self.nodes.push(node);
        id
    }

    pub fn lookup(&self, key: &DirectedPosition) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            // A chain longer than the arena would mean a parent cycle.
            if chain.len() > self.nodes.len() {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, GridPosition};

    fn key(x: i32, dir: Direction) -> DirectedPosition {
        DirectedPosition::new(GridPosition::new(x, 64, 0), dir)
    }

    fn child(parent: NodeId, key: DirectedPosition, g: f64) -> SearchNode {
        let mut node = SearchNode::root(key, 0.0);
        node.parent = Some(parent);
        node.kind = MoveKind::Forward;
        node.set_costs(g, 10.0 - g);
        node
    }

    #[test]
    fn set_costs_keeps_f_consistent() {
        let mut node = SearchNode::root(key(0, Direction::NONE), 7.5);
        assert_eq!(node.f(), 7.5);
        node.set_costs(2.0, 3.0);
        assert_eq!((node.g(), node.h(), node.f()), (2.0, 3.0, 5.0));
    }

    #[test]
    fn direction_is_part_of_identity() {
        let mut arena = NodeArena::new();
        let a = arena.insert(SearchNode::root(key(1, Direction::EAST), 0.0));
        let b = arena.insert(SearchNode::root(key(1, Direction::NORTH), 0.0));
        assert_ne!(a, b);
        assert_eq!(arena.lookup(&key(1, Direction::EAST)), Some(a));
        assert_eq!(arena.lookup(&key(1, Direction::NORTH)), Some(b));
        assert_eq!(arena.lookup(&key(1, Direction::WEST)), None);
    }

    #[test]
    fn lineage_runs_root_first() {
        let mut arena = NodeArena::new();
        let root = arena.insert(SearchNode::root(key(0, Direction::NONE), 10.0));
        let one = arena.insert(child(root, key(1, Direction::EAST), 1.0));
        let two = arena.insert(child(one, key(2, Direction::EAST), 2.0));
        assert_eq!(arena.lineage(two), vec![root, one, two]);
        assert_eq!(arena.lineage(root), vec![root]);
    }

    #[test]
    fn reinserting_a_key_rebinds_lookup() {
        let mut arena = NodeArena::new();
        let root = arena.insert(SearchNode::root(key(0, Direction::NONE), 10.0));
        let first = arena.insert(child(root, key(1, Direction::EAST), 1.0));
        arena.get_mut(first).state = NodeState::Evicted;
        let second = arena.insert(child(root, key(1, Direction::EAST), 1.0));
        assert_eq!(arena.lookup(&key(1, Direction::EAST)), Some(second));
        assert_eq!(arena.get(first).state, NodeState::Evicted);
        assert_eq!(arena.len(), 3);
    }
}
