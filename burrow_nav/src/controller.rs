// Control handle for one in-flight search run.
//
// A `SearchController` is the outside world's way into a running search. It
// is cheap to clone and safe to hand to other threads. It does two things:
//   - `cancel()` sets a shared flag the run checks once per iteration; the
//     run then finishes with termination `Cancelled`.
//   - `report_change(pos, state)` queues a real-world voxel change on an
//     `mpsc` channel. The run drains the channel at the top of every
//     iteration, folds each change into its live overlay layer (which sits
//     between node overlays and ground truth), and prunes the open set.
//
// Pruning: an open node is stale when its own overlay holds the opposite
// state for the changed position, or when (with no overlay entry there) the
// change touches the node's body or footing. Stale nodes are removed from
// the queue and marked `Evicted`; their parent is reopened so the branch is
// re-derived against the updated world on its next expansion. Closed nodes
// are never touched, so their finalized g-costs stay final.
//
// See also: `search.rs` which owns the receiving end, `node.rs` for
// `NodeState`, `queue.rs` for removal by id.
//
// **Critical constraint: single consumer.** Only the run that created the
// channel drains it. Dropping the run disconnects the channel, after which
// `report_change` returns false.

use crate::node::{NodeArena, NodeState, SearchNode};
use crate::overlay::OverlayState;
use crate::queue::OpenQueue;
use crate::types::GridPosition;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::trace;

/// A reported real-world change: `pos` is now `state`.
pub type LiveChange = (GridPosition, OverlayState);

/// Caller-side handle to a running search.
#[derive(Clone, Debug)]
pub struct SearchController {
    changes: Sender<LiveChange>,
    cancelled: Arc<AtomicBool>,
}

/// Run-side end of the controller.
#[derive(Debug)]
pub(crate) struct ControlChannel {
    changes: Receiver<LiveChange>,
    cancelled: Arc<AtomicBool>,
}

pub(crate) fn control_pair() -> (SearchController, ControlChannel) {
    let (tx, rx) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    (
        SearchController {
            changes: tx,
            cancelled: cancelled.clone(),
        },
        ControlChannel {
            changes: rx,
            cancelled,
        },
    )
}

impl SearchController {
    /// Ask the run to stop at its next iteration.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Queue a real-world change. Returns false if the run is gone.
    pub fn report_change(&self, pos: GridPosition, state: OverlayState) -> bool {
        self.changes.send((pos, state)).is_ok()
    }
}

impl ControlChannel {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Every change queued since the last drain, in arrival order.
    pub(crate) fn drain(&self) -> Vec<LiveChange> {
        self.changes.try_iter().collect()
    }
}

/// Whether `node`'s assumptions are contradicted by `pos` becoming `state`.
pub(crate) fn is_stale(node: &SearchNode, pos: GridPosition, state: OverlayState) -> bool {
    match node.overlay.get(pos) {
        Some(assumed) => assumed != state,
        None => {
            let at = node.key.pos;
            pos == at || pos == at.up(1) || pos == at.down(1)
        }
    }
}

/// Evict every open node made stale by one change and reopen its parent.
/// Returns how many nodes were evicted.
pub(crate) fn evict_stale(
    arena: &mut NodeArena,
    open: &mut OpenQueue,
    pos: GridPosition,
    state: OverlayState,
) -> u64 {
    let stale: Vec<_> = arena
        .iter()
        .filter(|(_, n)| n.is_open() && is_stale(n, pos, state))
        .map(|(id, n)| (id, n.parent))
        .collect();
    for &(id, parent) in &stale {
        open.remove(id);
        arena.get_mut(id).state = NodeState::Evicted;
        trace!(node = %arena.get(id).key.pos, changed = %pos, "evicted stale open node");
        if let Some(parent) = parent {
            let p = arena.get_mut(parent);
            if p.is_closed() {
                p.state = NodeState::Open;
                let (f, h) = (p.f(), p.h());
                open.push(parent, f, h);
            }
        }
    }
    stale.len() as u64
}
