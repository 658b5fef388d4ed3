// burrow_nav: path search for an agent in a voxel world it can dig through
// and build in.
//
// The crate plans routes for one agent over a block world exposed through a
// `WorldOracle`. Moves may break or place voxels; the search tracks those
// hypothetical edits per node in a structurally shared overlay, so each
// branch sees the world as it would be after its own edits. Searches are
// timeboxed and return the best partial path when the goal is out of reach
// within the budget.
//
// Module overview:
// - `types.rs`:      GridPosition, Direction, DirectedPosition, Voxel kinds and shapes.
// - `world.rs`:      WorldOracle / ResourceLedger seams, VoxelGrid and FlatPlane oracles.
// - `overlay.rs`:    VirtualOverlay, the persistent per-node speculative edit map.
// - `view.rs`:       WorldView: overlay-aware classification and traversal predicates.
// - `moves/`:        MoveRule trait plus the walk, parkour, swim, climb, scaffold and fly rules.
// - `registry.rs`:   MoveRegistry: gated, priority-ordered expansion with dedup.
// - `node.rs`:       SearchNode and the NodeArena (open index + closed set).
// - `queue.rs`:      OpenQueue, an indexed min-heap with decrease-key.
// - `goal.rs`:       Goal predicates, heuristics and waypoint anchors.
// - `controller.rs`: SearchController: cancellation and live world changes.
// - `search.rs`:     PathPlanner / SearchRun: timeboxed A* with partial results.
// - `waypoint.rs`:   WaypointOrchestrator: long-range trips as chains of legs.
// - `config.rs`:     PathConfig and its nested cost, block-list and waypoint tables.
// - `error.rs`:      ConfigError, the only error the crate returns.
//
// **Critical constraint: the world is read-only.** Nothing here mutates the
// oracle. Speculative edits live in overlays and real changes arrive
// through the controller; the caller applies paths to the real world.

pub mod config;
pub mod controller;
pub mod error;
pub mod goal;
pub mod moves;
pub mod node;
pub mod overlay;
pub mod queue;
pub mod registry;
pub mod search;
pub mod types;
pub mod view;
pub mod waypoint;
pub mod world;
