// The path planner: timeboxed A* over speculative world states.
//
// `PathPlanner` owns a validated `PathConfig` and a `MoveRegistry` and
// borrows the world oracle and resource ledger. Each request becomes a
// `SearchRun`, a resumable state machine:
//
//   READY → RUNNING → { GoalReached | TimedOut | ExpansionBudget |
//                       Exhausted | Cancelled }
//
// `SearchRun::advance(batch)` performs at most `batch` iterations and then
// yields (`RunState::Pending`), so a host can interleave other per-tick work
// between slices; `PathPlanner::search` simply drives a run to completion in
// `yield_batch` slices. One iteration:
//   1. Drain live world changes from the controller into the live overlay
//      layer, evicting open nodes they invalidate.
//   2. Pop the open node with minimal f (ties: lower h, then older).
//   3. If the goal accepts it, finish `Found` with the path to it.
//   4. Close it, record it as a best-node candidate, and expand it through
//      the registry. A successor whose key is closed is skipped; one whose
//      key is queued with g ≤ tentative g is skipped; otherwise it is
//      inserted or updated in place.
//   5. Check cancellation, the wall-clock budget and the optional expansion
//      budget.
//
// Best node (for partial results): among expanded nodes, the one with the
// lowest heuristic. Heuristic ties within `partial.tie_epsilon` go to the
// backoff metric: the incumbent is measured as `f / divisor`, where the
// divisor starts at `partial.divisor_start` and grows by
// `partial.divisor_growth` for every expansion it stays best, while a
// challenger is measured at `divisor_start` and must undercut the
// incumbent's metric by the `partial.hysteresis` fraction. Long-standing
// incumbents get harder to displace, which damps oscillation between
// near-equal frontier nodes.
//
// Termination statuses: `Found` on goal; `Partial` with the path to the best
// node on timeout, budget, or cancellation (if the best node is not the
// start); on exhaustion `Partial` only if the best node improved the start's
// heuristic by at least `partial.min_progress`; otherwise `NoPath` with an
// empty path.
//
// See also: `registry.rs` for expansion, `node.rs` and `queue.rs` for the
// open/closed bookkeeping, `controller.rs` for cancellation and live
// changes, `waypoint.rs` which runs many searches in sequence.
//
// **Critical constraint: bounded run time.** Every iteration ends with the
// budget checks, so a run returns within the think timeout plus one
// expansion regardless of world size or reachability.

use crate::config::PathConfig;
use crate::controller::{self, ControlChannel, SearchController};
use crate::error::ConfigError;
use crate::goal::Goal;
use crate::moves::{BreakList, ExpansionContext, MoveKind, PlaceList};
use crate::node::{NodeArena, NodeId, NodeState, SearchNode};
use crate::overlay::VirtualOverlay;
use crate::queue::OpenQueue;
use crate::registry::MoveRegistry;
use crate::types::{DirectedPosition, Direction, GridPosition};
use crate::view::{Region, WorldView};
use crate::world::{ResourceLedger, WorldOracle};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// One path request.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub start: GridPosition,
    pub goal: Goal,
    /// Regions where no voxel may be broken.
    pub no_break_zones: Vec<Region>,
}

impl SearchRequest {
    pub fn new(start: GridPosition, goal: Goal) -> Self {
        Self {
            start,
            goal,
            no_break_zones: Vec::new(),
        }
    }

    pub fn with_no_break_zones(mut self, zones: Vec<Region>) -> Self {
        self.no_break_zones = zones;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SearchStatus {
    Found,
    Partial,
    NoPath,
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Termination {
    GoalReached,
    TimedOut,
    ExpansionBudget,
    Exhausted,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchStats {
    pub expansions: u64,
    /// Successors accepted by the registry.
    pub generated: u64,
    pub evicted: u64,
    pub elapsed: Duration,
    pub termination: Termination,
    /// Lowest heuristic among expanded nodes (infinity if none).
    pub min_expanded_heuristic: f64,
}

/// One node of a returned path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PathStep {
    pub position: GridPosition,
    pub direction: Direction,
    /// How the agent gets here from the previous step.
    pub kind: MoveKind,
    /// Cumulative cost from the start.
    pub g: f64,
    pub h: f64,
    pub breaks: BreakList,
    pub places: PlaceList,
}

/// Ordered steps from the start to the terminal (or best) node.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Path {
    pub steps: Vec<PathStep>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start(&self) -> Option<GridPosition> {
        self.steps.first().map(|s| s.position)
    }

    pub fn end(&self) -> Option<GridPosition> {
        self.steps.last().map(|s| s.position)
    }

    pub fn total_cost(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.g)
    }

    pub fn break_count(&self) -> usize {
        self.steps.iter().map(|s| s.breaks.len()).sum()
    }

    pub fn place_count(&self) -> usize {
        self.steps.iter().map(|s| s.places.len()).sum()
    }

    /// Movement names of every step after the start.
    pub fn move_names(&self) -> Vec<&'static str> {
        self.steps.iter().skip(1).map(|s| s.kind.name()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub path: Path,
    pub stats: SearchStats,
}

/// Result of one `advance` slice.
#[derive(Clone, Debug, PartialEq)]
pub enum RunState {
    Pending,
    Finished(SearchOutcome),
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

pub struct PathPlanner<'w> {
    oracle: &'w dyn WorldOracle,
    ledger: &'w dyn ResourceLedger,
    config: PathConfig,
    registry: MoveRegistry,
    /// Controller of the most recently started run.
    active: Option<SearchController>,
}

impl<'w> PathPlanner<'w> {
    /// Build a planner with the standard rule set. Fails if the config does
    /// not validate.
    pub fn new(
        oracle: &'w dyn WorldOracle,
        ledger: &'w dyn ResourceLedger,
        config: PathConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            oracle,
            ledger,
            config,
            registry: MoveRegistry::standard(),
            active: None,
        })
    }

    /// Replace the rule set.
    pub fn with_registry(mut self, registry: MoveRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    pub fn oracle(&self) -> &'w dyn WorldOracle {
        self.oracle
    }

    /// Start a run. Any run previously started by this planner is cancelled
    /// first; its controller reports cancelled from now on.
    pub fn begin(&mut self, request: SearchRequest) -> SearchRun<'_> {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        let (handle, channel) = controller::control_pair();
        self.active = Some(handle.clone());
        SearchRun::new(self, request, handle, channel)
    }

    /// Run a request to completion.
    pub fn search(&mut self, request: SearchRequest) -> SearchOutcome {
        let batch = self.config.yield_batch;
        let mut run = self.begin(request);
        loop {
            if let RunState::Finished(outcome) = run.advance(batch) {
                return outcome;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Best {
    id: NodeId,
    h: f64,
    f: f64,
    /// Expansion count when this node became best.
    since: u64,
}

pub struct SearchRun<'p> {
    oracle: &'p dyn WorldOracle,
    config: &'p PathConfig,
    registry: &'p MoveRegistry,
    goal: Goal,
    hint: Option<GridPosition>,
    no_break_zones: Vec<Region>,
    scaffolding_available: u32,

    arena: NodeArena,
    open: OpenQueue,
    start: NodeId,
    live: VirtualOverlay,
    handle: SearchController,
    channel: ControlChannel,

    started: Instant,
    timeout: Duration,
    expansions: u64,
    generated: u64,
    evicted: u64,
    min_expanded_h: f64,
    best: Option<Best>,
    outcome: Option<SearchOutcome>,
}

impl<'p> SearchRun<'p> {
    fn new(
        planner: &'p PathPlanner<'_>,
        request: SearchRequest,
        handle: SearchController,
        channel: ControlChannel,
    ) -> Self {
        let config = &planner.config;
        let h = request.goal.heuristic(request.start, config.heuristic_weight);
        let mut arena = NodeArena::new();
        let mut open = OpenQueue::new();
        let start = arena.insert(SearchNode::root(
            DirectedPosition::new(request.start, Direction::NONE),
            h,
        ));
        open.push(start, h, h);
        debug!(
            start = %request.start,
            goal = ?request.goal,
            h,
            timeout_ms = config.think_timeout_ms,
            "search started"
        );
        Self {
            oracle: planner.oracle,
            config,
            registry: &planner.registry,
            hint: request.goal.hint(request.start),
            goal: request.goal,
            no_break_zones: request.no_break_zones,
            scaffolding_available: planner.ledger.scaffolding_available(),
            arena,
            open,
            start,
            live: VirtualOverlay::new(),
            handle,
            channel,
            started: Instant::now(),
            timeout: Duration::from_millis(config.think_timeout_ms),
            expansions: 0,
            generated: 0,
            evicted: 0,
            min_expanded_h: f64::INFINITY,
            best: None,
            outcome: None,
        }
    }

    /// A handle for cancelling this run or reporting world changes to it.
    pub fn controller(&self) -> SearchController {
        self.handle.clone()
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Perform up to `batch` iterations. Once finished, every further call
    /// returns the same outcome.
    pub fn advance(&mut self, batch: u32) -> RunState {
        if let Some(outcome) = &self.outcome {
            return RunState::Finished(outcome.clone());
        }
        for _ in 0..batch.max(1) {
            if let Some(termination) = self.step() {
                let outcome = self.finish(termination);
                self.outcome = Some(outcome.clone());
                return RunState::Finished(outcome);
            }
        }
        RunState::Pending
    }

    /// Run to completion.
    pub fn run_to_end(&mut self) -> SearchOutcome {
        let batch = self.config.yield_batch;
        loop {
            if let RunState::Finished(outcome) = self.advance(batch) {
                return outcome;
            }
        }
    }

    /// One iteration. Returns the termination reason when the run is over.
    fn step(&mut self) -> Option<Termination> {
        self.apply_live_changes();
        let Some(id) = self.open.pop_min() else {
            return Some(Termination::Exhausted);
        };
        if self.goal.is_reached(self.arena.get(id).key.pos) {
            self.arena.get_mut(id).state = NodeState::Closed;
            self.best = Some(self.best_entry(id));
            return Some(Termination::GoalReached);
        }
        self.arena.get_mut(id).state = NodeState::Closed;
        self.expansions += 1;
        self.record_best(id);
        self.expand(id);

        if self.channel.is_cancelled() {
            return Some(Termination::Cancelled);
        }
        if self.started.elapsed() >= self.timeout {
            return Some(Termination::TimedOut);
        }
        if self.config.max_expansions.is_some_and(|max| self.expansions >= max) {
            return Some(Termination::ExpansionBudget);
        }
        None
    }

    fn apply_live_changes(&mut self) {
        for (pos, state) in self.channel.drain() {
            self.live = self.live.with(pos, state);
            self.evicted += controller::evict_stale(&mut self.arena, &mut self.open, pos, state);
        }
    }

    fn best_entry(&self, id: NodeId) -> Best {
        let node = self.arena.get(id);
        Best {
            id,
            h: node.h(),
            f: node.f(),
            since: self.expansions,
        }
    }

    fn record_best(&mut self, id: NodeId) {
        let challenger = self.best_entry(id);
        self.min_expanded_h = self.min_expanded_h.min(challenger.h);
        let p = &self.config.partial;
        let replace = match self.best {
            None => true,
            Some(incumbent) if challenger.h < incumbent.h - p.tie_epsilon => true,
            Some(incumbent) if challenger.h <= incumbent.h + p.tie_epsilon => {
                let tenure = (self.expansions - incumbent.since) as f64;
                let divisor = p.divisor_start + p.divisor_growth * tenure;
                let incumbent_metric = incumbent.f / divisor;
                let challenger_metric = challenger.f / p.divisor_start;
                challenger_metric < incumbent_metric * (1.0 - p.hysteresis)
            }
            Some(_) => false,
        };
        if replace {
            self.best = Some(challenger);
        }
    }

    fn expand(&mut self, id: NodeId) {
        let weight = self.config.heuristic_weight;
        let node = self.arena.get(id);
        let g = node.g();
        let view = WorldView::new(self.oracle, &self.config.blocks)
            .with_live(&self.live)
            .with_overlay(&node.overlay)
            .with_no_break_zones(&self.no_break_zones);
        let ctx = ExpansionContext {
            view,
            config: self.config,
            origin: node.key,
            scaffolding_used: node.scaffolding_used,
            scaffolding_available: self.scaffolding_available,
            goal_hint: self.hint,
        };
        let successors = self.registry.expand(&ctx, &node.overlay);

        for s in successors {
            self.generated += 1;
            let tentative = g + s.cost;
            let h = self.goal.heuristic(s.target.pos, weight);
            let existing = self.arena.lookup(&s.target);
            let target_id = match existing {
                Some(existing) => {
                    let n = self.arena.get(existing);
                    match n.state {
                        NodeState::Closed => continue,
                        NodeState::Open if n.g() <= tentative => continue,
                        NodeState::Open | NodeState::Evicted => existing,
                    }
                }
                None => self.arena.insert(SearchNode::root(s.target, h)),
            };
            let n = self.arena.get_mut(target_id);
            n.set_costs(tentative, h);
            n.parent = Some(id);
            n.kind = s.kind;
            n.breaks = s.breaks;
            n.places = s.places;
            n.overlay = s.overlay;
            n.scaffolding_used = s.scaffolding_used;
            n.state = NodeState::Open;
            let f = n.f();
            self.open.push(target_id, f, h);
        }
    }

    fn path_to(&self, id: NodeId) -> Path {
        let steps = self
            .arena
            .lineage(id)
            .into_iter()
            .map(|i| {
                let n = self.arena.get(i);
                PathStep {
                    position: n.key.pos,
                    direction: n.key.dir,
                    kind: n.kind,
                    g: n.g(),
                    h: n.h(),
                    breaks: n.breaks.clone(),
                    places: n.places.clone(),
                }
            })
            .collect();
        Path { steps }
    }

    fn finish(&self, termination: Termination) -> SearchOutcome {
        let start_h = self.arena.get(self.start).h();
        let progressed = self.best.filter(|b| b.id != self.start);
        let (status, path) = match termination {
            Termination::GoalReached => {
                let id = self.best.map_or(self.start, |b| b.id);
                (SearchStatus::Found, self.path_to(id))
            }
            Termination::Exhausted => match progressed {
                Some(b) if start_h - b.h >= self.config.partial.min_progress => {
                    (SearchStatus::Partial, self.path_to(b.id))
                }
                _ => (SearchStatus::NoPath, Path::default()),
            },
            Termination::TimedOut | Termination::ExpansionBudget | Termination::Cancelled => {
                match progressed {
                    Some(b) => (SearchStatus::Partial, self.path_to(b.id)),
                    None => (SearchStatus::NoPath, Path::default()),
                }
            }
        };
        let stats = SearchStats {
            expansions: self.expansions,
            generated: self.generated,
            evicted: self.evicted,
            elapsed: self.started.elapsed(),
            termination,
            min_expanded_heuristic: self.min_expanded_h,
        };
        debug!(
            ?status,
            ?termination,
            expansions = stats.expansions,
            generated = stats.generated,
            evicted = stats.evicted,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            path_len = path.len(),
            cost = path.total_cost(),
            "search finished"
        );
        SearchOutcome {
            status,
            path,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayState;
    use crate::types::Voxel;
    use crate::world::{FixedLedger, FlatPlane, UnlimitedLedger, VoxelGrid};

    fn at(x: i32, y: i32, z: i32) -> GridPosition {
        GridPosition::new(x, y, z)
    }

    /// A 16×8×16 grid with floor at y = 63 (solid 60..=63).
    fn room() -> VoxelGrid {
        let mut grid = VoxelGrid::new(at(0, 60, 0), 16, 8, 16);
        grid.fill(at(0, 60, 0), at(15, 63, 15), Voxel::solid("stone"));
        grid
    }

    fn walker() -> PathConfig {
        PathConfig {
            can_break: false,
            can_place: false,
            ..PathConfig::default()
        }
    }

    #[test]
    fn planner_rejects_invalid_config() {
        let grid = room();
        let config = PathConfig {
            heuristic_weight: 2.0,
            ..PathConfig::default()
        };
        assert!(PathPlanner::new(&grid, &UnlimitedLedger, config).is_err());
    }

    #[test]
    fn start_at_goal_is_found_immediately() {
        let grid = room();
        let mut planner = PathPlanner::new(&grid, &UnlimitedLedger, walker()).unwrap();
        let outcome = planner.search(SearchRequest::new(at(3, 64, 3), Goal::Block(at(3, 64, 3))));
        assert_eq!(outcome.status, SearchStatus::Found);
        assert_eq!(outcome.path.len(), 1);
        assert_eq!(outcome.path.steps[0].kind, MoveKind::Start);
        assert_eq!(outcome.stats.expansions, 0);
    }

    #[test]
    fn finds_straight_path_across_room() {
        let grid = room();
        let mut planner = PathPlanner::new(&grid, &UnlimitedLedger, walker()).unwrap();
        let outcome = planner.search(SearchRequest::new(at(1, 64, 5), Goal::Block(at(9, 64, 5))));
        assert_eq!(outcome.status, SearchStatus::Found);
        assert_eq!(outcome.path.end(), Some(at(9, 64, 5)));
        assert!((outcome.path.total_cost() - 8.0).abs() < 1e-9);
        assert!(outcome.path.move_names().iter().all(|n| *n == "forward"));
    }

    #[test]
    fn routes_around_wall_when_breaking_disabled() {
        let mut grid = room();
        // Wall across x = 5 with a gap at z = 14.
        grid.fill(at(5, 64, 0), at(5, 67, 13), Voxel::solid("stone"));
        let mut planner = PathPlanner::new(&grid, &UnlimitedLedger, walker()).unwrap();
        let outcome = planner.search(SearchRequest::new(at(2, 64, 2), Goal::Block(at(8, 64, 2))));
        assert_eq!(outcome.status, SearchStatus::Found);
        assert_eq!(outcome.path.break_count(), 0);
        assert!(outcome.path.steps.iter().any(|s| s.position.z >= 13));
    }

    #[test]
    fn g_never_improves_after_pop() {
        let mut grid = room();
        grid.fill(at(6, 64, 2), at(6, 64, 12), Voxel::solid("stone"));
        let mut planner = PathPlanner::new(&grid, &UnlimitedLedger, PathConfig::default()).unwrap();
        let mut run = planner.begin(SearchRequest::new(at(2, 64, 7), Goal::Block(at(12, 64, 7))));
        let mut finalized: Vec<(DirectedPosition, f64)> = Vec::new();
        loop {
            let done = matches!(run.advance(1), RunState::Finished(_));
            for (_, node) in run.arena.iter().filter(|(_, n)| n.is_closed()) {
                if let Some((_, g)) = finalized.iter().find(|(k, _)| *k == node.key) {
                    assert!(node.g() >= *g - 1e-9);
                } else {
                    finalized.push((node.key, node.g()));
                }
            }
            if done {
                break;
            }
        }
    }

    #[test]
    fn exhaustion_without_progress_is_no_path() {
        // A one-cell pocket: nothing to expand into.
        let mut grid = VoxelGrid::new(at(0, 63, 0), 1, 3, 1);
        grid.set(at(0, 63, 0), Voxel::solid("bedrock"));
        let mut planner = PathPlanner::new(&grid, &FixedLedger(0), PathConfig::default()).unwrap();
        let outcome = planner.search(SearchRequest::new(at(0, 64, 0), Goal::Block(at(50, 64, 0))));
        assert_eq!(outcome.status, SearchStatus::NoPath);
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.stats.termination, Termination::Exhausted);
    }

    #[test]
    fn exhaustion_with_progress_is_partial() {
        // Closed corridor x 0..=5 heading toward a far goal.
        let mut grid = VoxelGrid::new(at(0, 63, 0), 6, 3, 1);
        grid.fill(at(0, 63, 0), at(5, 63, 0), Voxel::solid("bedrock"));
        let mut planner = PathPlanner::new(&grid, &FixedLedger(0), walker()).unwrap();
        let outcome = planner.search(SearchRequest::new(at(0, 64, 0), Goal::Block(at(50, 64, 0))));
        assert_eq!(outcome.status, SearchStatus::Partial);
        assert_eq!(outcome.stats.termination, Termination::Exhausted);
        assert_eq!(outcome.path.end(), Some(at(5, 64, 0)));
    }

    #[test]
    fn expansion_budget_yields_partial() {
        let plane = FlatPlane::new(63);
        let config = PathConfig {
            max_expansions: Some(50),
            ..walker()
        };
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, config).unwrap();
        let outcome = planner.search(SearchRequest::new(at(0, 64, 0), Goal::Block(at(500, 64, 0))));
        assert_eq!(outcome.status, SearchStatus::Partial);
        assert_eq!(outcome.stats.termination, Termination::ExpansionBudget);
        assert_eq!(outcome.stats.expansions, 50);
        let end = outcome.path.steps.last().unwrap();
        let epsilon = planner.config().partial.tie_epsilon;
        assert!(end.h - outcome.stats.min_expanded_heuristic <= epsilon + 1e-9);
    }

    #[test]
    fn advance_yields_between_slices() {
        let plane = FlatPlane::new(63);
        let config = PathConfig {
            max_expansions: Some(30),
            ..walker()
        };
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, config).unwrap();
        let mut run = planner.begin(SearchRequest::new(at(0, 64, 0), Goal::Block(at(500, 64, 0))));
        assert_eq!(run.advance(10), RunState::Pending);
        assert_eq!(run.expansions(), 10);
        assert_eq!(run.advance(10), RunState::Pending);
        let RunState::Finished(first) = run.advance(100) else {
            panic!("run should finish at the expansion budget");
        };
        assert_eq!(first.stats.expansions, 30);
        // A finished run keeps reporting the same outcome.
        assert_eq!(run.advance(1), RunState::Finished(first));
    }

    #[test]
    fn cancellation_stops_the_run() {
        let plane = FlatPlane::new(63);
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, walker()).unwrap();
        let mut run = planner.begin(SearchRequest::new(at(0, 64, 0), Goal::Block(at(5000, 64, 0))));
        assert_eq!(run.advance(20), RunState::Pending);
        run.controller().cancel();
        let RunState::Finished(outcome) = run.advance(1000) else {
            panic!("cancelled run should finish");
        };
        assert_eq!(outcome.stats.termination, Termination::Cancelled);
        assert_eq!(outcome.stats.expansions, 21);
        assert_eq!(outcome.status, SearchStatus::Partial);
    }

    #[test]
    fn beginning_a_new_run_cancels_the_previous() {
        let plane = FlatPlane::new(63);
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, walker()).unwrap();
        let first = planner.begin(SearchRequest::new(at(0, 64, 0), Goal::Block(at(9, 64, 0))));
        let handle = first.controller();
        drop(first);
        assert!(!handle.is_cancelled());
        let _second = planner.begin(SearchRequest::new(at(0, 64, 0), Goal::Block(at(9, 64, 0))));
        assert!(handle.is_cancelled());
    }

    #[test]
    fn live_change_evicts_and_replans() {
        let grid = room();
        let mut planner = PathPlanner::new(&grid, &UnlimitedLedger, walker()).unwrap();
        let mut run = planner.begin(SearchRequest::new(at(1, 64, 7), Goal::Block(at(12, 64, 7))));
        assert_eq!(run.advance(3), RunState::Pending);
        // Someone digs out the floor along the straight line.
        let handle = run.controller();
        for x in 2..=11 {
            assert!(handle.report_change(at(x, 63, 7), OverlayState::Air));
        }
        let outcome = run.run_to_end();
        assert_eq!(outcome.status, SearchStatus::Found);
        assert!(outcome.stats.evicted > 0);
        // Beyond what was already closed, the path never stands over a
        // removed floor cell.
        for step in &outcome.path.steps[1..] {
            let p = step.position;
            assert!(!(p.z == 7 && (4..=11).contains(&p.x) && p.y == 64));
        }
    }

    #[test]
    fn timeout_bounds_run_time() {
        let plane = FlatPlane::new(63);
        let config = PathConfig {
            think_timeout_ms: 20,
            ..PathConfig::default()
        };
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, config).unwrap();
        let begun = Instant::now();
        let outcome = planner.search(SearchRequest::new(
            at(0, 64, 0),
            Goal::Block(at(1_000_000, 64, 1_000_000)),
        ));
        assert_eq!(outcome.stats.termination, Termination::TimedOut);
        assert!(begun.elapsed() < Duration::from_millis(20 + 1000));
    }

    #[test]
    fn no_break_zone_forces_detour() {
        let mut grid = room();
        grid.fill(at(5, 64, 0), at(5, 67, 13), Voxel::solid("stone"));
        let config = PathConfig {
            can_place: false,
            ..PathConfig::default()
        };
        let zones = vec![Region::new(at(5, 60, 0), at(5, 67, 15))];
        let mut planner = PathPlanner::new(&grid, &UnlimitedLedger, config).unwrap();
        let outcome = planner.search(
            SearchRequest::new(at(2, 64, 2), Goal::Block(at(8, 64, 2))).with_no_break_zones(zones),
        );
        assert_eq!(outcome.status, SearchStatus::Found);
        assert!(
            outcome
                .path
                .steps
                .iter()
                .flat_map(|s| s.breaks.iter())
                .all(|b| b.x != 5)
        );
    }
}
