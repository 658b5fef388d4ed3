// Long-range travel: decomposing far goals into a chain of waypoint legs.
//
// A single A* run over hundreds of blocks rarely finishes inside the think
// budget, so `WaypointOrchestrator::travel` splits a far goal into legs.
// When the goal's anchor lies more than `threshold` blocks away
// (horizontally), `ceil(distance / spacing) - 1` intermediate points are
// placed on the straight line toward it and each is resolved to physically
// standable ground by a spiral search (exact point first, then rings of
// growing radius, scanning up and down each column). The chain always ends
// with the caller's own goal, so a trip of distance d issues ceil(d/spacing)
// sub-searches when nothing fails.
//
// Legs run sequentially through the caller's `PathPlanner`; an
// `AgentDriver` carries each returned path out and reports where the agent
// actually ended up. A leg succeeds when the search was `Found` and the
// agent arrived at the leg's target. A failed leg is retried up to
// `max_retries` times, after which the trip escalates one step:
//   0. insert a nearer intermediate waypoint halfway to the failing target;
//   1. mark the failing waypoint known-bad in the cache and skip it;
//   2. regenerate the remaining chain from the agent's current position;
//   3. give up (stranded).
// The escalation level resets whenever a planned waypoint (not an inserted
// intermediate) or the goal succeeds. If the trip ends without arriving but
// the agent stands within `residual_distance` of the goal, one last direct
// attempt is made. `max_legs` caps the total number of sub-searches.
//
// The orchestrator keeps a `WaypointCache` across trips: a bounded LRU map
// from waypoint position to success/failure counts, pruned on a logical
// clock. Waypoints with enough failures and no success are known-bad and
// never chosen again by the spiral search.
//
// See also: `search.rs` for the per-leg planner, `goal.rs` for `anchor`.
//
// **Critical constraint: bounded trips.** Every loop iteration issues one
// sub-search and `max_legs` bounds them, so a trip terminates even when the
// driver never reports progress.

use crate::config::WaypointConfig;
use crate::goal::Goal;
use crate::search::{Path, PathPlanner, SearchRequest, SearchStatus};
use crate::types::GridPosition;
use crate::view::WorldView;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Agent driver
// ---------------------------------------------------------------------------

/// Executes a leg's path and reports where the agent ended up.
pub trait AgentDriver {
    fn follow(&mut self, from: GridPosition, path: &Path) -> GridPosition;
}

/// A driver that assumes every path is walked to its end.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumedArrival;

impl AgentDriver for AssumedArrival {
    fn follow(&mut self, from: GridPosition, path: &Path) -> GridPosition {
        path.end().unwrap_or(from)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WaypointRecord {
    pub successes: u32,
    pub failures: u32,
}

/// Bounded success/failure history per waypoint, least-recently-used
/// entries pruned first.
#[derive(Debug)]
pub struct WaypointCache {
    entries: FxHashMap<GridPosition, (WaypointRecord, u64)>,
    capacity: usize,
    clock: u64,
}

impl WaypointCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pos: GridPosition) -> Option<WaypointRecord> {
        self.entries.get(&pos).map(|(record, _)| *record)
    }

    pub fn record_success(&mut self, pos: GridPosition) {
        self.touch(pos).successes += 1;
    }

    pub fn record_failure(&mut self, pos: GridPosition) {
        self.touch(pos).failures += 1;
    }

    /// Force `pos` known-bad under a threshold of `failures`.
    pub fn mark_known_bad(&mut self, pos: GridPosition, failures: u32) {
        let record = self.touch(pos);
        record.successes = 0;
        record.failures = record.failures.max(failures.max(1));
    }

    /// At least `threshold` failures and never a success.
    pub fn is_known_bad(&self, pos: GridPosition, threshold: u32) -> bool {
        self.get(pos)
            .is_some_and(|r| r.successes == 0 && r.failures >= threshold.max(1))
    }

    fn touch(&mut self, pos: GridPosition) -> &mut WaypointRecord {
        self.clock += 1;
        if !self.entries.contains_key(&pos) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        let clock = self.clock;
        let entry = self
            .entries
            .entry(pos)
            .or_insert((WaypointRecord::default(), clock));
        entry.1 = clock;
        &mut entry.0
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, (_, used))| *used)
            .map(|(pos, _)| *pos);
        if let Some(pos) = oldest {
            self.entries.remove(&pos);
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What one leg was aiming for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LegTarget {
    /// A planned point on the chain.
    Waypoint(GridPosition),
    /// A point inserted after a waypoint kept failing.
    Intermediate(GridPosition),
    /// The trip's own goal.
    Goal,
}

impl LegTarget {
    pub fn position(self) -> Option<GridPosition> {
        match self {
            Self::Waypoint(p) | Self::Intermediate(p) => Some(p),
            Self::Goal => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegRecord {
    pub target: LegTarget,
    /// The goal handed to the planner for this leg.
    pub goal: Goal,
    pub from: GridPosition,
    /// Where the driver reported the agent afterwards.
    pub reached: GridPosition,
    pub status: SearchStatus,
    pub expansions: u64,
    pub cost: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Adaptation {
    InsertedIntermediate(GridPosition),
    SkippedKnownBad(GridPosition),
    Regenerated { waypoints: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TravelStatus {
    Arrived,
    /// Every adaptation was used up.
    Stranded,
    /// The sub-search cap was hit first.
    LegBudget,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TravelReport {
    pub status: TravelStatus,
    pub position: GridPosition,
    pub legs: Vec<LegRecord>,
    pub adaptations: Vec<Adaptation>,
}

impl TravelReport {
    pub fn arrived(&self) -> bool {
        self.status == TravelStatus::Arrived
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Pending {
    target: LegTarget,
    failures: u32,
}

impl Pending {
    fn new(target: LegTarget) -> Self {
        Self {
            target,
            failures: 0,
        }
    }
}

/// Straight-line interpolation, rounded to the grid.
fn lerp(from: GridPosition, to: GridPosition, t: f64) -> GridPosition {
    let axis = |a: i32, b: i32| (f64::from(a) + f64::from(b - a) * t).round() as i32;
    GridPosition::new(axis(from.x, to.x), axis(from.y, to.y), axis(from.z, to.z))
}

#[derive(Debug)]
pub struct WaypointOrchestrator {
    config: WaypointConfig,
    cache: WaypointCache,
}

impl WaypointOrchestrator {
    pub fn new(config: WaypointConfig) -> Self {
        let cache = WaypointCache::new(config.cache_capacity);
        Self { config, cache }
    }

    pub fn cache(&self) -> &WaypointCache {
        &self.cache
    }

    fn usable(&self, view: &WorldView<'_>, pos: GridPosition) -> bool {
        view.is_standable(pos)
            && !view.is_hazard(pos)
            && !view.touches_lava(pos)
            && !self.cache.is_known_bad(pos, self.config.known_bad_failures)
    }

    /// The standable cell nearest `ideal`: the point itself, then columns on
    /// rings of growing radius, each scanned at offsets 0, +1, -1, +2, ...
    pub fn find_standable(&self, view: &WorldView<'_>, ideal: GridPosition) -> Option<GridPosition> {
        let radius = self.config.standable_search_radius as i32;
        let range = self.config.vertical_search_range as i32;
        for r in 0..=radius {
            let mut ring: Vec<(i32, i32)> = (-r..=r)
                .flat_map(|dx| (-r..=r).map(move |dz| (dx, dz)))
                .filter(|(dx, dz)| dx.abs().max(dz.abs()) == r)
                .collect();
            ring.sort_by_key(|&(dx, dz)| (dx * dx + dz * dz, dx, dz));
            for (dx, dz) in ring {
                let column = ideal.offset(dx, 0, dz);
                let offsets = std::iter::once(0).chain((1..=range).flat_map(|d| [d, -d]));
                for dy in offsets {
                    let candidate = column.offset(0, dy, 0);
                    if self.usable(view, candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Standable waypoints spaced along the line from `from` to `anchor`,
    /// excluding both ends. Empty when `anchor` is within the threshold.
    pub fn plan_waypoints(
        &self,
        view: &WorldView<'_>,
        from: GridPosition,
        anchor: GridPosition,
    ) -> Vec<GridPosition> {
        let distance = from.horizontal_distance(anchor);
        if distance <= f64::from(self.config.threshold) {
            return Vec::new();
        }
        let count = (distance / f64::from(self.config.spacing)).ceil() as u32;
        let mut waypoints: Vec<GridPosition> = Vec::new();
        for i in 1..count {
            let ideal = lerp(from, anchor, f64::from(i) / f64::from(count));
            match self.find_standable(view, ideal) {
                Some(p) if p != from && waypoints.last() != Some(&p) => waypoints.push(p),
                Some(_) => {}
                None => warn!(%ideal, "no standable ground near waypoint; dropping it"),
            }
        }
        waypoints
    }

    fn chain(&self, view: &WorldView<'_>, from: GridPosition, goal: &Goal) -> VecDeque<Pending> {
        let mut chain: VecDeque<Pending> = goal
            .anchor(from)
            .map(|anchor| self.plan_waypoints(view, from, anchor))
            .unwrap_or_default()
            .into_iter()
            .map(|p| Pending::new(LegTarget::Waypoint(p)))
            .collect();
        chain.push_back(Pending::new(LegTarget::Goal));
        chain
    }

    /// A standable point roughly halfway from `from` to `to`, distinct from
    /// both.
    fn intermediate(&self, view: &WorldView<'_>, from: GridPosition, to: GridPosition) -> Option<GridPosition> {
        if from.horizontal_distance(to) < 2.0 {
            return None;
        }
        self.find_standable(view, lerp(from, to, 0.5))
            .filter(|p| *p != from && *p != to)
    }

    /// Apply the next escalation step after `failed` ran out of retries.
    /// `None` means every step is used up.
    fn adapt(
        &mut self,
        view: &WorldView<'_>,
        escalation: &mut usize,
        position: GridPosition,
        failed: Pending,
        queue: &mut VecDeque<Pending>,
        goal: &Goal,
    ) -> Option<Adaptation> {
        loop {
            let step = *escalation;
            *escalation += 1;
            match step {
                0 => {
                    let toward = failed.target.position().or_else(|| goal.anchor(position));
                    if let Some(mid) = toward.and_then(|t| self.intermediate(view, position, t)) {
                        warn!(target = ?failed.target, %mid, "leg keeps failing; inserting intermediate waypoint");
                        queue.push_front(Pending::new(failed.target));
                        queue.push_front(Pending::new(LegTarget::Intermediate(mid)));
                        return Some(Adaptation::InsertedIntermediate(mid));
                    }
                }
                1 => {
                    if let Some(p) = failed.target.position() {
                        self.cache.mark_known_bad(p, self.config.known_bad_failures);
                        warn!(waypoint = %p, "waypoint marked known-bad; skipping it");
                        return Some(Adaptation::SkippedKnownBad(p));
                    }
                }
                2 => {
                    *queue = self.chain(view, position, goal);
                    let waypoints = queue.len().saturating_sub(1);
                    warn!(%position, waypoints, "regenerating waypoint chain");
                    return Some(Adaptation::Regenerated { waypoints });
                }
                _ => return None,
            }
        }
    }

    fn run_leg(
        planner: &mut PathPlanner<'_>,
        driver: &mut dyn AgentDriver,
        position: GridPosition,
        target: LegTarget,
        goal: &Goal,
    ) -> LegRecord {
        let leg_goal = match target.position() {
            Some(p) => Goal::Block(p),
            None => goal.clone(),
        };
        let outcome = planner.search(SearchRequest::new(position, leg_goal.clone()));
        let reached = if outcome.path.is_empty() {
            position
        } else {
            driver.follow(position, &outcome.path)
        };
        LegRecord {
            target,
            goal: leg_goal,
            from: position,
            reached,
            status: outcome.status,
            expansions: outcome.stats.expansions,
            cost: outcome.path.total_cost(),
        }
    }

    /// Take the agent from `start` to `goal`, one leg at a time.
    pub fn travel(
        &mut self,
        planner: &mut PathPlanner<'_>,
        driver: &mut dyn AgentDriver,
        start: GridPosition,
        goal: &Goal,
    ) -> TravelReport {
        let oracle = planner.oracle();
        let blocks = planner.config().blocks.clone();
        let weight = planner.config().heuristic_weight;
        let view = WorldView::new(oracle, &blocks);

        let mut position = start;
        let mut legs: Vec<LegRecord> = Vec::new();
        let mut adaptations = Vec::new();
        let mut escalation = 0;
        let mut queue = self.chain(&view, position, goal);
        info!(%start, ?goal, waypoints = queue.len() - 1, "trip planned");

        let mut status = loop {
            if goal.is_reached(position) {
                break TravelStatus::Arrived;
            }
            if legs.len() >= self.config.max_legs {
                break TravelStatus::LegBudget;
            }
            let Some(mut pending) = queue.pop_front() else {
                break TravelStatus::Stranded;
            };

            let leg = Self::run_leg(planner, driver, position, pending.target, goal);
            position = leg.reached;
            let arrived = match pending.target.position() {
                Some(p) => position == p,
                None => goal.is_reached(position),
            };
            let succeeded = leg.status == SearchStatus::Found && arrived;
            info!(
                leg = legs.len(),
                target = ?pending.target,
                status = ?leg.status,
                expansions = leg.expansions,
                %position,
                succeeded,
                "leg finished"
            );
            legs.push(leg);

            if succeeded {
                if let Some(p) = pending.target.position() {
                    self.cache.record_success(p);
                }
                if !matches!(pending.target, LegTarget::Intermediate(_)) {
                    escalation = 0;
                }
                continue;
            }

            if let Some(p) = pending.target.position() {
                self.cache.record_failure(p);
            }
            pending.failures += 1;
            if pending.failures <= self.config.max_retries {
                queue.push_front(pending);
                continue;
            }
            match self.adapt(&view, &mut escalation, position, pending, &mut queue, goal) {
                Some(adaptation) => adaptations.push(adaptation),
                None => break TravelStatus::Stranded,
            }
        };

        if status != TravelStatus::Arrived && legs.len() < self.config.max_legs {
            let near = match goal.anchor(position) {
                Some(anchor) => position.distance(anchor) <= self.config.residual_distance,
                None => goal.heuristic(position, weight) <= self.config.residual_distance,
            };
            if near {
                let leg = Self::run_leg(planner, driver, position, LegTarget::Goal, goal);
                position = leg.reached;
                info!(status = ?leg.status, %position, "residual attempt finished");
                legs.push(leg);
                if goal.is_reached(position) {
                    status = TravelStatus::Arrived;
                }
            }
        }

        if status == TravelStatus::Arrived {
            info!(legs = legs.len(), %position, "trip arrived");
        } else {
            warn!(?status, legs = legs.len(), %position, "trip ended short of the goal");
        }
        TravelReport {
            status,
            position,
            legs,
            adaptations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathConfig;
    use crate::types::Voxel;
    use crate::world::{FlatPlane, UnlimitedLedger, VoxelGrid};

    fn at(x: i32, y: i32, z: i32) -> GridPosition {
        GridPosition::new(x, y, z)
    }

    fn walker() -> PathConfig {
        PathConfig {
            can_break: false,
            can_place: false,
            ..PathConfig::default()
        }
    }

    /// Flat stone floor at y = 63 with a sealed bedrock pen around
    /// (60, 64, 0): walls at x = 58 and 62 and z = ±2, four blocks high.
    fn penned(pos: GridPosition) -> Option<Voxel> {
        if pos.y <= 63 {
            return Some(Voxel::solid("stone"));
        }
        let in_pen = (58..=62).contains(&pos.x) && (-2..=2).contains(&pos.z);
        let wall = pos.x == 58 || pos.x == 62 || pos.z.abs() == 2;
        if in_pen && wall && pos.y <= 67 {
            Some(Voxel::solid("bedrock"))
        } else {
            Some(Voxel::AIR)
        }
    }

    /// Stops one step short of the path end for its first `short` legs.
    struct Stumbling {
        short: u32,
    }

    impl AgentDriver for Stumbling {
        fn follow(&mut self, from: GridPosition, path: &Path) -> GridPosition {
            if self.short > 0 && path.len() >= 2 {
                self.short -= 1;
                return path.steps[path.len() - 2].position;
            }
            path.end().unwrap_or(from)
        }
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = WaypointCache::new(2);
        cache.record_failure(at(1, 0, 0));
        cache.record_failure(at(2, 0, 0));
        cache.record_success(at(1, 0, 0));
        cache.record_failure(at(3, 0, 0));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(at(2, 0, 0)).is_none());
        assert_eq!(
            cache.get(at(1, 0, 0)),
            Some(WaypointRecord {
                successes: 1,
                failures: 1
            })
        );
    }

    #[test]
    fn known_bad_needs_failures_and_no_success() {
        let mut cache = WaypointCache::new(8);
        let p = at(5, 64, 5);
        cache.record_failure(p);
        assert!(!cache.is_known_bad(p, 2));
        cache.record_failure(p);
        assert!(cache.is_known_bad(p, 2));
        cache.record_success(p);
        assert!(!cache.is_known_bad(p, 2));
        cache.mark_known_bad(p, 2);
        assert!(cache.is_known_bad(p, 2));
        assert!(!cache.is_known_bad(at(0, 0, 0), 2));
    }

    #[test]
    fn spiral_finds_nearest_standable_cell() {
        let mut grid = VoxelGrid::new(at(0, 60, 0), 9, 8, 9);
        grid.fill(at(0, 60, 0), at(8, 63, 8), Voxel::solid("stone"));
        // A lava pit around the ideal point, one ring wide.
        grid.fill(at(3, 63, 3), at(5, 63, 5), Voxel::LAVA);
        let blocks = PathConfig::default().blocks;
        let view = WorldView::new(&grid, &blocks);
        let orchestrator = WaypointOrchestrator::new(WaypointConfig::default());
        let found = orchestrator.find_standable(&view, at(4, 64, 4)).unwrap();
        assert_eq!(found.y, 64);
        let ring = (found.x - 4).abs().max((found.z - 4).abs());
        assert_eq!(ring, 2);
        // Ring 1 stands over the pit itself.
        assert!(!view.touches_lava(found));
    }

    #[test]
    fn spiral_scans_vertically() {
        let plane = FlatPlane::new(70);
        let blocks = PathConfig::default().blocks;
        let view = WorldView::new(&plane, &blocks);
        let orchestrator = WaypointOrchestrator::new(WaypointConfig::default());
        assert_eq!(orchestrator.find_standable(&view, at(0, 64, 0)), Some(at(0, 71, 0)));
    }

    #[test]
    fn waypoints_are_evenly_spaced() {
        let plane = FlatPlane::new(63);
        let blocks = PathConfig::default().blocks;
        let view = WorldView::new(&plane, &blocks);
        let orchestrator = WaypointOrchestrator::new(WaypointConfig::default());
        assert_eq!(
            orchestrator.plan_waypoints(&view, at(0, 64, 0), at(200, 64, 0)),
            vec![at(50, 64, 0), at(100, 64, 0), at(150, 64, 0)]
        );
        assert!(orchestrator.plan_waypoints(&view, at(0, 64, 0), at(90, 64, 0)).is_empty());
    }

    #[test]
    fn known_bad_points_are_avoided_when_planning() {
        let plane = FlatPlane::new(63);
        let blocks = PathConfig::default().blocks;
        let view = WorldView::new(&plane, &blocks);
        let mut orchestrator = WaypointOrchestrator::new(WaypointConfig::default());
        orchestrator.cache.mark_known_bad(at(100, 64, 0), 2);
        let waypoints = orchestrator.plan_waypoints(&view, at(0, 64, 0), at(200, 64, 0));
        assert_eq!(waypoints.len(), 3);
        assert_ne!(waypoints[1], at(100, 64, 0));
        assert!(waypoints[1].horizontal_distance(at(100, 64, 0)) <= 1.0);
    }

    #[test]
    fn short_trip_is_a_single_leg() {
        let plane = FlatPlane::new(63);
        let config = walker();
        let mut orchestrator = WaypointOrchestrator::new(config.waypoints.clone());
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, config).unwrap();
        let goal = Goal::Block(at(12, 64, 3));
        let report = orchestrator.travel(&mut planner, &mut AssumedArrival, at(0, 64, 0), &goal);
        assert!(report.arrived());
        assert_eq!(report.legs.len(), 1);
        assert_eq!(report.legs[0].target, LegTarget::Goal);
        assert_eq!(report.position, at(12, 64, 3));
    }

    #[test]
    fn sealed_waypoint_escalates_through_every_adaptation() {
        let mut config = walker();
        config.max_expansions = Some(2000);
        config.waypoints.threshold = 100;
        config.waypoints.spacing = 60;
        config.waypoints.max_retries = 0;
        let mut orchestrator = WaypointOrchestrator::new(config.waypoints.clone());
        let mut planner = PathPlanner::new(&penned, &UnlimitedLedger, config).unwrap();
        let goal = Goal::Block(at(120, 64, 0));
        let report = orchestrator.travel(&mut planner, &mut AssumedArrival, at(0, 64, 0), &goal);

        assert!(report.arrived());
        assert_eq!(
            report.adaptations,
            vec![
                Adaptation::InsertedIntermediate(at(59, 64, 0)),
                Adaptation::SkippedKnownBad(at(59, 64, 0)),
                Adaptation::Regenerated { waypoints: 0 },
            ]
        );
        let targets: Vec<LegTarget> = report.legs.iter().map(|l| l.target).collect();
        assert_eq!(
            targets,
            vec![
                LegTarget::Waypoint(at(60, 64, 0)),
                LegTarget::Intermediate(at(59, 64, 0)),
                LegTarget::Waypoint(at(60, 64, 0)),
                LegTarget::Goal,
            ]
        );
        assert!(orchestrator.cache().is_known_bad(at(59, 64, 0), 2));
        assert_eq!(orchestrator.cache().get(at(60, 64, 0)).unwrap().failures, 2);
    }

    #[test]
    fn residual_attempt_finishes_a_stranded_trip() {
        let plane = FlatPlane::new(63);
        let mut config = walker();
        config.waypoints.max_retries = 0;
        let mut orchestrator = WaypointOrchestrator::new(config.waypoints.clone());
        let mut planner = PathPlanner::new(&plane, &UnlimitedLedger, config).unwrap();
        let goal = Goal::Block(at(5, 64, 0));
        let mut driver = Stumbling { short: 2 };
        let report = orchestrator.travel(&mut planner, &mut driver, at(0, 64, 0), &goal);

        assert!(report.arrived());
        assert_eq!(report.adaptations, vec![Adaptation::Regenerated { waypoints: 0 }]);
        assert_eq!(report.legs.len(), 3);
        assert!(report.legs.iter().all(|l| l.status == SearchStatus::Found));
        assert_eq!(report.legs[2].from, at(4, 64, 0));
    }

    #[test]
    fn leg_budget_caps_sub_searches() {
        let mut config = walker();
        config.max_expansions = Some(200);
        config.waypoints.max_legs = 2;
        config.waypoints.max_retries = 5;
        let mut orchestrator = WaypointOrchestrator::new(config.waypoints.clone());
        let mut planner = PathPlanner::new(&penned, &UnlimitedLedger, config).unwrap();
        let report = orchestrator.travel(&mut planner, &mut AssumedArrival, at(50, 64, 0), &Goal::Block(at(60, 64, 0)));
        assert_eq!(report.status, TravelStatus::LegBudget);
        assert_eq!(report.legs.len(), 2);
    }
}
