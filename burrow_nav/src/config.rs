// Path search configuration.
//
// All tunable search parameters live in `PathConfig`: capability toggles
// (break, place, parkour, swim, fly), numeric limits (fall distance, dive
// depth, think timeout), heuristic weighting, move costs, the name-category
// block lists consulted by the world view, and the waypoint orchestrator's
// settings. Rules never use magic numbers for anything a host might want to
// tune; they read it from here.
//
// The config is a plain value handed to the planner. It is never read from
// the environment or from files by this crate. Hosts build it in code,
// deserialize it from JSON (`from_json`), or apply flat named settings
// (`set("waypoints.spacing", "50")`). Unknown keys and out-of-range values
// are rejected immediately with a `ConfigError`; a config that made it into
// a planner is always valid.
//
// See also: `error.rs` for `ConfigError`, `moves/mod.rs` for how rules are
// gated by `Capability`, `view.rs` for how `BlockLists` refine voxel kinds,
// `waypoint.rs` for `WaypointConfig`.
//
// **Critical constraint: immutability during a search.** The planner owns its
// config and rules only ever see `&PathConfig`. Changing settings means
// building a new planner; it cannot affect a run in progress.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A capability a move rule may require before it generates anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Break,
    Place,
    Parkour,
    Swim,
    Fly,
}

/// How the registry resolves two rules producing the same successor key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// The first rule in priority order keeps the key.
    #[default]
    FirstWins,
    /// The cheapest candidate keeps the key; priority breaks cost ties.
    CheapestWins,
}

// ---------------------------------------------------------------------------
// Nested parameter groups
// ---------------------------------------------------------------------------

/// Edge costs, in "forward step" units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoveCosts {
    /// One cardinal step on flat ground.
    pub forward: f64,
    /// One diagonal step on flat ground.
    pub diagonal: f64,
    /// Stepping up onto a block one higher.
    pub jump_up: f64,
    /// Stepping down one block.
    pub descend: f64,
    /// Added per block of a fall beyond the first.
    pub fall_per_block: f64,
    /// Per cell of horizontal distance covered by a parkour jump.
    pub parkour_per_block: f64,
    /// One cell of swimming.
    pub swim: f64,
    /// One cell of ladder climbing.
    pub climb: f64,
    /// One cell of powered flight.
    pub fly: f64,
    /// Added for every voxel a move breaks.
    pub break_per_voxel: f64,
    /// Added for every voxel a move places.
    pub place_per_voxel: f64,
    /// Multiplier on `break_per_voxel` for voxels in the disposable list.
    pub disposable_break_factor: f64,
    /// Added when a landing cell touches a stay-away voxel.
    pub stay_away_penalty: f64,
}

impl Default for MoveCosts {
    fn default() -> Self {
        Self {
            forward: 1.0,
            diagonal: std::f64::consts::SQRT_2,
            jump_up: 2.0,
            descend: 1.0,
            fall_per_block: 0.5,
            parkour_per_block: 1.0,
            swim: 2.0,
            climb: 1.5,
            fly: 1.0,
            break_per_voxel: 4.0,
            place_per_voxel: 3.0,
            disposable_break_factor: 0.5,
            stay_away_penalty: 10.0,
        }
    }
}

impl MoveCosts {
    fn all(&self) -> [(&'static str, f64); 13] {
        [
            ("costs.forward", self.forward),
            ("costs.diagonal", self.diagonal),
            ("costs.jump_up", self.jump_up),
            ("costs.descend", self.descend),
            ("costs.fall_per_block", self.fall_per_block),
            ("costs.parkour_per_block", self.parkour_per_block),
            ("costs.swim", self.swim),
            ("costs.climb", self.climb),
            ("costs.fly", self.fly),
            ("costs.break_per_voxel", self.break_per_voxel),
            ("costs.place_per_voxel", self.place_per_voxel),
            ("costs.disposable_break_factor", self.disposable_break_factor),
            ("costs.stay_away_penalty", self.stay_away_penalty),
        ]
    }
}

/// Name-category membership lists. Names are matched exactly against
/// `Voxel::name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlockLists {
    /// Never stand on, walk through, or break these.
    pub avoid: BTreeSet<String>,
    /// Penalize landing next to these.
    pub stay_away: BTreeSet<String>,
    /// Cheap to break (typically the scaffolding material).
    pub disposable: BTreeSet<String>,
    /// Walkable once opened (doors, gates).
    pub interactable: BTreeSet<String>,
    /// Ladder-like voxels.
    pub climbable: BTreeSet<String>,
    /// Never breakable regardless of other settings.
    pub unbreakable: BTreeSet<String>,
    /// Thin floor coverings that cannot serve as footing.
    pub carpet: BTreeSet<String>,
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for BlockLists {
    fn default() -> Self {
        Self {
            avoid: names(&["fire", "magma_block", "sweet_berry_bush", "powder_snow"]),
            stay_away: names(&["cactus", "wither_rose"]),
            disposable: names(&["scaffold", "dirt", "cobblestone", "netherrack"]),
            interactable: names(&["door", "fence_gate", "trapdoor"]),
            climbable: names(&["ladder", "vine"]),
            unbreakable: names(&["bedrock", "barrier", "end_portal_frame"]),
            carpet: names(&["carpet", "snow_layer", "lily_pad"]),
        }
    }
}

/// Shape of the "best node" selection used for partial results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    /// Heuristic differences at or below this count as a tie.
    pub tie_epsilon: f64,
    /// Initial backoff divisor.
    pub divisor_start: f64,
    /// Added to the divisor after every expansion.
    pub divisor_growth: f64,
    /// Fraction by which a challenger's backoff metric must undercut the
    /// incumbent's to replace it on a heuristic tie.
    pub hysteresis: f64,
    /// Minimum heuristic improvement over the start for an exhausted search
    /// to still report a partial path.
    pub min_progress: f64,
}

impl Default for PartialConfig {
    fn default() -> Self {
        Self {
            tie_epsilon: 1e-6,
            divisor_start: 1.5,
            divisor_growth: 0.01,
            hysteresis: 0.05,
            min_progress: 1.0,
        }
    }
}

/// Long-range decomposition settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaypointConfig {
    /// Goals farther than this (horizontal distance) are decomposed.
    pub threshold: u32,
    /// Target distance between consecutive waypoints.
    pub spacing: u32,
    /// Attempts per waypoint before adapting.
    pub max_retries: u32,
    /// Horizontal radius of the spiral search for standable ground.
    pub standable_search_radius: u32,
    /// Vertical range scanned at each spiral column.
    pub vertical_search_range: u32,
    /// Maximum entries in the waypoint success/failure cache.
    pub cache_capacity: usize,
    /// Failures (with no success) after which a waypoint is known-bad.
    pub known_bad_failures: u32,
    /// Within this distance of the goal, one last direct attempt is made.
    pub residual_distance: f64,
    /// Hard cap on sub-searches for one trip.
    pub max_legs: usize,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            threshold: 100,
            spacing: 50,
            max_retries: 2,
            standable_search_radius: 6,
            vertical_search_range: 8,
            cache_capacity: 128,
            known_bad_failures: 2,
            residual_distance: 4.0,
            max_legs: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level search configuration. Never mutated by a search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub can_break: bool,
    pub can_place: bool,
    pub allow_parkour: bool,
    pub allow_swim: bool,
    pub allow_fly: bool,

    /// Deepest drop a fall move may take, in blocks.
    pub max_fall_distance: u32,

    /// Deepest a swim move may go below the water surface, in blocks.
    pub max_water_dive_distance: u32,

    /// Wall-clock budget for one search, in milliseconds.
    pub think_timeout_ms: u64,

    /// Optional cap on node expansions; reached like a timeout.
    pub max_expansions: Option<u64>,

    /// Expansions performed per cooperative slice before yielding.
    pub yield_batch: u32,

    /// Euclidean share of the heuristic blend (Manhattan gets `1 - w`).
    pub heuristic_weight: f64,

    pub dedup_policy: DedupPolicy,

    /// Generate candidates for one node across rules in parallel, then merge
    /// in priority order.
    pub parallel_expansion: bool,

    pub partial: PartialConfig,
    pub costs: MoveCosts,
    pub blocks: BlockLists,
    pub waypoints: WaypointConfig,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            can_break: true,
            can_place: true,
            allow_parkour: true,
            allow_swim: true,
            allow_fly: false,
            max_fall_distance: 3,
            max_water_dive_distance: 3,
            think_timeout_ms: 5000,
            max_expansions: None,
            yield_batch: 256,
            heuristic_weight: 0.5,
            dedup_policy: DedupPolicy::FirstWins,
            parallel_expansion: false,
            partial: PartialConfig::default(),
            costs: MoveCosts::default(),
            blocks: BlockLists::default(),
            waypoints: WaypointConfig::default(),
        }
    }
}

impl PathConfig {
    /// Parse and validate a JSON config. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Whether a capability is enabled.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Break => self.can_break,
            Capability::Place => self.can_place,
            Capability::Parkour => self.allow_parkour,
            Capability::Swim => self.allow_swim,
            Capability::Fly => self.allow_fly,
        }
    }

    /// Apply one flat named setting, e.g. `set("can_break", "false")` or
    /// `set("waypoints.spacing", "40")`. Values are parsed as JSON scalars,
    /// falling back to a bare string (`set("dedup_policy", "cheapest_wins")`).
    /// The config is only changed if the result validates.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut tree = serde_json::to_value(&*self)?;
        let pointer = format!("/{}", key.replace('.', "/"));
        let slot = tree
            .pointer_mut(&pointer)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_owned()))?;
        if slot.is_object() {
            return Err(ConfigError::UnknownKey(key.to_owned()));
        }
        *slot = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_owned()));

        let updated: Self = serde_json::from_value(tree).map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check value ranges. Called by `from_json`, `set`, and the planner.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn out_of_range(key: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::OutOfRange {
                key,
                reason: reason.into(),
            }
        }

        if !(0.0..=1.0).contains(&self.heuristic_weight) {
            return Err(out_of_range("heuristic_weight", "must lie in [0, 1]"));
        }
        if self.think_timeout_ms == 0 {
            return Err(out_of_range("think_timeout_ms", "must be positive"));
        }
        if self.yield_batch == 0 {
            return Err(out_of_range("yield_batch", "must be positive"));
        }
        if self.max_fall_distance > 64 {
            return Err(out_of_range("max_fall_distance", "must be at most 64"));
        }
        if self.max_water_dive_distance > 64 {
            return Err(out_of_range("max_water_dive_distance", "must be at most 64"));
        }
        for (key, cost) in self.costs.all() {
            if !cost.is_finite() || cost < 0.0 {
                return Err(out_of_range(key, format!("{cost} is not a finite non-negative cost")));
            }
        }
        if self.costs.forward <= 0.0 {
            return Err(out_of_range("costs.forward", "must be positive"));
        }

        let p = &self.partial;
        if p.divisor_start.is_nan() || p.divisor_start <= 0.0 {
            return Err(out_of_range("partial.divisor_start", "must be positive"));
        }
        if p.divisor_growth.is_nan() || p.divisor_growth <= 0.0 {
            return Err(out_of_range("partial.divisor_growth", "must be positive"));
        }
        if !(0.0..1.0).contains(&p.hysteresis) {
            return Err(out_of_range("partial.hysteresis", "must lie in [0, 1)"));
        }
        if p.tie_epsilon.is_nan() || p.tie_epsilon < 0.0 || p.min_progress.is_nan() || p.min_progress < 0.0 {
            return Err(out_of_range("partial", "tolerances must be non-negative"));
        }

        let w = &self.waypoints;
        if w.spacing == 0 {
            return Err(out_of_range("waypoints.spacing", "must be positive"));
        }
        if w.spacing > w.threshold {
            return Err(out_of_range(
                "waypoints.spacing",
                format!("{} exceeds threshold {}", w.spacing, w.threshold),
            ));
        }
        if w.cache_capacity == 0 {
            return Err(out_of_range("waypoints.cache_capacity", "must be positive"));
        }
        if w.max_legs == 0 {
            return Err(out_of_range("waypoints.max_legs", "must be positive"));
        }
        if w.residual_distance.is_nan() || w.residual_distance < 0.0 {
            return Err(out_of_range("waypoints.residual_distance", "must be non-negative"));
        }
        Ok(())
    }
}
