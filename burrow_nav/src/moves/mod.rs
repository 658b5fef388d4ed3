// Movement rules: the strategies that expand one search node into candidate
// successors.
//
// Each `MoveRule` represents one physically distinct way of getting from a
// cell to nearby cells (a plain step, a jump up, a parkour hop, a ladder
// climb, placing a pillar block...). The registry hands every rule the same
// `ExpansionContext` (overlay-aware world view, immutable config, origin,
// scaffolding budget, goal hint) and the direction set to try; the rule
// appends zero or more `Candidate`s. A rule never fails: geometry that does
// not admit the move simply produces nothing.
//
// Candidates carry the voxels that must be broken or placed to realize the
// move. Rules check feasibility against the origin node's view; the registry
// re-checks every break for breakability, checks placements against the
// scaffolding budget, and builds each survivor's overlay.
//
// Rule families:
// - `walk.rs`: forward, diagonal, jump up, descend, fall.
// - `parkour.rs`: running jumps across gaps, straight and diagonal.
// - `swim.rs`: entering, moving through, and leaving water.
// - `climb.rs`: ladders and vines.
// - `scaffold.rs`: pillaring up, bridging, digging down.
// - `fly.rs`: free movement through air.
//
// See also: `registry.rs` for gating, ordering and deduplication,
// `view.rs` for the predicates every rule is built from, `config.rs` for
// `MoveCosts` and `Capability`.
//
// **Critical constraint: rules are stateless.** A rule instance is built
// once and reused by every search; everything a call needs arrives through
// the context. Rules must be `Send + Sync` so the registry can fan them out
// across threads.

pub mod climb;
pub mod fly;
pub mod parkour;
pub mod scaffold;
pub mod swim;
pub mod walk;

use crate::config::{Capability, MoveCosts, PathConfig};
use crate::types::{DirectedPosition, Direction, GridPosition};
use crate::view::WorldView;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

pub type BreakList = SmallVec<[GridPosition; 4]>;
pub type PlaceList = SmallVec<[GridPosition; 2]>;

/// The movement kind attached to every path step, consumed by the executor
/// to pick a locomotion routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// The root of a search; not a move.
    Start,
    Forward,
    Diagonal,
    JumpUp,
    Descend,
    Fall,
    Parkour,
    DiagonalParkour,
    SwimEnter,
    Swim,
    SwimUp,
    SwimDown,
    SwimExit,
    ClimbEnter,
    ClimbUp,
    ClimbDown,
    ClimbExit,
    Pillar,
    Bridge,
    DigDown,
    Fly,
}

impl MoveKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Forward => "forward",
            Self::Diagonal => "diagonal",
            Self::JumpUp => "jump_up",
            Self::Descend => "descend",
            Self::Fall => "fall",
            Self::Parkour => "parkour",
            Self::DiagonalParkour => "diagonal_parkour",
            Self::SwimEnter => "swim_enter",
            Self::Swim => "swim",
            Self::SwimUp => "swim_up",
            Self::SwimDown => "swim_down",
            Self::SwimExit => "swim_exit",
            Self::ClimbEnter => "climb_enter",
            Self::ClimbUp => "climb_up",
            Self::ClimbDown => "climb_down",
            Self::ClimbExit => "climb_exit",
            Self::Pillar => "pillar",
            Self::Bridge => "bridge",
            Self::DigDown => "dig_down",
            Self::Fly => "fly",
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One proposed transition out of the origin node.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub target: DirectedPosition,
    pub kind: MoveKind,
    /// Edge cost, including break/place surcharges and hazard penalties.
    /// `f64::INFINITY` marks an impassable move; the registry drops it.
    pub cost: f64,
    pub breaks: BreakList,
    pub places: PlaceList,
}

/// Everything a rule may consult while generating candidates for one node.
#[derive(Clone, Copy)]
pub struct ExpansionContext<'a> {
    /// The world as seen from the origin node (its overlay applied).
    pub view: WorldView<'a>,
    pub config: &'a PathConfig,
    pub origin: DirectedPosition,
    /// Scaffolding already committed along the path to the origin.
    pub scaffolding_used: u32,
    pub scaffolding_available: u32,
    /// The goal's anchor, when it has one.
    pub goal_hint: Option<GridPosition>,
}

impl<'a> ExpansionContext<'a> {
    pub fn costs(&self) -> &'a MoveCosts {
        &self.config.costs
    }

    pub fn pos(&self) -> GridPosition {
        self.origin.pos
    }

    /// Origin re-headed along `dir`, for direction-relative offsets.
    pub fn heading(&self, dir: Direction) -> DirectedPosition {
        DirectedPosition::new(self.origin.pos, dir)
    }

    pub fn scaffolding_left(&self) -> u32 {
        self.scaffolding_available
            .saturating_sub(self.scaffolding_used)
    }

    /// The origin stands on solid footing.
    pub fn grounded(&self) -> bool {
        self.view.is_floor(self.origin.pos.down(1))
    }

    /// Cells the body must pass through: each must be walkable already or,
    /// if breaking is enabled, breakable. Returns the voxels to break, or
    /// `None` if some cell cannot be cleared.
    pub fn clear_passage(&self, cells: &[GridPosition]) -> Option<BreakList> {
        let mut breaks = BreakList::new();
        for &cell in cells {
            if self.view.is_walkable(cell) {
                continue;
            }
            if self.config.can_break && self.view.is_breakable(cell) {
                breaks.push(cell);
            } else {
                return None;
            }
        }
        Some(breaks)
    }

    /// Every cell is walkable as it stands.
    pub fn all_walkable(&self, cells: &[GridPosition]) -> bool {
        cells.iter().all(|&c| self.view.is_walkable(c))
    }

    /// Assemble a candidate, adding break and place surcharges to `base`.
    /// A landing in or beside lava costs infinity; a landing beside a
    /// stay-away voxel pays the configured penalty.
    pub fn candidate(
        &self,
        target: DirectedPosition,
        kind: MoveKind,
        base: f64,
        breaks: BreakList,
        places: PlaceList,
    ) -> Candidate {
        let costs = self.costs();
        let landing = target.pos;
        let mut cost = base
            + breaks
                .iter()
                .map(|&b| self.view.break_cost(b, costs))
                .sum::<f64>()
            + costs.place_per_voxel * places.len() as f64;
        if self.view.is_lava(landing)
            || self.view.touches_lava(landing)
            || self.view.touches_lava(landing.up(1))
        {
            cost = f64::INFINITY;
        } else if self.view.touches_stay_away(landing) {
            cost += costs.stay_away_penalty;
        }
        Candidate {
            target,
            kind,
            cost,
            breaks,
            places,
        }
    }

    /// A candidate with no terrain edits.
    pub fn plain(&self, target: DirectedPosition, kind: MoveKind, base: f64) -> Candidate {
        self.candidate(target, kind, base, BreakList::new(), PlaceList::new())
    }
}

/// A movement strategy. See the module header.
pub trait MoveRule: Send + Sync {
    /// Stable identifier, used in logs and registry listings.
    fn name(&self) -> &'static str;

    /// Lower runs first. Under first-wins dedup, priority decides which rule
    /// keeps a contested successor.
    fn priority(&self) -> u32;

    /// Capabilities that must all be enabled for the rule to run.
    fn requires(&self) -> &'static [Capability] {
        &[]
    }

    /// Append candidates for each direction in `directions` (cardinals;
    /// diagonal rules derive their diagonals from them).
    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>);
}
