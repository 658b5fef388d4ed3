// Overlay-aware classification of voxels.
//
// `WorldView` is what move rules actually query. It resolves a position in
// three steps:
//   1. the node's own speculative overlay (`Air` → air, `Placed` → a full
//      solid scaffolding voxel),
//   2. the live layer of real-world changes reported to the search
//      controller mid-run,
//   3. the ground-truth oracle.
// It then refines the raw voxel with the configured name-category lists
// (a solid "ladder" classifies as climbable, a "door" as interactable) and
// derives the traversal predicates every rule is built from.
//
// Positions the oracle knows nothing about classify as `Unknown`, and every
// predicate treats `Unknown` as not traversable, not standable, and not
// breakable. The search fails closed at the edge of known space.
//
// See also: `overlay.rs` for the speculative layers, `world.rs` for the
// oracle, `config.rs` for `BlockLists`, `moves/` for the rules that call
// these predicates.
//
// **Critical constraint: purity.** Every predicate is a pure function of the
// overlays, the oracle and the config lists. A view never caches across
// nodes; each expansion builds a fresh view over that node's overlay.

use crate::config::{BlockLists, MoveCosts};
use crate::overlay::{OverlayState, VirtualOverlay};
use crate::types::{GridPosition, Voxel, VoxelKind, VoxelShape};
use crate::world::WorldOracle;
use serde::{Deserialize, Serialize};

static EMPTY_OVERLAY: VirtualOverlay = VirtualOverlay::new();

/// An inclusive axis-aligned box of positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub min: GridPosition,
    pub max: GridPosition,
}

impl Region {
    /// Build a region from any two opposite corners.
    pub fn new(a: GridPosition, b: GridPosition) -> Self {
        Self {
            min: GridPosition::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: GridPosition::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Integer center (rounded toward the minimum corner).
    pub fn center(&self) -> GridPosition {
        GridPosition::new(
            self.min.x + (self.max.x - self.min.x) / 2,
            self.min.y + (self.max.y - self.min.y) / 2,
            self.min.z + (self.max.z - self.min.z) / 2,
        )
    }
}

/// Read-only, overlay-aware view of the world for one node expansion.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    oracle: &'a dyn WorldOracle,
    blocks: &'a BlockLists,
    overlay: &'a VirtualOverlay,
    live: &'a VirtualOverlay,
    no_break: &'a [Region],
}

impl<'a> WorldView<'a> {
    /// A view over ground truth only.
    pub fn new(oracle: &'a dyn WorldOracle, blocks: &'a BlockLists) -> Self {
        Self {
            oracle,
            blocks,
            overlay: &EMPTY_OVERLAY,
            live: &EMPTY_OVERLAY,
            no_break: &[],
        }
    }

    /// Layer a node's speculative overlay on top.
    pub fn with_overlay(self, overlay: &'a VirtualOverlay) -> Self {
        Self { overlay, ..self }
    }

    /// Layer real-world changes reported mid-search between the node
    /// overlay and the oracle.
    pub fn with_live(self, live: &'a VirtualOverlay) -> Self {
        Self { live, ..self }
    }

    /// Regions where nothing may be broken.
    pub fn with_no_break_zones(self, zones: &'a [Region]) -> Self {
        Self {
            no_break: zones,
            ..self
        }
    }

    pub fn blocks(&self) -> &'a BlockLists {
        self.blocks
    }

    /// The resolved voxel at `pos`, or `None` when nothing is known.
    pub fn voxel(&self, pos: GridPosition) -> Option<Voxel> {
        let marked = self.overlay.get(pos).or_else(|| self.live.get(pos));
        match marked {
            Some(OverlayState::Air) => Some(Voxel::AIR),
            Some(OverlayState::Placed) => Some(Voxel::PLACED),
            None => self.oracle.voxel(pos),
        }
    }

    /// Whether `pos` is shadowed by the node's speculative overlay.
    pub fn is_speculative(&self, pos: GridPosition) -> bool {
        self.overlay.contains(pos)
    }

    pub fn classify(&self, pos: GridPosition) -> VoxelKind {
        match self.voxel(pos) {
            None => VoxelKind::Unknown,
            Some(v) => self.refine(v),
        }
    }

    fn refine(&self, voxel: Voxel) -> VoxelKind {
        match voxel.kind {
            VoxelKind::Solid | VoxelKind::Air if self.blocks.climbable.contains(voxel.name) => {
                VoxelKind::Climbable
            }
            VoxelKind::Solid | VoxelKind::Air
                if self.blocks.interactable.contains(voxel.name) =>
            {
                VoxelKind::Interactable
            }
            kind => kind,
        }
    }

    fn named(&self, pos: GridPosition, list: &std::collections::BTreeSet<String>) -> bool {
        self.voxel(pos).is_some_and(|v| list.contains(v.name))
    }

    pub fn is_unknown(&self, pos: GridPosition) -> bool {
        self.classify(pos) == VoxelKind::Unknown
    }

    pub fn is_solid(&self, pos: GridPosition) -> bool {
        self.classify(pos) == VoxelKind::Solid
    }

    pub fn is_water(&self, pos: GridPosition) -> bool {
        self.classify(pos) == VoxelKind::Water
    }

    pub fn is_lava(&self, pos: GridPosition) -> bool {
        self.classify(pos) == VoxelKind::Lava
    }

    pub fn is_climbable(&self, pos: GridPosition) -> bool {
        self.classify(pos) == VoxelKind::Climbable
    }

    pub fn is_interactable(&self, pos: GridPosition) -> bool {
        self.classify(pos) == VoxelKind::Interactable
    }

    pub fn is_avoided(&self, pos: GridPosition) -> bool {
        self.named(pos, &self.blocks.avoid)
    }

    /// Lava or an avoid-listed voxel.
    pub fn is_hazard(&self, pos: GridPosition) -> bool {
        self.is_lava(pos) || self.is_avoided(pos)
    }

    fn shape(&self, pos: GridPosition) -> Option<VoxelShape> {
        self.voxel(pos).map(|v| v.shape)
    }

    pub fn is_full_block(&self, pos: GridPosition) -> bool {
        self.is_solid(pos) && self.shape(pos) == Some(VoxelShape::Full)
    }

    pub fn is_fence(&self, pos: GridPosition) -> bool {
        self.is_solid(pos) && self.shape(pos) == Some(VoxelShape::Fence)
    }

    pub fn is_slab(&self, pos: GridPosition) -> bool {
        self.is_solid(pos) && self.shape(pos) == Some(VoxelShape::Slab)
    }

    pub fn is_carpet(&self, pos: GridPosition) -> bool {
        self.shape(pos) == Some(VoxelShape::Carpet) || self.named(pos, &self.blocks.carpet)
    }

    /// The agent's body can occupy `pos`.
    pub fn is_walkable(&self, pos: GridPosition) -> bool {
        if self.is_avoided(pos) {
            return false;
        }
        match self.classify(pos) {
            VoxelKind::Air | VoxelKind::Climbable | VoxelKind::Interactable => true,
            VoxelKind::Solid => self.is_carpet(pos),
            VoxelKind::Water | VoxelKind::Lava | VoxelKind::Unknown => false,
        }
    }

    /// Solid enough to stand on: a full-height solid voxel that is not
    /// avoided, not climbable and not a carpet.
    pub fn is_floor(&self, pos: GridPosition) -> bool {
        self.is_full_block(pos) && !self.is_avoided(pos) && !self.is_carpet(pos)
    }

    /// The agent can stand with its feet at `pos`.
    pub fn is_standable(&self, pos: GridPosition) -> bool {
        self.is_floor(pos.down(1)) && self.is_walkable(pos) && self.is_walkable(pos.up(1))
    }

    /// A solid voxel low enough to be jumped onto from the cell beside it.
    pub fn is_jumpable(&self, pos: GridPosition) -> bool {
        self.is_solid(pos)
            && self.shape(pos).is_some_and(|s| s.height() <= 1.0)
            && !self.is_avoided(pos)
    }

    /// Placement can fill `pos` (air or water).
    pub fn is_replaceable(&self, pos: GridPosition) -> bool {
        matches!(self.classify(pos), VoxelKind::Air | VoxelKind::Water) && !self.is_avoided(pos)
    }

    /// Breaking `pos` is allowed: solid, not unbreakable or avoided, outside
    /// every no-break zone, and not holding back a liquid.
    pub fn is_breakable(&self, pos: GridPosition) -> bool {
        if !self.is_solid(pos) {
            return false;
        }
        if self.named(pos, &self.blocks.unbreakable) || self.is_avoided(pos) {
            return false;
        }
        if self.no_break.iter().any(|zone| zone.contains(pos)) {
            return false;
        }
        // Opening a liquid pocket would flood the path.
        pos.face_neighbors()
            .into_iter()
            .filter(|n| *n != pos.down(1))
            .all(|n| !matches!(self.classify(n), VoxelKind::Water | VoxelKind::Lava))
    }

    /// Cost of breaking `pos`, honouring the disposable list.
    pub fn break_cost(&self, pos: GridPosition, costs: &MoveCosts) -> f64 {
        if self.named(pos, &self.blocks.disposable) {
            costs.break_per_voxel * costs.disposable_break_factor
        } else {
            costs.break_per_voxel
        }
    }

    /// Any face neighbor of `pos` is lava.
    pub fn touches_lava(&self, pos: GridPosition) -> bool {
        pos.face_neighbors().into_iter().any(|n| self.is_lava(n))
    }

    /// The body at `pos` (feet and head) would touch a stay-away voxel.
    pub fn touches_stay_away(&self, pos: GridPosition) -> bool {
        [pos, pos.up(1)]
            .into_iter()
            .flat_map(|p| p.face_neighbors())
            .any(|n| self.named(n, &self.blocks.stay_away))
    }
}
