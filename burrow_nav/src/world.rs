// Ground-truth world access: the oracle and resource ledger seams, plus two
// oracles the crate ships for hosts without their own voxel store.
//
// The search never owns the world. It asks a `WorldOracle` for the voxel at
// a position and a `ResourceLedger` for how much scaffolding material the
// agent carries. Both must be deterministic for the duration of one search.
//
// `VoxelGrid` is a dense 3D grid stored as a flat `Vec<Voxel>` indexed by
// `x + z * size_x + y * size_x * size_z` relative to an origin corner,
// giving O(1) read/write access. Unlike a game world, reads outside the
// grid return `None` (no data) rather than air: the view classifies those
// as `Unknown` and every predicate fails closed on them.
//
// `FlatPlane` is an unbounded procedural floor used for open-terrain
// searches where allocating a grid would be wasteful.
//
// See also: `view.rs` which layers overlays on top of an oracle,
// `types.rs` for `Voxel`.
//
// **Critical constraint: determinism.** An oracle must answer the same
// position identically for the whole search run; live changes go through
// the search controller, never by mutating the oracle mid-run.

use crate::types::{GridPosition, Voxel};

/// Ground-truth voxel source.
pub trait WorldOracle: Sync {
    /// The voxel at `pos`, or `None` when nothing is known about it.
    fn voxel(&self, pos: GridPosition) -> Option<Voxel>;
}

impl<F> WorldOracle for F
where
    F: Fn(GridPosition) -> Option<Voxel> + Sync,
{
    fn voxel(&self, pos: GridPosition) -> Option<Voxel> {
        self(pos)
    }
}

/// Inventory seam: how many scaffolding voxels the agent may place.
pub trait ResourceLedger: Sync {
    fn scaffolding_available(&self) -> u32;
}

/// A ledger with a fixed amount of scaffolding material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedLedger(pub u32);

impl ResourceLedger for FixedLedger {
    fn scaffolding_available(&self) -> u32 {
        self.0
    }
}

/// A ledger that never runs out.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnlimitedLedger;

impl ResourceLedger for UnlimitedLedger {
    fn scaffolding_available(&self) -> u32 {
        u32::MAX
    }
}

// ---------------------------------------------------------------------------
// Dense voxel grid
// ---------------------------------------------------------------------------

/// Dense 3D voxel grid anchored at `origin` (its minimum corner).
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    voxels: Vec<Voxel>,
    pub origin: GridPosition,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
}

impl VoxelGrid {
    /// Create a new grid filled with air.
    pub fn new(origin: GridPosition, size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            voxels: vec![Voxel::AIR; total],
            origin,
            size_x,
            size_y,
            size_z,
        }
    }

    /// Check whether a coordinate is within bounds.
    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        let x = pos.x - self.origin.x;
        let y = pos.y - self.origin.y;
        let z = pos.z - self.origin.z;
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.size_x
            && (y as u32) < self.size_y
            && (z as u32) < self.size_z
    }

    /// Convert a coordinate to a flat index. Returns `None` if out of bounds.
    fn index(&self, pos: GridPosition) -> Option<usize> {
        if self.in_bounds(pos) {
            let x = (pos.x - self.origin.x) as usize;
            let y = (pos.y - self.origin.y) as usize;
            let z = (pos.z - self.origin.z) as usize;
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(x + z * sx + y * sx * sz)
        } else {
            None
        }
    }

    /// Read a voxel. Returns `None` for out-of-bounds coordinates.
    pub fn get(&self, pos: GridPosition) -> Option<Voxel> {
        self.index(pos).map(|i| self.voxels[i])
    }

    /// Write a voxel. No-op for out-of-bounds coordinates.
    pub fn set(&mut self, pos: GridPosition, voxel: Voxel) {
        if let Some(i) = self.index(pos) {
            self.voxels[i] = voxel;
        }
    }

    /// Fill the inclusive box `[min, max]` with one voxel.
    pub fn fill(&mut self, min: GridPosition, max: GridPosition, voxel: Voxel) {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    self.set(GridPosition::new(x, y, z), voxel);
                }
            }
        }
    }
}

impl WorldOracle for VoxelGrid {
    fn voxel(&self, pos: GridPosition) -> Option<Voxel> {
        self.get(pos)
    }
}

// ---------------------------------------------------------------------------
// Procedural flat plane
// ---------------------------------------------------------------------------

/// An unbounded world: solid `floor` at and below `floor_y`, air above.
#[derive(Clone, Copy, Debug)]
pub struct FlatPlane {
    pub floor_y: i32,
    pub floor: Voxel,
}

impl FlatPlane {
    pub fn new(floor_y: i32) -> Self {
        Self {
            floor_y,
            floor: Voxel::solid("stone"),
        }
    }
}

impl WorldOracle for FlatPlane {
    fn voxel(&self, pos: GridPosition) -> Option<Voxel> {
        if pos.y <= self.floor_y {
            Some(self.floor)
        } else {
            Some(Voxel::AIR)
        }
    }
}
