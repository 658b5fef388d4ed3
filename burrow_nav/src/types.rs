// Core spatial and voxel types shared by every part of the search.
//
// Defines integer grid coordinates (`GridPosition`), the planar movement
// direction used to derive relative offsets (`Direction`,
// `DirectedPosition`), and the voxel description returned by a world oracle
// (`Voxel`, `VoxelKind`, `VoxelShape`).
//
// Coordinate conventions:
// - X: east  (positive) / west  (negative)
// - Y: up    (positive) / down  (negative)
// - Z: south (positive) / north (negative)
//
// A `Direction` is a 2D step `{dx, dz}` in the horizontal plane: one of the
// four cardinals, four diagonals, or `NONE` for purely vertical movement.
// Direction is not part of a position's identity for world queries, but it
// IS part of a search node's key (see `node.rs`): two rules approaching the
// same cell from different directions may produce different mutation sets.
//
// See also: `world.rs` for the oracle trait that hands out `Voxel`s,
// `view.rs` for the classification predicates built on top of them.
//
// **Critical constraint: exact identity.** Equality, ordering and hashing of
// positions are by exact integer coordinate. Never round-trip positions
// through floats.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Grid positions
// ---------------------------------------------------------------------------

/// An immutable position in the 3D voxel grid, in voxel units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub const fn up(self, n: i32) -> Self {
        self.offset(0, n, 0)
    }

    pub const fn down(self, n: i32) -> Self {
        self.offset(0, -n, 0)
    }

    /// Step `n` cells along a planar direction.
    pub const fn step(self, dir: Direction, n: i32) -> Self {
        self.offset(dir.dx as i32 * n, 0, dir.dz as i32 * n)
    }

    /// Manhattan distance between two coordinates.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        ((self.x - other.x).unsigned_abs())
            + ((self.y - other.y).unsigned_abs())
            + ((self.z - other.z).unsigned_abs())
    }

    /// Straight-line distance between two coordinates.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Straight-line distance ignoring the vertical axis.
    pub fn horizontal_distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dz = f64::from(self.z - other.z);
        (dx * dx + dz * dz).sqrt()
    }

    /// The six face-adjacent neighbors (±x, ±y, ±z).
    pub fn face_neighbors(self) -> [Self; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// A planar movement direction. Components are each in `-1..=1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i8,
    pub dz: i8,
}

impl Direction {
    /// No planar component (vertical moves, the start node).
    pub const NONE: Self = Self { dx: 0, dz: 0 };
    pub const NORTH: Self = Self { dx: 0, dz: -1 };
    pub const EAST: Self = Self { dx: 1, dz: 0 };
    pub const SOUTH: Self = Self { dx: 0, dz: 1 };
    pub const WEST: Self = Self { dx: -1, dz: 0 };

    /// The four cardinals in clockwise order starting at north.
    pub const CARDINALS: [Self; 4] = [Self::NORTH, Self::EAST, Self::SOUTH, Self::WEST];

    pub const fn new(dx: i8, dz: i8) -> Self {
        Self { dx, dz }
    }

    /// Rotate 90 degrees clockwise (viewed from above).
    pub const fn right(self) -> Self {
        Self::new(-self.dz, self.dx)
    }

    /// Rotate 90 degrees counter-clockwise (viewed from above).
    pub const fn left(self) -> Self {
        Self::new(self.dz, -self.dx)
    }

    pub const fn reverse(self) -> Self {
        Self::new(-self.dx, -self.dz)
    }

    /// The diagonal between this cardinal and its clockwise neighbor.
    pub const fn diagonal_right(self) -> Self {
        let r = self.right();
        Self::new(self.dx + r.dx, self.dz + r.dz)
    }

    pub const fn is_diagonal(self) -> bool {
        self.dx != 0 && self.dz != 0
    }

    pub const fn is_none(self) -> bool {
        self.dx == 0 && self.dz == 0
    }

    /// Split a diagonal into its two cardinal components `(x-part, z-part)`.
    pub const fn components(self) -> (Self, Self) {
        (Self::new(self.dx, 0), Self::new(0, self.dz))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.dx, self.dz) {
            (0, 0) => "none",
            (0, -1) => "north",
            (1, -1) => "north-east",
            (1, 0) => "east",
            (1, 1) => "south-east",
            (0, 1) => "south",
            (-1, 1) => "south-west",
            (-1, 0) => "west",
            (-1, -1) => "north-west",
            _ => return write!(f, "<{}, {}>", self.dx, self.dz),
        };
        f.write_str(name)
    }
}

/// A position paired with the direction the agent is moving in. Offsets are
/// derived relative to that direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectedPosition {
    pub pos: GridPosition,
    pub dir: Direction,
}

impl DirectedPosition {
    pub const fn new(pos: GridPosition, dir: Direction) -> Self {
        Self { pos, dir }
    }

    /// The same heading at another position.
    pub const fn with_pos(self, pos: GridPosition) -> Self {
        Self::new(pos, self.dir)
    }

    /// Relative offset: `forward` cells along `dir`, `up` cells vertically,
    /// `right` cells to the right of `dir`.
    pub const fn at(self, forward: i32, up: i32, right: i32) -> GridPosition {
        self.pos
            .step(self.dir, forward)
            .step(self.dir.right(), right)
            .up(up)
    }

    pub const fn forward(self, n: i32) -> GridPosition {
        self.at(n, 0, 0)
    }

    pub const fn back(self, n: i32) -> GridPosition {
        self.at(-n, 0, 0)
    }

    pub const fn right(self, n: i32) -> GridPosition {
        self.at(0, 0, n)
    }

    pub const fn left(self, n: i32) -> GridPosition {
        self.at(0, 0, -n)
    }

    pub const fn up(self, n: i32) -> GridPosition {
        self.pos.up(n)
    }

    pub const fn down(self, n: i32) -> GridPosition {
        self.pos.down(n)
    }
}

// ---------------------------------------------------------------------------
// Voxels
// ---------------------------------------------------------------------------

/// Material classification of a single voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoxelKind {
    Air,
    Solid,
    Water,
    Climbable,
    Interactable,
    Lava,
    /// No voxel data is known for this position. Never traversable.
    Unknown,
}

impl Default for VoxelKind {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Collision shape of a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoxelShape {
    /// No collision box.
    Empty,
    /// A full unit cube.
    Full,
    /// Half-height slab on the bottom of the cell.
    Slab,
    /// Post-and-rail shape, taller than a full block (1.5).
    Fence,
    /// A thin layer lying on the floor of the cell.
    Carpet,
    /// Any other bottom-aligned box, height in sixteenths of a voxel.
    Partial(u8),
}

impl VoxelShape {
    /// Collision height in voxel units.
    pub fn height(self) -> f32 {
        match self {
            Self::Empty => 0.0,
            Self::Full => 1.0,
            Self::Slab => 0.5,
            Self::Fence => 1.5,
            Self::Carpet => 1.0 / 16.0,
            Self::Partial(sixteenths) => f32::from(sixteenths) / 16.0,
        }
    }
}

/// One voxel as reported by a world oracle: its kind, shape, and material
/// name (used for the configured name-category lists).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voxel {
    pub kind: VoxelKind,
    pub shape: VoxelShape,
    pub name: &'static str,
}

impl Voxel {
    pub const AIR: Self = Self::new(VoxelKind::Air, VoxelShape::Empty, "air");
    pub const WATER: Self = Self::new(VoxelKind::Water, VoxelShape::Empty, "water");
    pub const LAVA: Self = Self::new(VoxelKind::Lava, VoxelShape::Empty, "lava");
    /// The voxel a speculative placement is assumed to produce.
    pub const PLACED: Self = Self::new(VoxelKind::Solid, VoxelShape::Full, "scaffold");

    pub const fn new(kind: VoxelKind, shape: VoxelShape, name: &'static str) -> Self {
        Self { kind, shape, name }
    }

    /// A full solid block of the given material.
    pub const fn solid(name: &'static str) -> Self {
        Self::new(VoxelKind::Solid, VoxelShape::Full, name)
    }

    /// A ladder-like voxel that can be climbed.
    pub const fn climbable(name: &'static str) -> Self {
        Self::new(VoxelKind::Climbable, VoxelShape::Empty, name)
    }
}
