// Test-only worlds and agent drivers for the integration suites.
//
// Builds the small hand-laid voxel worlds the scenario tests search over
// (a one-cell-wide corridor, a parkour gap, a ladder up a cliff, a walled
// room) and a `RecordingDriver` that walks every path to its end while
// remembering what it was handed. Configs are built from JSON fixtures
// through the same `PathConfig::from_json` hosts use.
//
// All worlds are `VoxelGrid`s: cells outside the grid have no voxel data,
// so every move that would leave the grid fails closed. A corridor one cell
// wide and three tall therefore leaves the search exactly one direction to
// go.
//
// See also: `tests/scenarios.rs`, `tests/travel.rs`, `tests/controller.rs`.

use burrow_nav::config::PathConfig;
use burrow_nav::search::Path;
use burrow_nav::types::{GridPosition, Voxel};
use burrow_nav::waypoint::AgentDriver;
use burrow_nav::world::VoxelGrid;

/// Feet height of an agent standing on the y = 63 floors used here.
pub const GROUND: i32 = 64;

pub fn at(x: i32, y: i32, z: i32) -> GridPosition {
    GridPosition::new(x, y, z)
}

/// Parse a config fixture. Keys left out take their defaults.
pub fn config(json: serde_json::Value) -> PathConfig {
    PathConfig::from_json(&json.to_string()).expect("fixture config should validate")
}

/// A config that neither breaks nor places.
pub fn walker() -> PathConfig {
    config(serde_json::json!({ "can_break": false, "can_place": false }))
}

/// Three cells long (x 0..=2), one wide (z = 0), floor at y = 63 with two
/// cells of headroom. `wall` fills (1, 64) and (1, 65) with the named
/// solid.
pub fn corridor(wall: Option<&'static str>) -> VoxelGrid {
    let mut grid = VoxelGrid::new(at(0, 63, 0), 3, 3, 1);
    grid.fill(at(0, 63, 0), at(2, 63, 0), Voxel::solid("stone"));
    if let Some(name) = wall {
        grid.fill(at(1, 64, 0), at(1, 65, 0), Voxel::solid(name));
    }
    grid
}

/// Ten cells long, one wide; ground on x 0..=3 and 6..=9 with an open pit
/// at x 4..=5.
pub fn gap_course() -> VoxelGrid {
    let mut grid = VoxelGrid::new(at(0, 60, 0), 10, 8, 1);
    grid.fill(at(0, 60, 0), at(3, 63, 0), Voxel::solid("stone"));
    grid.fill(at(6, 60, 0), at(9, 63, 0), Voxel::solid("stone"));
    grid
}

/// Six cells long, one wide: floor at y = 63, a stone cliff on x 3..=5 up
/// to y = 67, and a ladder at x = 2 from y 64 to 67.
pub fn ladder_cliff() -> VoxelGrid {
    let mut grid = VoxelGrid::new(at(0, 60, 0), 6, 10, 1);
    grid.fill(at(0, 60, 0), at(5, 63, 0), Voxel::solid("stone"));
    grid.fill(at(3, 64, 0), at(5, 67, 0), Voxel::solid("stone"));
    grid.fill(at(2, 64, 0), at(2, 67, 0), Voxel::climbable("ladder"));
    grid
}

/// A `size` × `size` room with a stone floor at y = 63 and eight cells of
/// headroom.
pub fn room(size: u32) -> VoxelGrid {
    let last = size as i32 - 1;
    let mut grid = VoxelGrid::new(at(0, 60, 0), size, 12, size);
    grid.fill(at(0, 60, 0), at(last, 63, last), Voxel::solid("stone"));
    grid
}

/// Walks every path to its end and keeps a copy of each.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub paths: Vec<Path>,
    pub starts: Vec<GridPosition>,
}

impl AgentDriver for RecordingDriver {
    fn follow(&mut self, from: GridPosition, path: &Path) -> GridPosition {
        self.starts.push(from);
        self.paths.push(path.clone());
        path.end().unwrap_or(from)
    }
}
