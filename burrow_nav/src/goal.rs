// Goals: reachability predicates with a matching heuristic.
//
// A `Goal` answers two questions about a position: is the search done here
// (`is_reached`), and roughly how far is it still (`heuristic`)? Distances
// use a weighted blend of Euclidean and Manhattan distance,
// `w * euclid + (1 - w) * manhattan`, with `w = heuristic_weight` from the
// config. Any `w < 1` can overestimate, so the search is not guaranteed
// optimal; it trades that for fewer expansions.
//
// Variants:
// - `Block`: stand exactly at a cell.
// - `Near`: within a Euclidean radius of a cell.
// - `Xz` / `NearXz`: reach a column, at any height.
// - `Y`: reach a height, anywhere.
// - `Region`: stand inside an inclusive box.
// - `GetTo`: stand next to a voxel (feet or head face-adjacent), e.g. to
//   interact with it.
// - `Any` / `All`: composite OR / AND. The heuristic takes the minimum /
//   maximum over children.
// - `Invert`: anywhere the inner goal is not reached; the heuristic is the
//   negated inner heuristic so the search moves away.
// - `Avoid`: at least `distance` away from a point.
//
// `hint` gives the move rules a target height to steer pillaring and
// digging; `anchor` gives the waypoint orchestrator a point to decompose
// toward.
//
// See also: `search.rs` which consults the goal at every expansion,
// `waypoint.rs` for `anchor`.
//
// **Critical constraint: purity.** A goal is immutable for a whole search;
// `is_reached` and `heuristic` are pure functions of their arguments.

use crate::types::GridPosition;
use crate::view::Region;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Goal {
    Block(GridPosition),
    Near { pos: GridPosition, range: f64 },
    Xz { x: i32, z: i32 },
    NearXz { x: i32, z: i32, range: f64 },
    Y(i32),
    Region(Region),
    GetTo(GridPosition),
    Any(Vec<Goal>),
    All(Vec<Goal>),
    Invert(Box<Goal>),
    Avoid { pos: GridPosition, distance: f64 },
}

/// The weighted distance blend between two positions.
pub fn blend(from: GridPosition, to: GridPosition, weight: f64) -> f64 {
    weight * from.distance(to) + (1.0 - weight) * f64::from(from.manhattan_distance(to))
}

fn clamp_into(pos: GridPosition, region: &Region) -> GridPosition {
    GridPosition::new(
        pos.x.clamp(region.min.x, region.max.x),
        pos.y.clamp(region.min.y, region.max.y),
        pos.z.clamp(region.min.z, region.max.z),
    )
}

impl Goal {
    pub fn is_reached(&self, pos: GridPosition) -> bool {
        match self {
            Self::Block(target) => pos == *target,
            Self::Near { pos: target, range } => pos.distance(*target) <= *range,
            Self::Xz { x, z } => pos.x == *x && pos.z == *z,
            Self::NearXz { x, z, range } => {
                pos.horizontal_distance(GridPosition::new(*x, pos.y, *z)) <= *range
            }
            Self::Y(level) => pos.y == *level,
            Self::Region(region) => region.contains(pos),
            Self::GetTo(target) => {
                pos != *target
                    && (pos.manhattan_distance(*target) == 1
                        || pos.up(1).manhattan_distance(*target) == 1)
            }
            Self::Any(goals) => goals.iter().any(|g| g.is_reached(pos)),
            Self::All(goals) => goals.iter().all(|g| g.is_reached(pos)),
            Self::Invert(inner) => !inner.is_reached(pos),
            Self::Avoid { pos: center, distance } => pos.distance(*center) >= *distance,
        }
    }

    /// Estimated remaining cost from `pos`, blended with `weight`.
    pub fn heuristic(&self, pos: GridPosition, weight: f64) -> f64 {
        match self {
            Self::Block(target) => blend(pos, *target, weight),
            Self::Near { pos: target, range } => (blend(pos, *target, weight) - range).max(0.0),
            Self::Xz { x, z } => blend(pos, GridPosition::new(*x, pos.y, *z), weight),
            Self::NearXz { x, z, range } => {
                (blend(pos, GridPosition::new(*x, pos.y, *z), weight) - range).max(0.0)
            }
            Self::Y(level) => f64::from(pos.y.abs_diff(*level)),
            Self::Region(region) => blend(pos, clamp_into(pos, region), weight),
            Self::GetTo(target) => (blend(pos, *target, weight) - 1.0).max(0.0),
            Self::Any(goals) => goals
                .iter()
                .map(|g| g.heuristic(pos, weight))
                .min_by(f64::total_cmp)
                .unwrap_or(0.0),
            Self::All(goals) => goals
                .iter()
                .map(|g| g.heuristic(pos, weight))
                .max_by(f64::total_cmp)
                .unwrap_or(0.0),
            Self::Invert(inner) => -inner.heuristic(pos, weight),
            Self::Avoid { pos: center, distance } => (distance - pos.distance(*center)).max(0.0),
        }
    }

    /// A target position with a definite height, for steering vertical
    /// moves. `None` when the goal does not care about height.
    pub fn hint(&self, from: GridPosition) -> Option<GridPosition> {
        match self {
            Self::Block(target) | Self::GetTo(target) => Some(*target),
            Self::Near { pos, .. } => Some(*pos),
            Self::Y(level) => Some(GridPosition::new(from.x, *level, from.z)),
            Self::Region(region) => Some(clamp_into(from, region)),
            Self::All(goals) => goals.iter().find_map(|g| g.hint(from)),
            _ => None,
        }
    }

    /// A point in the horizontal plane to travel toward, for waypoint
    /// decomposition. Column goals take `from`'s height.
    pub fn anchor(&self, from: GridPosition) -> Option<GridPosition> {
        match self {
            Self::Block(target) | Self::GetTo(target) => Some(*target),
            Self::Near { pos, .. } => Some(*pos),
            Self::Xz { x, z } | Self::NearXz { x, z, .. } => Some(GridPosition::new(*x, from.y, *z)),
            Self::Region(region) => Some(clamp_into(from, region)),
            Self::Any(goals) => goals
                .iter()
                .filter_map(|g| g.anchor(from))
                .min_by(|a, b| from.horizontal_distance(*a).total_cmp(&from.horizontal_distance(*b))),
            Self::All(goals) => goals.iter().find_map(|g| g.anchor(from)),
            Self::Y(_) | Self::Invert(_) | Self::Avoid { .. } => None,
        }
    }
}
