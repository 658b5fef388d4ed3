// Ladders and vines.
//
// The agent enters a climbable cell from level ground, moves up and down
// the column one cell at a time, and steps off either onto level ground or
// onto the ledge at the top of the column. Climbing needs no capability;
// the climbable name list decides what counts as a ladder.
//
// See also: `view.rs` for how names refine a voxel into `Climbable`.

use super::{Candidate, ExpansionContext, MoveKind, MoveRule};
use crate::types::{DirectedPosition, Direction};

pub struct ClimbEnter;

impl MoveRule for ClimbEnter {
    fn name(&self) -> &'static str {
        "climb_enter"
    }

    fn priority(&self) -> u32 {
        70
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if ctx.view.is_climbable(ctx.pos()) || !ctx.grounded() {
            return;
        }
        for &dir in directions {
            let origin = ctx.heading(dir);
            let target = origin.forward(1);
            if ctx.view.is_climbable(target) && ctx.view.is_walkable(target.up(1)) {
                out.push(ctx.plain(origin.with_pos(target), MoveKind::ClimbEnter, ctx.costs().climb));
            }
        }
    }
}

/// Moving up or down a climbable column.
pub struct ClimbMotion;

impl MoveRule for ClimbMotion {
    fn name(&self) -> &'static str {
        "climb"
    }

    fn priority(&self) -> u32 {
        71
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, _directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        if !ctx.view.is_climbable(pos) {
            return;
        }
        let cost = ctx.costs().climb;
        let up = pos.up(1);
        if ctx.view.is_climbable(up) && ctx.view.is_walkable(up.up(1)) {
            out.push(ctx.plain(DirectedPosition::new(up, Direction::NONE), MoveKind::ClimbUp, cost));
        }
        let down = pos.down(1);
        if ctx.view.is_climbable(down) {
            out.push(ctx.plain(
                DirectedPosition::new(down, Direction::NONE),
                MoveKind::ClimbDown,
                cost,
            ));
        }
    }
}

pub struct ClimbExit;

impl MoveRule for ClimbExit {
    fn name(&self) -> &'static str {
        "climb_exit"
    }

    fn priority(&self) -> u32 {
        72
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        if !ctx.view.is_climbable(pos) {
            return;
        }
        let costs = ctx.costs();
        for &dir in directions {
            let origin = ctx.heading(dir);
            let level = origin.forward(1);
            if ctx.view.is_standable(level) && !ctx.view.is_climbable(level) {
                out.push(ctx.plain(origin.with_pos(level), MoveKind::ClimbExit, costs.forward));
                continue;
            }
            let ledge = level.up(1);
            if ctx.view.is_walkable(pos.up(2)) && ctx.view.is_standable(ledge) {
                out.push(ctx.plain(origin.with_pos(ledge), MoveKind::ClimbExit, costs.climb + costs.forward));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathConfig;
    use crate::moves::test_util::*;
    use crate::types::Voxel;
    use crate::world::VoxelGrid;

    /// A ladder column at x = 5 from y 64 to 67 against a wall at x = 6
    /// that tops out at y 67, leaving a ledge at (6, 68).
    fn ladder() -> VoxelGrid {
        let mut grid = floor_grid();
        grid.fill(at(6, 64, 0), at(6, 67, 15), Voxel::solid("stone"));
        grid.fill(at(5, 64, 4), at(5, 67, 4), Voxel::climbable("ladder"));
        grid
    }

    #[test]
    fn enter_ladder_from_ground() {
        let grid = ladder();
        let config = PathConfig::default();
        let out = run(&ClimbEnter, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(targets(&out), vec![at(5, 64, 4)]);
    }

    #[test]
    fn climb_up_and_down_the_column() {
        let grid = ladder();
        let config = PathConfig::default();
        let out = run(&ClimbMotion, &grid, &config, at(5, 65, 4), 0);
        let kinds: Vec<_> = out.iter().map(|c| (c.kind, c.target.pos)).collect();
        assert!(kinds.contains(&(MoveKind::ClimbUp, at(5, 66, 4))));
        assert!(kinds.contains(&(MoveKind::ClimbDown, at(5, 64, 4))));
        assert!(out.iter().all(|c| c.target.dir == Direction::NONE));
    }

    #[test]
    fn exit_onto_ledge_at_top() {
        let grid = ladder();
        let config = PathConfig::default();
        let out = run(&ClimbExit, &grid, &config, at(5, 67, 4), 0);
        let east = out.iter().find(|c| c.target.dir == Direction::EAST).unwrap();
        assert_eq!(east.target.pos, at(6, 68, 4));
    }

    #[test]
    fn named_ladder_blocks_are_climbable() {
        let mut grid = floor_grid();
        grid.set(at(5, 64, 4), Voxel::solid("vine"));
        grid.set(at(5, 65, 4), Voxel::solid("vine"));
        let config = PathConfig::default();
        let out = run(&ClimbMotion, &grid, &config, at(5, 64, 4), 0);
        assert_eq!(targets(&out), vec![at(5, 65, 4)]);
    }

    #[test]
    fn no_climbing_without_ladder() {
        let grid = floor_grid();
        let config = PathConfig::default();
        assert!(run(&ClimbEnter, &grid, &config, at(4, 64, 4), 0).is_empty());
        assert!(run(&ClimbMotion, &grid, &config, at(4, 64, 4), 0).is_empty());
    }
}
