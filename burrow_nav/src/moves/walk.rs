// Ground movement: forward steps, diagonal steps, stepping up one block,
// stepping down one block, and falling further.
//
// All of these start from a grounded origin (solid footing under the feet).
// Forward and jump-up may tunnel: a body cell that is not walkable becomes a
// break when breaking is enabled and the voxel is breakable. Diagonal,
// descend and fall never break; a diagonal that would need digging is two
// forward steps instead.
//
// Diagonals may not cut corners: at least one of the two cardinal cells
// flanking the diagonal must be clear at both feet and head height.
//
// Falls scan straight down from the cell ahead for the first footing within
// `max_fall_distance`. Landing in water ends the fall early and is always
// survivable; a one-block drop is left to `Descend`.
//
// See also: `mod.rs` for `ExpansionContext` and the candidate helpers,
// `parkour.rs` for jumps across gaps.

use super::{Candidate, ExpansionContext, MoveKind, MoveRule};
use crate::types::Direction;

pub struct Forward;

impl MoveRule for Forward {
    fn name(&self) -> &'static str {
        "forward"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() {
            return;
        }
        for &dir in directions {
            let origin = ctx.heading(dir);
            let target = origin.forward(1);
            if !ctx.view.is_floor(target.down(1)) {
                continue;
            }
            let Some(breaks) = ctx.clear_passage(&[target, target.up(1)]) else {
                continue;
            };
            out.push(ctx.candidate(
                origin.with_pos(target),
                MoveKind::Forward,
                ctx.costs().forward,
                breaks,
                Default::default(),
            ));
        }
    }
}

pub struct Diagonal;

impl MoveRule for Diagonal {
    fn name(&self) -> &'static str {
        "diagonal"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() {
            return;
        }
        let pos = ctx.pos();
        for &dir in directions {
            let diag = dir.diagonal_right();
            let target = pos.step(diag, 1);
            if !ctx.view.is_standable(target) {
                continue;
            }
            let (a, b) = diag.components();
            let side_clear = [pos.step(a, 1), pos.step(b, 1)]
                .into_iter()
                .any(|side| ctx.all_walkable(&[side, side.up(1)]));
            if !side_clear {
                continue;
            }
            out.push(ctx.plain(
                ctx.heading(diag).with_pos(target),
                MoveKind::Diagonal,
                ctx.costs().diagonal,
            ));
        }
    }
}

pub struct JumpUp;

impl MoveRule for JumpUp {
    fn name(&self) -> &'static str {
        "jump_up"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() {
            return;
        }
        for &dir in directions {
            let origin = ctx.heading(dir);
            let step = origin.forward(1);
            if !ctx.view.is_jumpable(step) || !ctx.view.is_floor(step) {
                continue;
            }
            let target = step.up(1);
            let Some(breaks) = ctx.clear_passage(&[origin.up(2), target, target.up(1)]) else {
                continue;
            };
            out.push(ctx.candidate(
                origin.with_pos(target),
                MoveKind::JumpUp,
                ctx.costs().jump_up,
                breaks,
                Default::default(),
            ));
        }
    }
}

pub struct Descend;

impl MoveRule for Descend {
    fn name(&self) -> &'static str {
        "descend"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() || ctx.config.max_fall_distance == 0 {
            return;
        }
        for &dir in directions {
            let origin = ctx.heading(dir);
            let ahead = origin.forward(1);
            let target = ahead.down(1);
            if !ctx.all_walkable(&[ahead, ahead.up(1)]) || !ctx.view.is_standable(target) {
                continue;
            }
            out.push(ctx.plain(origin.with_pos(target), MoveKind::Descend, ctx.costs().descend));
        }
    }
}

pub struct Fall;

impl MoveRule for Fall {
    fn name(&self) -> &'static str {
        "fall"
    }

    fn priority(&self) -> u32 {
        45
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() {
            return;
        }
        let max = ctx.config.max_fall_distance as i32;
        let costs = ctx.costs();
        for &dir in directions {
            let origin = ctx.heading(dir);
            let ahead = origin.forward(1);
            if !ctx.all_walkable(&[ahead, ahead.up(1)]) {
                continue;
            }
            for drop in 1..=max {
                let cell = ahead.down(drop);
                let fall_cost = costs.descend + costs.fall_per_block * f64::from(drop - 1);
                if ctx.view.is_water(cell) {
                    out.push(ctx.plain(origin.with_pos(cell), MoveKind::Fall, fall_cost));
                    break;
                }
                if !ctx.view.is_walkable(cell) {
                    break;
                }
                if ctx.view.is_floor(cell.down(1)) {
                    if drop > 1 {
                        out.push(ctx.plain(origin.with_pos(cell), MoveKind::Fall, fall_cost));
                    }
                    break;
                }
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

    #[test]
    fn forward_steps_on_flat_ground() {
        let grid = floor_grid();
        let config = PathConfig::default();
        let out = run(&Forward, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|c| c.kind == MoveKind::Forward && c.breaks.is_empty()));
        assert!(out.iter().all(|c| (c.cost - 1.0).abs() < 1e-9));
        let east = out.iter().find(|c| c.target.dir == Direction::EAST).unwrap();
        assert_eq!(east.target.pos, at(5, 64, 4));
    }

    #[test]
    fn forward_tunnels_through_breakable_wall() {
        let mut grid = floor_grid();
        grid.set(at(5, 64, 4), Voxel::solid("stone"));
        grid.set(at(5, 65, 4), Voxel::solid("stone"));
        let config = PathConfig::default();
        let out = run(&Forward, &grid, &config, at(4, 64, 4), 0);
        let east = out.iter().find(|c| c.target.dir == Direction::EAST).unwrap();
        assert_eq!(east.breaks.as_slice(), &[at(5, 64, 4), at(5, 65, 4)]);
        assert!((east.cost - (1.0 + 2.0 * config.costs.break_per_voxel)).abs() < 1e-9);
    }

    #[test]
    fn forward_needs_footing() {
        let mut grid = floor_grid();
        grid.set(at(5, 63, 4), Voxel::AIR);
        let config = PathConfig::default();
        let out = run(&Forward, &grid, &config, at(4, 64, 4), 0);
        assert!(!targets(&out).contains(&at(5, 64, 4)));
    }

    #[test]
    fn diagonal_refuses_to_cut_corners() {
        let mut grid = floor_grid();
        let config = PathConfig::default();
        assert_eq!(run(&Diagonal, &grid, &config, at(4, 64, 4), 0).len(), 4);
        // Wall off both flanks of the south-east diagonal.
        grid.set(at(5, 64, 4), Voxel::solid("stone"));
        grid.set(at(4, 64, 5), Voxel::solid("stone"));
        let out = run(&Diagonal, &grid, &config, at(4, 64, 4), 0);
        assert!(!targets(&out).contains(&at(5, 64, 5)));
        assert_eq!(out.len(), 3);
        // One flank open is enough.
        grid.set(at(4, 64, 5), Voxel::AIR);
        let out = run(&Diagonal, &grid, &config, at(4, 64, 4), 0);
        assert!(targets(&out).contains(&at(5, 64, 5)));
    }

    #[test]
    fn jump_up_needs_head_clearance() {
        let mut grid = floor_grid();
        grid.set(at(5, 64, 4), Voxel::solid("stone"));
        let config = PathConfig {
            can_break: false,
            ..PathConfig::default()
        };
        let out = run(&JumpUp, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(targets(&out), vec![at(5, 65, 4)]);
        grid.set(at(4, 66, 4), Voxel::solid("stone"));
        assert!(run(&JumpUp, &grid, &config, at(4, 64, 4), 0).is_empty());
    }

    #[test]
    fn jump_up_refuses_fences() {
        let mut grid = floor_grid();
        grid.set(
            at(5, 64, 4),
            Voxel::new(crate::types::VoxelKind::Solid, crate::types::VoxelShape::Fence, "oak_fence"),
        );
        let config = PathConfig::default();
        assert!(run(&JumpUp, &grid, &config, at(4, 64, 4), 0).is_empty());
    }

    #[test]
    fn descend_and_fall_split_by_depth() {
        let mut grid = floor_grid();
        // A one-deep step east and a three-deep pit west.
        grid.set(at(5, 63, 4), Voxel::AIR);
        grid.fill(at(3, 61, 4), at(3, 63, 4), Voxel::AIR);
        let config = PathConfig::default();
        let down = run(&Descend, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(targets(&down), vec![at(5, 63, 4)]);
        let fall = run(&Fall, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(targets(&fall), vec![at(3, 61, 4)]);
        let expected = config.costs.descend + 2.0 * config.costs.fall_per_block;
        assert!((fall[0].cost - expected).abs() < 1e-9);
    }

    #[test]
    fn fall_respects_max_distance() {
        let mut grid = floor_grid();
        grid.fill(at(5, 60, 4), at(5, 63, 4), Voxel::AIR);
        let config = PathConfig {
            max_fall_distance: 2,
            ..PathConfig::default()
        };
        assert!(run(&Fall, &grid, &config, at(4, 64, 4), 0).is_empty());
    }

    #[test]
    fn fall_lands_in_water() {
        let mut grid = floor_grid();
        grid.fill(at(5, 62, 4), at(5, 63, 4), Voxel::AIR);
        grid.set(at(5, 61, 4), Voxel::WATER);
        let config = PathConfig::default();
        let out = run(&Fall, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(targets(&out), vec![at(5, 61, 4)]);
    }
}
