// Running jumps across gaps.
//
// A straight parkour jump covers 2 to 4 cells. Every intermediate cell must
// be a real gap (no footing below it, otherwise the agent would just walk)
// with three cells of clearance for the arc: feet, head, and the cell above
// the head. The landing may be level, one block lower, or (for jumps of at
// most 3 cells) one block higher. The first landing found along a direction
// ends the scan: a longer jump over the same gap is never cheaper.
//
// Diagonal parkour covers 2 or 3 cells along a diagonal and lands level.
//
// Neither form breaks or places anything. The executor is responsible for
// checking that the actual jump arc is physically achievable.
//
// See also: `walk.rs` for ordinary steps, `mod.rs` for the context helpers.

use super::{Candidate, ExpansionContext, MoveKind, MoveRule};
use crate::config::Capability;
use crate::types::{DirectedPosition, Direction, GridPosition};

const MAX_DISTANCE: i32 = 4;
/// Longest jump that can also gain a block of height.
const MAX_RISING_DISTANCE: i32 = 3;
const MAX_DIAGONAL_DISTANCE: i32 = 3;

/// The cell at `pos` is open for the arc and has no footing below.
fn is_gap(ctx: &ExpansionContext<'_>, pos: GridPosition) -> bool {
    let below = pos.down(1);
    !ctx.view.is_unknown(below)
        && !ctx.view.is_floor(below)
        && !ctx.view.is_hazard(below)
        && ctx.all_walkable(&[pos, pos.up(1), pos.up(2)])
}

pub struct Parkour;

impl Parkour {
    fn scan(ctx: &ExpansionContext<'_>, origin: DirectedPosition, out: &mut Vec<Candidate>) {
        let costs = ctx.costs();
        if !is_gap(ctx, origin.forward(1)) {
            return;
        }
        for distance in 2..=MAX_DISTANCE {
            let landing = origin.forward(distance);
            let base = costs.parkour_per_block * f64::from(distance);

            if ctx.view.is_standable(landing) && ctx.view.is_walkable(landing.up(2)) {
                out.push(ctx.plain(origin.with_pos(landing), MoveKind::Parkour, base));
                return;
            }
            let higher = landing.up(1);
            if distance <= MAX_RISING_DISTANCE
                && ctx.view.is_standable(higher)
                && ctx.view.is_walkable(higher.up(2))
            {
                let rise = costs.jump_up - costs.forward;
                out.push(ctx.plain(origin.with_pos(higher), MoveKind::Parkour, base + rise.max(0.0)));
                return;
            }
            let lower = landing.down(1);
            if ctx.all_walkable(&[landing, landing.up(1), landing.up(2)]) && ctx.view.is_standable(lower) {
                out.push(ctx.plain(origin.with_pos(lower), MoveKind::Parkour, base));
                return;
            }
            if !is_gap(ctx, landing) {
                return;
            }
        }
    }
}

impl MoveRule for Parkour {
    fn name(&self) -> &'static str {
        "parkour"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Parkour]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() || !ctx.view.is_walkable(ctx.pos().up(2)) {
            return;
        }
        for &dir in directions {
            Self::scan(ctx, ctx.heading(dir), out);
        }
    }
}

pub struct DiagonalParkour;

impl MoveRule for DiagonalParkour {
    fn name(&self) -> &'static str {
        "diagonal_parkour"
    }

    fn priority(&self) -> u32 {
        55
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Parkour]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() || !ctx.view.is_walkable(ctx.pos().up(2)) {
            return;
        }
        let costs = ctx.costs();
        for &dir in directions {
            let diag = dir.diagonal_right();
            let pos = ctx.pos();
            for distance in 1..=MAX_DIAGONAL_DISTANCE {
                let cell = pos.step(diag, distance);
                if distance >= 2 && ctx.view.is_standable(cell) && ctx.view.is_walkable(cell.up(2)) {
                    let base = costs.parkour_per_block * costs.diagonal * f64::from(distance);
                    out.push(ctx.plain(
                        DirectedPosition::new(cell, diag),
                        MoveKind::DiagonalParkour,
                        base,
                    ));
                    break;
                }
                if !is_gap(ctx, cell) {
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
    use crate::world::VoxelGrid;

    /// Floor with a trench of `width` cells east of x = 4, running the full
    /// z extent, three deep.
    fn trench(width: i32) -> VoxelGrid {
        let mut grid = floor_grid();
        grid.fill(at(5, 61, 0), at(4 + width, 63, 15), Voxel::AIR);
        grid
    }

    fn east(out: &[Candidate]) -> Option<&Candidate> {
        out.iter().find(|c| c.target.dir == Direction::EAST)
    }

    #[test]
    fn jumps_a_one_wide_gap() {
        let grid = trench(1);
        let config = PathConfig::default();
        let out = run(&Parkour, &grid, &config, at(4, 64, 4), 0);
        let jump = east(&out).unwrap();
        assert_eq!(jump.target.pos, at(6, 64, 4));
        assert_eq!(jump.kind, MoveKind::Parkour);
        assert!((jump.cost - 2.0 * config.costs.parkour_per_block).abs() < 1e-9);
    }

    #[test]
    fn jumps_up_to_four_cells() {
        let config = PathConfig::default();
        let out = run(&Parkour, &trench(3), &config, at(4, 64, 4), 0);
        assert_eq!(east(&out).unwrap().target.pos, at(8, 64, 4));
        let out = run(&Parkour, &trench(4), &config, at(4, 64, 4), 0);
        assert!(east(&out).is_none());
    }

    #[test]
    fn rising_jump_limited_to_three() {
        let config = PathConfig::default();
        let mut grid = trench(2);
        grid.set(at(7, 64, 4), Voxel::solid("stone"));
        let out = run(&Parkour, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(east(&out).unwrap().target.pos, at(7, 65, 4));

        let mut grid = trench(3);
        grid.set(at(8, 64, 4), Voxel::solid("stone"));
        let out = run(&Parkour, &grid, &config, at(4, 64, 4), 0);
        assert!(east(&out).is_none());
    }

    #[test]
    fn dropping_jump_lands_one_lower() {
        let config = PathConfig::default();
        let mut grid = trench(2);
        // Landing shelf one block down at x = 7.
        grid.set(at(7, 63, 4), Voxel::AIR);
        grid.set(at(7, 62, 4), Voxel::solid("stone"));
        let out = run(&Parkour, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(east(&out).unwrap().target.pos, at(7, 63, 4));
    }

    #[test]
    fn no_jump_without_a_gap() {
        let grid = floor_grid();
        let config = PathConfig::default();
        assert!(run(&Parkour, &grid, &config, at(4, 64, 4), 0).is_empty());
        assert!(run(&DiagonalParkour, &grid, &config, at(4, 64, 4), 0).is_empty());
    }

    #[test]
    fn low_ceiling_blocks_the_arc() {
        let mut grid = trench(1);
        grid.set(at(5, 66, 4), Voxel::solid("stone"));
        let config = PathConfig::default();
        let out = run(&Parkour, &grid, &config, at(4, 64, 4), 0);
        assert!(east(&out).is_none());
    }

    #[test]
    fn diagonal_jump_over_corner_pit() {
        let mut grid = floor_grid();
        grid.fill(at(5, 61, 5), at(5, 63, 5), Voxel::AIR);
        let config = PathConfig::default();
        let out = run(&DiagonalParkour, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(targets(&out), vec![at(6, 64, 6)]);
        assert_eq!(out[0].target.dir, Direction::new(1, 1));
    }
}
