// Terrain-building moves: pillaring straight up by placing a block under
// the agent, bridging across a missing floor cell, and digging straight
// down through the floor.
//
// Placements draw on the scaffolding budget. Rules here only check
// geometry; the registry drops any candidate whose placements would take
// the path's cumulative scaffolding past what the ledger reports.
//
// Pillar and dig-down are vertical moves with no heading. When the goal has
// an anchor, pillaring is only offered while the goal is above the agent
// and digging only while it is below, which keeps these expensive moves
// from flooding the open set on level searches.
//
// See also: `registry.rs` for the budget check, `overlay.rs` for how a
// placed block becomes visible to descendant nodes.

use super::{Candidate, ExpansionContext, MoveKind, MoveRule, PlaceList};
use crate::config::Capability;
use crate::types::{DirectedPosition, Direction};
use smallvec::smallvec;

pub struct Pillar;

impl MoveRule for Pillar {
    fn name(&self) -> &'static str {
        "pillar"
    }

    fn priority(&self) -> u32 {
        80
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Place]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, _directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        if ctx.goal_hint.is_some_and(|goal| goal.y <= pos.y) {
            return;
        }
        if !ctx.grounded() || !ctx.view.is_replaceable(pos) || !ctx.view.is_walkable(pos.up(2)) {
            return;
        }
        let places: PlaceList = smallvec![pos];
        out.push(ctx.candidate(
            DirectedPosition::new(pos.up(1), Direction::NONE),
            MoveKind::Pillar,
            ctx.costs().jump_up,
            Default::default(),
            places,
        ));
    }
}

pub struct Bridge;

impl MoveRule for Bridge {
    fn name(&self) -> &'static str {
        "bridge"
    }

    fn priority(&self) -> u32 {
        81
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Place]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if !ctx.grounded() {
            return;
        }
        for &dir in directions {
            let origin = ctx.heading(dir);
            let target = origin.forward(1);
            let floor = target.down(1);
            if ctx.view.is_floor(floor) || !ctx.view.is_replaceable(floor) {
                continue;
            }
            if !ctx.all_walkable(&[target, target.up(1)]) {
                continue;
            }
            out.push(ctx.candidate(
                origin.with_pos(target),
                MoveKind::Bridge,
                ctx.costs().forward,
                Default::default(),
                smallvec![floor],
            ));
        }
    }
}

pub struct DigDown;

impl MoveRule for DigDown {
    fn name(&self) -> &'static str {
        "dig_down"
    }

    fn priority(&self) -> u32 {
        85
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Break]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, _directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        if ctx.goal_hint.is_some_and(|goal| goal.y >= pos.y) {
            return;
        }
        let below = pos.down(1);
        if !ctx.view.is_breakable(below) || !ctx.view.is_floor(below.down(1)) {
            return;
        }
        out.push(ctx.candidate(
            DirectedPosition::new(below, Direction::NONE),
            MoveKind::DigDown,
            ctx.costs().descend,
            smallvec![below],
            Default::default(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathConfig;
    use crate::moves::test_util::*;
    use crate::types::Voxel;

    #[test]
    fn pillar_places_under_the_agent() {
        let grid = floor_grid();
        let config = PathConfig::default();
        let out = run(&Pillar, &grid, &config, at(4, 64, 4), 8);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target.pos, at(4, 65, 4));
        assert_eq!(out[0].places.as_slice(), &[at(4, 64, 4)]);
        let expected = config.costs.jump_up + config.costs.place_per_voxel;
        assert!((out[0].cost - expected).abs() < 1e-9);
    }

    #[test]
    fn pillar_needs_headroom() {
        let mut grid = floor_grid();
        grid.set(at(4, 66, 4), Voxel::solid("stone"));
        let config = PathConfig::default();
        assert!(run(&Pillar, &grid, &config, at(4, 64, 4), 8).is_empty());
    }

    #[test]
    fn bridge_fills_missing_floor() {
        let mut grid = floor_grid();
        grid.fill(at(5, 60, 4), at(5, 63, 4), Voxel::AIR);
        let config = PathConfig::default();
        let out = run(&Bridge, &grid, &config, at(4, 64, 4), 8);
        assert_eq!(targets(&out), vec![at(5, 64, 4)]);
        assert_eq!(out[0].places.as_slice(), &[at(5, 63, 4)]);
    }

    #[test]
    fn bridge_fails_closed_over_unknown() {
        let grid = floor_grid();
        let config = PathConfig::default();
        // Stand on the grid edge: the cell past it has no data.
        let out = run(&Bridge, &grid, &config, at(15, 64, 4), 8);
        assert!(out.is_empty());
    }

    #[test]
    fn dig_down_breaks_floor() {
        let grid = floor_grid();
        let config = PathConfig::default();
        let out = run(&DigDown, &grid, &config, at(4, 64, 4), 0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target.pos, at(4, 63, 4));
        assert_eq!(out[0].breaks.as_slice(), &[at(4, 63, 4)]);
    }

    #[test]
    fn dig_down_refuses_unbreakable_floor() {
        let mut grid = floor_grid();
        grid.set(at(4, 63, 4), Voxel::solid("bedrock"));
        let config = PathConfig::default();
        assert!(run(&DigDown, &grid, &config, at(4, 64, 4), 0).is_empty());
    }
}
