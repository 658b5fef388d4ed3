// Water movement: entering water from the bank, swimming horizontally,
// up and down, and climbing back out.
//
// A swimming body occupies a water cell at its feet; the head cell may be
// water or air (surface swimming). Diving is limited by
// `max_water_dive_distance`, counted as the number of water cells stacked
// above the target cell. Swimming up and down are vertical moves with no
// heading.
//
// See also: `walk.rs` for `Fall`, which can also land in water.

use super::{Candidate, ExpansionContext, MoveKind, MoveRule};
use crate::config::Capability;
use crate::types::{DirectedPosition, Direction, GridPosition};

/// The head cell of a swimmer at `pos` is open.
fn head_clear(ctx: &ExpansionContext<'_>, pos: GridPosition) -> bool {
    let head = pos.up(1);
    ctx.view.is_water(head) || ctx.view.is_walkable(head)
}

/// Water cells stacked directly above `pos`, capped one past `limit`.
fn depth_below_surface(ctx: &ExpansionContext<'_>, pos: GridPosition, limit: u32) -> u32 {
    let mut depth = 0;
    while depth <= limit && ctx.view.is_water(pos.up(depth as i32 + 1)) {
        depth += 1;
    }
    depth
}

pub struct SwimEnter;

impl MoveRule for SwimEnter {
    fn name(&self) -> &'static str {
        "swim_enter"
    }

    fn priority(&self) -> u32 {
        60
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Swim]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        if ctx.view.is_water(ctx.pos()) || !ctx.grounded() {
            return;
        }
        for &dir in directions {
            let origin = ctx.heading(dir);
            let target = origin.forward(1);
            if ctx.view.is_water(target) && head_clear(ctx, target) {
                out.push(ctx.plain(origin.with_pos(target), MoveKind::SwimEnter, ctx.costs().swim));
            }
        }
    }
}

/// Horizontal, upward and downward swimming.
pub struct SwimMotion;

impl MoveRule for SwimMotion {
    fn name(&self) -> &'static str {
        "swim"
    }

    fn priority(&self) -> u32 {
        61
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Swim]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        if !ctx.view.is_water(pos) {
            return;
        }
        let cost = ctx.costs().swim;
        let max_dive = ctx.config.max_water_dive_distance;
        for &dir in directions {
            let origin = ctx.heading(dir);
            let target = origin.forward(1);
            if ctx.view.is_water(target) && head_clear(ctx, target) {
                out.push(ctx.plain(origin.with_pos(target), MoveKind::Swim, cost));
            }
        }
        let up = pos.up(1);
        if ctx.view.is_water(up) && head_clear(ctx, up) {
            out.push(ctx.plain(DirectedPosition::new(up, Direction::NONE), MoveKind::SwimUp, cost));
        }
        let down = pos.down(1);
        if ctx.view.is_water(down) && depth_below_surface(ctx, down, max_dive) <= max_dive {
            out.push(ctx.plain(
                DirectedPosition::new(down, Direction::NONE),
                MoveKind::SwimDown,
                cost,
            ));
        }
    }
}

pub struct SwimExit;

impl MoveRule for SwimExit {
    fn name(&self) -> &'static str {
        "swim_exit"
    }

    fn priority(&self) -> u32 {
        62
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Swim]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        if !ctx.view.is_water(pos) {
            return;
        }
        let costs = ctx.costs();
        for &dir in directions {
            let origin = ctx.heading(dir);
            let level = origin.forward(1);
            if ctx.view.is_standable(level) {
                out.push(ctx.plain(origin.with_pos(level), MoveKind::SwimExit, costs.swim));
                continue;
            }
            // Climbing onto a bank one block higher needs air over the swimmer.
            let bank = level.up(1);
            if ctx.view.is_walkable(pos.up(1))
                && ctx.view.is_walkable(pos.up(2))
                && ctx.view.is_standable(bank)
            {
                out.push(ctx.plain(origin.with_pos(bank), MoveKind::SwimExit, costs.swim + costs.jump_up));
            }
        }
    }
}
