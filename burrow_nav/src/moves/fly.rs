// Powered flight: free movement through open air in the four cardinals and
// straight up or down. Only offered when flying is enabled.
//
// A flying body needs its feet and head cells walkable at the target; no
// footing is required anywhere.

use super::{Candidate, ExpansionContext, MoveKind, MoveRule};
use crate::config::Capability;
use crate::types::{DirectedPosition, Direction};

pub struct Fly;

impl MoveRule for Fly {
    fn name(&self) -> &'static str {
        "fly"
    }

    fn priority(&self) -> u32 {
        90
    }

    fn requires(&self) -> &'static [Capability] {
        &[Capability::Fly]
    }

    fn generate(&self, ctx: &ExpansionContext<'_>, directions: &[Direction], out: &mut Vec<Candidate>) {
        let pos = ctx.pos();
        let cost = ctx.costs().fly;
        for &dir in directions {
            let origin = ctx.heading(dir);
            let target = origin.forward(1);
            if ctx.all_walkable(&[target, target.up(1)]) {
                out.push(ctx.plain(origin.with_pos(target), MoveKind::Fly, cost));
            }
        }
        if ctx.view.is_walkable(pos.up(2)) {
            out.push(ctx.plain(DirectedPosition::new(pos.up(1), Direction::NONE), MoveKind::Fly, cost));
        }
        if ctx.view.is_walkable(pos.down(1)) {
            out.push(ctx.plain(DirectedPosition::new(pos.down(1), Direction::NONE), MoveKind::Fly, cost));
        }
    }
}
