// The move registry: a flat, priority-ordered table of move rules.
//
// `expand` turns one search node into its successors:
//   1. Gate: skip every rule whose required capabilities are not all
//      enabled in the config.
//   2. Generate: run the surviving rules over the four cardinals, either
//      sequentially or fanned out with rayon (`parallel_expansion`). Parallel
//      results are collected per rule and merged in priority order, so both
//      modes yield identical successors.
//   3. Validate: drop candidates with infinite cost, breaks of voxels that
//      are not breakable, and placements the scaffolding budget cannot
//      cover (cumulative along the path, not per move).
//   4. Deduplicate by (target position, direction). Under
//      `DedupPolicy::FirstWins` the earliest rule in priority order keeps
//      the key; under `CheapestWins` a cheaper later candidate replaces it.
//   5. Extend the origin's overlay with each survivor's edits (break marks
//      `Air`, place marks `Placed`).
//
// See also: `moves/` for the rules, `search.rs` which calls `expand` once
// per dequeued node, `overlay.rs` for the extend operation.
//
// **Critical constraint: deterministic merge order.** Successors come out in
// rule priority order, then in each rule's own emission order, regardless of
// threading. The search's tie-breaking depends on it.

use crate::config::{DedupPolicy, PathConfig};
use crate::moves::{climb, fly, parkour, scaffold, swim, walk};
use crate::moves::{BreakList, Candidate, ExpansionContext, MoveKind, MoveRule, PlaceList};
use crate::overlay::{OverlayState, VirtualOverlay};
use crate::types::{DirectedPosition, Direction, GridPosition};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::trace;

/// A validated successor, ready to become a search node.
#[derive(Clone, Debug)]
pub struct Successor {
    pub target: DirectedPosition,
    pub kind: MoveKind,
    pub cost: f64,
    pub breaks: BreakList,
    pub places: PlaceList,
    /// The origin's overlay plus this move's edits.
    pub overlay: VirtualOverlay,
    /// Cumulative scaffolding placed along the path, including this move.
    pub scaffolding_used: u32,
}

/// Priority-ordered collection of move rules.
pub struct MoveRegistry {
    rules: Vec<Box<dyn MoveRule>>,
}

impl Default for MoveRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl MoveRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Every built-in rule.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(walk::Forward));
        registry.register(Box::new(walk::Diagonal));
        registry.register(Box::new(walk::JumpUp));
        registry.register(Box::new(walk::Descend));
        registry.register(Box::new(walk::Fall));
        registry.register(Box::new(parkour::Parkour));
        registry.register(Box::new(parkour::DiagonalParkour));
        registry.register(Box::new(swim::SwimEnter));
        registry.register(Box::new(swim::SwimMotion));
        registry.register(Box::new(swim::SwimExit));
        registry.register(Box::new(climb::ClimbEnter));
        registry.register(Box::new(climb::ClimbMotion));
        registry.register(Box::new(climb::ClimbExit));
        registry.register(Box::new(scaffold::Pillar));
        registry.register(Box::new(scaffold::Bridge));
        registry.register(Box::new(scaffold::DigDown));
        registry.register(Box::new(fly::Fly));
        registry
    }

    /// Add a rule, keeping the table sorted by priority. Rules with equal
    /// priority keep registration order.
    pub fn register(&mut self, rule: Box<dyn MoveRule>) {
        self.rules.push(rule);
        self.rules.sort_by_key(|r| r.priority());
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Rules whose capability requirements are all met by `config`.
    fn enabled<'r>(&'r self, config: &PathConfig) -> Vec<&'r dyn MoveRule> {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| r.requires().iter().all(|&cap| config.allows(cap)))
            .collect()
    }

    /// Expand one node. `overlay` is the origin node's overlay (the one
    /// `ctx.view` was built over).
    pub fn expand(&self, ctx: &ExpansionContext<'_>, overlay: &VirtualOverlay) -> Vec<Successor> {
        let rules = self.enabled(ctx.config);
        let directions = Direction::CARDINALS;
        let batches: Vec<Vec<Candidate>> = if ctx.config.parallel_expansion {
            rules
                .par_iter()
                .map(|rule| {
                    let mut out = Vec::new();
                    rule.generate(ctx, &directions, &mut out);
                    out
                })
                .collect()
        } else {
            rules
                .iter()
                .map(|rule| {
                    let mut out = Vec::new();
                    rule.generate(ctx, &directions, &mut out);
                    out
                })
                .collect()
        };

        let mut kept: Vec<(Candidate, u32)> = Vec::new();
        let mut index: FxHashMap<(GridPosition, Direction), usize> = FxHashMap::default();
        for candidate in batches.into_iter().flatten() {
            let Some(scaffolding) = self.validate(ctx, &candidate) else {
                continue;
            };
            let key = (candidate.target.pos, candidate.target.dir);
            match index.get(&key) {
                None => {
                    index.insert(key, kept.len());
                    kept.push((candidate, scaffolding));
                }
                Some(&slot) => {
                    let incumbent = &kept[slot].0;
                    let replace = ctx.config.dedup_policy == DedupPolicy::CheapestWins
                        && candidate.cost < incumbent.cost;
                    trace!(
                        pos = %candidate.target.pos,
                        dir = %candidate.target.dir,
                        kept = if replace { candidate.kind.name() } else { incumbent.kind.name() },
                        dropped = if replace { incumbent.kind.name() } else { candidate.kind.name() },
                        "successor dedup conflict"
                    );
                    if replace {
                        kept[slot] = (candidate, scaffolding);
                    }
                }
            }
        }

        kept.into_iter()
            .map(|(c, scaffolding_used)| {
                let edits = c
                    .breaks
                    .iter()
                    .map(|&p| (p, OverlayState::Air))
                    .chain(c.places.iter().map(|&p| (p, OverlayState::Placed)));
                let overlay = overlay.extend(edits);
                Successor {
                    target: c.target,
                    kind: c.kind,
                    cost: c.cost,
                    breaks: c.breaks,
                    places: c.places,
                    overlay,
                    scaffolding_used,
                }
            })
            .collect()
    }

    /// Check a candidate against costs, breakability and the scaffolding
    /// budget. Returns the cumulative scaffolding count if it survives.
    fn validate(&self, ctx: &ExpansionContext<'_>, candidate: &Candidate) -> Option<u32> {
        if !candidate.cost.is_finite() || candidate.cost < 0.0 {
            return None;
        }
        if !candidate.breaks.is_empty() {
            if !ctx.config.can_break {
                return None;
            }
            if !candidate.breaks.iter().all(|&b| ctx.view.is_breakable(b)) {
                return None;
            }
        }
        if candidate.places.is_empty() {
            return Some(ctx.scaffolding_used);
        }
        if !ctx.config.can_place || !candidate.places.iter().all(|&p| ctx.view.is_replaceable(p)) {
            return None;
        }
        let used = ctx
            .scaffolding_used
            .checked_add(u32::try_from(candidate.places.len()).ok()?)?;
        (used <= ctx.scaffolding_available).then_some(used)
    }
}
