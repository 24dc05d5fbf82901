//! Composable transition predicates evaluated against a per-tick snapshot of
//! agent and target state.

use bevy::prelude::*;

use super::machine::SearchMemory;
use crate::nav::NavGrid;

/// Read-only snapshot a condition is evaluated against.
pub struct ConditionCtx<'a> {
    pub agent: Vec2,
    /// Resolved target position, or None when no target exists.
    pub target: Option<Vec2>,
    pub detection_range: f32,
    pub attack_range: f32,
    pub grid: &'a NavGrid,
    pub memory: &'a SearchMemory,
}

/// Boolean predicate over a [`ConditionCtx`]. The combinators compose
/// primitives into arbitrary expressions; the state machine never
/// special-cases any of them.
///
/// With no resolvable target the "out of" / "lacks" variants hold and their
/// complements do not, so loss-of-target transitions fire naturally.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    WithinDetectionRange,
    OutOfDetectionRange,
    WithinAttackRange,
    OutOfAttackRange,
    HasLineOfSight,
    LacksLineOfSight,
    /// True once the search timer has run for the given number of seconds.
    SearchExpired(f32),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eval(&self, ctx: &ConditionCtx) -> bool {
        match self {
            Condition::WithinDetectionRange => within(ctx, ctx.detection_range),
            Condition::OutOfDetectionRange => !within(ctx, ctx.detection_range),
            Condition::WithinAttackRange => within(ctx, ctx.attack_range),
            Condition::OutOfAttackRange => !within(ctx, ctx.attack_range),
            Condition::HasLineOfSight => has_los(ctx),
            Condition::LacksLineOfSight => !has_los(ctx),
            Condition::SearchExpired(secs) => ctx.memory.search_timer >= *secs,
            Condition::And(parts) => parts.iter().all(|c| c.eval(ctx)),
            Condition::Or(parts) => parts.iter().any(|c| c.eval(ctx)),
            Condition::Not(inner) => !inner.eval(ctx),
        }
    }
}

fn within(ctx: &ConditionCtx, range: f32) -> bool {
    ctx.target
        .is_some_and(|target| ctx.agent.distance(target) <= range)
}

fn has_los(ctx: &ConditionCtx) -> bool {
    ctx.target
        .is_some_and(|target| ctx.grid.line_of_sight(ctx.agent, target))
}
