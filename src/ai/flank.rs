//! Flank: approach a point behind the target, displaced sideways so the
//! agent swings around rather than trailing the chase pack.

use bevy::prelude::*;

use super::machine::BehaviorDebug;
use super::FlankParams;
use crate::nav::NavGrid;

/// Pick a goal behind the target along the agent→target axis, displaced
/// perpendicular by the arc distance. Falls back to the plain behind-point,
/// then to the target's own cell; every candidate is clamped to the arena
/// and ring-validated before pathing.
pub fn move_direction(
    agent: Vec2,
    target: Option<Vec2>,
    params: &FlankParams,
    grid: &NavGrid,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    let Some(target) = target else {
        return Vec2::ZERO;
    };

    let to_agent = (agent - target).normalize_or_zero();
    let cell = grid.cell_size();

    let candidates: [Vec2; 3] = if to_agent == Vec2::ZERO {
        // Agent on top of the target: no meaningful flank axis.
        [target, target, target]
    } else {
        let behind = target - to_agent * params.behind_cells * cell;
        let perp = Vec2::new(-to_agent.y, to_agent.x);
        let arc = behind + perp * params.arc_cells * cell;
        [arc, behind, target]
    };

    for candidate in candidates {
        let Some(goal) = super::resolve_goal(grid, candidate) else {
            continue;
        };
        let direction = super::steer_to_cell(grid, agent, goal, debug);
        if direction != Vec2::ZERO {
            return direction;
        }
    }
    Vec2::ZERO
}
