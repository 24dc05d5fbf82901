//! Keep-distance: back off when the target crowds in, close when it drifts
//! out of reach, strafe inside the comfortable band.

use bevy::prelude::*;

use super::machine::BehaviorDebug;
use super::RetreatParams;
use crate::nav::NavGrid;

/// Retreat goal candidates tried with increasing reach before giving up.
const RETREAT_ATTEMPTS: u32 = 5;

/// Perpendicular strafe offset, in grid cells.
const STRAFE_CELLS: f32 = 2.0;

/// Three zones relative to the target distance: closer than `min_distance`
/// retreats along the away-vector, farther than the follow threshold (or
/// `max_distance`) approaches, and inside the band the agent strafes when
/// enabled.
pub fn move_direction(
    agent: Vec2,
    target: Option<Vec2>,
    params: &RetreatParams,
    grid: &NavGrid,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    let Some(target) = target else {
        return Vec2::ZERO;
    };
    let distance = agent.distance(target);

    if distance < params.min_distance {
        return retreat_away(agent, target, params, grid, debug);
    }

    let follow_at = params.follow_threshold.min(params.max_distance);
    if distance > follow_at {
        let Some(goal) = super::resolve_goal(grid, target) else {
            return Vec2::ZERO;
        };
        return super::steer_to_cell(grid, agent, goal, debug);
    }

    if params.strafe {
        let away = away_vector(agent, target);
        let perp = Vec2::new(-away.y, away.x);
        let strafe_point = agent + perp * STRAFE_CELLS * grid.cell_size();
        if let Some(goal) = super::resolve_goal(grid, strafe_point) {
            let direction = super::steer_to_cell(grid, agent, goal, debug);
            if direction != Vec2::ZERO {
                return direction;
            }
        }
        // Strafing blocked: give ground instead.
        return retreat_away(agent, target, params, grid, debug);
    }

    Vec2::ZERO
}

/// Path to a point along the away-vector. The reach is increased per attempt
/// until the resolved goal is provably farther from the target than the agent
/// currently is, so a clamped or ring-substituted goal can never pull the
/// agent closer.
fn retreat_away(
    agent: Vec2,
    target: Vec2,
    params: &RetreatParams,
    grid: &NavGrid,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    let away = away_vector(agent, target);
    let current = agent.distance(target);

    for attempt in 0..RETREAT_ATTEMPTS {
        let reach = params.ideal_distance * (1.0 + 0.5 * attempt as f32);
        let Some(goal) = super::resolve_goal(grid, agent + away * reach) else {
            continue;
        };
        if grid.grid_to_world(goal).distance(target) <= current {
            continue;
        }
        let direction = super::steer_to_cell(grid, agent, goal, debug);
        if direction != Vec2::ZERO {
            return direction;
        }
    }
    Vec2::ZERO
}

fn away_vector(agent: Vec2, target: Vec2) -> Vec2 {
    let away = (agent - target).normalize_or_zero();
    if away == Vec2::ZERO {
        Vec2::X
    } else {
        away
    }
}
