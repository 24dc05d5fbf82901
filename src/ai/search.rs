//! Search: the target was lost, last seen at a known point. Close in on that
//! point, then wander a disk around it until the target is reacquired or the
//! machine gives up.

use bevy::prelude::*;
use rand::Rng;

use super::machine::{BehaviorDebug, SearchMemory};
use super::SearchParams;
use crate::nav::NavGrid;

/// Random samples tried per tick when picking a wander point.
const WANDER_SAMPLES: u32 = 10;

/// Two phases: (a) path toward the last known position while farther than
/// half the search radius from it; a budget of consecutive pathing failures
/// forces phase (b) and widens the wander disk to twice the radius.
/// (b) wander: hold a cached random walkable point inside the disk, re-rolled
/// when reached or when pathing to it fails.
///
/// Requires `last_known_position` in the agent's memory; the state machine
/// guarantees it on entry. Without it the pattern reports "not searching"
/// and holds still.
pub fn move_direction(
    agent: Vec2,
    params: &SearchParams,
    grid: &NavGrid,
    memory: &mut SearchMemory,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    let Some(anchor) = memory.last_known_position else {
        debug.is_searching = false;
        return Vec2::ZERO;
    };
    debug.is_searching = true;

    // Phase (a): move in on the last known position.
    if !memory.reached_last_known && !memory.failed_to_reach {
        if agent.distance(anchor) <= params.radius * 0.5 {
            memory.reached_last_known = true;
        } else {
            if let Some(goal) = super::resolve_goal(grid, anchor) {
                let direction = super::steer_to_cell(grid, agent, goal, debug);
                if direction != Vec2::ZERO {
                    memory.failed_path_attempts = 0;
                    return direction;
                }
            }
            memory.failed_path_attempts += 1;
            if memory.failed_path_attempts < params.forced_wander_after {
                return Vec2::ZERO;
            }
            // Budget exhausted: the anchor is not coming closer. Wander wide.
            memory.failed_to_reach = true;
        }
    }

    // Phase (b): wander the disk around the anchor.
    let radius = if memory.failed_to_reach {
        params.radius * 2.0
    } else {
        params.radius
    };
    debug.patrol_radius = radius;

    if let Some(wander) = memory.wander_target {
        if agent.distance(wander) < grid.cell_size() * 0.5 {
            memory.wander_target = None;
        }
    }
    if memory.wander_target.is_none() {
        memory.wander_target = sample_wander_point(grid, anchor, radius);
    }
    let Some(wander) = memory.wander_target else {
        // No walkable sample this tick; memory untouched, retried next tick.
        return Vec2::ZERO;
    };

    let goal = grid.world_to_grid(wander);
    let direction = super::steer_to_cell(grid, agent, goal, debug);
    if direction == Vec2::ZERO {
        // Unreachable or already there: re-roll next tick.
        memory.wander_target = None;
    }
    direction
}

/// Uniform random point inside the disk whose cell is walkable, or None when
/// every sample landed on blocked ground.
fn sample_wander_point(grid: &NavGrid, anchor: Vec2, radius: f32) -> Option<Vec2> {
    let mut rng = rand::thread_rng();
    for _ in 0..WANDER_SAMPLES {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let r = radius * rng.r#gen::<f32>().sqrt();
        let point = grid.clamp_to_bounds(anchor + Vec2::from_angle(angle) * r);
        if grid.is_cell_walkable(grid.world_to_grid(point)) {
            return Some(point);
        }
    }
    None
}
