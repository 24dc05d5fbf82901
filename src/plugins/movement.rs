//! Continuous movement: applies each entity's `MoveIntent` to its transform
//! at its `MoveSpeed`, validated against the walkability grid.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::app_state::AppState;
use crate::components::{MoveIntent, MoveSpeed};
use crate::nav::NavGrid;
use crate::plugins::agents::drive_agents;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            apply_move_intent
                .after(drive_agents)
                .run_if(in_state(AppState::Running)),
        );
    }
}

/// Integrate intents for one fixed tick. A step that would land in a blocked
/// cell is dropped for the tick; the next tick's path recomputation routes
/// around whatever was hit.
#[span_fn]
fn apply_move_intent(
    time: Res<Time>,
    grid: Res<NavGrid>,
    mut query: Query<(&mut Transform, &MoveIntent, &MoveSpeed)>,
) {
    for (mut transform, intent, speed) in &mut query {
        if intent.0 == Vec2::ZERO {
            continue;
        }
        let current = transform.translation.truncate();
        let next = grid.clamp_to_bounds(current + intent.0 * speed.0 * time.delta_secs());
        if !grid.is_cell_walkable(grid.world_to_grid(next)) {
            continue;
        }
        transform.translation.x = next.x;
        transform.translation.y = next.y;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
