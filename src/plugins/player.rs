//! Player spawning and input handling. The player is the target every agent
//! hunts; input simply steers its move intent.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::app_state::AppState;
use crate::components::{Facing, MoveIntent, MoveSpeed, Player};
use crate::nav::NavGrid;
use crate::plugins::arena::ArenaMap;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Running), spawn_player);
        app.add_systems(
            Update,
            player_input.run_if(in_state(AppState::Running)),
        );
    }
}

const PLAYER_COLOR: Color = Color::srgb(1.0, 0.85, 0.0);
const PLAYER_SPEED: f32 = 180.0;
const PLAYER_Z: f32 = 10.0;

/// Spawn the player at the arena's player spawn cell.
#[span_fn]
fn spawn_player(mut commands: Commands, arena: Res<ArenaMap>, grid: Res<NavGrid>) {
    let world = grid.grid_to_world(arena.player_spawn);
    commands.spawn((
        Player,
        MoveIntent::default(),
        Facing::default(),
        MoveSpeed(PLAYER_SPEED),
        Sprite::from_color(PLAYER_COLOR, Vec2::splat(grid.cell_size() * 0.8)),
        Transform::from_xyz(world.x, world.y, PLAYER_Z),
    ));
}

/// Read WASD/arrows into the player's move intent.
#[span_fn]
fn player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut MoveIntent, &mut Facing), With<Player>>,
) {
    let mut direction = Vec2::ZERO;
    if keyboard.pressed(KeyCode::ArrowUp) || keyboard.pressed(KeyCode::KeyW) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowDown) || keyboard.pressed(KeyCode::KeyS) {
        direction.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    let direction = direction.normalize_or_zero();

    for (mut intent, mut facing) in &mut query {
        intent.0 = direction;
        if direction != Vec2::ZERO {
            facing.0 = direction;
        }
    }
}
