//! Idle: never moves, ignores all context.

use bevy::prelude::*;

pub fn move_direction() -> Vec2 {
    Vec2::ZERO
}
