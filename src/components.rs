use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Entity markers
// ---------------------------------------------------------------------------

#[derive(Component, Debug)]
pub struct Player;

#[derive(Component, Debug)]
pub struct Agent;

/// The agent archetype, determining ranges and state machine layout.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchetypeKind {
    Stalker,
    Flanker,
    Skirmisher,
    Bomber,
}

/// A static collider. Overlapping grid cells are marked non-walkable
/// whenever the navigation grid is rebuilt.
#[derive(Component, Debug, Clone, Copy)]
pub struct Obstacle {
    pub half_extents: Vec2,
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Desired movement direction for this tick, written by the behavior driver
/// (or player input) and consumed by the movement system. Zero means
/// "do not move this tick".
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MoveIntent(pub Vec2);

/// World units per second.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveSpeed(pub f32);

/// Last non-zero movement direction; kept for sprite orientation and
/// anything downstream that needs a heading.
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Facing(Vec2::NEG_Y)
    }
}

// ---------------------------------------------------------------------------
// Perception
// ---------------------------------------------------------------------------

/// Detection and attack thresholds in world units. Agents without an
/// explicit config fall back to these defaults.
#[derive(Component, Debug, Clone, Copy)]
pub struct Perception {
    pub detection_range: f32,
    pub attack_range: f32,
}

impl Default for Perception {
    fn default() -> Self {
        Perception {
            detection_range: 400.0,
            attack_range: 50.0,
        }
    }
}
