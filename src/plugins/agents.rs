//! Agent spawning and the per-tick behavior driver.
//!
//! The driver runs once per fixed tick for every agent: refresh the target
//! snapshot, advance the state machine, invoke the active movement pattern,
//! and hand the resulting direction to the motion system.

use bevy::prelude::*;
use micromegas_tracing::prelude::{imetric, span_scope};

use crate::ai::machine::{StateMachine, TargetInfo};
use crate::app_state::AppState;
use crate::components::{Agent, Facing, MoveIntent, MoveSpeed, Perception, Player};
use crate::events::StateChanged;
use crate::nav::NavGrid;
use crate::plugins::arena::{rebuild_nav_grid, ArenaMap};
use crate::resources::{archetype_config, SimConfig};

pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Running), spawn_agents);
        app.add_systems(
            FixedUpdate,
            drive_agents
                .after(rebuild_nav_grid)
                .run_if(in_state(AppState::Running)),
        );
    }
}

const AGENT_Z: f32 = 10.0;

/// Spawn one agent per arena spawn marker, wired to its archetype's shared
/// machine definition.
pub fn spawn_agents(
    mut commands: Commands,
    arena: Res<ArenaMap>,
    grid: Res<NavGrid>,
    config: Res<SimConfig>,
) {
    span_scope!("agent_spawn");
    for (kind, cell) in &arena.agent_spawns {
        let archetype = archetype_config(*kind, &config);
        let world = grid.grid_to_world(*cell);
        commands.spawn((
            Agent,
            *kind,
            Perception {
                detection_range: archetype.detection_range,
                attack_range: archetype.attack_range,
            },
            StateMachine::new(archetype.machine),
            MoveIntent::default(),
            Facing::default(),
            MoveSpeed(archetype.speed),
            Sprite::from_color(archetype.color, Vec2::splat(grid.cell_size() * 0.8)),
            Transform::from_xyz(world.x, world.y, AGENT_Z),
        ));
    }
    imetric!("agents_spawned", "count", arena.agent_spawns.len() as u64);
}

/// One simulation tick of behavior for every agent.
#[allow(clippy::type_complexity)]
pub fn drive_agents(
    grid: Res<NavGrid>,
    time: Res<Time>,
    mut commands: Commands,
    player_query: Query<&Transform, With<Player>>,
    mut agent_query: Query<
        (
            Entity,
            &Transform,
            &Perception,
            &mut StateMachine,
            &mut MoveIntent,
            &mut Facing,
        ),
        (With<Agent>, Without<Player>),
    >,
) {
    span_scope!("drive_agents");

    let target_position = player_query
        .single()
        .ok()
        .map(|transform| transform.translation.truncate());

    for (entity, transform, perception, mut machine, mut intent, mut facing) in &mut agent_query {
        let agent_position = transform.translation.truncate();
        let target = target_position.map(|position| TargetInfo {
            position,
            visible: grid.line_of_sight(agent_position, position),
        });

        let before = machine.state();
        machine.advance(
            agent_position,
            target.as_ref(),
            perception,
            &grid,
            time.delta_secs(),
        );
        let after = machine.state();
        if before != after {
            commands.trigger(StateChanged {
                agent: entity,
                from: before,
                to: after,
            });
        }

        let direction = machine.move_direction(agent_position, target_position, &grid);
        intent.0 = direction;
        if direction != Vec2::ZERO {
            facing.0 = direction;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::machine::StateId;
    use crate::components::ArchetypeKind;
    use crate::nav::GridCell;
    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn setup_app(grid: NavGrid) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.init_state::<AppState>();
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(
            16_667,
        )));
        app.insert_resource(grid);
        app.add_systems(
            FixedUpdate,
            drive_agents.run_if(in_state(AppState::Running)),
        );

        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::Running);
        for _ in 0..3 {
            app.update();
        }
        app
    }

    fn spawn_stalker(app: &mut App, position: Vec2) -> Entity {
        let config = SimConfig::default();
        let archetype = archetype_config(ArchetypeKind::Stalker, &config);
        app.world_mut()
            .spawn((
                Agent,
                ArchetypeKind::Stalker,
                Perception {
                    detection_range: archetype.detection_range,
                    attack_range: archetype.attack_range,
                },
                StateMachine::new(archetype.machine),
                MoveIntent::default(),
                Facing::default(),
                MoveSpeed(archetype.speed),
                Transform::from_xyz(position.x, position.y, AGENT_Z),
            ))
            .id()
    }

    #[test]
    fn driver_writes_move_intent_toward_visible_player() {
        let grid = NavGrid::new(20, 20, 32.0);
        let agent_pos = grid.grid_to_world(GridCell { x: 1, y: 1 });
        let player_pos = grid.grid_to_world(GridCell { x: 8, y: 1 });
        let mut app = setup_app(grid);

        app.world_mut()
            .spawn((Player, Transform::from_xyz(player_pos.x, player_pos.y, 0.0)));
        let agent = spawn_stalker(&mut app, agent_pos);

        for _ in 0..5 {
            app.update();
        }

        let machine = app.world().entity(agent).get::<StateMachine>().unwrap();
        assert_eq!(machine.state(), StateId::Chase);
        let intent = app.world().entity(agent).get::<MoveIntent>().unwrap();
        assert!(intent.0.x > 0.5, "expected motion toward the player");
    }

    #[test]
    fn driver_without_player_keeps_agents_idle() {
        let grid = NavGrid::new(20, 20, 32.0);
        let agent_pos = grid.grid_to_world(GridCell { x: 1, y: 1 });
        let mut app = setup_app(grid);
        let agent = spawn_stalker(&mut app, agent_pos);

        for _ in 0..5 {
            app.update();
        }

        let machine = app.world().entity(agent).get::<StateMachine>().unwrap();
        assert_eq!(machine.state(), StateId::Idle);
        let intent = app.world().entity(agent).get::<MoveIntent>().unwrap();
        assert_eq!(intent.0, Vec2::ZERO);
    }

    #[test]
    fn facing_follows_movement() {
        let grid = NavGrid::new(20, 20, 32.0);
        let agent_pos = grid.grid_to_world(GridCell { x: 1, y: 1 });
        let player_pos = grid.grid_to_world(GridCell { x: 1, y: 10 });
        let mut app = setup_app(grid);

        app.world_mut()
            .spawn((Player, Transform::from_xyz(player_pos.x, player_pos.y, 0.0)));
        let agent = spawn_stalker(&mut app, agent_pos);

        for _ in 0..5 {
            app.update();
        }

        let facing = app.world().entity(agent).get::<Facing>().unwrap();
        assert!(facing.0.y > 0.5, "facing should track the chase direction");
    }
}
