pub mod ai;
pub mod app_state;
pub mod components;
pub mod events;
pub mod nav;
pub mod pathfind;
pub mod plugins;
pub mod resources;

use bevy::prelude::*;

use app_state::AppState;
use plugins::agents::AgentPlugin;
use plugins::arena::ArenaPlugin;
use plugins::camera::CameraPlugin;
use plugins::movement::MovementPlugin;
use plugins::player::PlayerPlugin;
use plugins::telemetry::TelemetryPlugin;
use resources::{load_sim_config, SIM_CONFIG_PATH};

/// Fixed simulation rate. All behavior and movement advances on this clock;
/// rendering runs as fast as the frame loop allows.
pub const TICK_HZ: f64 = 60.0;

pub struct SkirmishPlugin;

impl Plugin for SkirmishPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>();
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ));
        app.insert_resource(load_sim_config(SIM_CONFIG_PATH));

        app.add_plugins(CameraPlugin);
        app.add_plugins(ArenaPlugin);
        app.add_plugins(PlayerPlugin);
        app.add_plugins(AgentPlugin);
        app.add_plugins(MovementPlugin);
        app.add_plugins(TelemetryPlugin);
    }
}
