//! Tick-level telemetry: frame metrics plus state-transition logging.

use bevy::prelude::*;
use micromegas_tracing::prelude::{fmetric, imetric, info, span_scope};

use crate::components::Agent;
use crate::events::StateChanged;

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Last, frame_telemetry);
        app.add_observer(on_state_changed);
    }
}

fn frame_telemetry(time: Res<Time>, agents: Query<(), With<Agent>>) {
    span_scope!("frame");
    let dt_ms = time.delta_secs_f64() * 1000.0;
    fmetric!("frame_time_ms", "ms", dt_ms);
    imetric!("agent_count", "count", agents.iter().count() as u64);
}

fn on_state_changed(event: On<StateChanged>) {
    let change = event.event();
    info!(
        "agent {:?} transition {:?} -> {:?}",
        change.agent, change.from, change.to
    );
    imetric!("state_transitions", "count", 1);
}
