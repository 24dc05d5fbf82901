//! Simulation events triggered by the behavior driver and observed by telemetry.

use bevy::prelude::*;

use crate::ai::machine::StateId;

#[derive(Event, Debug, Clone, Copy)]
pub struct StateChanged {
    pub agent: Entity,
    pub from: StateId,
    pub to: StateId,
}
