pub mod agents;
pub mod arena;
pub mod camera;
pub mod movement;
pub mod player;
pub mod telemetry;
