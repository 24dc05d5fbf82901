use std::sync::Arc;

use bevy::prelude::*;
use micromegas_tracing::prelude::info;

use crate::ai::conditions::Condition;
use crate::ai::machine::{MachineDef, StateId, TransitionRule};
use crate::ai::{FlankParams, PatternDef, RetreatParams, SearchParams};
use crate::components::ArchetypeKind;

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

pub const SIM_CONFIG_PATH: &str = "assets/sim_config.json";

/// Tunables loaded from `assets/sim_config.json`; missing file falls back to
/// the defaults, malformed content is a startup failure.
#[derive(Resource, Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena_file: String,
    pub cell_size: f32,
    /// Consecutive failed-pathing ticks search tolerates before it forces
    /// its wander phase.
    pub search_retry_budget: u32,
    /// Seconds of fruitless searching before an agent gives up and idles.
    pub search_give_up_secs: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            arena_file: "assets/arenas/arena_01.txt".to_string(),
            cell_size: 32.0,
            search_retry_budget: 30,
            search_give_up_secs: 6.0,
        }
    }
}

/// Read the simulation config, or defaults when the file does not exist.
pub fn load_sim_config(path: &str) -> SimConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("Failed to parse sim config {}: {}", path, e)),
        Err(_) => {
            info!("sim config {} not found, using defaults", path);
            SimConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Archetype configuration
// ---------------------------------------------------------------------------

/// Everything an archetype contributes to a spawned agent: perception
/// ranges, movement speed, placeholder color, and the shared machine
/// definition.
#[derive(Debug, Clone)]
pub struct ArchetypeConfig {
    pub detection_range: f32,
    pub attack_range: f32,
    pub speed: f32,
    pub color: Color,
    pub machine: Arc<MachineDef>,
}

/// Target acquired: inside detection range with a clear line of sight.
fn engage() -> Condition {
    Condition::And(vec![
        Condition::WithinDetectionRange,
        Condition::HasLineOfSight,
    ])
}

fn rule(from: StateId, to: StateId, condition: Condition) -> TransitionRule {
    TransitionRule {
        from,
        to,
        condition,
    }
}

/// Build the configuration for an archetype. Machine layouts are static
/// tables; a validation failure here is a configuration bug and panics at
/// startup rather than at tick time.
pub fn archetype_config(kind: ArchetypeKind, config: &SimConfig) -> ArchetypeConfig {
    let budget = config.search_retry_budget;
    let give_up = config.search_give_up_secs;

    let (detection_range, attack_range, speed, color, machine) = match kind {
        // Straight-line pressure: chase on sight, drop to idle in attack
        // range (the attack system takes over there), search when sight is
        // lost.
        ArchetypeKind::Stalker => (
            400.0,
            50.0,
            140.0,
            Color::srgb(0.85, 0.25, 0.2),
            MachineDef::new(
                StateId::Idle,
                vec![
                    (StateId::Idle, PatternDef::Idle),
                    (StateId::Chase, PatternDef::Chase),
                    (
                        StateId::Search,
                        PatternDef::Search(SearchParams {
                            radius: 128.0,
                            forced_wander_after: budget,
                        }),
                    ),
                ],
                vec![
                    rule(StateId::Idle, StateId::Chase, engage()),
                    rule(StateId::Chase, StateId::Search, Condition::LacksLineOfSight),
                    rule(StateId::Chase, StateId::Idle, Condition::WithinAttackRange),
                    rule(StateId::Search, StateId::Chase, engage()),
                    rule(
                        StateId::Search,
                        StateId::Idle,
                        Condition::SearchExpired(give_up),
                    ),
                ],
            ),
        ),
        // Swings around behind the target; trades places with chase across
        // the attack range boundary.
        ArchetypeKind::Flanker => (
            420.0,
            60.0,
            150.0,
            Color::srgb(0.8, 0.5, 0.1),
            MachineDef::new(
                StateId::Idle,
                vec![
                    (StateId::Idle, PatternDef::Idle),
                    (
                        StateId::Flank,
                        PatternDef::Flank(FlankParams {
                            behind_cells: 3.0,
                            arc_cells: 3.0,
                        }),
                    ),
                    (StateId::Chase, PatternDef::Chase),
                    (
                        StateId::Search,
                        PatternDef::Search(SearchParams {
                            radius: 160.0,
                            forced_wander_after: budget,
                        }),
                    ),
                ],
                vec![
                    rule(StateId::Idle, StateId::Flank, engage()),
                    rule(StateId::Flank, StateId::Search, Condition::LacksLineOfSight),
                    rule(StateId::Flank, StateId::Chase, Condition::WithinAttackRange),
                    rule(StateId::Chase, StateId::Search, Condition::LacksLineOfSight),
                    rule(StateId::Chase, StateId::Flank, Condition::OutOfAttackRange),
                    rule(StateId::Search, StateId::Flank, engage()),
                    rule(
                        StateId::Search,
                        StateId::Idle,
                        Condition::SearchExpired(give_up),
                    ),
                ],
            ),
        ),
        // Ranged harasser: keeps a wide standoff band and strafes inside it.
        ArchetypeKind::Skirmisher => (
            500.0,
            220.0,
            130.0,
            Color::srgb(0.3, 0.6, 0.9),
            MachineDef::new(
                StateId::Idle,
                vec![
                    (StateId::Idle, PatternDef::Idle),
                    (
                        StateId::Retreat,
                        PatternDef::Retreat(RetreatParams {
                            ideal_distance: 200.0,
                            follow_threshold: 260.0,
                            min_distance: 120.0,
                            max_distance: 280.0,
                            strafe: true,
                        }),
                    ),
                    (
                        StateId::Search,
                        PatternDef::Search(SearchParams {
                            radius: 160.0,
                            forced_wander_after: budget,
                        }),
                    ),
                ],
                vec![
                    rule(StateId::Idle, StateId::Retreat, engage()),
                    rule(
                        StateId::Retreat,
                        StateId::Search,
                        Condition::LacksLineOfSight,
                    ),
                    rule(StateId::Search, StateId::Retreat, engage()),
                    rule(
                        StateId::Search,
                        StateId::Idle,
                        Condition::SearchExpired(give_up),
                    ),
                ],
            ),
        ),
        // Closes fast, gives up quickly: a short search radius and an early
        // exit back to idle. Damage and cooldown live outside this core.
        ArchetypeKind::Bomber => (
            350.0,
            40.0,
            160.0,
            Color::srgb(0.6, 0.3, 0.8),
            MachineDef::new(
                StateId::Idle,
                vec![
                    (StateId::Idle, PatternDef::Idle),
                    (StateId::Chase, PatternDef::Chase),
                    (
                        StateId::Search,
                        PatternDef::Search(SearchParams {
                            radius: 64.0,
                            forced_wander_after: budget,
                        }),
                    ),
                ],
                vec![
                    rule(StateId::Idle, StateId::Chase, engage()),
                    rule(StateId::Chase, StateId::Search, Condition::LacksLineOfSight),
                    rule(StateId::Chase, StateId::Idle, Condition::WithinAttackRange),
                    rule(StateId::Search, StateId::Chase, engage()),
                    rule(
                        StateId::Search,
                        StateId::Idle,
                        Condition::SearchExpired(give_up * 0.5),
                    ),
                ],
            ),
        ),
    };

    let machine =
        machine.unwrap_or_else(|e| panic!("invalid machine definition for {:?}: {}", kind, e));

    ArchetypeConfig {
        detection_range,
        attack_range,
        speed,
        color,
        machine: Arc::new(machine),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_archetype_machines_validate() {
        let config = SimConfig::default();
        for kind in [
            ArchetypeKind::Stalker,
            ArchetypeKind::Flanker,
            ArchetypeKind::Skirmisher,
            ArchetypeKind::Bomber,
        ] {
            let cfg = archetype_config(kind, &config);
            assert_eq!(cfg.machine.initial(), StateId::Idle);
            assert!(cfg.detection_range > cfg.attack_range);
        }
    }

    #[test]
    fn bomber_searches_a_short_radius() {
        let config = SimConfig::default();
        let bomber = archetype_config(ArchetypeKind::Bomber, &config);
        let PatternDef::Search(params) = bomber.machine.pattern_for(StateId::Search) else {
            panic!("bomber must bind a search pattern");
        };
        assert!(params.radius < 100.0);
    }

    #[test]
    fn retry_budget_comes_from_config() {
        let config = SimConfig {
            search_retry_budget: 7,
            ..Default::default()
        };
        let stalker = archetype_config(ArchetypeKind::Stalker, &config);
        let PatternDef::Search(params) = stalker.machine.pattern_for(StateId::Search) else {
            panic!("stalker must bind a search pattern");
        };
        assert_eq!(params.forced_wander_after, 7);
    }

    #[test]
    fn skirmisher_band_is_wide_and_strafes() {
        let config = SimConfig::default();
        let skirmisher = archetype_config(ArchetypeKind::Skirmisher, &config);
        let PatternDef::Retreat(params) = skirmisher.machine.pattern_for(StateId::Retreat) else {
            panic!("skirmisher must bind a retreat pattern");
        };
        assert!(params.strafe);
        assert!(params.max_distance - params.min_distance > 100.0);
    }

    #[test]
    fn default_config_values() {
        let config = SimConfig::default();
        assert_eq!(config.search_retry_budget, 30);
        assert!((config.cell_size - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn config_parses_partial_json() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "search_retry_budget": 12 }"#).unwrap();
        assert_eq!(config.search_retry_budget, 12);
        assert_eq!(config.arena_file, "assets/arenas/arena_01.txt");
    }
}
