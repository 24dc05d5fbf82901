//! Per-agent finite state machine: a shared immutable definition plus a
//! mutable per-agent instance holding the current state and search memory.

use std::sync::Arc;

use bevy::prelude::*;
use micromegas_tracing::prelude::info;

use super::conditions::{Condition, ConditionCtx};
use super::PatternDef;
use crate::components::Perception;
use crate::nav::{GridCell, NavGrid};

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Idle,
    Chase,
    Flank,
    Retreat,
    Search,
}

#[derive(Debug, Clone)]
pub struct TransitionRule {
    pub from: StateId,
    pub to: StateId,
    pub condition: Condition,
}

/// Immutable machine layout for one agent archetype: an initial state, a
/// pattern bound to each state, and ordered transition rules. Shared
/// read-only (via `Arc`) across all agents of the archetype.
#[derive(Debug)]
pub struct MachineDef {
    initial: StateId,
    patterns: Vec<(StateId, PatternDef)>,
    transitions: Vec<TransitionRule>,
}

impl MachineDef {
    /// Validate and build a definition. A machine referencing an unbound
    /// state is a configuration bug; it fails here, at construction, not at
    /// tick time.
    pub fn new(
        initial: StateId,
        patterns: Vec<(StateId, PatternDef)>,
        transitions: Vec<TransitionRule>,
    ) -> Result<Self, String> {
        let bound = |state: StateId| patterns.iter().any(|(id, _)| *id == state);

        for (i, (id, _)) in patterns.iter().enumerate() {
            if patterns[..i].iter().any(|(other, _)| other == id) {
                return Err(format!("state {id:?} is bound to more than one pattern"));
            }
        }
        if !bound(initial) {
            return Err(format!("initial state {initial:?} has no pattern binding"));
        }
        for rule in &transitions {
            if !bound(rule.from) {
                return Err(format!("transition from unbound state {:?}", rule.from));
            }
            if !bound(rule.to) {
                return Err(format!("transition to unbound state {:?}", rule.to));
            }
        }

        Ok(MachineDef {
            initial,
            patterns,
            transitions,
        })
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Pattern bound to a state. Only called with states validated at
    /// construction time.
    pub fn pattern_for(&self, state: StateId) -> &PatternDef {
        self.patterns
            .iter()
            .find(|(id, _)| *id == state)
            .map(|(_, pattern)| pattern)
            .expect("state bound at construction")
    }
}

// ---------------------------------------------------------------------------
// Per-agent memory and debug surface
// ---------------------------------------------------------------------------

/// Transient search memory, owned by one agent's machine instance and
/// mutated only by its own update step.
#[derive(Debug, Clone, Default)]
pub struct SearchMemory {
    pub last_known_position: Option<Vec2>,
    pub search_timer: f32,
    pub wander_target: Option<Vec2>,
    pub reached_last_known: bool,
    pub failed_to_reach: bool,
    pub failed_path_attempts: u32,
}

/// State written by the patterns for an external overlay to read. This core
/// never draws it.
#[derive(Debug, Clone, Default)]
pub struct BehaviorDebug {
    pub is_searching: bool,
    pub patrol_radius: f32,
    pub last_path: Vec<GridCell>,
}

/// Read-only view over one agent's machine for debug/observability.
#[derive(Debug, Clone, Copy)]
pub struct DebugSnapshot<'a> {
    pub state: StateId,
    pub is_searching: bool,
    pub patrol_radius: f32,
    pub last_path: &'a [GridCell],
}

/// Target snapshot resolved by the behavior driver once per tick.
#[derive(Debug, Clone, Copy)]
pub struct TargetInfo {
    pub position: Vec2,
    pub visible: bool,
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// Per-agent runtime: current state plus search memory, created at spawn and
/// destroyed with the agent. At most one transition fires per tick; rules
/// are tested in declaration order for the current state only.
#[derive(Component, Debug, Clone)]
pub struct StateMachine {
    def: Arc<MachineDef>,
    current: StateId,
    memory: SearchMemory,
    debug: BehaviorDebug,
}

impl StateMachine {
    pub fn new(def: Arc<MachineDef>) -> Self {
        let current = def.initial();
        StateMachine {
            def,
            current,
            memory: SearchMemory::default(),
            debug: BehaviorDebug::default(),
        }
    }

    pub fn state(&self) -> StateId {
        self.current
    }

    pub fn memory(&self) -> &SearchMemory {
        &self.memory
    }

    pub fn snapshot(&self) -> DebugSnapshot<'_> {
        DebugSnapshot {
            state: self.current,
            is_searching: self.debug.is_searching,
            patrol_radius: self.debug.patrol_radius,
            last_path: &self.debug.last_path,
        }
    }

    /// Advance the machine by one tick: refresh the last-known-position
    /// snapshot, accumulate the search timer, and fire the first satisfied
    /// transition rule for the current state.
    pub fn advance(
        &mut self,
        agent: Vec2,
        target: Option<&TargetInfo>,
        perception: &Perception,
        grid: &NavGrid,
        dt: f32,
    ) {
        // While directly engaging, keep the last confirmed target position
        // fresh; when visibility drops the previous snapshot stands.
        if matches!(
            self.current,
            StateId::Chase | StateId::Flank | StateId::Retreat
        ) {
            if let Some(info) = target {
                if info.visible {
                    self.memory.last_known_position = Some(info.position);
                }
            }
        }

        if self.current == StateId::Search {
            self.memory.search_timer += dt;
        }

        let def = Arc::clone(&self.def);
        let fired = {
            let ctx = ConditionCtx {
                agent,
                target: target.map(|info| info.position),
                detection_range: perception.detection_range,
                attack_range: perception.attack_range,
                grid,
                memory: &self.memory,
            };
            def.transitions
                .iter()
                .filter(|rule| rule.from == self.current)
                .find(|rule| rule.condition.eval(&ctx))
                .map(|rule| rule.to)
        };

        if let Some(to) = fired {
            self.apply_transition(to, target);
        }
    }

    fn apply_transition(&mut self, to: StateId, target: Option<&TargetInfo>) {
        if to == StateId::Search {
            // Entering search needs an anchor. The engagement snapshot is
            // preferred; the target's current position is the fallback. With
            // neither, the transition is suppressed: a searcher without an
            // anchor would be stranded.
            let anchor = self
                .memory
                .last_known_position
                .or_else(|| target.map(|info| info.position));
            let Some(anchor) = anchor else {
                info!("search transition suppressed: no anchor position");
                return;
            };
            self.memory.last_known_position = Some(anchor);
            self.memory.search_timer = 0.0;
            self.memory.wander_target = None;
            self.memory.reached_last_known = false;
            self.memory.failed_to_reach = false;
            self.memory.failed_path_attempts = 0;
            if let PatternDef::Search(params) = self.def.pattern_for(StateId::Search) {
                self.debug.patrol_radius = params.radius;
            }
        } else if self.current == StateId::Search {
            // Leaving search drops the whole search memory and the debug
            // search flags.
            self.memory = SearchMemory::default();
            self.debug.is_searching = false;
            self.debug.patrol_radius = 0.0;
        }
        self.current = to;
    }

    /// Resolve the active pattern and produce this tick's movement
    /// direction.
    pub fn move_direction(&mut self, agent: Vec2, target: Option<Vec2>, grid: &NavGrid) -> Vec2 {
        let pattern = self.def.pattern_for(self.current).clone();
        super::move_direction(
            &pattern,
            agent,
            target,
            grid,
            &mut self.memory,
            &mut self.debug,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
