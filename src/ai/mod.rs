//! Agent decision logic: movement patterns, transition conditions, and the
//! per-agent state machine.
//!
//! Patterns are pure strategies: they consume the agent position, the target
//! position, and the navigation grid, and produce a normalized movement
//! direction. A zero vector always means "do not move this tick".

pub mod chase;
pub mod conditions;
pub mod flank;
pub mod idle;
pub mod machine;
pub mod retreat;
pub mod search;

use bevy::prelude::*;

use crate::nav::{GridCell, NavGrid};
use crate::pathfind::find_path;
use machine::{BehaviorDebug, SearchMemory};

/// Ring-search radius (in cells) used when substituting a blocked goal with
/// a nearby walkable cell.
pub const GOAL_RING_RADIUS: i32 = 2;

// ---------------------------------------------------------------------------
// Pattern definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlankParams {
    /// Offset behind the target, in grid cells.
    pub behind_cells: f32,
    /// Perpendicular arc displacement, in grid cells.
    pub arc_cells: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetreatParams {
    pub ideal_distance: f32,
    pub follow_threshold: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub strafe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub radius: f32,
    /// Consecutive failed-pathing ticks tolerated before the wander phase is
    /// forced.
    pub forced_wander_after: u32,
}

/// Tactical movement strategy, tagged with its tuning parameters. One
/// pattern is bound to each state of a machine definition; dispatch is a
/// closed match, so a missing strategy cannot exist at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternDef {
    Chase,
    Flank(FlankParams),
    Retreat(RetreatParams),
    Search(SearchParams),
    Idle,
}

/// Resolve a pattern to its movement direction for this tick.
pub fn move_direction(
    def: &PatternDef,
    agent: Vec2,
    target: Option<Vec2>,
    grid: &NavGrid,
    memory: &mut SearchMemory,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    match def {
        PatternDef::Chase => chase::move_direction(agent, target, grid, debug),
        PatternDef::Flank(params) => flank::move_direction(agent, target, params, grid, debug),
        PatternDef::Retreat(params) => retreat::move_direction(agent, target, params, grid, debug),
        PatternDef::Search(params) => search::move_direction(agent, params, grid, memory, debug),
        PatternDef::Idle => idle::move_direction(),
    }
}

// ---------------------------------------------------------------------------
// Shared navigation helpers
// ---------------------------------------------------------------------------

/// Resolve a world-space goal point to a walkable cell: clamp into the arena,
/// convert, and ring-search outward when the cell itself is blocked.
pub(crate) fn resolve_goal(grid: &NavGrid, point: Vec2) -> Option<GridCell> {
    let cell = grid.world_to_grid(grid.clamp_to_bounds(point));
    grid.nearest_walkable(cell, GOAL_RING_RADIUS)
}

/// Path from the agent's cell to `goal` and move toward the path's second
/// cell (the first is the agent's own cell; steering at it oscillates near
/// waypoints). Records the path for the debug surface. Zero when no route
/// exists.
pub(crate) fn steer_to_cell(
    grid: &NavGrid,
    agent: Vec2,
    goal: GridCell,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    let start = grid.world_to_grid(agent);
    let path = find_path(grid, start, goal);
    let direction = step_along(grid, agent, &path);
    debug.last_path = path;
    direction
}

/// Direction toward the second cell of a path, or zero when the path has no
/// second cell.
pub(crate) fn step_along(grid: &NavGrid, agent: Vec2, path: &[GridCell]) -> Vec2 {
    if path.len() < 2 {
        return Vec2::ZERO;
    }
    (grid.grid_to_world(path[1]) - agent).normalize_or_zero()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
