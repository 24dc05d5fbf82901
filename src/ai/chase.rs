//! Chase: path straight at the target's cell. The most direct pressure an
//! agent can apply.

use bevy::prelude::*;

use super::machine::BehaviorDebug;
use crate::nav::NavGrid;

/// Move toward the target along the grid path. When the target's own cell is
/// blocked (target hugging a wall), a ring search substitutes the nearest
/// walkable cell before pathing. Zero when the target is missing or
/// unreachable this tick.
pub fn move_direction(
    agent: Vec2,
    target: Option<Vec2>,
    grid: &NavGrid,
    debug: &mut BehaviorDebug,
) -> Vec2 {
    let Some(target) = target else {
        return Vec2::ZERO;
    };
    let Some(goal) = super::resolve_goal(grid, target) else {
        return Vec2::ZERO;
    };
    super::steer_to_cell(grid, agent, goal, debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::GridCell;

    #[test]
    fn chase_moves_toward_target() {
        let grid = NavGrid::new(10, 10, 32.0);
        let agent = grid.grid_to_world(GridCell { x: 0, y: 0 });
        let target = grid.grid_to_world(GridCell { x: 9, y: 9 });
        let mut debug = BehaviorDebug::default();

        let dir = move_direction(agent, Some(target), &grid, &mut debug);
        assert!(dir.length() > 0.99, "expected a unit direction");
        // Moving along dir must close the distance.
        let next = agent + dir * 10.0;
        assert!(next.distance(target) < agent.distance(target));
    }

    #[test]
    fn missing_target_is_zero() {
        let grid = NavGrid::new(10, 10, 32.0);
        let mut debug = BehaviorDebug::default();
        assert_eq!(
            move_direction(Vec2::new(16.0, 16.0), None, &grid, &mut debug),
            Vec2::ZERO
        );
    }

    #[test]
    fn blocked_target_cell_uses_nearby_substitute() {
        let mut grid = NavGrid::new(10, 10, 32.0);
        grid.set_walkable(5, 5, false);
        let agent = grid.grid_to_world(GridCell { x: 0, y: 5 });
        let target = grid.grid_to_world(GridCell { x: 5, y: 5 });
        let mut debug = BehaviorDebug::default();

        let dir = move_direction(agent, Some(target), &grid, &mut debug);
        assert_ne!(dir, Vec2::ZERO);
        let goal = *debug.last_path.last().unwrap();
        assert_ne!(goal, GridCell { x: 5, y: 5 });
        assert!(grid.is_cell_walkable(goal));
    }

    #[test]
    fn unreachable_target_is_zero() {
        let mut grid = NavGrid::new(10, 10, 32.0);
        // Seal the agent into the left column.
        for y in 0..10 {
            grid.set_walkable(1, y, false);
        }
        let agent = grid.grid_to_world(GridCell { x: 0, y: 5 });
        let target = grid.grid_to_world(GridCell { x: 8, y: 5 });
        let mut debug = BehaviorDebug::default();

        assert_eq!(move_direction(agent, Some(target), &grid, &mut debug), Vec2::ZERO);
    }

    #[test]
    fn routes_through_wall_gap() {
        let mut grid = NavGrid::new(10, 10, 32.0);
        // Wall at column 5 with one gap at row 0.
        for y in 1..10 {
            grid.set_walkable(5, y, false);
        }
        let agent = grid.grid_to_world(GridCell { x: 0, y: 9 });
        let target = grid.grid_to_world(GridCell { x: 9, y: 9 });
        let mut debug = BehaviorDebug::default();

        let dir = move_direction(agent, Some(target), &grid, &mut debug);
        assert_ne!(dir, Vec2::ZERO, "gap should make the target reachable");
        assert!(debug.last_path.contains(&GridCell { x: 5, y: 0 }));
    }
}
