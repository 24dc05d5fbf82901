//! A* path search over the walkability grid.
//!
//! Eight-directional adjacency with integer octile costs (10 per cardinal
//! step, 14 per diagonal), so flanking and strafing goals are reachable
//! without axis-aligned staircases. A diagonal step is allowed only when both
//! adjacent cardinal cells are walkable; the conservative rule means a
//! character controller can follow every returned path without clipping wall
//! corners.

use pathfinding::prelude::astar;

use crate::nav::{GridCell, NavGrid};

const CARDINAL_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// Minimal-cost sequence of adjacent walkable cells from `start` to `goal`,
/// both inclusive. Returns `[start]` when the goal is blocked or no connected
/// route exists; callers treat a length of one or less as "no path".
pub fn find_path(grid: &NavGrid, start: GridCell, goal: GridCell) -> Vec<GridCell> {
    if start == goal {
        return vec![start];
    }
    if !grid.is_cell_walkable(goal) {
        return vec![start];
    }

    let result = astar(
        &start,
        |cell| neighbors(grid, *cell),
        |cell| octile(*cell, goal),
        |cell| *cell == goal,
    );

    match result {
        Some((cells, _cost)) => cells,
        None => vec![start],
    }
}

/// Walkable 8-neighbors with step costs. Diagonals require both orthogonal
/// neighbors open.
fn neighbors(grid: &NavGrid, cell: GridCell) -> Vec<(GridCell, u32)> {
    const STEPS: [(i32, i32, u32); 8] = [
        (1, 0, CARDINAL_COST),
        (-1, 0, CARDINAL_COST),
        (0, 1, CARDINAL_COST),
        (0, -1, CARDINAL_COST),
        (1, 1, DIAGONAL_COST),
        (1, -1, DIAGONAL_COST),
        (-1, 1, DIAGONAL_COST),
        (-1, -1, DIAGONAL_COST),
    ];

    STEPS
        .iter()
        .filter_map(|&(dx, dy, cost)| {
            let next = GridCell {
                x: cell.x + dx,
                y: cell.y + dy,
            };
            if !grid.is_cell_walkable(next) {
                return None;
            }
            if dx != 0
                && dy != 0
                && !(grid.is_walkable(cell.x + dx, cell.y) && grid.is_walkable(cell.x, cell.y + dy))
            {
                return None;
            }
            Some((next, cost))
        })
        .collect()
}

/// Octile distance heuristic, admissible and consistent for the 10/14 cost
/// model.
fn octile(a: GridCell, b: GridCell) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    CARDINAL_COST * (dx + dy) - (2 * CARDINAL_COST - DIAGONAL_COST) * dx.min(dy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> NavGrid {
        NavGrid::new(10, 10, 32.0)
    }

    fn cell(x: i32, y: i32) -> GridCell {
        GridCell { x, y }
    }

    #[test]
    fn start_equals_goal() {
        let grid = open_grid();
        let path = find_path(&grid, cell(3, 3), cell(3, 3));
        assert_eq!(path, vec![cell(3, 3)]);
    }

    #[test]
    fn open_grid_step_count_is_chebyshev() {
        let grid = open_grid();
        let cases = [
            (cell(0, 0), cell(9, 9), 9),
            (cell(0, 0), cell(9, 4), 9),
            (cell(2, 7), cell(2, 1), 6),
            (cell(1, 1), cell(2, 1), 1),
        ];
        for (start, goal, expected_steps) in cases {
            let path = find_path(&grid, start, goal);
            assert_eq!(
                path.len() - 1,
                expected_steps,
                "steps from {start:?} to {goal:?}"
            );
            assert_eq!(path[0], start);
            assert_eq!(*path.last().unwrap(), goal);
        }
    }

    #[test]
    fn path_cells_are_adjacent_and_walkable() {
        let mut grid = open_grid();
        for y in 1..10 {
            grid.set_walkable(5, y, false);
        }
        let path = find_path(&grid, cell(0, 5), cell(9, 5));
        assert!(path.len() > 1, "gap at (5,0) should be reachable");
        for pair in path.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            assert!(dx <= 1 && dy <= 1 && (dx, dy) != (0, 0), "non-adjacent step");
            assert!(grid.is_cell_walkable(pair[1]));
        }
    }

    #[test]
    fn blocked_goal_returns_start_only() {
        let mut grid = open_grid();
        grid.set_walkable(7, 7, false);
        let path = find_path(&grid, cell(0, 0), cell(7, 7));
        assert_eq!(path, vec![cell(0, 0)]);
    }

    #[test]
    fn sealed_goal_returns_start_only() {
        let mut grid = open_grid();
        // Ring of blocked cells around (7,7)
        for (dx, dy) in [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ] {
            grid.set_walkable(7 + dx, 7 + dy, false);
        }
        let path = find_path(&grid, cell(0, 0), cell(7, 7));
        assert!(path.len() <= 1);
    }

    #[test]
    fn no_corner_cutting_through_blocked_corner() {
        let mut grid = open_grid();
        // Wall corner at (5,5): cells (5,5) and the diagonal neighbors of the
        // route would be cut without the corner rule.
        grid.set_walkable(5, 5, false);
        grid.set_walkable(4, 5, false);
        let path = find_path(&grid, cell(4, 4), cell(5, 6));
        for pair in path.windows(2) {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            if dx != 0 && dy != 0 {
                assert!(
                    grid.is_walkable(pair[0].x + dx, pair[0].y)
                        && grid.is_walkable(pair[0].x, pair[0].y + dy),
                    "diagonal step cut a blocked corner at {:?}",
                    pair[0]
                );
            }
        }
    }

    #[test]
    fn diagonal_shortcut_preferred_on_open_grid() {
        let grid = open_grid();
        let path = find_path(&grid, cell(0, 0), cell(3, 3));
        // 3 diagonal steps, not 6 cardinal ones.
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn deterministic_across_runs() {
        let mut grid = open_grid();
        grid.set_walkable(4, 4, false);
        grid.set_walkable(4, 5, false);
        let a = find_path(&grid, cell(0, 0), cell(9, 9));
        let b = find_path(&grid, cell(0, 0), cell(9, 9));
        assert_eq!(a, b);
    }

    #[test]
    fn octile_matches_cost_model() {
        assert_eq!(octile(cell(0, 0), cell(3, 0)), 30);
        assert_eq!(octile(cell(0, 0), cell(3, 3)), 42);
        assert_eq!(octile(cell(0, 0), cell(5, 2)), 58);
    }
}
