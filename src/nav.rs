//! Walkability grid over the continuous arena.
//!
//! The arena is discretized into fixed-size square cells. Cells overlapped by
//! obstacle bounds are non-walkable; everything else is open. The grid is
//! rebuilt wholesale by the arena plugin whenever obstacles change, so every
//! pathfinding call within a tick sees one consistent snapshot.

use bevy::prelude::*;

/// Integer cell coordinate. Derived from world positions by floor division
/// by the cell size; converts back to the cell's center point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

/// Per-cell walkability for the whole arena. World origin is at (0,0) with
/// +y up; cell (0,0) covers world `[0, cell_size) x [0, cell_size)`.
#[derive(Resource, Debug, Clone)]
pub struct NavGrid {
    cols: i32,
    rows: i32,
    cell_size: f32,
    cells: Vec<bool>,
}

impl NavGrid {
    /// Create a fully walkable grid.
    pub fn new(cols: i32, rows: i32, cell_size: f32) -> Self {
        assert!(cols > 0 && rows > 0, "grid dimensions must be positive");
        assert!(cell_size > 0.0, "cell size must be positive");
        NavGrid {
            cols,
            rows,
            cell_size,
            cells: vec![true; (cols * rows) as usize],
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols || y >= self.rows {
            return None;
        }
        Some((y * self.cols + x) as usize)
    }

    /// Mark a cell walkable or blocked. Out-of-range calls are no-ops.
    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = walkable;
        }
    }

    /// Out-of-range cells are not walkable.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn is_cell_walkable(&self, cell: GridCell) -> bool {
        self.is_walkable(cell.x, cell.y)
    }

    /// Reset every cell to walkable. Used before re-applying obstacle bounds.
    pub fn clear(&mut self) {
        self.cells.fill(true);
    }

    /// Convert a world position to its containing cell.
    pub fn world_to_grid(&self, point: Vec2) -> GridCell {
        GridCell {
            x: (point.x / self.cell_size).floor() as i32,
            y: (point.y / self.cell_size).floor() as i32,
        }
    }

    /// Center point of a cell in world coordinates.
    pub fn grid_to_world(&self, cell: GridCell) -> Vec2 {
        Vec2::new(
            cell.x as f32 * self.cell_size + self.cell_size / 2.0,
            cell.y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// World extent of the whole grid.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    /// Clamp a world point into the arena bounds. The upper edge is pulled
    /// in slightly so a clamped point always maps to an in-range cell.
    pub fn clamp_to_bounds(&self, point: Vec2) -> Vec2 {
        let size = self.world_size() - Vec2::splat(1e-3);
        Vec2::new(point.x.clamp(0.0, size.x), point.y.clamp(0.0, size.y))
    }

    /// Mark every cell overlapping an axis-aligned world rectangle
    /// non-walkable.
    pub fn block_rect(&mut self, min: Vec2, max: Vec2) {
        let lo = self.world_to_grid(min);
        // Pull the max corner in slightly so a rect ending exactly on a cell
        // boundary does not block the next cell over.
        let hi = self.world_to_grid(max - Vec2::splat(1e-3));
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                self.set_walkable(x, y, false);
            }
        }
    }

    /// Find the walkable cell nearest to `cell`, scanning outward in
    /// expanding rings up to `max_radius`. Returns the cell itself when it is
    /// already walkable. Scan order within a ring is fixed, so the result is
    /// deterministic.
    pub fn nearest_walkable(&self, cell: GridCell, max_radius: i32) -> Option<GridCell> {
        if self.is_cell_walkable(cell) {
            return Some(cell);
        }
        for radius in 1..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let candidate = GridCell {
                        x: cell.x + dx,
                        y: cell.y + dy,
                    };
                    if self.is_cell_walkable(candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Cell raycast between two world points. True when every cell the
    /// segment passes through is walkable. Uses the standard integer line
    /// walk over the cell grid.
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let a = self.world_to_grid(from);
        let b = self.world_to_grid(to);

        let dx = (b.x - a.x).abs();
        let dy = (b.y - a.y).abs();
        let sx = if a.x < b.x { 1 } else { -1 };
        let sy = if a.y < b.y { 1 } else { -1 };

        let mut x = a.x;
        let mut y = a.y;
        let mut err = dx - dy;

        loop {
            if !self.is_walkable(x, y) {
                return false;
            }
            if x == b.x && y == b.y {
                return true;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
