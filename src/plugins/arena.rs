//! Arena loading and navigation-grid lifecycle.
//!
//! Parses ASCII arena files into obstacle entities and spawn positions, and
//! rebuilds the walkability grid wholesale whenever obstacles change.

use bevy::prelude::*;
use micromegas_tracing::prelude::{info, span_scope};

use crate::app_state::AppState;
use crate::components::{ArchetypeKind, Obstacle};
use crate::nav::{GridCell, NavGrid};
use crate::resources::SimConfig;

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_arena);
        app.add_systems(
            Update,
            finish_loading.run_if(in_state(AppState::Loading)),
        );
        app.add_systems(FixedUpdate, rebuild_nav_grid);
    }
}

const WALL_COLOR: Color = Color::srgb(0.15, 0.15, 0.4);

// ---------------------------------------------------------------------------
// Arena map resource
// ---------------------------------------------------------------------------

/// Parsed arena layout: wall cells and spawn positions.
#[derive(Resource, Debug, Clone)]
pub struct ArenaMap {
    pub width: usize,
    pub height: usize,
    pub walls: Vec<GridCell>,
    pub player_spawn: GridCell,
    pub agent_spawns: Vec<(ArchetypeKind, GridCell)>,
}

impl ArenaMap {
    /// Parse an ASCII arena string. `#` wall, `P` player spawn, `S`/`F`/`K`/
    /// `B` archetype spawns, space or `.` floor. The first text line is the
    /// top row of the arena (highest y).
    pub fn parse(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err("Empty arena".to_string());
        }

        let height = lines.len();
        let width = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        if width == 0 {
            return Err("Arena has zero width".to_string());
        }

        let mut walls = Vec::new();
        let mut player_spawn = None;
        let mut agent_spawns = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            // Top text row maps to the highest grid y.
            let y = (height - 1 - row) as i32;
            for (x, ch) in line.chars().enumerate() {
                let pos = GridCell { x: x as i32, y };
                match ch {
                    '#' => walls.push(pos),
                    ' ' | '.' => {}
                    'P' => {
                        if player_spawn.is_some() {
                            return Err(format!("Multiple player spawns at ({}, {})", x, row));
                        }
                        player_spawn = Some(pos);
                    }
                    'S' => agent_spawns.push((ArchetypeKind::Stalker, pos)),
                    'F' => agent_spawns.push((ArchetypeKind::Flanker, pos)),
                    'K' => agent_spawns.push((ArchetypeKind::Skirmisher, pos)),
                    'B' => agent_spawns.push((ArchetypeKind::Bomber, pos)),
                    _ => {
                        return Err(format!(
                            "Unknown arena character '{}' at ({}, {})",
                            ch, x, row
                        ));
                    }
                }
            }
        }

        let player_spawn = player_spawn.ok_or("No player spawn ('P') found in arena")?;

        Ok(ArenaMap {
            width,
            height,
            walls,
            player_spawn,
            agent_spawns,
        })
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Read and parse the arena file, spawn wall entities, and seed the
/// navigation grid. Failures here are configuration bugs and abort startup.
pub fn load_arena(mut commands: Commands, config: Res<SimConfig>) {
    span_scope!("arena_load");
    let path = &config.arena_file;
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read arena file {}: {}", path, e));
    let arena = ArenaMap::parse(&text)
        .unwrap_or_else(|e| panic!("Failed to parse arena file {}: {}", path, e));

    let cell = config.cell_size;
    let grid = NavGrid::new(arena.width as i32, arena.height as i32, cell);

    for wall in &arena.walls {
        let center = grid.grid_to_world(*wall);
        commands.spawn((
            Obstacle {
                half_extents: Vec2::splat(cell / 2.0),
            },
            Sprite::from_color(WALL_COLOR, Vec2::splat(cell)),
            Transform::from_xyz(center.x, center.y, 0.0),
        ));
    }

    info!("arena loaded: {} ({}x{})", path, arena.width, arena.height);
    commands.insert_resource(arena);
    commands.insert_resource(grid);
}

/// Everything loads synchronously, so the first Loading-state frame can hand
/// off to Running.
fn finish_loading(mut next_state: ResMut<NextState<AppState>>) {
    next_state.set(AppState::Running);
}

/// Rebuild the grid from scratch whenever obstacle entities were added,
/// moved, or removed. Wholesale rebuilds keep every pathfinding call in a
/// tick on one consistent snapshot.
#[allow(clippy::type_complexity)]
pub fn rebuild_nav_grid(
    grid: Option<ResMut<NavGrid>>,
    obstacles: Query<(&Transform, &Obstacle)>,
    changed: Query<(), (With<Obstacle>, Or<(Added<Obstacle>, Changed<Transform>)>)>,
    mut removed: RemovedComponents<Obstacle>,
) {
    let Some(mut grid) = grid else { return };
    let removed_any = removed.read().next().is_some();
    if changed.is_empty() && !removed_any {
        return;
    }

    span_scope!("nav_grid_rebuild");
    grid.clear();
    for (transform, obstacle) in &obstacles {
        let center = transform.translation.truncate();
        grid.block_rect(center - obstacle.half_extents, center + obstacle.half_extents);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ARENA: &str = "\
#####
#P..#
#.S.#
#####";

    #[test]
    fn parse_small_arena() {
        let arena = ArenaMap::parse(TEST_ARENA).unwrap();
        assert_eq!(arena.width, 5);
        assert_eq!(arena.height, 4);
        // Top text row is y=3; 'P' is on row 1 → y=2.
        assert_eq!(arena.player_spawn, GridCell { x: 1, y: 2 });
        assert_eq!(arena.agent_spawns.len(), 1);
        assert_eq!(
            arena.agent_spawns[0],
            (ArchetypeKind::Stalker, GridCell { x: 2, y: 1 })
        );
    }

    #[test]
    fn walls_collected() {
        let arena = ArenaMap::parse(TEST_ARENA).unwrap();
        assert!(arena.walls.contains(&GridCell { x: 0, y: 0 }));
        assert!(arena.walls.contains(&GridCell { x: 4, y: 3 }));
        assert!(!arena.walls.contains(&GridCell { x: 1, y: 2 }));
    }

    #[test]
    fn all_archetype_letters_parse() {
        let arena = ArenaMap::parse("P.SFKB").unwrap();
        let kinds: Vec<ArchetypeKind> =
            arena.agent_spawns.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArchetypeKind::Stalker,
                ArchetypeKind::Flanker,
                ArchetypeKind::Skirmisher,
                ArchetypeKind::Bomber,
            ]
        );
    }

    #[test]
    fn malformed_arena_no_player() {
        let result = ArenaMap::parse("####\n#..#\n####");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("No player spawn"));
    }

    #[test]
    fn malformed_arena_bad_char() {
        let result = ArenaMap::parse("####\n#P?#\n####");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Unknown arena character"));
    }

    #[test]
    fn malformed_arena_duplicate_player() {
        let result = ArenaMap::parse("####\n#PP#\n####");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Multiple player spawns"));
    }

    #[test]
    fn ragged_rows_take_max_width() {
        let arena = ArenaMap::parse("#####\n#P#\n#####").unwrap();
        assert_eq!(arena.width, 5);
    }
}
