use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::nav::NavGrid;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera);
        app.add_systems(Update, fit_camera_to_arena);
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Center the camera on the arena and scale it to fit with some padding.
#[span_fn]
fn fit_camera_to_arena(
    grid: Option<Res<NavGrid>>,
    windows: Query<&Window>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    let Some(grid) = grid else { return };
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((mut transform, mut projection)) = cameras.single_mut() else {
        return;
    };

    let size = grid.world_size();
    transform.translation.x = size.x / 2.0;
    transform.translation.y = size.y / 2.0;

    let padding = grid.cell_size() * 2.0;
    let scale_x = (size.x + padding) / window.width();
    let scale_y = (size.y + padding) / window.height();

    if let Projection::Orthographic(ref mut ortho) = *projection {
        ortho.scale = scale_x.max(scale_y);
    }
}
