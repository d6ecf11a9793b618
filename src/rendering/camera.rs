use bevy::prelude::*;
use bevy::render::camera::{CameraProjection, OrthographicProjection, ScalingMode};

use crate::core::config::GameConfig;

/// Marker for the single viewer camera.
#[derive(Component)]
pub struct ViewerCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_camera, setup_lights));
    }
}

/// Orthographic camera straight above the grid plane: positioned at
/// `z = world_radius * 10`, near plane 1, far plane at the same distance.
/// The horizontal half-extent is twice the scene radius; the vertical
/// extent follows the window aspect (and therefore window resizes).
fn setup_camera(mut commands: Commands, cfg: Res<GameConfig>, windows: Query<&Window>) {
    let radius = cfg.grid.world_radius;
    let view_width = radius * 4.0;
    let mut projection = OrthographicProjection {
        near: 1.0,
        far: radius * 10.0,
        viewport_origin: Vec2::splat(0.5),
        scaling_mode: ScalingMode::FixedHorizontal {
            viewport_width: view_width,
        },
        scale: 1.0,
        area: Rect::from_center_size(Vec2::ZERO, Vec2::splat(view_width)),
    };
    if let Ok(window) = windows.single() {
        projection.update(window.width(), window.height());
    }
    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(projection),
        Transform::from_xyz(0.0, 0.0, radius * 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        ViewerCamera,
    ));
}

fn setup_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.25, 0.25, 0.25),
        brightness: 300.0,
        affects_lightmapped_meshes: false,
    });
    // Key light shining along the camera axis onto the ball plane
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 200.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
