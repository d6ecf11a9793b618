//! Sphere visuals for balls and the per-frame selection color sync.
use bevy::prelude::*;

use crate::core::components::{Ball, BallColor, BallDiameter, BallSphereVisual, BallState};
use crate::core::config::GameConfig;
use crate::core::system::system_order::RenderSyncSet;
use crate::spatial::grid::grid_unit_size;

/// Shared unit sphere; each ball scales it to its real diameter.
#[derive(Resource)]
pub struct BallSphereMesh(pub Handle<Mesh>);

pub struct BallVisualPlugin;

impl Plugin for BallVisualPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_sphere_mesh).add_systems(
            Update,
            (attach_ball_visuals, sync_ball_colors)
                .chain()
                .in_set(RenderSyncSet),
        );
    }
}

fn init_sphere_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(BallSphereMesh(meshes.add(Mesh::from(Sphere { radius: 0.5 }))));
}

/// Give every newly added ball (seed or merge-created aggregate) a sphere
/// mesh child with its own material instance, sized to the real diameter.
fn attach_ball_visuals(
    mut commands: Commands,
    mesh: Res<BallSphereMesh>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<GameConfig>,
    fresh: Query<(Entity, &BallDiameter, &BallColor), Added<Ball>>,
) {
    let unit = grid_unit_size(cfg.grid.world_radius, cfg.grid.size);
    for (entity, diameter, color) in fresh.iter() {
        let real_diameter = diameter.0 * unit;
        let material = materials.add(StandardMaterial {
            base_color: color.0,
            ..default()
        });
        commands.entity(entity).with_children(|parent| {
            parent.spawn((
                Mesh3d(mesh.0.clone()),
                MeshMaterial3d(material),
                Transform::from_scale(Vec3::splat(real_diameter)),
                BallSphereVisual,
            ));
        });
    }
}

/// Project domain state onto materials once per frame: selected balls show
/// the highlight tint, everything else its base color. The frame-local pass
/// is the only writer, so no highlight state lingers anywhere else.
fn sync_ball_colors(
    cfg: Res<GameConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    balls: Query<(&BallState, &BallColor, &Children), With<Ball>>,
    visuals: Query<&MeshMaterial3d<StandardMaterial>, With<BallSphereVisual>>,
) {
    let highlight = cfg.selection.highlight_srgb();
    for (state, base, children) in balls.iter() {
        let target = if state.selected { highlight } else { base.0 };
        for child in children.iter() {
            let Ok(material) = visuals.get(child) else {
                continue;
            };
            if let Some(mat) = materials.get_mut(&material.0) {
                if mat.base_color != target {
                    mat.base_color = target;
                }
            }
        }
    }
}
