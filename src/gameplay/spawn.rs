//! Seed ball placement and the shared ball component bundle.
use bevy::prelude::*;

use crate::core::components::{Ball, BallColor, BallDiameter, BallState, GridPos, ScreenRect};
use crate::core::config::GameConfig;
use crate::spatial::grid::{grid_to_world, grid_unit_size};

pub struct BallSpawnPlugin;

impl Plugin for BallSpawnPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_seed_balls);
    }
}

/// Components shared by every ball, leaf or aggregate. The sphere visual is
/// attached separately by the rendering layer; merge-created balls add
/// `AggregateChildren` on top.
pub fn ball_bundle(
    grid_pos: Vec2,
    diameter: f32,
    color: Color,
    unit: f32,
    now: f32,
) -> impl Bundle {
    (
        Ball,
        GridPos(grid_pos),
        BallDiameter(diameter),
        BallColor(color),
        BallState::new(now),
        ScreenRect::default(),
        Transform::from_translation(grid_to_world(grid_pos, unit)),
        GlobalTransform::default(),
        Visibility::Visible,
    )
}

fn spawn_seed_balls(mut commands: Commands, cfg: Res<GameConfig>, time: Res<Time>) {
    let unit = grid_unit_size(cfg.grid.world_radius, cfg.grid.size);
    let now = time.elapsed_secs();
    for seed in &cfg.balls {
        commands.spawn(ball_bundle(
            Vec2::new(seed.x, seed.y),
            seed.diameter,
            seed.srgb(),
            unit,
            now,
        ));
    }
    info!(
        "spawned {} seed ball(s) on a {}-cell grid (unit {})",
        cfg.balls.len(),
        cfg.grid.size,
        unit
    );
}
