//! Debug module: feature-gated runtime stats, interval logging, and gizmo
//! overlays (grid/axes helper, live marquee rectangle).
//! Built only when compiled with `--features debug`.
use bevy::prelude::*;

#[cfg(feature = "debug")]
use crate::core::components::{AggregateChildren, Ball, BallState};
#[cfg(feature = "debug")]
use crate::core::config::GameConfig;
#[cfg(feature = "debug")]
use crate::core::system::system_order::RenderSyncSet;
#[cfg(feature = "debug")]
use crate::interaction::pointer::PointerGesture;
#[cfg(feature = "debug")]
use crate::spatial::grid::{grid_unit_size, ViewState};
#[cfg(feature = "debug")]
use crate::spatial::marquee::marquee_rect;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(feature = "debug")]
        {
            app.init_resource::<DebugState>()
                .init_resource::<DebugStats>()
                .add_systems(
                    Update,
                    (
                        (debug_stats_collect, debug_logging).chain(),
                        debug_draw_grid,
                        debug_draw_marquee,
                    )
                        .in_set(RenderSyncSet),
                );
        }
        #[cfg(not(feature = "debug"))]
        {
            let _ = app;
        }
    }
}

#[cfg(feature = "debug")]
#[derive(Resource, Debug)]
pub struct DebugState {
    pub time_accum: f32,
    pub log_interval: f32,
    pub frame_counter: u64,
}
#[cfg(feature = "debug")]
impl Default for DebugState {
    fn default() -> Self {
        Self {
            time_accum: 0.0,
            log_interval: 2.0,
            frame_counter: 0,
        }
    }
}

#[cfg(feature = "debug")]
#[derive(Resource, Debug, Default)]
pub struct DebugStats {
    pub fps: f32,
    pub ball_count: usize,
    pub visible_count: usize,
    pub selected_count: usize,
    pub aggregate_count: usize,
    pub last_selection_change: f32,
}

#[cfg(feature = "debug")]
fn debug_stats_collect(
    time: Res<Time>,
    mut stats: ResMut<DebugStats>,
    q: Query<(&BallState, &Visibility, Option<&AggregateChildren>), With<Ball>>,
) {
    let dt = time.delta_secs();
    if dt > 0.0 {
        let instant = 1.0 / dt;
        stats.fps = if stats.fps == 0.0 {
            instant
        } else {
            stats.fps * 0.9 + instant * 0.1
        };
    }
    let mut counted = DebugStats {
        fps: stats.fps,
        ..Default::default()
    };
    for (state, vis, children) in q.iter() {
        counted.ball_count += 1;
        if *vis != Visibility::Hidden {
            counted.visible_count += 1;
        }
        if state.selected {
            counted.selected_count += 1;
        }
        if children.is_some() {
            counted.aggregate_count += 1;
        }
        counted.last_selection_change = counted.last_selection_change.max(state.last_change);
    }
    *stats = counted;
}

#[cfg(feature = "debug")]
fn debug_logging(time: Res<Time>, mut state: ResMut<DebugState>, stats: Res<DebugStats>) {
    state.frame_counter += 1;
    state.time_accum += time.delta_secs();
    if state.time_accum >= state.log_interval {
        state.time_accum = 0.0;
        info!(
            "VIEW frame={} t={:.3}s fps={:.1} balls={} visible={} selected={} aggregates={} last_sel_change={:.2}",
            state.frame_counter,
            time.elapsed_secs(),
            stats.fps,
            stats.ball_count,
            stats.visible_count,
            stats.selected_count,
            stats.aggregate_count,
            stats.last_selection_change
        );
    }
}

#[cfg(feature = "debug")]
fn debug_draw_grid(cfg: Res<GameConfig>, mut gizmos: Gizmos) {
    if !cfg.draw_grid {
        return;
    }
    let r = cfg.grid.world_radius;
    let unit = grid_unit_size(r, cfg.grid.size);
    let line_color = Color::srgb(0.25, 0.25, 0.28);
    for i in 0..=cfg.grid.size {
        let offset = -r + i as f32 * unit;
        gizmos.line(
            Vec3::new(offset, -r, 0.0),
            Vec3::new(offset, r, 0.0),
            line_color,
        );
        gizmos.line(
            Vec3::new(-r, offset, 0.0),
            Vec3::new(r, offset, 0.0),
            line_color,
        );
    }
    // axes helper
    gizmos.line(Vec3::ZERO, Vec3::X * r * 1.5, Color::srgb(0.9, 0.2, 0.2));
    gizmos.line(Vec3::ZERO, Vec3::Y * r * 1.5, Color::srgb(0.2, 0.9, 0.2));
    gizmos.line(Vec3::ZERO, Vec3::Z * r * 1.5, Color::srgb(0.2, 0.4, 0.9));
}

/// Draw the active marquee on the grid plane by unprojecting its corners.
#[cfg(feature = "debug")]
fn debug_draw_marquee(gesture: Res<PointerGesture>, view: Res<ViewState>, mut gizmos: Gizmos) {
    if !gesture.dragging {
        return;
    }
    let rect = marquee_rect(gesture.start, gesture.last);
    let corners = [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ];
    let mut points = [Vec3::ZERO; 5];
    for (i, corner) in corners.iter().enumerate() {
        let Some(ray) = view.pointer_ray(*corner) else {
            return;
        };
        if ray.direction.z.abs() < 1e-4 {
            return;
        }
        let t = -ray.origin.z / ray.direction.z;
        points[i] = ray.origin + ray.direction * t;
    }
    points[4] = points[0];
    gizmos.linestrip(points, Color::srgb(1.0, 0.6, 0.1));
}
