//! Grid <-> world <-> screen coordinate mapping.
//!
//! Pure functions over matrices + viewport size so the math is testable
//! without a render target; systems feed them from the live camera through
//! the [`ViewState`] resource.
use bevy::prelude::*;
use bevy::render::camera::CameraProjection;

use crate::core::components::{Ball, BallDiameter, GridPos, ScreenRect};
use crate::core::config::GameConfig;
use crate::rendering::camera::ViewerCamera;

/// World-space length of one grid cell: the scene spans `world_radius * 2`
/// and is divided into `grid_size` cells.
pub fn grid_unit_size(world_radius: f32, grid_size: u32) -> f32 {
    (world_radius * 2.0) / grid_size.max(1) as f32
}

/// Grid coordinates to world position on the z = 0 plane.
pub fn grid_to_world(grid_pos: Vec2, unit: f32) -> Vec3 {
    (grid_pos * unit).extend(0.0)
}

/// Grid-space bounding square of a ball.
pub fn grid_bounds(center: Vec2, diameter: f32) -> Rect {
    Rect::from_center_size(center, Vec2::splat(diameter))
}

/// NDC (`[-1, 1]`, y up) to viewport pixels (y down from top-left).
pub fn ndc_to_screen(ndc: Vec2, viewport: Vec2) -> Vec2 {
    let half = viewport * 0.5;
    Vec2::new(ndc.x * half.x + half.x, -(ndc.y * half.y) + half.y)
}

/// Viewport pixels to NDC. Inverse of [`ndc_to_screen`].
pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (screen.x / viewport.x) * 2.0 - 1.0,
        -(screen.y / viewport.y) * 2.0 + 1.0,
    )
}

/// Project a world point through the camera into viewport pixels.
pub fn world_to_screen(world: Vec3, clip_from_world: &Mat4, viewport: Vec2) -> Vec2 {
    let ndc = clip_from_world.project_point3(world);
    ndc_to_screen(ndc.truncate(), viewport)
}

/// Viewport rectangle covering the ball's world-space bounding square
/// (the XY square around the center; the ball layout is planar).
pub fn ball_screen_rect(
    center: Vec3,
    real_radius: f32,
    clip_from_world: &Mat4,
    viewport: Vec2,
) -> Rect {
    let offset = Vec3::new(real_radius, real_radius, 0.0);
    let a = world_to_screen(center - offset, clip_from_world, viewport);
    let b = world_to_screen(center + offset, clip_from_world, viewport);
    // The y flip swaps min/max; from_corners normalizes.
    Rect::from_corners(a, b)
}

/// Camera matrices + viewport captured once per frame for screen-space math.
/// `unit` is the grid cell size so consumers don't re-derive it from config.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub clip_from_world: Mat4,
    pub viewport: Vec2,
    pub unit: f32,
}
impl Default for ViewState {
    fn default() -> Self {
        Self {
            clip_from_world: Mat4::IDENTITY,
            viewport: Vec2::ONE,
            unit: 1.0,
        }
    }
}
impl ViewState {
    pub fn world_to_screen(&self, world: Vec3) -> Vec2 {
        world_to_screen(world, &self.clip_from_world, self.viewport)
    }

    /// Ray through the given viewport point. Unprojects the near and far
    /// clip planes; Bevy's projections are reverse-Z, so near sits at
    /// NDC z = 1.
    pub fn pointer_ray(&self, screen: Vec2) -> Option<Ray3d> {
        let ndc = screen_to_ndc(screen, self.viewport);
        let world_from_clip = self.clip_from_world.inverse();
        let near = world_from_clip.project_point3(ndc.extend(1.0));
        // z = 0 exactly would divide by zero for perspective projections
        let far = world_from_clip.project_point3(ndc.extend(f32::EPSILON));
        if near.is_nan() || far.is_nan() {
            return None;
        }
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d {
            origin: near,
            direction,
        })
    }
}

/// Snapshot the viewer camera's matrices and the window size. Writes only
/// on change so `refresh_screen_rects` can key off change detection.
pub fn capture_view_state(
    cfg: Res<GameConfig>,
    camera_q: Query<(&Projection, &GlobalTransform), With<ViewerCamera>>,
    windows: Query<&Window>,
    mut view: ResMut<ViewState>,
) {
    let Ok((projection, cam_tf)) = camera_q.single() else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Vec2::new(window.width(), window.height());
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return;
    }
    let next = ViewState {
        clip_from_world: projection.get_clip_from_view() * cam_tf.compute_matrix().inverse(),
        viewport,
        unit: grid_unit_size(cfg.grid.world_radius, cfg.grid.size),
    };
    if *view != next {
        *view = next;
    }
}

/// Recompute every ball's cached [`ScreenRect`] when the camera or window
/// changed, or when balls were added / repositioned. Marquee selection
/// reads these rects, so stale caches would select against an old view.
pub fn refresh_screen_rects(
    view: Res<ViewState>,
    fresh: Query<(), Or<(Added<ScreenRect>, Changed<GridPos>)>>,
    mut q: Query<(&GridPos, &BallDiameter, &mut ScreenRect), With<Ball>>,
) {
    if !view.is_changed() && fresh.is_empty() {
        return;
    }
    for (pos, diameter, mut rect) in q.iter_mut() {
        let center = grid_to_world(pos.0, view.unit);
        let real_radius = diameter.0 * view.unit / 2.0;
        let next = ball_screen_rect(center, real_radius, &view.clip_from_world, view.viewport);
        if rect.0 != next {
            rect.0 = next;
        }
    }
}
