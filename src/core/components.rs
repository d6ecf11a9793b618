use bevy::prelude::*;

/// Marker component identifying a ball entity (owns the sphere visual child).
#[derive(Component)]
pub struct Ball;

/// Diameter in grid units. An aggregate's diameter is the sum of its
/// children's diameters at merge time.
#[derive(Component, Debug, Deref, DerefMut, Copy, Clone, PartialEq)]
pub struct BallDiameter(pub f32);

/// Ball center in grid units.
#[derive(Component, Debug, Deref, DerefMut, Copy, Clone, PartialEq)]
pub struct GridPos(pub Vec2);

/// Base tint. Selection highlight is applied render-side each frame and
/// never written back here.
#[derive(Component, Debug, Copy, Clone, PartialEq)]
pub struct BallColor(pub Color);

/// Selected flag + timestamp of last change (seconds since startup).
#[derive(Component, Debug, Copy, Clone)]
pub struct BallState {
    pub selected: bool,
    pub last_change: f32,
}
impl BallState {
    pub fn new(now: f32) -> Self {
        Self {
            selected: false,
            last_change: now,
        }
    }
}

/// Entity ids of the balls hidden into this aggregate, in selection order.
/// Present only on balls created by a merge; immutable after construction.
/// Ids are non-owning: the children stay alive (hidden) in the world so a
/// later split can restore them.
#[derive(Component, Debug, Clone)]
pub struct AggregateChildren(pub Vec<Entity>);

/// Cached projection of the ball's world-space bounding square onto the
/// viewport. Refreshed when the camera matrices or the window size change.
#[derive(Component, Debug, Copy, Clone, Default, PartialEq)]
pub struct ScreenRect(pub Rect);

/// Tag component for the sphere mesh child.
#[derive(Component)]
pub struct BallSphereVisual;
