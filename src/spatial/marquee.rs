//! Drag-rectangle (marquee) selection against cached screen rects.
use bevy::prelude::*;

/// Normalized screen-space rectangle spanned by a drag gesture.
pub fn marquee_rect(start: Vec2, current: Vec2) -> Rect {
    Rect::from_corners(start, current)
}

/// Balls whose cached screen rect overlaps the drag rectangle.
///
/// Candidates are `(entity, screen_rect, visible)`; a ball qualifies iff it
/// is visible and the 2D intersection is non-empty on both axes. Edge
/// contact alone (zero-area overlap) does not select.
pub fn balls_in_rect<I>(rect: Rect, candidates: I) -> Vec<Entity>
where
    I: IntoIterator<Item = (Entity, Rect, bool)>,
{
    candidates
        .into_iter()
        .filter(|(_, ball_rect, visible)| *visible && !rect.intersect(*ball_rect).is_empty())
        .map(|(entity, _, _)| entity)
        .collect()
}
