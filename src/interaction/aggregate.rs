//! Merge/split engine over the active ball collection.
//!
//! Both operations validate before touching anything, so a refused command
//! leaves the collection exactly as it was. They run inside the dispatch
//! step and complete synchronously; render systems never observe a
//! half-merged state.
use bevy::prelude::*;
use rand::Rng;
use std::fmt;

use crate::core::components::{
    AggregateChildren, Ball, BallDiameter, BallState, GridPos,
};
use crate::core::config::GameConfig;
use crate::gameplay::spawn::ball_bundle;
use crate::spatial::grid::{grid_bounds, grid_unit_size};

/// User-facing validation failures. Recoverable: the command is refused and
/// nothing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSplitError {
    /// Merge needs at least two selected balls.
    InsufficientSelection,
    /// Split needs exactly one selected ball.
    InvalidSelectionCount,
    /// The selected ball is a leaf and cannot be split.
    NoChildren,
}

impl fmt::Display for MergeSplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientSelection => write!(f, "Please select more than 2!"),
            Self::InvalidSelectionCount => write!(f, "Please select exactly one"),
            Self::NoChildren => {
                write!(f, "Selected does not have components. Can not separate it!")
            }
        }
    }
}

impl std::error::Error for MergeSplitError {}

/// Fired after a successful merge.
#[derive(Event, Debug, Clone)]
pub struct BallsMerged {
    pub aggregate: Entity,
    pub ball_count: usize,
    pub total_diameter: f32,
    pub center_grid: Vec2,
}

/// Fired after a successful split.
#[derive(Event, Debug, Clone)]
pub struct BallSplit {
    pub aggregate: Entity,
    pub restored: usize,
}

fn selected_visible(world: &mut World) -> Vec<(Entity, Vec2, f32)> {
    let mut q = world
        .query_filtered::<(Entity, &BallState, &GridPos, &BallDiameter, &Visibility), With<Ball>>();
    q.iter(world)
        .filter(|(_, state, _, _, vis)| state.selected && **vis != Visibility::Hidden)
        .map(|(entity, _, pos, diameter, _)| (entity, pos.0, diameter.0))
        .collect()
}

/// Combine the selected balls into one aggregate.
///
/// The selected balls are hidden (not despawned) and recorded as the
/// aggregate's children; the aggregate takes the summed diameter, sits at
/// the center of the union of the children's grid-space bounding squares,
/// and gets a fresh random color.
pub fn merge_selected(world: &mut World) -> Result<Entity, MergeSplitError> {
    let selected = selected_visible(world);
    if selected.len() < 2 {
        return Err(MergeSplitError::InsufficientSelection);
    }

    let now = world.resource::<Time>().elapsed_secs();
    let mut total_diameter = 0.0;
    let mut union = grid_bounds(selected[0].1, selected[0].2);
    for (_, pos, diameter) in &selected {
        total_diameter += diameter;
        union = union.union(grid_bounds(*pos, *diameter));
    }

    for (entity, _, _) in &selected {
        if let Some(mut state) = world.get_mut::<BallState>(*entity) {
            state.selected = false;
            state.last_change = now;
        }
        if let Some(mut vis) = world.get_mut::<Visibility>(*entity) {
            *vis = Visibility::Hidden;
        }
    }

    let children: Vec<Entity> = selected.iter().map(|(entity, _, _)| *entity).collect();
    let ball_count = children.len();
    let center = union.center();
    let unit = {
        let cfg = world.resource::<GameConfig>();
        grid_unit_size(cfg.grid.world_radius, cfg.grid.size)
    };
    let mut rng = rand::thread_rng();
    let color = Color::srgb(
        rng.gen::<f32>() * 0.9 + 0.1,
        rng.gen::<f32>() * 0.9 + 0.1,
        rng.gen::<f32>() * 0.9 + 0.1,
    );

    let aggregate = world
        .spawn(ball_bundle(center, total_diameter, color, unit, now))
        .insert(AggregateChildren(children))
        .id();

    info!(
        "merged {ball_count} ball(s) into {aggregate} (diameter {total_diameter}, center {center})"
    );
    world.send_event(BallsMerged {
        aggregate,
        ball_count,
        total_diameter,
        center_grid: center,
    });
    Ok(aggregate)
}

/// Reverse one merge: restore the aggregate's direct children and remove
/// the aggregate. Children that are themselves aggregates keep their own
/// children hidden; a multi-level combination splits one level at a time.
pub fn split_selected(world: &mut World) -> Result<usize, MergeSplitError> {
    let selected = selected_visible(world);
    if selected.len() != 1 {
        return Err(MergeSplitError::InvalidSelectionCount);
    }
    let aggregate = selected[0].0;
    let children = match world.get::<AggregateChildren>(aggregate) {
        Some(children) if !children.0.is_empty() => children.0.clone(),
        _ => return Err(MergeSplitError::NoChildren),
    };

    let now = world.resource::<Time>().elapsed_secs();
    for child in &children {
        if let Some(mut vis) = world.get_mut::<Visibility>(*child) {
            *vis = Visibility::Visible;
        }
        if let Some(mut state) = world.get_mut::<BallState>(*child) {
            state.last_change = now;
        }
    }

    let restored = children.len();
    world.entity_mut(aggregate).despawn();
    info!("split {aggregate} back into {restored} ball(s)");
    world.send_event(BallSplit {
        aggregate,
        restored,
    });
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::{BallColor, ScreenRect};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.add_event::<BallsMerged>();
        app.add_event::<BallSplit>();
        app
    }

    fn spawn_ball(app: &mut App, pos: Vec2, diameter: f32) -> Entity {
        app.world_mut()
            .spawn(ball_bundle(pos, diameter, Color::WHITE, 10.0, 0.0))
            .id()
    }

    fn select(app: &mut App, entity: Entity) {
        app.world_mut()
            .get_mut::<BallState>(entity)
            .unwrap()
            .selected = true;
    }

    fn ball_count(app: &mut App) -> usize {
        let world = app.world_mut();
        let mut q = world.query_filtered::<(), With<Ball>>();
        q.iter(world).count()
    }

    #[test]
    fn merge_conserves_diameter_and_hides_children() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::new(-4.0, -3.0), 1.0);
        let b = spawn_ball(&mut app, Vec2::new(-3.0, -2.0), 1.0);
        let c = spawn_ball(&mut app, Vec2::new(0.0, 0.0), 2.0);
        select(&mut app, a);
        select(&mut app, b);

        let aggregate = merge_selected(app.world_mut()).expect("merge");

        let world = app.world();
        assert_eq!(world.get::<BallDiameter>(aggregate).unwrap().0, 2.0);
        // Union of [-4.5,-3.5]x[-3.5,-2.5] and [-3.5,-2.5]x[-2.5,-1.5]
        assert_eq!(
            world.get::<GridPos>(aggregate).unwrap().0,
            Vec2::new(-3.5, -2.5)
        );
        assert_eq!(
            world.get::<AggregateChildren>(aggregate).unwrap().0,
            vec![a, b]
        );
        assert_eq!(*world.get::<Visibility>(a).unwrap(), Visibility::Hidden);
        assert_eq!(*world.get::<Visibility>(b).unwrap(), Visibility::Hidden);
        assert_eq!(*world.get::<Visibility>(c).unwrap(), Visibility::Visible);
        // Children are deselected as they are absorbed
        assert!(!world.get::<BallState>(a).unwrap().selected);
        assert!(!world.get::<BallState>(b).unwrap().selected);
    }

    #[test]
    fn split_restores_children_and_removes_aggregate() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::new(-4.0, -3.0), 1.0);
        let b = spawn_ball(&mut app, Vec2::new(-3.0, -2.0), 1.0);
        let color_a = *app.world().get::<BallColor>(a).unwrap();
        select(&mut app, a);
        select(&mut app, b);
        let aggregate = merge_selected(app.world_mut()).expect("merge");

        select(&mut app, aggregate);
        let restored = split_selected(app.world_mut()).expect("split");

        assert_eq!(restored, 2);
        let world = app.world();
        assert!(world.get_entity(aggregate).is_err());
        assert_eq!(*world.get::<Visibility>(a).unwrap(), Visibility::Visible);
        assert_eq!(*world.get::<Visibility>(b).unwrap(), Visibility::Visible);
        // Attributes survive the round trip untouched
        assert_eq!(world.get::<GridPos>(a).unwrap().0, Vec2::new(-4.0, -3.0));
        assert_eq!(world.get::<BallDiameter>(a).unwrap().0, 1.0);
        assert_eq!(*world.get::<BallColor>(a).unwrap(), color_a);
    }

    #[test]
    fn merge_with_one_selected_is_refused() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::ZERO, 1.0);
        spawn_ball(&mut app, Vec2::ONE, 1.0);
        select(&mut app, a);

        assert_eq!(
            merge_selected(app.world_mut()),
            Err(MergeSplitError::InsufficientSelection)
        );
        assert_eq!(ball_count(&mut app), 2);
        let world = app.world();
        assert!(world.get::<BallState>(a).unwrap().selected);
        assert_eq!(*world.get::<Visibility>(a).unwrap(), Visibility::Visible);
    }

    #[test]
    fn hidden_balls_do_not_count_toward_merge_selection() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::ZERO, 1.0);
        let b = spawn_ball(&mut app, Vec2::ONE, 1.0);
        select(&mut app, a);
        select(&mut app, b);
        *app.world_mut().get_mut::<Visibility>(b).unwrap() = Visibility::Hidden;

        assert_eq!(
            merge_selected(app.world_mut()),
            Err(MergeSplitError::InsufficientSelection)
        );
    }

    #[test]
    fn split_leaf_is_refused() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::ZERO, 1.0);
        select(&mut app, a);

        assert_eq!(
            split_selected(app.world_mut()),
            Err(MergeSplitError::NoChildren)
        );
        assert_eq!(ball_count(&mut app), 1);
    }

    #[test]
    fn split_with_two_selected_is_refused() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::ZERO, 1.0);
        let b = spawn_ball(&mut app, Vec2::ONE, 1.0);
        select(&mut app, a);
        select(&mut app, b);

        assert_eq!(
            split_selected(app.world_mut()),
            Err(MergeSplitError::InvalidSelectionCount)
        );
        assert_eq!(ball_count(&mut app), 2);
    }

    #[test]
    fn aggregate_and_children_never_visible_together() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::ZERO, 1.0);
        let b = spawn_ball(&mut app, Vec2::ONE, 1.0);
        select(&mut app, a);
        select(&mut app, b);
        let first = merge_selected(app.world_mut()).expect("merge");

        // Merge the aggregate with a third ball into a second level
        let c = spawn_ball(&mut app, Vec2::new(3.0, 3.0), 2.0);
        select(&mut app, first);
        select(&mut app, c);
        let second = merge_selected(app.world_mut()).expect("second merge");
        assert_eq!(app.world().get::<BallDiameter>(second).unwrap().0, 4.0);

        // One split restores only the first aggregate and c; a and b stay
        // hidden beneath the restored aggregate
        select(&mut app, second);
        split_selected(app.world_mut()).expect("split");
        let world = app.world();
        assert_eq!(*world.get::<Visibility>(first).unwrap(), Visibility::Visible);
        assert_eq!(*world.get::<Visibility>(c).unwrap(), Visibility::Visible);
        assert_eq!(*world.get::<Visibility>(a).unwrap(), Visibility::Hidden);
        assert_eq!(*world.get::<Visibility>(b).unwrap(), Visibility::Hidden);
    }

    #[test]
    fn aggregate_waits_for_screen_rect_refresh() {
        let mut app = test_app();
        let a = spawn_ball(&mut app, Vec2::ZERO, 1.0);
        let b = spawn_ball(&mut app, Vec2::ONE, 1.0);
        select(&mut app, a);
        select(&mut app, b);
        let aggregate = merge_selected(app.world_mut()).expect("merge");
        // Fresh aggregates carry a default rect until the screen-map pass
        assert_eq!(
            app.world().get::<ScreenRect>(aggregate).unwrap().0,
            Rect::default()
        );
    }
}
