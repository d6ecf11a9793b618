//! Selection handlers: click picking and live marquee tracking.
//!
//! Registered on the dispatcher by the viewer at startup; they run inside
//! the exclusive dispatch step with full world access.
use bevy::prelude::*;
use std::collections::HashSet;

use crate::core::components::{Ball, BallDiameter, BallState, ScreenRect};
use crate::interaction::aggregate::{merge_selected, split_selected};
use crate::interaction::dispatcher::{
    EventPayload, HandlerOwner, InputDispatcher, COMMAND_REJECTED, DRAG_MOVE, DRAG_START, DROP,
    MERGE_COMMAND, POINTER_DOWN, POINTER_UP, SPLIT_COMMAND,
};
use crate::spatial::grid::ViewState;
use crate::spatial::marquee::{balls_in_rect, marquee_rect};
use crate::spatial::picking::pick_ball;

pub struct SelectPlugin;

impl Plugin for SelectPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, register_selection_handlers);
    }
}

pub fn register_selection_handlers(mut dispatcher: ResMut<InputDispatcher>) {
    dispatcher.on(POINTER_DOWN, HandlerOwner::Viewer, |world, _| {
        deselect_all_visible(world);
    });
    for event in [DRAG_START, DRAG_MOVE] {
        dispatcher.on(event, HandlerOwner::Viewer, |world, payload| {
            if let EventPayload::Drag { start, current } = payload {
                apply_marquee(world, marquee_rect(*start, *current));
            }
        });
    }
    dispatcher.on(DROP, HandlerOwner::Viewer, |world, payload| {
        if let EventPayload::Drag { start, current } = payload {
            apply_marquee(world, marquee_rect(*start, *current));
        }
    });
    dispatcher.on(POINTER_UP, HandlerOwner::Viewer, |world, payload| {
        if let EventPayload::Pointer { screen } = payload {
            tap_select(world, *screen);
        }
    });
    dispatcher.on(MERGE_COMMAND, HandlerOwner::Viewer, |world, _| {
        if let Err(err) = merge_selected(world) {
            reject(world, MERGE_COMMAND, err.to_string());
        }
    });
    dispatcher.on(SPLIT_COMMAND, HandlerOwner::Viewer, |world, _| {
        if let Err(err) = split_selected(world) {
            reject(world, SPLIT_COMMAND, err.to_string());
        }
    });
}

fn reject(world: &mut World, command: &str, message: String) {
    warn!("{command} rejected: {message}");
    world
        .resource_mut::<InputDispatcher>()
        .emit(COMMAND_REJECTED, EventPayload::Rejected { message });
}

/// A press anywhere clears the selection of every visible ball before a new
/// click or marquee selection is formed.
fn deselect_all_visible(world: &mut World) {
    let now = world.resource::<Time>().elapsed_secs();
    let mut q = world.query_filtered::<(&mut BallState, &Visibility), With<Ball>>();
    for (mut state, vis) in q.iter_mut(world) {
        if state.selected && *vis != Visibility::Hidden {
            state.selected = false;
            state.last_change = now;
        }
    }
}

/// Selection tracks the rectangle live: every drag step re-derives the
/// matching set from the cached screen rects and replaces the selection.
fn apply_marquee(world: &mut World, rect: Rect) {
    let mut q = world.query_filtered::<(Entity, &ScreenRect, &Visibility), With<Ball>>();
    let candidates: Vec<_> = q
        .iter(world)
        .map(|(entity, screen_rect, vis)| (entity, screen_rect.0, *vis != Visibility::Hidden))
        .collect();
    let wanted: HashSet<Entity> = balls_in_rect(rect, candidates).into_iter().collect();

    let now = world.resource::<Time>().elapsed_secs();
    let mut q = world.query_filtered::<(Entity, &mut BallState, &Visibility), With<Ball>>();
    for (entity, mut state, vis) in q.iter_mut(world) {
        if *vis == Visibility::Hidden {
            continue;
        }
        let want = wanted.contains(&entity);
        if state.selected != want {
            state.selected = want;
            state.last_change = now;
        }
    }
}

/// A tap selects the topmost ball under the pointer, if any. The press that
/// preceded it already cleared the previous selection.
fn tap_select(world: &mut World, screen: Vec2) {
    let view = *world.resource::<ViewState>();
    let Some(ray) = view.pointer_ray(screen) else {
        return;
    };
    let mut q =
        world.query_filtered::<(Entity, &Transform, &BallDiameter, &Visibility), With<Ball>>();
    let candidates: Vec<_> = q
        .iter(world)
        .map(|(entity, tf, diameter, vis)| {
            (
                entity,
                tf.translation,
                diameter.0 * view.unit / 2.0,
                *vis != Visibility::Hidden,
            )
        })
        .collect();
    let Some(hit) = pick_ball(&ray, candidates, None) else {
        return;
    };
    let now = world.resource::<Time>().elapsed_secs();
    if let Some(mut state) = world.get_mut::<BallState>(hit) {
        if !state.selected {
            state.selected = true;
            state.last_change = now;
        }
    }
}
