use bevy::prelude::*;

use crate::core::system::system_order::{DispatchSet, InputCollectSet, RenderSyncSet, ScreenMapSet};
use crate::debug::DebugPlugin;
use crate::gameplay::spawn::BallSpawnPlugin;
use crate::interaction::aggregate::{BallSplit, BallsMerged};
use crate::interaction::dispatcher::{dispatch_events, InputDispatcher};
use crate::interaction::pointer::{
    command_input_system, pointer_input_system, PointerConsumed, PointerGesture,
};
use crate::interaction::select::SelectPlugin;
use crate::interaction::session::auto_close::AutoClosePlugin;
use crate::rendering::ball_visual::BallVisualPlugin;
use crate::rendering::camera::CameraPlugin;
use crate::rendering::feedback::FeedbackPlugin;
use crate::spatial::grid::{capture_view_state, refresh_screen_rects, ViewState};

pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                InputCollectSet,
                ScreenMapSet.after(InputCollectSet),
                DispatchSet.after(ScreenMapSet),
                RenderSyncSet.after(DispatchSet),
            ),
        )
        .init_resource::<InputDispatcher>()
        .init_resource::<PointerGesture>()
        .init_resource::<PointerConsumed>()
        .init_resource::<ViewState>()
        .add_event::<BallsMerged>()
        .add_event::<BallSplit>()
        .add_plugins((
            CameraPlugin,
            BallSpawnPlugin,
            BallVisualPlugin,
            SelectPlugin,
            FeedbackPlugin,
            AutoClosePlugin,
            DebugPlugin,
        ))
        .add_systems(
            Update,
            (pointer_input_system, command_input_system).in_set(InputCollectSet),
        )
        .add_systems(
            Update,
            (capture_view_state, refresh_screen_rects)
                .chain()
                .in_set(ScreenMapSet),
        )
        .add_systems(Update, dispatch_events.in_set(DispatchSet));
    }
}
