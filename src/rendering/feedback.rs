//! Command buttons and the user-facing rejection message line.
use bevy::prelude::*;

use crate::core::system::system_order::{InputCollectSet, RenderSyncSet};
use crate::interaction::dispatcher::{
    EventPayload, HandlerOwner, InputDispatcher, COMMAND_REJECTED, MERGE_COMMAND, SPLIT_COMMAND,
};
use crate::interaction::pointer::{pointer_input_system, PointerConsumed};

const FEEDBACK_SECS: f32 = 3.0;

/// Latest user-facing command message and how long it stays on screen.
#[derive(Resource, Debug, Default)]
pub struct CommandFeedback {
    pub message: String,
    pub remaining: f32,
}
impl CommandFeedback {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.remaining = FEEDBACK_SECS;
    }
}

#[derive(Component)]
struct FeedbackText;

/// On-screen control bound to a command event name.
#[derive(Component)]
pub struct CommandButton(pub &'static str);

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandFeedback>()
            .add_systems(Startup, (spawn_command_ui, register_feedback_handler))
            .add_systems(
                Update,
                (
                    ui_pointer_capture.before(pointer_input_system),
                    command_button_system,
                )
                    .in_set(InputCollectSet),
            )
            .add_systems(Update, feedback_update.in_set(RenderSyncSet));
    }
}

fn register_feedback_handler(mut dispatcher: ResMut<InputDispatcher>) {
    dispatcher.on(COMMAND_REJECTED, HandlerOwner::Viewer, |world, payload| {
        if let EventPayload::Rejected { message } = payload {
            let message = message.clone();
            world.resource_mut::<CommandFeedback>().show(message);
        }
    });
}

fn spawn_command_ui(mut commands: Commands) {
    commands.spawn((
        Text::new(String::new()),
        TextFont {
            font_size: 16.0,
            ..Default::default()
        },
        TextColor(Color::srgb(1.0, 0.85, 0.4)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(48.0),
            left: Val::Px(12.0),
            ..Default::default()
        },
        FeedbackText,
    ));

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(8.0),
            left: Val::Px(8.0),
            column_gap: Val::Px(8.0),
            ..Default::default()
        })
        .with_children(|row| {
            for (label, command) in [("Merge", MERGE_COMMAND), ("Split", SPLIT_COMMAND)] {
                row.spawn((
                    Button,
                    CommandButton(command),
                    Node {
                        padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
                        ..Default::default()
                    },
                    BackgroundColor(Color::srgb(0.17, 0.17, 0.2)),
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new(label),
                        TextFont {
                            font_size: 14.0,
                            ..Default::default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });
            }
        });
}

/// Presses that land on a UI control must not start a selection gesture.
fn ui_pointer_capture(
    interactions: Query<&Interaction, With<Button>>,
    mut consumed: ResMut<PointerConsumed>,
) {
    consumed.0 = interactions.iter().any(|i| !matches!(i, Interaction::None));
}

fn command_button_system(
    interactions: Query<(&Interaction, &CommandButton), Changed<Interaction>>,
    mut dispatcher: ResMut<InputDispatcher>,
) {
    for (interaction, button) in interactions.iter() {
        if matches!(interaction, Interaction::Pressed) {
            dispatcher.emit(button.0, EventPayload::Command);
        }
    }
}

fn feedback_update(
    time: Res<Time>,
    mut feedback: ResMut<CommandFeedback>,
    mut q: Query<&mut Text, With<FeedbackText>>,
) {
    let Ok(mut text) = q.single_mut() else {
        return;
    };
    if feedback.remaining > 0.0 {
        feedback.remaining -= time.delta_secs();
        if text.0 != feedback.message {
            text.0 = feedback.message.clone();
        }
        if feedback.remaining <= 0.0 {
            feedback.message.clear();
            text.0.clear();
        }
    } else if !text.0.is_empty() {
        text.0.clear();
    }
}
