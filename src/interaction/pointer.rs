//! Raw pointer + keyboard input normalized into dispatcher events.
use bevy::prelude::*;

use crate::core::config::GameConfig;
use crate::interaction::dispatcher::{
    EventPayload, InputDispatcher, DRAG_MOVE, DRAG_START, DROP, MERGE_COMMAND, POINTER_DOWN,
    POINTER_MOVE, POINTER_UP, SPLIT_COMMAND,
};

/// Pointer gesture runtime: pressed state, anchor, last position, and
/// whether the press has crossed the drag threshold.
#[derive(Resource, Debug, Default, Clone)]
pub struct PointerGesture {
    pub down: bool,
    pub start: Vec2,
    pub last: Vec2,
    pub dragging: bool,
}

/// Set when the pointer is over a UI control this frame; presses that start
/// there must not begin a selection gesture.
#[derive(Resource, Debug, Default)]
pub struct PointerConsumed(pub bool);

/// Track mouse/touch into [`PointerGesture`] and emit pointer-down/move/up
/// and drag/drop events. A press only becomes a drag once the pointer has
/// travelled `selection.drag_threshold` pixels from its anchor; releasing
/// before that emits a plain pointer-up (tap).
pub fn pointer_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    cfg: Res<GameConfig>,
    consumed: Res<PointerConsumed>,
    mut gesture: ResMut<PointerGesture>,
    mut dispatcher: ResMut<InputDispatcher>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let pointer = touches
        .iter()
        .next()
        .map(|t| t.position())
        .or_else(|| window.cursor_position());
    let pressed = buttons.pressed(MouseButton::Left) || touches.iter().count() > 0;
    let released = buttons.just_released(MouseButton::Left)
        || touches.iter_just_released().next().is_some();

    if let Some(pos) = pointer {
        if pressed && !gesture.down {
            if consumed.0 {
                return;
            }
            gesture.down = true;
            gesture.start = pos;
            gesture.last = pos;
            gesture.dragging = false;
            dispatcher.emit(POINTER_DOWN, EventPayload::Pointer { screen: pos });
        } else if gesture.down && pressed {
            if pos != gesture.last {
                dispatcher.emit(POINTER_MOVE, EventPayload::Pointer { screen: pos });
            }
            gesture.last = pos;
            if !gesture.dragging
                && (pos - gesture.start).length() >= cfg.selection.drag_threshold
            {
                gesture.dragging = true;
                dispatcher.emit(
                    DRAG_START,
                    EventPayload::Drag {
                        start: gesture.start,
                        current: pos,
                    },
                );
            } else if gesture.dragging {
                dispatcher.emit(
                    DRAG_MOVE,
                    EventPayload::Drag {
                        start: gesture.start,
                        current: pos,
                    },
                );
            }
        }
    }

    if gesture.down && (released || !pressed) {
        let end = pointer.unwrap_or(gesture.last);
        if gesture.dragging {
            dispatcher.emit(
                DROP,
                EventPayload::Drag {
                    start: gesture.start,
                    current: end,
                },
            );
        } else {
            dispatcher.emit(POINTER_UP, EventPayload::Pointer { screen: end });
        }
        gesture.down = false;
        gesture.dragging = false;
    }
}

/// Keyboard bindings for the two commands; the same events are also emitted
/// by the on-screen buttons.
pub fn command_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut dispatcher: ResMut<InputDispatcher>,
) {
    if keys.just_pressed(KeyCode::KeyM) {
        dispatcher.emit(MERGE_COMMAND, EventPayload::Command);
    }
    if keys.just_pressed(KeyCode::KeyS) {
        dispatcher.emit(SPLIT_COMMAND, EventPayload::Command);
    }
}
