//! Generic named-event publish/subscribe registry.
//!
//! Decouples pointer/drag/drop and command notifications from both the
//! rendering surface and the domain entities: producers `emit` into a
//! queue, and an exclusive system drains it once per frame, invoking
//! handlers in registration order. Handlers registered under an owner tag
//! can be torn down together, so listener lifetime is explicit instead of
//! being tied to captured closures.
use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::HashMap;

pub const POINTER_DOWN: &str = "pointerdown";
pub const POINTER_MOVE: &str = "pointermove";
pub const POINTER_UP: &str = "pointerup";
pub const DRAG_START: &str = "dragstart";
pub const DRAG_MOVE: &str = "drag";
pub const DROP: &str = "drop";
pub const MERGE_COMMAND: &str = "merge-selected";
pub const SPLIT_COMMAND: &str = "split-selected";
pub const COMMAND_REJECTED: &str = "command-rejected";

/// Payload delivered alongside an event name.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Pointer position in viewport pixels.
    Pointer { screen: Vec2 },
    /// Drag gesture from its anchor to the current pointer position.
    Drag { start: Vec2, current: Vec2 },
    /// A user-facing command with no parameters.
    Command,
    /// A command was refused; `message` is user-presentable.
    Rejected { message: String },
}

/// Who registered a handler; used for batch teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOwner {
    Viewer,
    Ball(Entity),
}

type Handler = Box<dyn FnMut(&mut World, &EventPayload) + Send + Sync>;

struct HandlerEntry {
    owner: HandlerOwner,
    handler: Handler,
}

#[derive(Resource, Default)]
pub struct InputDispatcher {
    handlers: HashMap<String, Vec<HandlerEntry>>,
    queue: Vec<(String, EventPayload)>,
    // Owners unregistered while their handlers were checked out by a
    // dispatch pass; applied when the entries are restored.
    dead_owners: SmallVec<[HandlerOwner; 2]>,
}

impl InputDispatcher {
    /// Register a handler for `event`. Handlers fire in registration order.
    pub fn on(
        &mut self,
        event: &str,
        owner: HandlerOwner,
        handler: impl FnMut(&mut World, &EventPayload) + Send + Sync + 'static,
    ) {
        // A fresh registration revives an owner whose teardown is pending;
        // the teardown only covers handlers registered before it.
        self.dead_owners.retain(|dead| *dead != owner);
        self.handlers.entry(event.to_owned()).or_default().push(HandlerEntry {
            owner,
            handler: Box::new(handler),
        });
    }

    /// Queue an event; it is delivered at the next dispatch drain.
    pub fn emit(&mut self, event: &str, payload: EventPayload) {
        self.queue.push((event.to_owned(), payload));
    }

    /// Remove every handler registered under `owner`, across all events.
    pub fn off_owner(&mut self, owner: HandlerOwner) {
        for entries in self.handlers.values_mut() {
            entries.retain(|e| e.owner != owner);
        }
        if !self.dead_owners.contains(&owner) {
            self.dead_owners.push(owner);
        }
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    fn take_queue(&mut self) -> Vec<(String, EventPayload)> {
        std::mem::take(&mut self.queue)
    }

    fn take_handlers(&mut self, event: &str) -> Vec<HandlerEntry> {
        self.handlers.remove(event).unwrap_or_default()
    }

    fn restore_handlers(&mut self, event: &str, mut entries: Vec<HandlerEntry>) {
        entries.retain(|e| !self.dead_owners.contains(&e.owner));
        // Handlers registered during dispatch keep their later position.
        if let Some(newer) = self.handlers.remove(event) {
            entries.extend(newer);
        }
        if !entries.is_empty() {
            self.handlers.insert(event.to_owned(), entries);
        }
    }
}

/// Events emitted by handlers are delivered in a follow-up pass of the same
/// drain; this bounds handler chains that keep re-emitting.
const MAX_DISPATCH_PASSES: usize = 8;

/// Exclusive system: drain the queue and deliver each event to its handlers
/// in registration order. Handlers get full `World` access, so merge/split
/// complete before control returns here and the render systems never see a
/// half-applied operation.
pub fn dispatch_events(world: &mut World) {
    for _ in 0..MAX_DISPATCH_PASSES {
        let batch = world.resource_mut::<InputDispatcher>().take_queue();
        if batch.is_empty() {
            world.resource_mut::<InputDispatcher>().dead_owners.clear();
            return;
        }
        for (event, payload) in batch {
            let mut entries = world.resource_mut::<InputDispatcher>().take_handlers(&event);
            for entry in entries.iter_mut() {
                (entry.handler)(world, &payload);
            }
            world
                .resource_mut::<InputDispatcher>()
                .restore_handlers(&event, entries);
        }
    }
    let pending = world.resource::<InputDispatcher>().pending_events();
    world.resource_mut::<InputDispatcher>().dead_owners.clear();
    warn!("input dispatcher: {pending} event(s) still queued after {MAX_DISPATCH_PASSES} passes");
}
