//! Central system ordering labels to make the update sequence explicit.
//! Stages (high-level):
//! 1. InputCollect (gesture tracking, command keys/buttons -> dispatcher queue)
//! 2. ScreenMap (capture camera matrices, refresh cached screen rects)
//! 3. Dispatch (exclusive drain; selection and merge/split handlers run here)
//! 4. RenderSync (visual state application, feedback UI)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputCollectSet; // raw input converted to dispatcher events

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ScreenMapSet; // screen-space caches refreshed before dispatch

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct DispatchSet; // handlers mutate domain state

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct RenderSyncSet; // read-only projection of domain state to visuals
