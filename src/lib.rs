pub mod app;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod interaction;
pub mod rendering;
pub mod spatial;

// Curated re-exports (`crate::` keeps the local `core` module unambiguous)
pub use crate::app::game::ViewerPlugin;
pub use crate::core::components::{
    AggregateChildren, Ball, BallColor, BallDiameter, BallState, GridPos, ScreenRect,
};
pub use crate::core::config::{GameConfig, GridConfig, WindowConfig};
pub use crate::interaction::aggregate::{merge_selected, split_selected, MergeSplitError};
