pub mod config;

pub use config::{BallSeed, GameConfig, GridConfig, SelectionConfig, WindowConfig};
