use anyhow::ensure;
use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use ball_merger::{GameConfig, ViewerPlugin};

const BASE_CONFIG: &str = "assets/config/game.ron";

#[derive(Parser, Debug)]
#[command(about = "Grid ball viewer with marquee selection and merge/split")]
struct Cli {
    /// Extra RON config overlays applied on top of assets/config/game.ron
    #[arg(long = "config")]
    config: Vec<PathBuf>,
    /// Exit automatically after N seconds (overrides window.autoClose)
    #[arg(long)]
    auto_close: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // The base config may be absent (defaults apply), but an overlay the
    // user asked for must exist.
    for overlay in &cli.config {
        ensure!(
            overlay.exists(),
            "config overlay not found: {}",
            overlay.display()
        );
    }
    let mut paths = vec![PathBuf::from(BASE_CONFIG)];
    paths.extend(cli.config.iter().cloned());
    let (mut cfg, used, errors) = GameConfig::load_layered(&paths);
    for err in &errors {
        eprintln!("config: {err}");
    }
    if let Some(secs) = cli.auto_close {
        cfg.window.auto_close = secs;
    }
    for warning in cfg.validate() {
        eprintln!("config warning: {warning}");
    }
    if !used.is_empty() {
        println!("config loaded from: {}", used.join(", "));
    }

    App::new()
        .insert_resource(cfg.clone())
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window.title.clone(),
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(ViewerPlugin)
        .run();
    Ok(())
}
