use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Ball Merger".into(),
            auto_close: 0.0,
        }
    }
}

/// Grid placement parameters. `size` is the cell count per axis; the world
/// spans `[-world_radius, world_radius]` on both axes, so one grid unit is
/// `world_radius * 2 / size` world units.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub size: u32,
    pub world_radius: f32,
}
impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 10,
            world_radius: 50.0,
        }
    }
}

/// One ball placed at startup.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BallSeed {
    pub x: f32,
    pub y: f32,
    pub diameter: f32,
    pub color: [f32; 3],
}
impl Default for BallSeed {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            diameter: 1.0,
            color: [0.5, 0.5, 0.5],
        }
    }
}
impl BallSeed {
    pub fn srgb(&self) -> Color {
        Color::srgb(self.color[0], self.color[1], self.color[2])
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Pointer travel (logical px) before a press becomes a marquee drag.
    pub drag_threshold: f32,
    /// Tint applied to selected balls in place of their base color.
    pub highlight: [f32; 3],
}
impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            highlight: [1.0, 0.0, 0.0],
        }
    }
}
impl SelectionConfig {
    pub fn highlight_srgb(&self) -> Color {
        Color::srgb(self.highlight[0], self.highlight[1], self.highlight[2])
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub grid: GridConfig,
    pub balls: Vec<BallSeed>,
    pub selection: SelectionConfig,
    pub draw_grid: bool,
}
impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            grid: Default::default(),
            balls: default_seed_balls(),
            selection: Default::default(),
            draw_grid: false,
        }
    }
}

fn default_seed_balls() -> Vec<BallSeed> {
    vec![
        BallSeed {
            x: -4.0,
            y: -3.0,
            diameter: 1.0,
            color: [0.19, 0.15, 0.24],
        },
        BallSeed {
            x: -3.0,
            y: -2.0,
            diameter: 1.0,
            color: [0.80, 0.48, 0.26],
        },
        BallSeed {
            x: 0.0,
            y: 0.0,
            diameter: 2.0,
            color: [0.47, 0.64, 0.35],
        },
        BallSeed {
            x: 3.0,
            y: 1.0,
            diameter: 3.0,
            color: [0.00, 0.27, 0.68],
        },
    ]
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Merge several RON files in order (later files override earlier keys)
    /// and deserialize the result. Unreadable or unparsable files are
    /// reported, not fatal.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut ron::value::Value, overlay: ron::value::Value) {
            use ron::value::Value;
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        let mut replaced = false;
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                merge_value(ev, incoming.take().unwrap());
                                replaced = true;
                                break;
                            }
                        }
                        if !replaced {
                            bm.insert(k, incoming.unwrap());
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        if let Some(val) = merged {
            match val.clone().into_rust::<GameConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => (GameConfig::default(), used, {
                    let mut evec = errors;
                    evec.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    evec
                }),
            }
        } else {
            (GameConfig::default(), used, errors)
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        }
        if self.grid.size == 0 {
            w.push("grid.size is 0; grid unit size degenerates".into());
        }
        if self.grid.world_radius <= 0.0 {
            w.push(format!(
                "grid.world_radius {} must be > 0",
                self.grid.world_radius
            ));
        }
        if self.balls.is_empty() {
            w.push("balls list is empty; nothing will spawn".into());
        }
        let half_grid = self.grid.size as f32 / 2.0;
        for (i, seed) in self.balls.iter().enumerate() {
            if seed.diameter <= 0.0 {
                w.push(format!("balls[{i}].diameter must be > 0"));
            }
            if seed.x.abs() > half_grid || seed.y.abs() > half_grid {
                w.push(format!(
                    "balls[{i}] at ({}, {}) lies outside the {}-cell grid",
                    seed.x, seed.y, self.grid.size
                ));
            }
            for (c, ch) in seed.color.iter().enumerate() {
                if !(0.0..=1.0).contains(ch) {
                    w.push(format!("balls[{i}].color[{c}] {ch} outside 0..1"));
                }
            }
        }
        if self.selection.drag_threshold < 0.0 {
            w.push("selection.drag_threshold negative -> every press becomes a drag".into());
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_clean() {
        assert!(GameConfig::default().validate().is_empty());
    }

    #[test]
    fn default_seeds_match_layout() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.balls.len(), 4);
        assert_eq!(cfg.balls[0].x, -4.0);
        assert_eq!(cfg.balls[0].y, -3.0);
        assert_eq!(cfg.balls[2].diameter, 2.0);
    }

    #[test]
    fn out_of_grid_seed_is_flagged() {
        let mut cfg = GameConfig::default();
        cfg.balls[0].x = 9.0; // half-grid for size 10 is 5
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("outside")));
    }

    #[test]
    fn zero_grid_size_is_flagged() {
        let mut cfg = GameConfig::default();
        cfg.grid.size = 0;
        assert!(!cfg.validate().is_empty());
    }
}
