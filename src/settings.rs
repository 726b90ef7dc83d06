//! Session settings
//!
//! Geometry, tick rate and demo knobs. Physics tunables live in [`crate::consts`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Field;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application name (window title for hosts that have one)
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Ticks per second
    pub fps: u32,
    /// RNG seed for bullet sizes/colors and generated targets
    pub seed: u64,
    /// Targets spawned by the demo binary
    pub target_count: u32,
    /// Cannon pivot; defaults to the middle of the left edge
    pub cannon_origin: Vec2,

    // === Demo pilot ===
    /// How long the pilot holds the fire button (ms)
    pub demo_hold_ms: u64,
    /// Ticks between pilot shots
    pub demo_cooldown_ticks: u64,
    /// Pilot requests a stop after this many ticks
    pub demo_max_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::setup("Cannon Range", FIELD_WIDTH, FIELD_HEIGHT)
    }
}

impl Settings {
    /// Settings for a field of the given size; the cannon sits at half height
    pub fn setup(name: &str, width: f32, height: f32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            fps: FPS,
            seed: 1,
            target_count: 5,
            cannon_origin: Vec2::new(CANNON_X, height / 2.0),
            demo_hold_ms: 2000,
            demo_cooldown_ticks: 50,
            demo_max_ticks: 60 * FPS as u64,
        }
    }

    pub fn field(&self) -> Field {
        Field::new(self.width, self.height)
    }

    /// Duration of one tick
    pub fn tick_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps.max(1)))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0.0 && self.height > 0.0,
            "field must have positive size, got {}x{}",
            self.width,
            self.height
        );
        ensure!(self.fps > 0, "fps must be > 0");
        ensure!(
            self.field().contains(self.cannon_origin),
            "cannon origin {} is outside the field",
            self.cannon_origin
        );
        Ok(())
    }

    /// Read settings from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading settings {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("invalid settings {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Like [`Settings::from_json_file`], but falls back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::from_json_file(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err:#}, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }
}
