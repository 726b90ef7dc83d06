//! Cannon Range - charge the cannon, fire, knock out bouncing targets
//!
//! Core modules:
//! - `sim`: Simulation (registry, kinematics, collisions, cannon, tick)
//! - `render`: Render surface seam and the per-tick render sync pass
//! - `driver`: Fixed-rate session loop and input plumbing
//! - `settings`: Session configuration

pub mod driver;
pub mod render;
pub mod settings;
pub mod sim;

pub use driver::{DemoPilot, InputEvent, InputSource, Session};
pub use render::{RecordingSurface, RenderHandle, RenderSurface, Shape, Transform};
pub use settings::Settings;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Default tick rate (ticks per second)
    pub const FPS: u32 = 100;

    /// Default field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 640.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Velocity multiplier applied to bullets every tick (air drag)
    pub const DRAG: f32 = 0.999;
    /// Downward acceleration applied to bullets after drag (pixels/tick²)
    pub const GRAVITY: f32 = 0.1;

    /// Cannon charge ceiling
    pub const MAX_CHARGE: u32 = 100;
    /// Launch speed at full charge (pixels/tick)
    pub const MAX_SPEED: f32 = 10.0;
    /// Charge gained per millisecond of holding
    pub const CHARGE_RATE: f64 = 0.02;

    /// Cannon origin x; y defaults to half the field height
    pub const CANNON_X: f32 = 50.0;
    /// Barrel thickness
    pub const BARREL_WIDTH: f32 = 5.0;
    /// Barrel length at zero charge
    pub const BASE_LEN: f32 = 25.0;
    /// Extra barrel length at full charge
    pub const MAX_LEN_DELTA: f32 = 100.0;

    /// Bullet/target radius range, upper bound exclusive
    pub const MIN_RADIUS: i32 = 5;
    pub const MAX_RADIUS: i32 = 20;
}

/// RGB color, `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);

    /// `#rrggbb` form for hosts that take CSS-style colors
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

/// Colors handed out to new bullets and targets
pub const PALETTE: [Color; 6] = [
    Color(0xff0000),
    Color(0x0000ff),
    Color(0xffff00),
    Color(0x00ff00),
    Color(0xff00ff),
    Color(0x00ffff),
];

/// Angle of `to` as seen from `from` (radians, screen coordinates)
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle scaled by `len`
#[inline]
pub fn polar_to_cartesian(len: f32, theta: f32) -> Vec2 {
    Vec2::new(len * theta.cos(), len * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color(0xff00ff).to_hex(), "#ff00ff");
        assert_eq!(Color::BLACK.to_hex(), "#000000");
    }

    #[test]
    fn test_angle_between() {
        let origin = Vec2::new(50.0, 300.0);
        assert!(angle_between(origin, Vec2::new(100.0, 300.0)).abs() < 1e-6);
        let down = angle_between(origin, Vec2::new(50.0, 400.0));
        assert!((down - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
