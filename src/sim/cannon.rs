//! Cannon charge controller
//!
//! Holding the fire button charges the cannon. Charge is derived from the time
//! elapsed since the press, so it does not depend on the tick rate.

use std::time::{Duration, Instant};

use glam::Vec2;

use crate::consts::*;
use crate::{Color, angle_between, polar_to_cartesian};

/// Whether the fire button is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeMode {
    #[default]
    Idle,
    Charging { since: Instant },
}

#[derive(Debug, Clone)]
pub struct Cannon {
    /// Fixed pivot and bullet spawn point
    pub origin: Vec2,
    /// Aim angle (radians, screen coordinates)
    pub rotation: f32,
    /// Current charge in `[0, MAX_CHARGE]`
    pub charge: u32,
    mode: ChargeMode,
}

impl Cannon {
    pub fn new(origin: Vec2) -> Self {
        Self {
            origin,
            rotation: 0.0,
            charge: 0,
            mode: ChargeMode::Idle,
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.mode, ChargeMode::Charging { .. })
    }

    /// Start charging; a second press while held is ignored
    pub fn press(&mut self, now: Instant) -> bool {
        if self.is_charging() {
            return false;
        }
        self.mode = ChargeMode::Charging { since: now };
        true
    }

    /// Recompute charge from the hold time (no-op when idle)
    pub fn update(&mut self, now: Instant) {
        if let ChargeMode::Charging { since } = self.mode {
            self.charge = charge_after(now.saturating_duration_since(since));
        }
    }

    /// Stop charging and return the launch velocity for the current charge
    pub fn release(&mut self) -> Option<Vec2> {
        if !self.is_charging() {
            return None;
        }
        let vel = polar_to_cartesian(launch_speed(self.charge), self.rotation);
        self.reset();
        Some(vel)
    }

    /// Point the barrel at a pointer position; junk coordinates are ignored
    pub fn aim(&mut self, pointer: Vec2) {
        if !pointer.is_finite() {
            return;
        }
        self.rotation = angle_between(self.origin, pointer);
    }

    pub(crate) fn reset(&mut self) {
        self.mode = ChargeMode::Idle;
        self.charge = 0;
    }

    pub fn barrel_len(&self) -> f32 {
        barrel_len(self.charge)
    }

    pub fn color(&self) -> Color {
        cannon_color(self.charge)
    }
}

/// Charge reached after holding for `held`
pub fn charge_after(held: Duration) -> u32 {
    let ms = held.as_millis() as f64;
    (CHARGE_RATE * ms).clamp(0.0, MAX_CHARGE as f64) as u32
}

/// Launch speed (pixels/tick) for a charge level
pub fn launch_speed(charge: u32) -> f32 {
    MAX_SPEED * charge.min(MAX_CHARGE) as f32 / MAX_CHARGE as f32
}

/// Barrel length drawn for a charge level
pub fn barrel_len(charge: u32) -> f32 {
    BASE_LEN + MAX_LEN_DELTA * charge.min(MAX_CHARGE) as f32 / MAX_CHARGE as f32
}

/// Barrel color for a charge level; charge does not tint the barrel
pub fn cannon_color(_charge: u32) -> Color {
    Color::BLACK
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cannon() -> Cannon {
        Cannon::new(Vec2::new(CANNON_X, 300.0))
    }

    #[test]
    fn test_full_hold_reaches_max_exactly() {
        let full = Duration::from_millis((MAX_CHARGE as f64 / CHARGE_RATE) as u64);
        assert_eq!(charge_after(full), MAX_CHARGE);
        assert_eq!(charge_after(full * 3), MAX_CHARGE);
        assert_eq!(charge_after(Duration::ZERO), 0);
        assert_eq!(charge_after(Duration::from_millis(49)), 0);
        assert_eq!(charge_after(Duration::from_millis(50)), 1);
    }

    #[test]
    fn test_charge_cycle() {
        let mut c = cannon();
        let t0 = Instant::now();
        assert!(c.press(t0));
        assert!(!c.press(t0 + Duration::from_millis(10)));

        c.update(t0 + Duration::from_millis(1000));
        assert_eq!(c.charge, 20);
        c.update(t0 + Duration::from_millis(5000));
        assert_eq!(c.charge, MAX_CHARGE);

        let vel = c.release().unwrap();
        assert!((vel.length() - MAX_SPEED).abs() < 1e-5);
        assert_eq!(c.charge, 0);
        assert!(!c.is_charging());
        assert!(c.release().is_none());
    }

    #[test]
    fn test_update_while_idle_keeps_zero() {
        let mut c = cannon();
        c.update(Instant::now());
        assert_eq!(c.charge, 0);
    }

    #[test]
    fn test_release_follows_rotation() {
        let mut c = cannon();
        let t0 = Instant::now();
        c.aim(c.origin + Vec2::new(0.0, -10.0));
        c.press(t0);
        c.update(t0 + Duration::from_millis(2500));
        let vel = c.release().unwrap();
        assert!(vel.x.abs() < 1e-5);
        assert!((vel.y + 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_aim_ignores_nan() {
        let mut c = cannon();
        c.aim(c.origin + Vec2::new(1.0, 1.0));
        let before = c.rotation;
        c.aim(Vec2::new(f32::NAN, 3.0));
        assert_eq!(c.rotation, before);
    }

    #[test]
    fn test_aim_while_charging() {
        let mut c = cannon();
        c.press(Instant::now());
        c.aim(c.origin + Vec2::new(-1.0, 0.0));
        assert!((c.rotation.abs() - std::f32::consts::PI).abs() < 1e-6);
        assert!(c.is_charging());
    }

    #[test]
    fn test_visuals() {
        assert_eq!(barrel_len(0), BASE_LEN);
        assert_eq!(barrel_len(MAX_CHARGE), BASE_LEN + MAX_LEN_DELTA);
        assert_eq!(launch_speed(50), MAX_SPEED / 2.0);
        assert_eq!(cannon_color(0), Color::BLACK);
        assert_eq!(cannon_color(MAX_CHARGE), Color::BLACK);
    }

    proptest! {
        #[test]
        fn prop_charge_monotonic_and_clamped(holds in proptest::collection::vec(0u64..20_000, 1..20)) {
            let mut holds = holds;
            holds.sort_unstable();
            let mut c = cannon();
            let t0 = Instant::now();
            c.press(t0);
            let mut last = 0;
            for ms in holds {
                c.update(t0 + Duration::from_millis(ms));
                prop_assert!(c.charge >= last);
                prop_assert!(c.charge <= MAX_CHARGE);
                last = c.charge;
            }
            c.release();
            prop_assert_eq!(c.charge, 0);
        }
    }
}
