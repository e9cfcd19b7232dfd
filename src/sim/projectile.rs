//! Bullets
//!
//! Straight-line movers with a short position history for trail rendering.
//! A projectile dies on its first hit or once it leaves the playfield by
//! more than twice its radius (the overshoot lets trails finish off-screen).

use glam::Vec2;

use super::weapon::Weapon;
use crate::unit_from_angle;

/// Trail points kept per projectile (newest first)
pub const TRAIL_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Hue in degrees for the renderer
    pub hue: f32,
    pub active: bool,
    /// Position history for trail rendering (newest first)
    pub trail: Vec<Vec2>,
}

impl Projectile {
    /// Build a projectile from a weapon fired at `angle` from `pos`
    pub fn fire(weapon: &Weapon, pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            vel: unit_from_angle(angle) * weapon.projectile_speed,
            radius: weapon.projectile_radius,
            damage: weapon.damage,
            hue: weapon.hue,
            active: true,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Advance one tick of straight-line motion
    pub fn update(&mut self, dt: f32) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
        self.pos += self.vel * dt;
    }

    /// Whether the projectile is still within the playfield, allowing a
    /// margin of twice its radius past each edge.
    pub fn in_bounds(&self, width: f32, height: f32) -> bool {
        let m = self.radius * 2.0;
        self.pos.x >= -m && self.pos.x <= width + m && self.pos.y >= -m && self.pos.y <= height + m
    }
}
