//! Snake enemies
//!
//! Snakes spawn just outside a random playfield edge and home in on the
//! player with a perpendicular wobble so waves don't march in straight
//! lines. Each snake drags a chain of body segments behind its head; the
//! chain is a constrained follow-the-leader, not a physics sim.
//!
//! Stats come from base constants scaled twice: by the level's difficulty
//! multipliers AND a per-instance jitter, so no two snakes in a wave are
//! identical.

use glam::Vec2;
use rand::Rng;

use super::progression::Difficulty;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct Snake {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub base_speed: f32,
    pub health: f32,
    pub max_health: f32,
    /// Experience awarded on death
    pub xp_value: u32,
    /// Hue in degrees: green for weak, sliding toward red/purple as
    /// combined strength grows, saturating at 3x.
    pub hue: f32,
    pub frozen: bool,
    pub active: bool,
    /// Trailing body segments, head-adjacent first
    pub segments: Vec<Vec2>,
    /// Remaining hit-flash time (visual, decays even while frozen)
    pub hit_flash: f32,
    wobble_phase: f32,
}

impl Snake {
    /// Spawn a snake at a random edge, just outside the visible bounds.
    pub fn spawn(
        rng: &mut impl Rng,
        difficulty: &Difficulty,
        width: f32,
        height: f32,
    ) -> Self {
        let size_factor: f32 = rng.random_range(0.8..1.3);
        let speed_factor: f32 = rng.random_range(0.8..1.2);

        let radius = SNAKE_BASE_RADIUS * size_factor;
        let pos = match rng.random_range(0..4u32) {
            0 => Vec2::new(rng.random_range(0.0..width), -radius * 2.0),
            1 => Vec2::new(rng.random_range(0.0..width), height + radius * 2.0),
            2 => Vec2::new(-radius * 2.0, rng.random_range(0.0..height)),
            _ => Vec2::new(width + radius * 2.0, rng.random_range(0.0..height)),
        };

        let speed = SNAKE_BASE_SPEED * difficulty.speed_mult * speed_factor;
        let max_health = SNAKE_BASE_HEALTH * difficulty.health_mult * size_factor;
        let strength = size_factor * difficulty.health_mult;
        let xp_value = (SNAKE_BASE_XP as f32 * strength).round() as u32;

        // Green (120) shifting through red toward purple; saturates at 3x
        let t = ((strength - 1.0) / 2.0).clamp(0.0, 1.0);
        let hue = (120.0 - 200.0 * t).rem_euclid(360.0);

        Self {
            pos,
            radius,
            speed,
            base_speed: speed,
            health: max_health,
            max_health,
            xp_value,
            hue,
            frozen: false,
            active: true,
            segments: vec![pos; SNAKE_SEGMENTS],
            hit_flash: 0.0,
            wobble_phase: rng.random_range(0.0..std::f32::consts::TAU),
        }
    }

    /// Advance one tick of pursuit toward `target`.
    ///
    /// Frozen snakes skip all movement but the hit-flash timer still decays.
    pub fn update(&mut self, dt: f32, target: Vec2) {
        self.hit_flash = (self.hit_flash - dt).max(0.0);
        if self.frozen {
            return;
        }

        let to_target = target - self.pos;
        let dir = to_target.normalize_or_zero();

        self.wobble_phase += SNAKE_WOBBLE_FREQ * dt;
        let perp = Vec2::new(-dir.y, dir.x);
        let wobble = perp * self.wobble_phase.sin() * SNAKE_WOBBLE_AMPLITUDE;

        self.pos += (dir * self.speed + wobble) * dt;
        self.propagate_segments();
    }

    /// Pull each trailing segment toward its leader, clamped to the maximum
    /// inter-segment spacing.
    fn propagate_segments(&mut self) {
        let mut lead = self.pos;
        for seg in &mut self.segments {
            let delta = lead - *seg;
            if delta.length() > SNAKE_SEGMENT_SPACING {
                *seg = lead - delta.normalize() * SNAKE_SEGMENT_SPACING;
            }
            lead = *seg;
        }
    }

    /// Apply damage; returns true if this crossed the snake to dead.
    /// Health clamps at zero and a kill deactivates immediately.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.active {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.hit_flash = SNAKE_FLASH_SECS;
        if self.health <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }
}
