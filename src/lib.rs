//! Serpent Siege - an edge-spawn arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, progression)
//! - `settings`: Persisted preferences (mute flag)
//! - `audio`: Web Audio cue synthesis (wasm only)
//! - `render`: Canvas2D drawing of the renderable state (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod render;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Maximum usable frame delta (seconds). Stalled frames are clamped to
    /// this so entities never teleport across the playfield.
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions (logical pixels, origin top-left)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 16.0;
    pub const PLAYER_SPEED: f32 = 220.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    /// Invulnerability window granted after taking a hit (seconds)
    pub const PLAYER_INVULN_SECS: f32 = 1.0;

    /// Snake base stats, scaled by difficulty and per-instance jitter
    pub const SNAKE_BASE_RADIUS: f32 = 14.0;
    pub const SNAKE_BASE_SPEED: f32 = 70.0;
    pub const SNAKE_BASE_HEALTH: f32 = 30.0;
    pub const SNAKE_BASE_XP: u32 = 10;
    /// Trailing body segments per snake
    pub const SNAKE_SEGMENTS: usize = 5;
    /// Maximum spacing between chained segments
    pub const SNAKE_SEGMENT_SPACING: f32 = 11.0;
    /// Hit-flash duration after taking damage (seconds)
    pub const SNAKE_FLASH_SECS: f32 = 0.12;
    /// Perpendicular wobble applied to pursuit movement
    pub const SNAKE_WOBBLE_AMPLITUDE: f32 = 30.0;
    pub const SNAKE_WOBBLE_FREQ: f32 = 6.0;

    /// Contact damage: base plus a term proportional to the snake's radius
    pub const CONTACT_DAMAGE_BASE: f32 = 10.0;
    pub const CONTACT_DAMAGE_PER_RADIUS: f32 = 0.5;

    /// Every Nth cumulative kill heals the player (if below max health)
    pub const HEAL_EVERY_KILLS: u32 = 5;
    pub const HEAL_AMOUNT: f32 = 15.0;

    /// Score awarded per experience point
    pub const SCORE_PER_XP: u64 = 10;

    /// Spawn policy: interval shrinks stepwise every 2 levels, floored
    pub const SPAWN_INTERVAL_BASE: f32 = 2.0;
    pub const SPAWN_INTERVAL_STEP: f32 = 0.15;
    pub const SPAWN_INTERVAL_MIN: f32 = 0.5;
    pub const ENEMY_CAP_BASE: u32 = 5;
    pub const ENEMY_CAP_PER_LEVEL: u32 = 2;

    /// Area damage dealt by the blast power-pack
    pub const BLAST_DAMAGE: f32 = 40.0;

    /// Ally (summoned helper) tuning
    pub const ALLY_RADIUS: f32 = 14.0;
    pub const ALLY_DESCENT_SPEED: f32 = 150.0;
    pub const ALLY_DRIFT_AMPLITUDE: f32 = 60.0;
    pub const ALLY_LANDING_SECS: f32 = 0.6;
    pub const ALLY_LIFESPAN_SECS: f32 = 12.0;
    pub const ALLY_DESPAWN_SECS: f32 = 1.0;
    pub const ALLY_SPEED: f32 = 90.0;
    /// Preferred engagement distance; the ally retreats inside 70% of it
    pub const ALLY_KEEP_DISTANCE: f32 = 140.0;
    pub const ALLY_FIRE_INTERVAL: f32 = 0.5;
    /// Idle rotation speed when no target is alive (radians/sec)
    pub const ALLY_IDLE_SPIN: f32 = 0.8;
}

/// Squared distance between two points
#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_squared()
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Angle of the vector from `from` to `to`, in radians
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit vector for an angle in radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Linear interpolation between `a` and `b` by `t` in [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
