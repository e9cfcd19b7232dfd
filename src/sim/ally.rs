//! The summoned helper unit
//!
//! A small finite state machine:
//! `Descending -> Landing -> Active -> Despawning -> Inactive`
//!
//! The ally drops in from above with a lateral drift, pauses on its landing
//! line, then fights with a snapshot of the summoner's weapon until its
//! lifespan runs out and it fades away. It never shoots before `Active` and
//! never moves while `Despawning`. Its target is an index into the live
//! enemy collection, re-resolved every tick so compaction can never leave it
//! pointing at a corpse.

use glam::Vec2;
use rand::Rng;

use super::enemy::Snake;
use super::player::spread_shots;
use super::projectile::Projectile;
use super::weapon::Weapon;
use crate::consts::*;
use crate::{angle_between, unit_from_angle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllyPhase {
    /// Dropping straight down with sinusoidal drift
    Descending,
    /// Holding position for the touchdown dust-cloud window
    Landing,
    /// Fighting: track nearest snake, keep distance, fire on cooldown
    Active,
    /// Fading out; no movement, no shooting
    Despawning,
    /// Eligible for removal
    Inactive,
}

#[derive(Debug, Clone)]
pub struct Ally {
    pub pos: Vec2,
    pub rotation: f32,
    pub radius: f32,
    /// Snapshot of the summoner's weapon at summon time
    pub weapon: Weapon,
    pub phase: AllyPhase,
    /// Render opacity; fades linearly to zero while despawning
    pub opacity: f32,
    /// Index of the current target in the enemy collection, if any
    pub target: Option<usize>,
    landing_y: f32,
    landing_timer: f32,
    active_time: f32,
    lifespan: f32,
    despawn_timer: f32,
    fire_cooldown: f32,
    drift_phase: f32,
}

impl Ally {
    /// Summon above the field, descending toward the summoner's latitude.
    pub fn summon(summoner_pos: Vec2, weapon: Weapon) -> Self {
        Self {
            pos: Vec2::new(
                summoner_pos.x.clamp(ALLY_RADIUS, FIELD_WIDTH - ALLY_RADIUS),
                -ALLY_RADIUS * 2.0,
            ),
            rotation: std::f32::consts::FRAC_PI_2,
            radius: ALLY_RADIUS,
            weapon,
            phase: AllyPhase::Descending,
            opacity: 1.0,
            target: None,
            landing_y: summoner_pos.y.clamp(100.0, FIELD_HEIGHT - 100.0),
            landing_timer: 0.0,
            active_time: 0.0,
            lifespan: ALLY_LIFESPAN_SECS,
            despawn_timer: 0.0,
            fire_cooldown: 0.0,
            drift_phase: 0.0,
        }
    }

    /// Advance the state machine one tick. Returns projectiles fired
    /// (only ever non-empty in the `Active` phase).
    pub fn update(&mut self, dt: f32, snakes: &[Snake], rng: &mut impl Rng) -> Vec<Projectile> {
        match self.phase {
            AllyPhase::Descending => {
                self.drift_phase += 2.0 * dt;
                self.pos.y += ALLY_DESCENT_SPEED * dt;
                self.pos.x += self.drift_phase.sin() * ALLY_DRIFT_AMPLITUDE * dt;
                self.pos.x = self.pos.x.clamp(self.radius, FIELD_WIDTH - self.radius);
                if self.pos.y >= self.landing_y {
                    self.pos.y = self.landing_y;
                    self.landing_timer = ALLY_LANDING_SECS;
                    self.phase = AllyPhase::Landing;
                }
                Vec::new()
            }
            AllyPhase::Landing => {
                self.landing_timer -= dt;
                if self.landing_timer <= 0.0 {
                    self.active_time = 0.0;
                    self.phase = AllyPhase::Active;
                }
                Vec::new()
            }
            AllyPhase::Active => {
                self.active_time += dt;
                if self.active_time >= self.lifespan {
                    self.despawn_timer = ALLY_DESPAWN_SECS;
                    self.phase = AllyPhase::Despawning;
                    return Vec::new();
                }
                self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

                self.target = nearest_live(snakes, self.pos);
                let Some(idx) = self.target else {
                    // Nothing alive: idle and slowly rotate
                    self.rotation += ALLY_IDLE_SPIN * dt;
                    return Vec::new();
                };

                let target_pos = snakes[idx].pos;
                self.rotation = angle_between(self.pos, target_pos);

                // Keep-distance band: advance when far, retreat when crowded
                let dist = (target_pos - self.pos).length();
                let dir = unit_from_angle(self.rotation);
                if dist > ALLY_KEEP_DISTANCE {
                    self.pos += dir * ALLY_SPEED * dt;
                } else if dist < ALLY_KEEP_DISTANCE * 0.7 {
                    self.pos -= dir * ALLY_SPEED * dt;
                }
                self.pos.x = self.pos.x.clamp(self.radius, FIELD_WIDTH - self.radius);
                self.pos.y = self.pos.y.clamp(self.radius, FIELD_HEIGHT - self.radius);

                if self.fire_cooldown <= 0.0 {
                    self.fire_cooldown = ALLY_FIRE_INTERVAL;
                    let muzzle = self.pos + dir * self.radius;
                    return spread_shots(
                        &self.weapon,
                        muzzle,
                        self.rotation,
                        self.weapon.projectile_count,
                        rng,
                    );
                }
                Vec::new()
            }
            AllyPhase::Despawning => {
                self.despawn_timer -= dt;
                self.opacity = (self.despawn_timer / ALLY_DESPAWN_SECS).clamp(0.0, 1.0);
                if self.despawn_timer <= 0.0 {
                    self.opacity = 0.0;
                    self.phase = AllyPhase::Inactive;
                }
                Vec::new()
            }
            AllyPhase::Inactive => Vec::new(),
        }
    }
}

/// Nearest live snake by linear scan; the first one found at the minimum
/// distance wins ties.
fn nearest_live(snakes: &[Snake], from: Vec2) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, snake) in snakes.iter().enumerate() {
        if !snake.active {
            continue;
        }
        let d = (snake.pos - from).length_squared();
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}
