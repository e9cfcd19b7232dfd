//! The player avatar
//!
//! Movement comes from latched directional flags, facing from the latest aim
//! point, and shooting from a held fire flag gated by the weapon cooldown.
//! All timers are plain decrementing counters checked once per tick.

use glam::Vec2;
use rand::Rng;

use super::powerup::EffectKind;
use super::projectile::Projectile;
use super::state::InputState;
use super::weapon::Weapon;
use crate::consts::*;
use crate::{angle_between, unit_from_angle};

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub active: bool,
    /// Facing angle toward the current aim point (radians)
    pub rotation: f32,
    pub weapon: Weapon,
    // Power-up flags, toggled by effect kind
    pub rapid_fire: bool,
    pub wide_shot: bool,
    pub shield: bool,
    pub faster_guns: bool,
    /// Remaining invulnerability window (seconds)
    pub invuln: f32,
    /// Shooting-animation timer for the renderer (seconds)
    pub shoot_anim: f32,
    fire_cooldown: f32,
}

impl Player {
    pub fn new(pos: Vec2, weapon: Weapon) -> Self {
        Self {
            pos,
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            active: true,
            rotation: 0.0,
            weapon,
            rapid_fire: false,
            wide_shot: false,
            shield: false,
            faster_guns: false,
            invuln: 0.0,
            shoot_anim: 0.0,
            fire_cooldown: 0.0,
        }
    }

    /// Combined fire-rate multiplier; rate boosts stack multiplicatively.
    pub fn fire_rate_multiplier(&self) -> f32 {
        let mut mult = 1.0;
        if self.rapid_fire {
            mult *= 2.0;
        }
        if self.faster_guns {
            mult *= 1.5;
        }
        mult
    }

    /// Advance one tick: move, face the aim point, run timers, and fire if
    /// the button is held and the cooldown has elapsed. Returns the
    /// projectiles spawned this tick (usually empty).
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputState,
        rng: &mut impl Rng,
        width: f32,
        height: f32,
    ) -> Vec<Projectile> {
        let mut dir = Vec2::ZERO;
        if input.up {
            dir.y -= 1.0;
        }
        if input.down {
            dir.y += 1.0;
        }
        if input.left {
            dir.x -= 1.0;
        }
        if input.right {
            dir.x += 1.0;
        }
        // Normalize so diagonal speed matches axis speed
        self.pos += dir.normalize_or_zero() * self.speed * dt;
        self.pos.x = self.pos.x.clamp(self.radius, width - self.radius);
        self.pos.y = self.pos.y.clamp(self.radius, height - self.radius);

        self.rotation = angle_between(self.pos, input.aim);

        self.invuln = (self.invuln - dt).max(0.0);
        self.shoot_anim = (self.shoot_anim - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        if input.fire && self.fire_cooldown <= 0.0 {
            self.fire_cooldown = self.weapon.fire_interval / self.fire_rate_multiplier();
            self.shoot_anim = 0.15;
            return self.shoot(rng);
        }
        Vec::new()
    }

    /// Spawn this weapon's pellets aimed along the current facing.
    ///
    /// Multi-pellet weapons spread evenly across the weapon arc; a single
    /// pellet gets one random jitter inside it. Always returns a sequence so
    /// call sites never branch on shape.
    pub fn shoot(&self, rng: &mut impl Rng) -> Vec<Projectile> {
        let count = if self.wide_shot {
            self.weapon.projectile_count.max(3)
        } else {
            self.weapon.projectile_count
        };
        let muzzle = self.pos + unit_from_angle(self.rotation) * self.radius;
        spread_shots(&self.weapon, muzzle, self.rotation, count, rng)
    }

    /// Apply damage unless shielded or inside the invulnerability window.
    /// Returns true if this killed the player. Shield absorption is binary.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.shield || self.invuln > 0.0 {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.invuln = PLAYER_INVULN_SECS;
        if self.health <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Heal up to max health
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Set the flag for a timed effect. Kinds that don't map to a player
    /// flag are ignored.
    pub fn apply_effect(&mut self, kind: EffectKind) {
        self.set_effect_flag(kind, true);
    }

    /// Clear the flag for a timed effect on expiry.
    pub fn remove_effect(&mut self, kind: EffectKind) {
        self.set_effect_flag(kind, false);
    }

    fn set_effect_flag(&mut self, kind: EffectKind, on: bool) {
        match kind {
            EffectKind::RapidFire => self.rapid_fire = on,
            EffectKind::WideShot => self.wide_shot = on,
            EffectKind::Shield => self.shield = on,
            EffectKind::FasterGuns => self.faster_guns = on,
            EffectKind::Freeze | EffectKind::Blast | EffectKind::SummonAlly => {}
        }
    }
}

/// Shared pellet-spread logic used by the player and the ally.
pub fn spread_shots(
    weapon: &Weapon,
    muzzle: Vec2,
    aim: f32,
    count: u32,
    rng: &mut impl Rng,
) -> Vec<Projectile> {
    let mut shots = Vec::with_capacity(count as usize);
    if count > 1 {
        let start = aim - weapon.spread / 2.0;
        let step = weapon.spread / (count - 1) as f32;
        for i in 0..count {
            shots.push(Projectile::fire(weapon, muzzle, start + step * i as f32));
        }
    } else {
        let half = weapon.spread / 2.0;
        let jitter = rng.random_range(-half..half);
        shots.push(Projectile::fire(weapon, muzzle, aim + jitter));
    }
    shots
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn test_player() -> Player {
        Player::new(
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            Weapon::standard_table().remove(0),
        )
    }

    #[test]
    fn diagonal_speed_matches_axis_speed() {
        let mut rng = Pcg32::seed_from_u64(0);
        let input_diag = InputState {
            up: true,
            right: true,
            ..Default::default()
        };
        let input_axis = InputState {
            right: true,
            ..Default::default()
        };

        let mut a = test_player();
        let start = a.pos;
        a.update(1.0, &input_diag, &mut rng, FIELD_WIDTH, FIELD_HEIGHT);
        let diag_moved = (a.pos - start).length();

        let mut b = test_player();
        let start = b.pos;
        b.update(1.0, &input_axis, &mut rng, FIELD_WIDTH, FIELD_HEIGHT);
        let axis_moved = (b.pos - start).length();

        // Both clamp at the field edge, so compare over a short step instead
        let mut c = test_player();
        let mut d = test_player();
        let start_c = c.pos;
        let start_d = d.pos;
        c.update(0.1, &input_diag, &mut rng, FIELD_WIDTH, FIELD_HEIGHT);
        d.update(0.1, &input_axis, &mut rng, FIELD_WIDTH, FIELD_HEIGHT);
        assert!(
            ((c.pos - start_c).length() - (d.pos - start_d).length()).abs() < 1e-3,
            "diag {diag_moved} vs axis {axis_moved}"
        );
    }

    #[test]
    fn position_clamps_to_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = test_player();
        let input = InputState {
            left: true,
            up: true,
            ..Default::default()
        };
        for _ in 0..600 {
            p.update(1.0 / 60.0, &input, &mut rng, FIELD_WIDTH, FIELD_HEIGHT);
        }
        assert_eq!(p.pos.x, p.radius);
        assert_eq!(p.pos.y, p.radius);
    }

    #[test]
    fn shield_blocks_all_damage() {
        let mut p = test_player();
        p.shield = true;
        assert!(!p.take_damage(1000.0));
        assert_eq!(p.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn damage_grants_invulnerability_window() {
        let mut p = test_player();
        assert!(!p.take_damage(10.0));
        assert_eq!(p.health, PLAYER_MAX_HEALTH - 10.0);
        // Second hit inside the window is absorbed
        assert!(!p.take_damage(10.0));
        assert_eq!(p.health, PLAYER_MAX_HEALTH - 10.0);
    }

    #[test]
    fn lethal_damage_deactivates() {
        let mut p = test_player();
        p.health = 5.0;
        assert!(p.take_damage(10.0));
        assert_eq!(p.health, 0.0);
        assert!(!p.active);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut p = test_player();
        p.health = 95.0;
        p.heal(HEAL_AMOUNT);
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn rate_boosts_stack_multiplicatively() {
        let mut p = test_player();
        assert_eq!(p.fire_rate_multiplier(), 1.0);
        p.rapid_fire = true;
        assert_eq!(p.fire_rate_multiplier(), 2.0);
        p.faster_guns = true;
        assert_eq!(p.fire_rate_multiplier(), 3.0);
    }

    #[test]
    fn multi_pellet_shot_spreads_evenly() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut p = test_player();
        p.weapon = Weapon::by_id(&Weapon::standard_table(), "scatter")
            .unwrap()
            .clone();
        p.rotation = 0.0;
        let shots = p.shoot(&mut rng);
        assert_eq!(shots.len(), 3);
        // Outer pellets mirror around the aim direction
        assert!((shots[0].vel.y + shots[2].vel.y).abs() < 1e-3);
        assert!(shots[1].vel.y.abs() < 1e-3);
    }

    #[test]
    fn wide_shot_raises_pellet_count() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = test_player();
        assert_eq!(p.shoot(&mut rng).len(), 1);
        p.wide_shot = true;
        assert_eq!(p.shoot(&mut rng).len(), 3);
    }

    #[test]
    fn held_fire_respects_cooldown() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut p = test_player();
        let input = InputState {
            fire: true,
            aim: Vec2::new(700.0, 300.0),
            ..Default::default()
        };
        let mut total = 0;
        // One second of held fire at 60 Hz with a 0.25s interval: 4-5 shots
        for _ in 0..60 {
            total += p
                .update(1.0 / 60.0, &input, &mut rng, FIELD_WIDTH, FIELD_HEIGHT)
                .len();
        }
        assert!((4..=5).contains(&total), "got {total} shots");
    }
}
