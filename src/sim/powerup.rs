//! Power-packs and the active-effect registry
//!
//! Three effect categories:
//! - instant (area blast): applied once, never stored
//! - timed player flag (rapid fire, wide shot, shield, faster guns): flag set
//!   on activation, cleared on expiry
//! - timed global effect (freeze): every live snake is flagged frozen on
//!   activation and every tracked snake is unfrozen on expiry
//!
//! The summon-ally pack is a deferred spawn: activation only sets a pending
//! marker the orchestrator consumes on its next tick, keeping this module
//! free of entity-construction dependencies.
//!
//! Re-activating an effect that is already running refreshes its timer; the
//! registry never holds two entries for one kind.

use super::enemy::Snake;
use super::player::Player;
use super::state::GameEvent;
use crate::consts::BLAST_DAMAGE;

/// The closed set of effect kinds known at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    RapidFire,
    WideShot,
    Shield,
    FasterGuns,
    Freeze,
    Blast,
    SummonAlly,
}

impl EffectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::RapidFire => "rapid-fire",
            EffectKind::WideShot => "wide-shot",
            EffectKind::Shield => "shield",
            EffectKind::FasterGuns => "faster-guns",
            EffectKind::Freeze => "freeze",
            EffectKind::Blast => "blast",
            EffectKind::SummonAlly => "summon-ally",
        }
    }

    /// Permissive parse at the external activation boundary; unknown ids
    /// resolve to `None` and are ignored by callers.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "rapid-fire" => Some(EffectKind::RapidFire),
            "wide-shot" => Some(EffectKind::WideShot),
            "shield" => Some(EffectKind::Shield),
            "faster-guns" => Some(EffectKind::FasterGuns),
            "freeze" => Some(EffectKind::Freeze),
            "blast" => Some(EffectKind::Blast),
            "summon-ally" => Some(EffectKind::SummonAlly),
            _ => None,
        }
    }
}

/// A purchasable power-pack definition (value object)
#[derive(Debug, Clone, PartialEq)]
pub struct PowerPack {
    pub kind: EffectKind,
    pub name: &'static str,
    /// Seconds the effect lasts; 0 = instantaneous
    pub duration: f32,
    /// Currency cost in points
    pub cost: u32,
}

impl PowerPack {
    pub fn standard_table() -> Vec<PowerPack> {
        vec![
            PowerPack {
                kind: EffectKind::RapidFire,
                name: "Rapid Fire",
                duration: 8.0,
                cost: 5,
            },
            PowerPack {
                kind: EffectKind::WideShot,
                name: "Wide Shot",
                duration: 8.0,
                cost: 5,
            },
            PowerPack {
                kind: EffectKind::Shield,
                name: "Shield",
                duration: 6.0,
                cost: 8,
            },
            PowerPack {
                kind: EffectKind::FasterGuns,
                name: "Faster Guns",
                duration: 10.0,
                cost: 6,
            },
            PowerPack {
                kind: EffectKind::Freeze,
                name: "Freeze",
                duration: 5.0,
                cost: 10,
            },
            PowerPack {
                kind: EffectKind::Blast,
                name: "Blast",
                duration: 0.0,
                cost: 12,
            },
            PowerPack {
                kind: EffectKind::SummonAlly,
                name: "Summon Ally",
                duration: 0.0,
                cost: 15,
            },
        ]
    }
}

/// A running timed effect
#[derive(Debug, Clone)]
struct ActiveEffect {
    kind: EffectKind,
    remaining: f32,
}

/// Tracks running effects and applies activation/expiry side effects
#[derive(Debug, Clone, Default)]
pub struct PowerUps {
    active: Vec<ActiveEffect>,
    pending_ally: bool,
}

impl PowerUps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    /// Whether any timed effect is running (the one-pack-at-a-time gate)
    pub fn any_timed_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Consume the deferred ally-spawn marker
    pub fn take_pending_ally(&mut self) -> bool {
        std::mem::take(&mut self.pending_ally)
    }

    /// Apply a pack's activation side effects.
    ///
    /// Returns the xp values of snakes killed outright (blast only) so the
    /// orchestrator can run its normal kill accounting.
    pub fn activate(
        &mut self,
        pack: &PowerPack,
        player: &mut Player,
        snakes: &mut [Snake],
        events: &mut Vec<GameEvent>,
    ) -> Vec<u32> {
        let mut killed_xp = Vec::new();
        match pack.kind {
            EffectKind::Blast => {
                for snake in snakes.iter_mut().filter(|s| s.active) {
                    if snake.take_damage(BLAST_DAMAGE) {
                        killed_xp.push(snake.xp_value);
                    }
                }
            }
            EffectKind::SummonAlly => {
                self.pending_ally = true;
            }
            EffectKind::Freeze => {
                for snake in snakes.iter_mut().filter(|s| s.active) {
                    snake.frozen = true;
                }
                self.store(pack.kind, pack.duration);
            }
            kind => {
                player.apply_effect(kind);
                self.store(kind, pack.duration);
            }
        }
        events.push(GameEvent::PowerUpActivated {
            kind: pack.kind,
            duration: pack.duration,
        });
        killed_xp
    }

    /// Refresh-or-insert; one entry per kind.
    fn store(&mut self, kind: EffectKind, duration: f32) {
        if let Some(e) = self.active.iter_mut().find(|e| e.kind == kind) {
            e.remaining = duration;
        } else {
            self.active.push(ActiveEffect {
                kind,
                remaining: duration,
            });
        }
    }

    /// Decrement timers and run type-specific teardown on expiry.
    ///
    /// Freeze teardown unfreezes every snake in the collection handed in
    /// here, including ones spawned during the freeze window.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut Player,
        snakes: &mut [Snake],
        events: &mut Vec<GameEvent>,
    ) {
        let mut expired = Vec::new();
        for effect in &mut self.active {
            effect.remaining -= dt;
            if effect.remaining <= 0.0 {
                expired.push(effect.kind);
            }
        }
        self.active.retain(|e| e.remaining > 0.0);

        for kind in expired {
            match kind {
                EffectKind::Freeze => {
                    for snake in snakes.iter_mut() {
                        snake.frozen = false;
                    }
                }
                EffectKind::Blast | EffectKind::SummonAlly => {}
                kind => player.remove_effect(kind),
            }
            events.push(GameEvent::PowerUpExpired { kind });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, PLAYER_MAX_HEALTH};
    use crate::sim::progression::Difficulty;
    use crate::sim::weapon::Weapon;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn test_player() -> Player {
        Player::new(Vec2::new(400.0, 300.0), Weapon::standard_table().remove(0))
    }

    fn test_snakes(n: usize) -> Vec<Snake> {
        let mut rng = Pcg32::seed_from_u64(9);
        let d = Difficulty {
            health_mult: 1.0,
            speed_mult: 1.0,
            spawn_interval: 2.0,
            max_enemies: 10,
        };
        (0..n)
            .map(|_| Snake::spawn(&mut rng, &d, FIELD_WIDTH, FIELD_HEIGHT))
            .collect()
    }

    fn pack(kind: EffectKind) -> PowerPack {
        PowerPack::standard_table()
            .into_iter()
            .find(|p| p.kind == kind)
            .unwrap()
    }

    #[test]
    fn reactivation_refreshes_instead_of_stacking() {
        let mut pu = PowerUps::new();
        let mut player = test_player();
        let mut snakes = Vec::new();
        let mut events = Vec::new();
        let shield = pack(EffectKind::Shield);

        pu.activate(&shield, &mut player, &mut snakes, &mut events);
        pu.update(2.0, &mut player, &mut snakes, &mut events);
        pu.activate(&shield, &mut player, &mut snakes, &mut events);

        assert_eq!(pu.active.len(), 1);
        assert!((pu.active[0].remaining - shield.duration).abs() < 1e-5);
    }

    #[test]
    fn flag_effect_sets_and_clears_player_flag() {
        let mut pu = PowerUps::new();
        let mut player = test_player();
        let mut snakes = Vec::new();
        let mut events = Vec::new();
        let rapid = pack(EffectKind::RapidFire);

        pu.activate(&rapid, &mut player, &mut snakes, &mut events);
        assert!(player.rapid_fire);

        pu.update(rapid.duration + 0.01, &mut player, &mut snakes, &mut events);
        assert!(!player.rapid_fire);
        assert!(!pu.is_active(EffectKind::RapidFire));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PowerUpExpired { kind: EffectKind::RapidFire })));
    }

    #[test]
    fn freeze_flags_all_live_snakes_and_expiry_unfreezes_new_spawns_too() {
        let mut pu = PowerUps::new();
        let mut player = test_player();
        let mut snakes = test_snakes(3);
        let mut events = Vec::new();
        let freeze = pack(EffectKind::Freeze);

        pu.activate(&freeze, &mut player, &mut snakes, &mut events);
        assert!(snakes.iter().all(|s| s.frozen));

        // A snake spawned mid-window, frozen by the spawner policy
        let mut late = test_snakes(1).remove(0);
        late.frozen = true;
        snakes.push(late);

        pu.update(freeze.duration + 0.01, &mut player, &mut snakes, &mut events);
        assert!(snakes.iter().all(|s| !s.frozen));
    }

    #[test]
    fn blast_is_instant_and_reports_kills() {
        let mut pu = PowerUps::new();
        let mut player = test_player();
        let mut snakes = test_snakes(2);
        snakes[0].health = BLAST_DAMAGE - 1.0;
        snakes[1].health = BLAST_DAMAGE + 10.0;
        let mut events = Vec::new();

        let killed = pu.activate(&pack(EffectKind::Blast), &mut player, &mut snakes, &mut events);
        assert_eq!(killed.len(), 1);
        assert!(!snakes[0].active);
        assert!(snakes[1].active);
        assert!(!pu.any_timed_active());
    }

    #[test]
    fn summon_sets_pending_marker_once() {
        let mut pu = PowerUps::new();
        let mut player = test_player();
        let mut snakes = Vec::new();
        let mut events = Vec::new();

        pu.activate(
            &pack(EffectKind::SummonAlly),
            &mut player,
            &mut snakes,
            &mut events,
        );
        assert!(pu.take_pending_ally());
        assert!(!pu.take_pending_ally());
    }

    #[test]
    fn unknown_id_is_ignored_at_the_boundary() {
        assert!(EffectKind::from_id("mega-laser").is_none());
        assert_eq!(EffectKind::from_id("freeze"), Some(EffectKind::Freeze));
    }

    #[test]
    fn shield_effect_blocks_damage_until_expiry() {
        let mut pu = PowerUps::new();
        let mut player = test_player();
        let mut snakes = Vec::new();
        let mut events = Vec::new();
        let shield = pack(EffectKind::Shield);

        pu.activate(&shield, &mut player, &mut snakes, &mut events);
        assert!(!player.take_damage(50.0));
        assert_eq!(player.health, PLAYER_MAX_HEALTH);

        pu.update(shield.duration + 0.01, &mut player, &mut snakes, &mut events);
        assert!(!player.take_damage(50.0)); // not killed, but now damaged
        assert_eq!(player.health, PLAYER_MAX_HEALTH - 50.0);
    }
}
