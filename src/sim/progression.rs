//! Experience, levels, score, currency and the derived difficulty curve

use super::state::GameEvent;
use crate::consts::*;

/// Experience needed to clear the given level.
///
/// Strictly increasing in `level`; pure so the HUD and the level-up loop
/// always agree on the threshold.
pub fn xp_required(level: u32) -> u32 {
    (100.0 * f64::from(level).powf(1.5)).floor() as u32
}

/// Scaling parameters derived from the current level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub health_mult: f32,
    pub speed_mult: f32,
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Live-enemy cap
    pub max_enemies: u32,
}

/// Run-scoped progression counters.
///
/// Level only increases; experience carries its remainder across level-ups
/// and never goes negative.
#[derive(Debug, Clone)]
pub struct Progression {
    pub xp: u32,
    pub level: u32,
    pub kills: u32,
    pub score: u64,
    /// Currency points, one per kill, spent on power-packs
    pub points: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

impl Progression {
    pub fn new() -> Self {
        Self {
            xp: 0,
            level: 1,
            kills: 0,
            score: 0,
            points: 0,
        }
    }

    /// Record a kill worth `amount` experience.
    ///
    /// Bumps the kill counter, scores the award, then consumes thresholds in
    /// a loop so one large award can cross several levels. Returns whether at
    /// least one level-up occurred; each one pushes its own event.
    pub fn add_experience(&mut self, amount: u32, events: &mut Vec<GameEvent>) -> bool {
        self.kills += 1;
        events.push(GameEvent::KillsChanged { kills: self.kills });

        self.score += u64::from(amount) * SCORE_PER_XP;
        events.push(GameEvent::ScoreChanged { score: self.score });

        self.xp += amount;
        let mut leveled = false;
        while self.xp >= xp_required(self.level) {
            self.xp -= xp_required(self.level);
            self.level += 1;
            leveled = true;
            events.push(GameEvent::LevelUp { level: self.level });
        }
        events.push(GameEvent::XpChanged {
            xp: self.xp,
            required: xp_required(self.level),
        });
        leveled
    }

    /// Award one currency point
    pub fn award_point(&mut self, events: &mut Vec<GameEvent>) {
        self.points += 1;
        events.push(GameEvent::CurrencyChanged {
            points: self.points,
        });
    }

    /// Debit `cost` points; returns false (and changes nothing) if short
    pub fn spend_points(&mut self, cost: u32, events: &mut Vec<GameEvent>) -> bool {
        if self.points < cost {
            return false;
        }
        self.points -= cost;
        events.push(GameEvent::CurrencyChanged {
            points: self.points,
        });
        true
    }

    /// Difficulty parameters for the current level
    pub fn difficulty(&self) -> Difficulty {
        let l = self.level.max(1);
        let steps = (l - 1) / 2;
        Difficulty {
            health_mult: 1.0 + 0.2 * (l - 1) as f32,
            speed_mult: 1.0 + 0.1 * (l - 1) as f32,
            spawn_interval: (SPAWN_INTERVAL_BASE - SPAWN_INTERVAL_STEP * steps as f32)
                .max(SPAWN_INTERVAL_MIN),
            max_enemies: ENEMY_CAP_BASE + ENEMY_CAP_PER_LEVEL * (l - 1),
        }
    }

    /// Zero all counters and re-fire the change notifications so dependent
    /// HUD state stays consistent across a restart.
    pub fn reset(&mut self, events: &mut Vec<GameEvent>) {
        *self = Self::new();
        events.push(GameEvent::XpChanged {
            xp: 0,
            required: xp_required(1),
        });
        events.push(GameEvent::ScoreChanged { score: 0 });
        events.push(GameEvent::KillsChanged { kills: 0 });
        events.push(GameEvent::CurrencyChanged { points: 0 });
    }
}
