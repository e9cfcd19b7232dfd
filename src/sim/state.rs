//! Game state and run lifecycle
//!
//! `GameState` owns every entity collection and all run-scoped bookkeeping.
//! External collaborators never reach into the tick: input arrives as a
//! latched `InputState` read at tick boundaries, and everything the shell
//! needs to know flows back out through the `GameEvent` queue.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ally::Ally;
use super::enemy::Snake;
use super::player::Player;
use super::powerup::{EffectKind, PowerPack, PowerUps};
use super::progression::{xp_required, Progression};
use super::projectile::Projectile;
use super::weapon::Weapon;
use crate::consts::*;

/// Where the run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Before the first start (or after construction)
    Idle,
    /// Ticking
    Running,
    /// Player died; no further ticks until restart
    Ended,
}

/// Latched input state, owned by the shell and read once per tick.
/// Device events mutate this between ticks; the tick itself only reads it.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Aim point in playfield coordinates (mouse or touch)
    pub aim: Vec2,
}

/// Everything the core reports to the outside world: audio cues and HUD
/// updates with the literal new values. The core never formats or plays
/// anything itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Shoot,
    Hit,
    HealthChanged { health: f32, max: f32 },
    ScoreChanged { score: u64 },
    KillsChanged { kills: u32 },
    XpChanged { xp: u32, required: u32 },
    LevelUp { level: u32 },
    CurrencyChanged { points: u32 },
    PowerUpActivated { kind: EffectKind, duration: f32 },
    PowerUpExpired { kind: EffectKind },
    AllySummoned,
    AllyDespawned,
    GameOver { score: u64, kills: u32, level: u32 },
}

/// Configuration handed to the orchestrator at construction. No module-level
/// tables: weapons and packs are explicit data.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub weapons: Vec<Weapon>,
    pub packs: Vec<PowerPack>,
    pub starting_weapon: &'static str,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            weapons: Weapon::standard_table(),
            packs: PowerPack::standard_table(),
            starting_weapon: "blaster",
        }
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: RunPhase,
    pub player: Player,
    pub snakes: Vec<Snake>,
    pub projectiles: Vec<Projectile>,
    pub ally: Option<Ally>,
    pub progression: Progression,
    pub powerups: PowerUps,
    /// Seconds since the last enemy spawn
    pub spawn_timer: f32,
    /// Total simulated seconds this run
    pub elapsed: f64,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let player = Self::build_player(&config);
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Idle,
            player,
            snakes: Vec::new(),
            projectiles: Vec::new(),
            ally: None,
            progression: Progression::new(),
            powerups: PowerUps::new(),
            spawn_timer: 0.0,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    fn build_player(config: &GameConfig) -> Player {
        // Falling back to the first table entry keeps an unknown starting id
        // a no-op rather than an error
        let weapon = Weapon::by_id(&config.weapons, config.starting_weapon)
            .or_else(|| config.weapons.first())
            .cloned()
            .unwrap_or_else(|| Weapon::standard_table().remove(0));
        Player::new(
            Vec2::new(config.width / 2.0, config.height / 2.0),
            weapon,
        )
    }

    /// Start (or restart) a run: rebuild the player, clear every transient
    /// collection, zero progression and currency, and enter `Running`.
    pub fn start_run(&mut self) {
        self.player = Self::build_player(&self.config);
        self.snakes.clear();
        self.projectiles.clear();
        self.ally = None;
        self.powerups = PowerUps::new();
        self.progression.reset(&mut self.events);
        self.spawn_timer = 0.0;
        self.elapsed = 0.0;
        self.phase = RunPhase::Running;
        self.events.push(GameEvent::HealthChanged {
            health: self.player.health,
            max: self.player.max_health,
        });
        self.events.push(GameEvent::XpChanged {
            xp: 0,
            required: xp_required(1),
        });
        log::info!("run started (seed {})", self.seed);
    }

    /// Hand the queued events to the shell, leaving the queue empty.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Count of snakes still participating in the simulation
    pub fn live_snakes(&self) -> usize {
        self.snakes.iter().filter(|s| s.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle() {
        let state = GameState::new(GameConfig::default(), 42);
        assert_eq!(state.phase, RunPhase::Idle);
        assert!(state.snakes.is_empty());
    }

    #[test]
    fn start_run_resets_everything() {
        let mut state = GameState::new(GameConfig::default(), 42);
        state.start_run();
        state.player.health = 10.0;
        state.progression.points = 99;
        state.snakes.push({
            use crate::sim::progression::Difficulty;
            use rand::SeedableRng;
            let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
            Snake::spawn(
                &mut rng,
                &Difficulty {
                    health_mult: 1.0,
                    speed_mult: 1.0,
                    spawn_interval: 2.0,
                    max_enemies: 5,
                },
                FIELD_WIDTH,
                FIELD_HEIGHT,
            )
        });

        state.start_run();
        assert_eq!(state.phase, RunPhase::Running);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
        assert_eq!(state.progression.points, 0);
        assert!(state.snakes.is_empty());
        assert!(state.ally.is_none());
    }

    #[test]
    fn unknown_starting_weapon_falls_back() {
        let config = GameConfig {
            starting_weapon: "no-such-gun",
            ..GameConfig::default()
        };
        let state = GameState::new(config, 1);
        assert_eq!(state.player.weapon.id, "blaster");
    }

    #[test]
    fn drain_events_empties_queue() {
        let mut state = GameState::new(GameConfig::default(), 42);
        state.start_run();
        assert!(!state.drain_events().is_empty());
        assert!(state.drain_events().is_empty());
    }
}
