//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Driven only by the tick delta handed in by the shell
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod ally;
pub mod collision;
pub mod enemy;
pub mod player;
pub mod powerup;
pub mod progression;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod weapon;

pub use ally::{Ally, AllyPhase};
pub use collision::{circles_overlap, contact_damage};
pub use enemy::Snake;
pub use player::Player;
pub use powerup::{EffectKind, PowerPack, PowerUps};
pub use progression::{Difficulty, Progression};
pub use projectile::Projectile;
pub use state::{GameConfig, GameEvent, GameState, InputState, RunPhase};
pub use tick::{purchase_pack, tick};
pub use weapon::Weapon;
