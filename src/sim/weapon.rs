//! Weapon configuration
//!
//! Weapons are immutable value objects shared by copy between the player,
//! the summoned ally and projectile construction. Nothing owns them; the
//! config table is handed to the orchestrator at construction.

/// A weapon's firing characteristics
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub id: &'static str,
    pub damage: f32,
    /// Seconds between shots at base rate
    pub fire_interval: f32,
    /// Projectile speed (px/sec)
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    /// Hue in degrees, handed through to the renderer
    pub hue: f32,
    /// Pellets per shot; > 1 spreads evenly across `spread`
    pub projectile_count: u32,
    /// Total angular spread in radians
    pub spread: f32,
}

impl Weapon {
    /// The default loadout. The first entry is the starting weapon.
    pub fn standard_table() -> Vec<Weapon> {
        vec![
            Weapon {
                id: "blaster",
                damage: 25.0,
                fire_interval: 0.25,
                projectile_speed: 520.0,
                projectile_radius: 4.0,
                hue: 55.0,
                projectile_count: 1,
                spread: 0.12,
            },
            Weapon {
                id: "scatter",
                damage: 12.0,
                fire_interval: 0.45,
                projectile_speed: 440.0,
                projectile_radius: 3.0,
                hue: 20.0,
                projectile_count: 3,
                spread: 0.5,
            },
        ]
    }

    /// Look up a weapon by id. Unknown ids come from internal tables only,
    /// so a miss is a silent `None`, not an error.
    pub fn by_id<'a>(table: &'a [Weapon], id: &str) -> Option<&'a Weapon> {
        table.iter().find(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_id() {
        let table = Weapon::standard_table();
        assert!(Weapon::by_id(&table, "blaster").is_some());
    }

    #[test]
    fn lookup_ignores_unknown_id() {
        let table = Weapon::standard_table();
        assert!(Weapon::by_id(&table, "bfg9000").is_none());
    }
}
