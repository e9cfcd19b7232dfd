//! Per-frame orchestration
//!
//! One tick runs to completion before anything renders: player, power-up
//! timers, spawning, projectiles, snakes, collision resolution, compaction,
//! then the end-of-run check. Order matters and is fixed here.

use super::ally::{Ally, AllyPhase};
use super::collision::{circles_overlap, contact_damage};
use super::enemy::Snake;
use super::player::Player;
use super::powerup::EffectKind;
use super::progression::Progression;
use super::state::{GameEvent, GameState, InputState, RunPhase};
use crate::consts::*;

/// Advance the simulation by one frame delta.
///
/// The delta is clamped to [`MAX_FRAME_DT`] so a stalled frame cannot
/// teleport entities or fire several spawns at once; zero or negative
/// deltas are a complete no-op.
pub fn tick(state: &mut GameState, input: &InputState, dt: f32) {
    if state.phase != RunPhase::Running {
        return;
    }
    let dt = dt.min(MAX_FRAME_DT);
    if dt <= 0.0 {
        return;
    }
    state.elapsed += f64::from(dt);

    let (width, height) = (state.config.width, state.config.height);

    // Player first: movement, aim, cooldowns, newly fired shots
    let shots = state
        .player
        .update(dt, input, &mut state.rng, width, height);
    if !shots.is_empty() {
        state.events.push(GameEvent::Shoot);
        state.projectiles.extend(shots);
    }

    // Power-up timers (may unfreeze snakes or clear player flags)
    state
        .powerups
        .update(dt, &mut state.player, &mut state.snakes, &mut state.events);

    // Deferred ally spawn requested by the power-up system last tick.
    // A fresh summon replaces a still-living ally.
    if state.powerups.take_pending_ally() {
        state.ally = Some(Ally::summon(state.player.pos, state.player.weapon.clone()));
        state.events.push(GameEvent::AllySummoned);
    }

    // Spawn policy: interval elapsed and below the live cap
    let difficulty = state.progression.difficulty();
    state.spawn_timer += dt;
    if state.spawn_timer >= difficulty.spawn_interval
        && (state.live_snakes() as u32) < difficulty.max_enemies
    {
        let mut snake = Snake::spawn(&mut state.rng, &difficulty, width, height);
        // Mid-freeze spawns inherit the frozen flag so the window stays airtight
        if state.powerups.is_active(EffectKind::Freeze) {
            snake.frozen = true;
        }
        state.snakes.push(snake);
        state.spawn_timer = 0.0;
    }

    // Projectiles: advance and cull anything past the trail margin
    for p in &mut state.projectiles {
        p.update(dt);
        if !p.in_bounds(width, height) {
            p.active = false;
        }
    }

    // Snakes pursue the player (frozen ones sit still)
    let player_pos = state.player.pos;
    for snake in state.snakes.iter_mut().filter(|s| s.active) {
        snake.update(dt, player_pos);
    }

    // Ally state machine; its shots join the shared projectile pool
    if let Some(ally) = &mut state.ally {
        let shots = ally.update(dt, &state.snakes, &mut state.rng);
        if !shots.is_empty() {
            state.events.push(GameEvent::Shoot);
            state.projectiles.extend(shots);
        }
        if ally.phase == AllyPhase::Inactive {
            state.ally = None;
            state.events.push(GameEvent::AllyDespawned);
        }
    }

    // Projectile-vs-snake resolution. A projectile affects at most one
    // snake; the first overlap in iteration order wins and the projectile
    // dies on the spot.
    for p in &mut state.projectiles {
        if !p.active {
            continue;
        }
        for snake in &mut state.snakes {
            if !snake.active {
                continue;
            }
            if circles_overlap(p.pos, p.radius, snake.pos, snake.radius) {
                p.active = false;
                state.events.push(GameEvent::Hit);
                if snake.take_damage(p.damage) {
                    let xp = snake.xp_value;
                    award_kill(
                        &mut state.progression,
                        &mut state.player,
                        xp,
                        &mut state.events,
                    );
                }
                break;
            }
        }
    }

    // Player contact: a snake that reaches the player is a one-shot
    // kamikaze, deactivated instantly.
    for snake in &mut state.snakes {
        if !snake.active {
            continue;
        }
        if circles_overlap(
            snake.pos,
            snake.radius,
            state.player.pos,
            state.player.radius,
        ) {
            snake.active = false;
            state.player.take_damage(contact_damage(snake.radius));
            state.events.push(GameEvent::Hit);
            state.events.push(GameEvent::HealthChanged {
                health: state.player.health,
                max: state.player.max_health,
            });
        }
    }

    // Compact the collections
    state.snakes.retain(|s| s.active);
    state.projectiles.retain(|p| p.active);

    // End-of-run check: deactivated player ends the run; no further ticks
    // until restart
    if !state.player.active {
        state.phase = RunPhase::Ended;
        let p = &state.progression;
        state.events.push(GameEvent::GameOver {
            score: p.score,
            kills: p.kills,
            level: p.level,
        });
        log::info!(
            "run ended: score {} kills {} level {}",
            p.score,
            p.kills,
            p.level
        );
    }
}

/// Kill bookkeeping shared by every kill path (bullets, area blast):
/// experience (which may level up), one currency point, and the every-Nth
/// kill heal when below max health.
fn award_kill(
    progression: &mut Progression,
    player: &mut Player,
    xp: u32,
    events: &mut Vec<GameEvent>,
) {
    progression.add_experience(xp, events);
    progression.award_point(events);
    if progression.kills % HEAL_EVERY_KILLS == 0 && player.health < player.max_health {
        player.heal(HEAL_AMOUNT);
        events.push(GameEvent::HealthChanged {
            health: player.health,
            max: player.max_health,
        });
    }
}

/// Purchase a power-pack by external id. Orchestrator-enforced policy:
/// unknown ids are ignored, only one timed pack may run at a time, and the
/// cost is debited atomically with a successful activation.
pub fn purchase_pack(state: &mut GameState, id: &str) -> bool {
    if state.phase != RunPhase::Running {
        return false;
    }
    let Some(kind) = EffectKind::from_id(id) else {
        log::debug!("ignoring unknown power-pack id {id:?}");
        return false;
    };
    let Some(pack) = state.config.packs.iter().find(|p| p.kind == kind).cloned() else {
        return false;
    };
    if pack.duration > 0.0 && state.powerups.any_timed_active() {
        return false;
    }
    if !state.progression.spend_points(pack.cost, &mut state.events) {
        return false;
    }
    let killed = state.powerups.activate(
        &pack,
        &mut state.player,
        &mut state.snakes,
        &mut state.events,
    );
    for xp in killed {
        award_kill(
            &mut state.progression,
            &mut state.player,
            xp,
            &mut state.events,
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::progression::Difficulty;
    use crate::sim::projectile::Projectile;
    use crate::sim::state::GameConfig;
    use crate::sim::weapon::Weapon;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn running_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), 42);
        state.start_run();
        state.drain_events();
        state
    }

    fn snake_at(pos: Vec2, health: f32) -> Snake {
        let mut rng = Pcg32::seed_from_u64(0);
        let d = Difficulty {
            health_mult: 1.0,
            speed_mult: 1.0,
            spawn_interval: 2.0,
            max_enemies: 5,
        };
        let mut s = Snake::spawn(&mut rng, &d, FIELD_WIDTH, FIELD_HEIGHT);
        s.pos = pos;
        s.health = health;
        s.max_health = health;
        s.speed = 0.0;
        s.base_speed = 0.0;
        s
    }

    /// A still projectile parked on top of its victim
    fn bullet_at(pos: Vec2, damage: f32) -> Projectile {
        let mut p = Projectile::fire(&Weapon::standard_table()[0], pos, 0.0);
        p.vel = Vec2::ZERO;
        p.damage = damage;
        p
    }

    #[test]
    fn zero_or_negative_dt_is_a_no_op() {
        let mut state = running_state();
        state.snakes.push(snake_at(Vec2::new(100.0, 100.0), 50.0));
        state.snakes[0].speed = 40.0;
        let snapshot = state.snakes[0].pos;

        tick(&mut state, &InputState::default(), 0.0);
        assert_eq!(state.snakes[0].pos, snapshot);

        tick(&mut state, &InputState::default(), -1.0);
        assert_eq!(state.snakes[0].pos, snapshot);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn oversized_dt_is_clamped() {
        let mut state = running_state();
        let input = InputState {
            right: true,
            ..Default::default()
        };
        let start = state.player.pos;
        tick(&mut state, &input, 10.0);
        let moved = (state.player.pos - start).length();
        assert!(moved <= PLAYER_SPEED * MAX_FRAME_DT + 1e-3);
    }

    #[test]
    fn does_not_tick_outside_running() {
        let mut state = GameState::new(GameConfig::default(), 42);
        tick(&mut state, &InputState::default(), DT);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.phase, RunPhase::Idle);
    }

    #[test]
    fn spawner_respects_interval_and_cap() {
        let mut state = running_state();
        // Park the player in a corner so nothing reaches it quickly
        state.player.pos = Vec2::new(PLAYER_RADIUS, PLAYER_RADIUS);

        // Run 30 simulated seconds
        for _ in 0..(30 * 60) {
            tick(&mut state, &InputState::default(), DT);
        }
        let cap = state.progression.difficulty().max_enemies as usize;
        assert!(!state.snakes.is_empty());
        assert!(state.live_snakes() <= cap);
    }

    #[test]
    fn two_hits_kill_a_fifty_health_snake() {
        let mut state = running_state();
        let spot = Vec2::new(650.0, 80.0);
        state.snakes.push(snake_at(spot, 50.0));

        state.projectiles.push(bullet_at(spot, 25.0));
        tick(&mut state, &InputState::default(), DT);
        assert!(state.snakes[0].active);
        assert_eq!(state.snakes[0].health, 25.0);
        assert_eq!(state.progression.kills, 0);

        let xp = state.snakes[0].xp_value;
        state.projectiles.push(bullet_at(state.snakes[0].pos, 25.0));
        tick(&mut state, &InputState::default(), DT);

        assert!(state.snakes.is_empty()); // compacted after the kill
        assert_eq!(state.progression.kills, 1);
        assert_eq!(state.progression.points, 1);
        assert_eq!(state.progression.xp, xp);
    }

    #[test]
    fn projectile_hits_at_most_one_snake() {
        let mut state = running_state();
        let spot = Vec2::new(650.0, 80.0);
        state.snakes.push(snake_at(spot, 500.0));
        state.snakes.push(snake_at(spot, 500.0));
        state.projectiles.push(bullet_at(spot, 25.0));

        tick(&mut state, &InputState::default(), DT);
        let damaged = state
            .snakes
            .iter()
            .filter(|s| s.health < s.max_health)
            .count();
        assert_eq!(damaged, 1);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn missed_projectile_dies_only_past_the_margin() {
        let mut state = running_state();
        let w = Weapon::standard_table().remove(0);
        let mut p = Projectile::fire(&w, Vec2::new(FIELD_WIDTH - 5.0, 300.0), 0.0);
        let radius = p.radius;
        p.damage = 0.0;
        state.projectiles.push(p);

        let mut deactivations = 0;
        let mut last_seen = Vec2::ZERO;
        for _ in 0..120 {
            let had = state.projectiles.len();
            if had > 0 {
                last_seen = state.projectiles[0].pos;
            }
            tick(&mut state, &InputState::default(), DT);
            if state.projectiles.len() < had {
                deactivations += 1;
            }
        }
        assert_eq!(deactivations, 1);
        // It survived to at least the playfield edge before culling
        assert!(last_seen.x >= FIELD_WIDTH - radius * 2.0 - 20.0);
    }

    #[test]
    fn contact_kamikaze_damages_player_and_removes_snake() {
        let mut state = running_state();
        state.snakes.push(snake_at(state.player.pos, 500.0));
        let radius = state.snakes[0].radius;

        tick(&mut state, &InputState::default(), DT);
        assert!(state.snakes.is_empty());
        assert_eq!(
            state.player.health,
            PLAYER_MAX_HEALTH - contact_damage(radius)
        );
    }

    #[test]
    fn fifth_kill_heals_exactly_once() {
        let mut state = running_state();
        state.player.health = 50.0;

        let mut healths = Vec::new();
        for kill in 1..=6u32 {
            award_kill(
                &mut state.progression,
                &mut state.player,
                1,
                &mut state.events,
            );
            healths.push((kill, state.player.health));
        }
        // Damage taken per kill: none; heal fires only at kill 5
        assert_eq!(healths[3].1, 50.0);
        assert_eq!(healths[4].1, 50.0 + HEAL_AMOUNT);
        assert_eq!(healths[5].1, 50.0 + HEAL_AMOUNT);
    }

    #[test]
    fn fifth_kill_heal_skipped_at_full_health() {
        let mut state = running_state();
        for _ in 0..5 {
            award_kill(
                &mut state.progression,
                &mut state.player,
                1,
                &mut state.events,
            );
        }
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn player_death_ends_the_run_once() {
        let mut state = running_state();
        state.player.health = 1.0;
        state.player.invuln = 0.0;
        state.snakes.push(snake_at(state.player.pos, 500.0));

        tick(&mut state, &InputState::default(), DT);
        assert_eq!(state.phase, RunPhase::Ended);
        let events = state.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));

        // Further ticks are ignored
        let elapsed = state.elapsed;
        tick(&mut state, &InputState::default(), DT);
        assert_eq!(state.elapsed, elapsed);
    }

    #[test]
    fn purchase_rejected_without_points() {
        let mut state = running_state();
        assert!(!purchase_pack(&mut state, "shield"));
        assert!(!state.player.shield);
    }

    #[test]
    fn purchase_debits_atomically_and_activates() {
        let mut state = running_state();
        state.progression.points = 20;
        assert!(purchase_pack(&mut state, "shield"));
        assert!(state.player.shield);
        assert_eq!(state.progression.points, 20 - 8);
    }

    #[test]
    fn second_timed_pack_rejected_while_one_runs() {
        let mut state = running_state();
        state.progression.points = 50;
        assert!(purchase_pack(&mut state, "shield"));
        let points = state.progression.points;
        assert!(!purchase_pack(&mut state, "rapid-fire"));
        assert_eq!(state.progression.points, points);
    }

    #[test]
    fn unknown_pack_id_is_ignored() {
        let mut state = running_state();
        state.progression.points = 50;
        assert!(!purchase_pack(&mut state, "doomsday"));
        assert_eq!(state.progression.points, 50);
    }

    #[test]
    fn summon_pack_spawns_ally_on_next_tick() {
        let mut state = running_state();
        state.progression.points = 50;
        assert!(purchase_pack(&mut state, "summon-ally"));
        assert!(state.ally.is_none());

        tick(&mut state, &InputState::default(), DT);
        assert!(state.ally.is_some());
        assert!(state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::AllySummoned)));
    }

    #[test]
    fn freeze_halts_snakes_and_new_spawns_inherit_it() {
        let mut state = running_state();
        state.progression.points = 50;
        state.player.pos = Vec2::new(PLAYER_RADIUS, PLAYER_RADIUS);
        state
            .snakes
            .push(snake_at(Vec2::new(700.0, 500.0), 100.0));
        state.snakes[0].speed = 60.0;

        assert!(purchase_pack(&mut state, "freeze"));
        assert!(state.snakes[0].frozen);
        let frozen_pos = state.snakes[0].pos;

        // Enough ticks for the spawner to add a snake, well inside the
        // 5-second freeze window
        for _ in 0..(3 * 60) {
            tick(&mut state, &InputState::default(), DT);
        }
        assert_eq!(state.snakes[0].pos, frozen_pos);
        assert!(state.snakes.len() > 1);
        assert!(state.snakes.iter().all(|s| s.frozen));

        // Past expiry everything thaws
        for _ in 0..(3 * 60) {
            tick(&mut state, &InputState::default(), DT);
        }
        assert!(state.snakes.iter().all(|s| !s.frozen));
        assert_ne!(state.snakes[0].pos, frozen_pos);
    }

    #[test]
    fn blast_kills_feed_normal_kill_accounting() {
        let mut state = running_state();
        state.progression.points = 50;
        state.snakes.push(snake_at(Vec2::new(700.0, 80.0), 10.0));
        state.snakes.push(snake_at(Vec2::new(80.0, 500.0), 10.0));

        assert!(purchase_pack(&mut state, "blast"));
        assert_eq!(state.progression.kills, 2);
        // 50 - 12 cost + 2 kill points
        assert_eq!(state.progression.points, 50 - 12 + 2);
    }
}
