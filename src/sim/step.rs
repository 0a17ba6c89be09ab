/// The step function: advances a session by one frame.
///
/// Processing order:
///   1. Reject non-positive / non-finite `dt` (frame is a no-op)
///   2. Player movement from input intent
///   3. Enemies, in order: AI tick → movement → contact check
///
/// Each enemy only reads the player's position, so enemy order cannot change
/// any enemy's outcome. The first contact ends processing for the frame.

use tracing::{debug, info};

use crate::domain::ai::AiMode;
use crate::domain::entity::Intent;
use super::event::GameEvent;
use super::world::GameSession;

pub fn step(session: &mut GameSession, input: Intent, dt: f32) -> Vec<GameEvent> {
    if !(dt.is_finite() && dt > 0.0) { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    session.tick += 1;
    session.elapsed += dt;

    resolve_player_movement(session, input, dt);
    resolve_enemies(session, dt, &mut events);

    events
}

fn resolve_player_movement(session: &mut GameSession, input: Intent, dt: f32) {
    session.player.move_with_intent(input, dt, &session.map);
}

fn resolve_enemies(session: &mut GameSession, dt: f32, events: &mut Vec<GameEvent>) {
    let GameSession { map, player, enemies, rng, .. } = session;
    let target = player.position();

    for enemy in enemies.iter_mut() {
        match enemy.update(dt, target, map, rng) {
            Some(AiMode::Chase) => {
                debug!(enemy = enemy.id, "enemy gained aggro");
                events.push(GameEvent::EnemyAggro { enemy: enemy.id });
            }
            Some(AiMode::Patrol) => {
                debug!(enemy = enemy.id, "enemy lost aggro");
                events.push(GameEvent::EnemyLostAggro { enemy: enemy.id });
            }
            None => {}
        }

        if player.overlaps(&enemy.actor) {
            info!(enemy = enemy.id, x = player.x, y = player.y, "player caught");
            events.push(GameEvent::PlayerCaught { enemy: enemy.id });
            return;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::ai::EnemyAi;
    use crate::domain::entity::{Actor, Enemy};
    use crate::domain::map::{map_from, TileMap};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f32 = 1.0 / 60.0;

    fn arena() -> TileMap {
        map_from(&[
            "##############################",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "##############################",
        ], 16.0, 16.0)
    }

    fn session_with(player: Actor, enemies: Vec<Enemy>) -> GameSession {
        GameSession::from_parts(arena(), player, enemies, ChaCha8Rng::seed_from_u64(1), 1)
    }

    fn enemy_at(id: usize, x: f32, y: f32, detect: f32, lose: f32) -> Enemy {
        Enemy::new(
            id,
            Actor::new(x, y, 80.0, 14.0, 14.0),
            EnemyAi::with_timers(detect, lose, 0.0, 1000.0),
        )
    }

    #[test]
    fn invalid_dt_changes_nothing() {
        let mut s = session_with(Actor::new(100.0, 80.0, 200.0, 14.0, 14.0), vec![]);
        for dt in [0.0, -0.1, f32::NAN] {
            assert!(step(&mut s, Intent::new(1, 0), dt).is_empty());
        }
        assert_eq!(s.player.position(), (100.0, 80.0));
        assert_eq!(s.tick, 0);
        assert_eq!(s.elapsed, 0.0);
    }

    #[test]
    fn player_follows_input() {
        let mut s = session_with(Actor::new(100.0, 80.0, 200.0, 14.0, 14.0), vec![]);
        step(&mut s, Intent::new(0, 1), 0.1);
        assert_eq!(s.player.position(), (100.0, 100.0));
        assert!(s.player.is_moving);
        assert_eq!(s.tick, 1);
    }

    #[test]
    fn fast_player_stays_inside_world() {
        let cfg = GameConfig::from_toml_str("[player]\nspeed = 1000.0\n").unwrap();
        let size = cfg.player.size;
        // Flush against the right border wall, which starts at x = 464.
        let player = Actor::new(464.0 - size / 2.0, 80.0, cfg.player.speed, size, size);
        let mut s = session_with(player, vec![]);
        step(&mut s, Intent::new(1, 0), 0.1);
        assert_eq!(s.player.rect().right(), 464.0);
        assert_eq!(s.player.y, 80.0);

        for _ in 0..5 {
            step(&mut s, Intent::new(-1, 0), 0.1);
        }
        assert_eq!(s.player.rect().left(), 16.0);
    }

    #[test]
    fn enemy_at_distance_100_starts_chasing() {
        // Enemy 60 left of and 80 below the player: distance 100.
        let player = Actor::new(300.0, 40.0, 200.0, 14.0, 14.0);
        let mut s = session_with(player, vec![enemy_at(0, 240.0, 120.0, 150.0, 300.0)]);
        assert!((s.enemies[0].actor.distance_to(300.0, 40.0) - 100.0).abs() < 1e-4);

        let events = step(&mut s, Intent::NONE, DT);
        assert_eq!(events, vec![GameEvent::EnemyAggro { enemy: 0 }]);
        assert!(s.enemies[0].ai.is_chasing());
        assert_eq!(s.enemies[0].ai.intent, Intent { dx: 1, dy: -1 });
        assert!(s.enemies[0].actor.distance_to(300.0, 40.0) < 100.0);
    }

    #[test]
    fn distant_enemy_keeps_patrolling() {
        let player = Actor::new(40.0, 40.0, 200.0, 14.0, 14.0);
        let mut s = session_with(player, vec![enemy_at(0, 400.0, 120.0, 150.0, 300.0)]);
        for _ in 0..30 {
            assert!(step(&mut s, Intent::NONE, DT).is_empty());
        }
        assert!(!s.enemies[0].ai.is_chasing());
    }

    #[test]
    fn contact_ends_the_run() {
        let player = Actor::new(100.0, 80.0, 200.0, 14.0, 14.0);
        let mut s = session_with(player, vec![
            enemy_at(0, 400.0, 120.0, 150.0, 300.0),
            enemy_at(1, 110.0, 80.0, 150.0, 300.0),
            enemy_at(2, 108.0, 84.0, 150.0, 300.0),
        ]);
        let events = step(&mut s, Intent::NONE, DT);
        assert_eq!(events.last(), Some(&GameEvent::PlayerCaught { enemy: 1 }));
        // Enemy 2 is never processed this frame.
        assert!(!s.enemies[2].ai.is_chasing());
        assert_eq!(s.caught_by(), Some(1));
    }

    #[test]
    fn chaser_eventually_catches_idle_player() {
        let player = Actor::new(300.0, 80.0, 200.0, 14.0, 14.0);
        let mut s = session_with(player, vec![enemy_at(0, 200.0, 80.0, 150.0, 300.0)]);
        let caught = (0..600).any(|_| {
            step(&mut s, Intent::NONE, DT)
                .contains(&GameEvent::PlayerCaught { enemy: 0 })
        });
        assert!(caught);
    }

    #[test]
    fn fleeing_player_sheds_aggro() {
        let player = Actor::new(120.0, 80.0, 400.0, 14.0, 14.0);
        let mut s = session_with(player, vec![enemy_at(0, 40.0, 80.0, 150.0, 200.0)]);
        let mut events = Vec::new();
        for _ in 0..120 {
            events.extend(step(&mut s, Intent::new(1, 0), DT));
        }
        assert!(events.contains(&GameEvent::EnemyAggro { enemy: 0 }));
        assert!(events.contains(&GameEvent::EnemyLostAggro { enemy: 0 }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerCaught { .. })));
    }

    #[test]
    fn seeded_runs_replay_identically() {
        let cfg = GameConfig::default();
        let run = || {
            let mut s = GameSession::new(&cfg, 314);
            let inputs = [Intent::new(1, 0), Intent::new(1, 1), Intent::new(0, -1), Intent::NONE];
            for i in 0..240 {
                step(&mut s, inputs[(i / 60) % inputs.len()], DT);
            }
            let mut out = vec![s.player.position()];
            out.extend(s.enemies.iter().map(|e| e.actor.position()));
            out
        };
        assert_eq!(run(), run());
    }
}
