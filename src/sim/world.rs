/// Session and application state.
///
/// ## Ownership
///
///   - `GameSession` — everything one run needs: map, player, enemies and the
///     RNG that drives spawns and patrol decisions. Built fresh on "start",
///     dropped on game over. Nothing carries over between sessions.
///   - `AppState` — the phase machine around sessions (menu / playing /
///     game over) plus the music toggle. Owned by the main loop and passed by
///     reference; there are no globals.
///
/// With a configured seed, session `n` uses `seed + n`, so a run can be
/// replayed exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::GameConfig;
use crate::domain::ai::EnemyAi;
use crate::domain::entity::{Actor, Enemy};
use crate::domain::map::TileMap;
use crate::domain::spawn;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

pub struct GameSession {
    pub map: TileMap,
    pub player: Actor,
    pub enemies: Vec<Enemy>,
    pub rng: ChaCha8Rng,
    pub seed: u64,
    pub tick: u64,
    /// Seconds survived.
    pub elapsed: f32,
}

impl GameSession {
    /// Generate the map and place the player (center-biased) and enemies.
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let w = &config.world;
        let map = TileMap::generate(w.width, w.height, w.tile_width, w.tile_height);

        let (px, py) = spawn::find_spawn(&map, true, &mut rng);
        let player = Actor::new(px, py, config.player.speed, config.player.size, config.player.size);

        let e = &config.enemies;
        let enemies: Vec<Enemy> = (0..e.count)
            .map(|id| {
                let (ex, ey) = spawn::find_spawn(&map, false, &mut rng);
                let speed = roll(&mut rng, e.speed_min, e.speed_max) as f32;
                let detection = roll(&mut rng, e.detection_min, e.detection_max) as f32;
                let lose_aggro = roll(&mut rng, e.lose_aggro_min, e.lose_aggro_max) as f32;
                let ai = EnemyAi::new(detection, lose_aggro, &mut rng);
                Enemy::new(id, Actor::new(ex, ey, speed, e.size, e.size), ai)
            })
            .collect();

        info!(
            seed,
            rows = map.rows(),
            cols = map.cols(),
            player_x = px,
            player_y = py,
            enemies = enemies.len(),
            "session started"
        );

        Self::from_parts(map, player, enemies, rng, seed)
    }

    /// Assemble a session from prepared pieces.
    pub fn from_parts(map: TileMap, player: Actor, enemies: Vec<Enemy>, rng: ChaCha8Rng, seed: u64) -> Self {
        GameSession { map, player, enemies, rng, seed, tick: 0, elapsed: 0.0 }
    }

    #[cfg(test)]
    /// First enemy whose rectangle overlaps the player's.
    pub fn caught_by(&self) -> Option<usize> {
        self.enemies
            .iter()
            .find(|e| self.player.overlaps(&e.actor))
            .map(|e| e.id)
    }

    pub fn chasing_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.ai.is_chasing()).count()
    }
}

/// Uniform in `min..=max`; an inverted range collapses to `max`.
fn roll<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    rng.gen_range(min.min(max)..=max)
}

pub struct AppState {
    pub phase: Phase,
    pub music_on: bool,
    pub session: Option<GameSession>,
    /// Time survived in the last finished run.
    pub last_survival: f32,
    pub best_survival: f32,
    sessions_started: u64,
}

impl AppState {
    pub fn new(music_on: bool) -> Self {
        AppState {
            phase: Phase::Menu,
            music_on,
            session: None,
            last_survival: 0.0,
            best_survival: 0.0,
            sessions_started: 0,
        }
    }

    /// Build a fresh session and enter Playing.
    pub fn start_session(&mut self, config: &GameConfig) {
        let seed = match config.seed {
            Some(base) => base.wrapping_add(self.sessions_started),
            None => rand::random(),
        };
        self.sessions_started += 1;
        self.session = Some(GameSession::new(config, seed));
        self.phase = Phase::Playing;
    }

    /// End the current run. The session is discarded.
    pub fn game_over(&mut self) {
        if let Some(session) = self.session.take() {
            self.last_survival = session.elapsed;
            self.best_survival = self.best_survival.max(session.elapsed);
            info!(
                seed = session.seed,
                survived = session.elapsed,
                ticks = session.tick,
                "game over"
            );
        }
        self.phase = Phase::GameOver;
    }

    pub fn back_to_menu(&mut self) {
        self.session = None;
        self.phase = Phase::Menu;
    }

    pub fn toggle_music(&mut self) -> bool {
        self.music_on = !self.music_on;
        self.music_on
    }
}
