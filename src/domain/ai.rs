/// Enemy AI — Patrol ⇄ Chase state machine.
///
/// Two modes:
///   1. **Patrol** — wander. Every `patrol_interval` seconds pick a new
///      direction (or stop). The interval is re-rolled on every decision.
///   2. **Chase** — head straight for the player, one unit step per axis.
///
/// Transitions use two radii so the enemy does not flicker at the edge:
///   Patrol → Chase   when distance <  detection_radius
///   Chase  → Patrol  when distance >  lose_aggro_radius (intent cleared)
///
/// The AI only reads the player's position; it never touches other enemies.

use std::ops::Range;

use rand::Rng;

use super::entity::Intent;

/// Initial patrol timer, seconds.
pub const PATROL_START_TIMER: Range<f32> = 0.0..1.5;
/// Initial patrol interval, seconds.
pub const PATROL_START_INTERVAL: Range<f32> = 1.5..3.0;
/// Interval re-rolled after each patrol decision, seconds.
pub const PATROL_INTERVAL: Range<f32> = 2.0..4.0;
/// Chance that a patrol decision is "stand still".
pub const PATROL_STOP_CHANCE: f64 = 0.3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AiMode {
    Patrol,
    Chase,
}

#[derive(Clone, Debug)]
pub struct EnemyAi {
    pub mode: AiMode,
    pub detection_radius: f32,
    pub lose_aggro_radius: f32,
    pub patrol_timer: f32,
    pub patrol_interval: f32,
    pub intent: Intent,
}

impl EnemyAi {
    /// Fresh AI in Patrol with randomized patrol timing.
    pub fn new<R: Rng + ?Sized>(detection_radius: f32, lose_aggro_radius: f32, rng: &mut R) -> Self {
        let timer = rng.gen_range(PATROL_START_TIMER);
        let interval = rng.gen_range(PATROL_START_INTERVAL);
        Self::with_timers(detection_radius, lose_aggro_radius, timer, interval)
    }

    /// Fresh AI in Patrol with explicit patrol timing.
    pub fn with_timers(
        detection_radius: f32,
        lose_aggro_radius: f32,
        patrol_timer: f32,
        patrol_interval: f32,
    ) -> Self {
        EnemyAi {
            mode: AiMode::Patrol,
            detection_radius,
            lose_aggro_radius,
            patrol_timer,
            patrol_interval,
            intent: Intent::NONE,
        }
    }

    pub fn is_chasing(&self) -> bool {
        self.mode == AiMode::Chase
    }

    /// Advance one frame and return the movement intent.
    ///
    /// `body_width` is the enemy's bounding-box width: inside half of it the
    /// chase intent is zero so an adjacent enemy does not jitter.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        from: (f32, f32),
        body_width: f32,
        player: (f32, f32),
        dt: f32,
        rng: &mut R,
    ) -> Intent {
        let dx = player.0 - from.0;
        let dy = player.1 - from.1;
        let dist = dx.hypot(dy);

        self.update_mode(dist);

        match self.mode {
            AiMode::Chase => {
                self.intent = if dist > body_width / 2.0 {
                    Intent::new(sign(dx), sign(dy))
                } else {
                    Intent::NONE
                };
            }
            AiMode::Patrol => self.patrol(dt, rng),
        }
        self.intent
    }

    fn update_mode(&mut self, dist: f32) {
        match self.mode {
            AiMode::Patrol if dist < self.detection_radius => {
                self.mode = AiMode::Chase;
            }
            AiMode::Chase if dist > self.lose_aggro_radius => {
                self.mode = AiMode::Patrol;
                self.intent = Intent::NONE;
            }
            _ => {}
        }
    }

    fn patrol<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if dt.is_finite() && dt > 0.0 {
            self.patrol_timer += dt;
        }
        if self.patrol_timer < self.patrol_interval { return; }

        self.patrol_timer = 0.0;
        self.patrol_interval = rng.gen_range(PATROL_INTERVAL);
        self.intent = roll_patrol_intent(rng);
    }
}

/// A patrol decision: stop with `PATROL_STOP_CHANCE`, otherwise a direction.
pub fn roll_patrol_intent<R: Rng + ?Sized>(rng: &mut R) -> Intent {
    if rng.gen_bool(PATROL_STOP_CHANCE) {
        Intent::NONE
    } else {
        roll_patrol_direction(rng)
    }
}

/// Two-stage draw: each axis from {-1, 0, 1}; a (0, 0) result is replaced by
/// a single-axis step (50/50 axis, 50/50 sign). Never returns `Intent::NONE`.
pub fn roll_patrol_direction<R: Rng + ?Sized>(rng: &mut R) -> Intent {
    let dx = rng.gen_range(-1..=1);
    let dy = rng.gen_range(-1..=1);
    if dx != 0 || dy != 0 {
        return Intent::new(dx, dy);
    }
    let step = if rng.gen_bool(0.5) { 1 } else { -1 };
    if rng.gen_bool(0.5) {
        Intent::new(step, 0)
    } else {
        Intent::new(0, step)
    }
}

fn sign(v: f32) -> i8 {
    if v > 0.0 { 1 } else if v < 0.0 { -1 } else { 0 }
}
