/// Entities: the shared `Actor` body and the `Enemy` that drives one.
///
/// Player and enemies move through the same code path: an `Intent` is turned
/// into a velocity, scaled by `dt`, and resolved against the map. Enemies add
/// an `EnemyAi` that produces the intent; the player's comes from input.

use rand::Rng;

use super::ai::{AiMode, EnemyAi};
use super::geom::Rect;
use super::map::TileMap;
use super::physics;

/// Per-axis movement direction, each component in {-1, 0, 1}.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Intent {
    pub dx: i8,
    pub dy: i8,
}

impl Intent {
    pub const NONE: Intent = Intent { dx: 0, dy: 0 };

    /// Components are clamped to their sign.
    pub fn new(dx: i8, dy: i8) -> Self {
        Intent { dx: dx.signum(), dy: dy.signum() }
    }

    /// `dx = right - left`, `dy = down - up`.
    pub fn from_held(left: bool, right: bool, up: bool, down: bool) -> Self {
        Intent {
            dx: right as i8 - left as i8,
            dy: down as i8 - up as i8,
        }
    }

    pub fn is_none(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Velocity in world units/second. Diagonals are scaled by 1/√2 so every
    /// direction moves at `speed`.
    pub fn velocity(self, speed: f32) -> (f32, f32) {
        let mut vx = self.dx as f32 * speed;
        let mut vy = self.dy as f32 * speed;
        if self.dx != 0 && self.dy != 0 {
            vx *= std::f32::consts::FRAC_1_SQRT_2;
            vy *= std::f32::consts::FRAC_1_SQRT_2;
        }
        (vx, vy)
    }
}

/// A movable body. `(x, y)` is the center; the bounding rect is derived.
#[derive(Clone, Debug)]
pub struct Actor {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Last applied intent was non-zero (drives animation selection).
    pub is_moving: bool,
}

impl Actor {
    pub fn new(x: f32, y: f32, speed: f32, width: f32, height: f32) -> Self {
        Actor { x, y, speed, width, height, is_moving: false }
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.x, self.y, self.width, self.height)
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Move by a raw displacement, resolving wall collisions.
    pub fn apply_displacement(&mut self, dx: f32, dy: f32, map: &TileMap) {
        let moved = physics::resolve_swept(self.rect(), dx, dy, map);
        (self.x, self.y) = moved.center();
    }

    /// Move for one frame along `intent`. A non-positive or non-finite `dt`
    /// leaves the position untouched.
    pub fn move_with_intent(&mut self, intent: Intent, dt: f32, map: &TileMap) {
        self.is_moving = !intent.is_none();
        if !(dt.is_finite() && dt > 0.0) { return; }
        let (vx, vy) = intent.velocity(self.speed);
        self.apply_displacement(vx * dt, vy * dt, map);
    }

    #[cfg(test)]
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (x - self.x).hypot(y - self.y)
    }

    pub fn overlaps(&self, other: &Actor) -> bool {
        self.rect().overlaps(&other.rect())
    }
}

/// An AI-driven actor.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: usize,
    pub actor: Actor,
    pub ai: EnemyAi,
}

impl Enemy {
    pub fn new(id: usize, actor: Actor, ai: EnemyAi) -> Self {
        Enemy { id, actor, ai }
    }

    /// Run the AI for one frame and move. Returns the new mode if it changed.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player: (f32, f32),
        map: &TileMap,
        rng: &mut R,
    ) -> Option<AiMode> {
        let before = self.ai.mode;
        let intent = self.ai.tick(self.actor.position(), self.actor.width, player, dt, rng);
        self.actor.move_with_intent(intent, dt, map);
        (self.ai.mode != before).then_some(self.ai.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::map::map_from;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_field() -> TileMap {
        map_from(&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ], 16.0, 16.0)
    }

    #[test]
    fn intent_from_held_keys() {
        assert_eq!(Intent::from_held(false, true, true, false), Intent { dx: 1, dy: -1 });
        assert_eq!(Intent::from_held(true, true, false, false), Intent::NONE);
        assert_eq!(Intent::new(5, -3), Intent { dx: 1, dy: -1 });
    }

    #[test]
    fn diagonal_velocity_has_axis_magnitude() {
        let (vx, vy) = Intent::new(1, 1).velocity(100.0);
        assert!((vx - 70.710_68).abs() < 1e-3);
        assert!((vy - 70.710_68).abs() < 1e-3);
        assert!((vx.hypot(vy) - 100.0).abs() < 1e-3);

        assert_eq!(Intent::new(-1, 0).velocity(100.0), (-100.0, 0.0));
        assert_eq!(Intent::NONE.velocity(100.0), (0.0, 0.0));
    }

    #[test]
    fn rect_is_centered_on_position() {
        let a = Actor::new(40.0, 30.0, 100.0, 14.0, 10.0);
        assert_eq!(a.rect(), Rect::new(33.0, 25.0, 14.0, 10.0));
    }

    #[test]
    fn moves_by_speed_times_dt() {
        let map = open_field();
        let mut a = Actor::new(48.0, 40.0, 100.0, 14.0, 14.0);
        a.move_with_intent(Intent::new(1, 0), 0.25, &map);
        assert_eq!(a.position(), (73.0, 40.0));
        assert!(a.is_moving);
    }

    #[test]
    fn stops_at_wall() {
        let map = open_field();
        let mut a = Actor::new(120.0, 40.0, 200.0, 14.0, 14.0);
        a.move_with_intent(Intent::new(1, 0), 0.1, &map);
        assert_eq!(a.rect().right(), 144.0);
        assert_eq!(a.y, 40.0);
    }

    #[test]
    fn invalid_dt_is_a_no_op() {
        let map = open_field();
        for dt in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let mut a = Actor::new(48.0, 40.0, 100.0, 14.0, 14.0);
            a.move_with_intent(Intent::new(1, 1), dt, &map);
            assert_eq!(a.position(), (48.0, 40.0), "dt = {dt}");
        }
    }

    #[test]
    fn idle_intent_clears_moving_flag() {
        let map = open_field();
        let mut a = Actor::new(48.0, 40.0, 100.0, 14.0, 14.0);
        a.move_with_intent(Intent::new(0, 1), 0.1, &map);
        assert!(a.is_moving);
        a.move_with_intent(Intent::NONE, 0.1, &map);
        assert!(!a.is_moving);
    }

    #[test]
    fn overlap_between_actors() {
        let a = Actor::new(40.0, 40.0, 0.0, 14.0, 14.0);
        let b = Actor::new(53.0, 40.0, 0.0, 14.0, 14.0);
        let c = Actor::new(54.0, 40.0, 0.0, 14.0, 14.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn enemy_reports_mode_change_once() {
        let map = open_field();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let ai = EnemyAi::with_timers(150.0, 300.0, 0.0, 10.0);
        let mut e = Enemy::new(0, Actor::new(40.0, 40.0, 80.0, 14.0, 14.0), ai);

        assert_eq!(e.update(0.016, (120.0, 40.0), &map, &mut rng), Some(AiMode::Chase));
        assert_eq!(e.update(0.016, (120.0, 40.0), &map, &mut rng), None);
        assert!(e.actor.x > 40.0);
        assert!(e.actor.is_moving);
    }
}
