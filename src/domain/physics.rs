/// Axis-separated collision against the tile grid.
///
/// ## Resolution order
///
///   1. Move along x, collect overlapping walls, snap the leading x edge.
///   2. Move along y (from the x-corrected rect), collect again, snap the
///      leading y edge.
///
/// Only the tiles under the rectangle are scanned; the scan window is clamped
/// to the grid, so rectangles hanging off the map never index out of range.
///
/// A zero displacement on an axis applies no correction on that axis, even if
/// the rectangle already overlaps a wall.
///
/// `resolve` alone can skip a wall when one step is longer than a tile plus
/// the rectangle's size. `resolve_swept` splits a move into steps of at most
/// one tile per axis, so no speed carries a rectangle through a wall.

use super::geom::Rect;
use super::map::TileMap;

/// Wall tile rectangles strictly overlapping `rect`, in row-major scan order.
pub fn wall_collisions(rect: &Rect, map: &TileMap) -> Vec<Rect> {
    let mut hits = Vec::new();
    if map.rows() == 0 || map.cols() == 0 { return hits; }

    let (tw, th) = map.tile_size();
    let (c0, c1) = tile_span(rect.left(), rect.right(), tw, map.cols());
    let (r0, r1) = tile_span(rect.top(), rect.bottom(), th, map.rows());

    for r in r0..=r1 {
        for c in c0..=c1 {
            if !map.is_wall(r, c) { continue; }
            let wall = map.cell_rect(r, c);
            if rect.overlaps(&wall) {
                hits.push(wall);
            }
        }
    }
    hits
}

/// Move `rect` by `(dx, dy)` and push it out of walls, one axis at a time.
pub fn resolve(rect: Rect, dx: f32, dy: f32, map: &TileMap) -> Rect {
    let mut r = rect;

    r.x += dx;
    for wall in wall_collisions(&r, map) {
        if dx > 0.0 {
            r.set_right(wall.left());
        } else if dx < 0.0 {
            r.set_left(wall.right());
        }
    }

    r.y += dy;
    for wall in wall_collisions(&r, map) {
        if dy > 0.0 {
            r.set_bottom(wall.top());
        } else if dy < 0.0 {
            r.set_top(wall.bottom());
        }
    }

    r
}

/// Upper bound on sub-steps for one move.
const MAX_SUBSTEPS: f32 = 1024.0;

/// `resolve` in equal sub-steps no longer than one tile on either axis.
/// A non-finite displacement leaves the rectangle where it is.
pub fn resolve_swept(rect: Rect, dx: f32, dy: f32, map: &TileMap) -> Rect {
    if !(dx.is_finite() && dy.is_finite()) { return rect; }

    let (tw, th) = map.tile_size();
    let steps = if tw > 0.0 && th > 0.0 {
        (dx.abs() / tw).max(dy.abs() / th).ceil().clamp(1.0, MAX_SUBSTEPS) as usize
    } else {
        1
    };
    let (sx, sy) = (dx / steps as f32, dy / steps as f32);
    (0..steps).fold(rect, |r, _| resolve(r, sx, sy, map))
}

/// Inclusive tile index range covering `[lo, hi]`, clamped to `0..count`.
fn tile_span(lo: f32, hi: f32, size: f32, count: usize) -> (usize, usize) {
    let last = count as i64 - 1;
    let a = ((lo / size).floor() as i64).clamp(0, last);
    let b = ((hi / size).floor() as i64).clamp(0, last);
    (a as usize, b as usize)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::map::map_from;

    fn room() -> TileMap {
        map_from(&[
            "#####",
            "#...#",
            "#...#",
            "#####",
        ], 16.0, 16.0)
    }

    fn touches_no_wall(r: &Rect, map: &TileMap) -> bool {
        wall_collisions(r, map).is_empty()
    }

    // ── Single axis ──

    #[test]
    fn right_into_wall_snaps_to_wall_left() {
        let map = room();
        let start = Rect::new(40.0, 17.0, 14.0, 14.0);
        let end = resolve(start, 20.0, 0.0, &map);
        assert_eq!(end.right(), 64.0);
        assert_eq!(end.y, 17.0);
    }

    #[test]
    fn left_into_wall_snaps_to_wall_right() {
        let map = room();
        let start = Rect::new(20.0, 17.0, 14.0, 14.0);
        let end = resolve(start, -10.0, 0.0, &map);
        assert_eq!(end.left(), 16.0);
        assert_eq!(end.y, 17.0);
    }

    #[test]
    fn down_into_wall_snaps_to_wall_top() {
        let map = room();
        let start = Rect::new(20.0, 30.0, 14.0, 14.0);
        let end = resolve(start, 0.0, 12.0, &map);
        assert_eq!(end.bottom(), 48.0);
        assert_eq!(end.x, 20.0);
    }

    #[test]
    fn up_into_wall_snaps_to_wall_bottom() {
        let map = room();
        let start = Rect::new(20.0, 20.0, 14.0, 14.0);
        let end = resolve(start, 0.0, -9.0, &map);
        assert_eq!(end.top(), 16.0);
        assert_eq!(end.x, 20.0);
    }

    #[test]
    fn free_movement_is_unchanged() {
        let map = room();
        let start = Rect::new(20.0, 18.0, 10.0, 10.0);
        let end = resolve(start, 3.5, 2.0, &map);
        assert_eq!(end, Rect::new(23.5, 20.0, 10.0, 10.0));
    }

    #[test]
    fn zero_displacement_never_moves() {
        let map = room();
        let inside = Rect::new(20.0, 18.0, 10.0, 10.0);
        assert_eq!(resolve(inside, 0.0, 0.0, &map), inside);
        // Embedded in the border: still untouched.
        let embedded = Rect::new(2.0, 2.0, 10.0, 10.0);
        assert_eq!(resolve(embedded, 0.0, 0.0, &map), embedded);
    }

    // ── Both axes ──

    #[test]
    fn diagonal_into_corner_touches_both_walls() {
        let map = room();
        let start = Rect::new(36.0, 20.0, 14.0, 14.0);
        let end = resolve(start, 20.0, 20.0, &map);
        assert_eq!(end.right(), 64.0);
        assert_eq!(end.bottom(), 48.0);
        assert!(touches_no_wall(&end, &map));
    }

    #[test]
    fn slides_along_wall() {
        let map = room();
        // Pressed against the right wall, moving down-right: x blocked, y free.
        let start = Rect::new(50.0, 17.0, 14.0, 14.0);
        let end = resolve(start, 5.0, 4.0, &map);
        assert_eq!(end.right(), 64.0);
        assert_eq!(end.y, 21.0);
    }

    // ── Edge cases ──

    #[test]
    fn embedded_actor_pushed_out_by_motion() {
        let map = map_from(&[
            ".....",
            "..#..",
            ".....",
        ], 16.0, 16.0);
        // Fully inside the wall tile at (1, 2) = x 32..48, y 16..32.
        let start = Rect::new(33.0, 17.0, 10.0, 10.0);
        let end = resolve(start, 5.0, 0.0, &map);
        assert_eq!(end.right(), 32.0);
        assert!(touches_no_wall(&end, &map));
    }

    #[test]
    fn embedded_actor_without_x_motion_stays_embedded() {
        let map = map_from(&[
            ".....",
            "..#..",
            ".....",
        ], 16.0, 16.0);
        let start = Rect::new(33.0, 17.0, 10.0, 10.0);
        let end = resolve(start, 0.0, 0.0, &map);
        assert_eq!(end, start);
        assert!(!touches_no_wall(&end, &map));
    }

    #[test]
    fn scan_clamps_off_map_rect() {
        let map = room();
        let off = Rect::new(-40.0, -40.0, 14.0, 14.0);
        assert_eq!(wall_collisions(&off, &map).len(), 0);
        let huge = Rect::new(-100.0, -100.0, 1000.0, 1000.0);
        assert_eq!(wall_collisions(&huge, &map).len(), 14);
    }

    #[test]
    fn touching_wall_is_not_a_collision() {
        let map = room();
        let flush = Rect::new(16.0, 16.0, 16.0, 16.0);
        assert!(touches_no_wall(&flush, &map));
    }

    #[test]
    fn single_long_step_can_skip_a_thin_wall() {
        let map = map_from(&["#####", "#.#.#", "#####"], 16.0, 16.0);
        let start = Rect::new(17.0, 17.0, 14.0, 14.0);
        let end = resolve(start, 32.0, 0.0, &map);
        assert_eq!(end.left(), 49.0);
    }

    #[test]
    fn swept_move_stops_at_first_wall() {
        let map = map_from(&["#####", "#.#.#", "#####"], 16.0, 16.0);
        let start = Rect::new(17.0, 17.0, 14.0, 14.0);
        let end = resolve_swept(start, 32.0, 0.0, &map);
        assert_eq!(end.right(), 32.0);
        assert_eq!(end.top(), 17.0);
    }

    #[test]
    fn swept_move_never_leaves_the_border() {
        let map = room();
        let (w, h) = map.world_size();
        let start = Rect::new(30.0, 20.0, 14.0, 14.0);
        for (dx, dy) in [(500.0, 0.0), (-500.0, 0.0), (0.0, 500.0), (0.0, -500.0), (500.0, 500.0)] {
            let end = resolve_swept(start, dx, dy, &map);
            assert!(end.left() >= 16.0 && end.right() <= w - 16.0, "x for ({dx}, {dy})");
            assert!(end.top() >= 16.0 && end.bottom() <= h - 16.0, "y for ({dx}, {dy})");
        }
    }

    #[test]
    fn swept_short_move_matches_single_step() {
        let map = room();
        let start = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(resolve_swept(start, 5.0, -3.0, &map), resolve(start, 5.0, -3.0, &map));
        assert_eq!(resolve_swept(start, f32::NAN, 0.0, &map), start);
    }

    #[test]
    fn empty_map_has_no_walls() {
        let map = TileMap::generate(0, 0, 16, 16);
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(resolve(r, 5.0, 5.0, &map), Rect::new(5.0, 5.0, 10.0, 10.0));
    }
}
