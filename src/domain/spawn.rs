/// Spawn search: random trials for a Floor cell with a clear 8-neighborhood.
///
/// The first `CENTER_BIAS_ATTEMPTS` trials may be confined to a window around
/// the map center (used for the player). Exhausting every trial is not an
/// error; the world center is returned instead.

use rand::Rng;
use tracing::debug;

use super::map::TileMap;

pub const SPAWN_ATTEMPTS: usize = 1000;
pub const CENTER_BIAS_ATTEMPTS: usize = 20;
/// Half-width, in cells, of the center window.
pub const CENTER_WINDOW: i64 = 5;

/// Find a spawn point in world coordinates (center of the chosen cell).
pub fn find_spawn<R: Rng + ?Sized>(map: &TileMap, prefer_center: bool, rng: &mut R) -> (f32, f32) {
    let (world_w, world_h) = map.world_size();
    let fallback = (world_w / 2.0, world_h / 2.0);

    let rows = map.rows() as i64;
    let cols = map.cols() as i64;
    if rows == 0 || cols == 0 {
        return fallback;
    }
    let (cr, cc) = map.center_cell();
    let (cr, cc) = (cr as i64, cc as i64);

    for attempt in 0..SPAWN_ATTEMPTS {
        let (r, c) = if prefer_center && attempt < CENTER_BIAS_ATTEMPTS {
            (
                rng.gen_range(cr - CENTER_WINDOW..=cr + CENTER_WINDOW),
                rng.gen_range(cc - CENTER_WINDOW..=cc + CENTER_WINDOW),
            )
        } else {
            (sample_interior(rng, rows), sample_interior(rng, cols))
        };
        let r = r.clamp(0, rows - 1) as usize;
        let c = c.clamp(0, cols - 1) as usize;

        if is_clear(map, r, c) {
            return map.cell_center(r, c);
        }
    }

    debug!(attempts = SPAWN_ATTEMPTS, "no clear spawn cell found, using world center");
    fallback
}

/// Is `(row, col)` Floor with every in-bounds neighbor Floor?
/// Neighbors outside the grid are skipped.
pub fn is_clear(map: &TileMap, row: usize, col: usize) -> bool {
    if !map.is_floor(row, col) { return false; }
    for dr in -1i64..=1 {
        for dc in -1i64..=1 {
            let r = row as i64 + dr;
            let c = col as i64 + dc;
            if r < 0 || c < 0 || r >= map.rows() as i64 || c >= map.cols() as i64 {
                continue;
            }
            if !map.is_floor(r as usize, c as usize) { return false; }
        }
    }
    true
}

/// Uniform over `1..=n-2`; whole axis when there is no interior.
fn sample_interior<R: Rng + ?Sized>(rng: &mut R, n: i64) -> i64 {
    if n >= 3 { rng.gen_range(1..=n - 2) } else { rng.gen_range(0..n) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::map::map_from;
    use crate::domain::tile::Tile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn assert_valid_spawn(map: &TileMap, pos: (f32, f32)) {
        let (ww, wh) = map.world_size();
        assert!(pos.0 >= 0.0 && pos.0 <= ww, "x out of world: {pos:?}");
        assert!(pos.1 >= 0.0 && pos.1 <= wh, "y out of world: {pos:?}");
        let (r, c) = map.cell_at(pos.0, pos.1).expect("spawn on grid");
        assert!(is_clear(map, r, c), "cell ({r},{c}) not clear");
    }

    #[test]
    fn spawns_on_generated_map_are_clear() {
        let map = TileMap::generate(1280, 720, 16, 16);
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let pos = find_spawn(&map, seed % 2 == 0, &mut rng);
            assert_valid_spawn(&map, pos);
        }
    }

    #[test]
    fn prefer_center_lands_near_center() {
        let map = TileMap::generate(1280, 720, 16, 16);
        let (cr, cc) = map.center_cell();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (x, y) = find_spawn(&map, true, &mut rng);
            let (r, c) = map.cell_at(x, y).expect("on grid");
            assert!(r.abs_diff(cr) <= 5, "row {r} far from {cr}");
            assert!(c.abs_diff(cc) <= 5, "col {c} far from {cc}");
        }
    }

    #[test]
    fn all_wall_map_falls_back_to_world_center() {
        let map = TileMap::from_tiles(vec![vec![Tile::Wall; 10]; 8], 16.0, 16.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(find_spawn(&map, true, &mut rng), (80.0, 64.0));
        assert_eq!(find_spawn(&map, false, &mut rng), (80.0, 64.0));
    }

    #[test]
    fn empty_map_falls_back() {
        let map = TileMap::generate(1280, 720, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(find_spawn(&map, false, &mut rng), (640.0, 360.0));
    }

    #[test]
    fn finds_the_only_clear_pocket() {
        let map = map_from(&[
            "#######",
            "#######",
            "##...##",
            "##...##",
            "##...##",
            "#######",
            "#######",
        ], 16.0, 16.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(find_spawn(&map, false, &mut rng), map.cell_center(3, 3));
    }

    #[test]
    fn off_grid_neighbors_are_skipped() {
        let map = map_from(&["..", ".."], 16.0, 16.0);
        assert!(is_clear(&map, 0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pos = find_spawn(&map, false, &mut rng);
        assert_valid_spawn(&map, pos);
    }

    #[test]
    fn wall_neighbor_blocks_cell() {
        let map = map_from(&[
            ".....",
            ".....",
            "...#.",
            ".....",
        ], 16.0, 16.0);
        assert!(!is_clear(&map, 1, 2));
        assert!(!is_clear(&map, 2, 3));
        assert!(is_clear(&map, 1, 1));
    }

    #[test]
    fn repeated_calls_are_independent() {
        let map = TileMap::generate(1280, 720, 16, 16);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let spawns: Vec<_> = (0..6).map(|_| find_spawn(&map, false, &mut rng)).collect();
        for pos in &spawns {
            assert_valid_spawn(&map, *pos);
        }
        assert!(spawns.windows(2).any(|w| w[0] != w[1]));
    }
}
