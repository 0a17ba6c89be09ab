/// Procedurally generated tile map.
///
/// ## Layout rules (applied per cell, in order)
///
///   1. Border ring                          → Wall
///   2. Inner chamber: rows 5..=7, centered span of columns → Wall
///   3. Two corridors: 7 rows around the middle, at 1/4 and 3/4 width → Wall
///   4. Bottom barrier: row `rows - 10`, open 10 columns from each side → Wall
///   5. 3×3 block around the center          → Floor (always wins)
///
/// Generation is a pure function of the dimensions. The map is never mutated
/// afterwards; a new session builds a new map.
///
/// Cells are addressed `(row, col)` and stored `tiles[row][col]`.

use super::geom::Rect;
use super::tile::Tile;

#[derive(Clone, Debug)]
pub struct TileMap {
    tiles: Vec<Vec<Tile>>,
    rows: usize,
    cols: usize,
    tile_w: f32,
    tile_h: f32,
    world_w: f32,
    world_h: f32,
}

impl TileMap {
    /// Build the map for a world of `world_w × world_h` units cut into
    /// `tile_w × tile_h` tiles. Partial tiles at the right/bottom are dropped.
    pub fn generate(world_w: u32, world_h: u32, tile_w: u32, tile_h: u32) -> Self {
        let cols = world_w.checked_div(tile_w).unwrap_or(0) as usize;
        let rows = world_h.checked_div(tile_h).unwrap_or(0) as usize;

        let tiles = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| if generated_wall(r as i64, c as i64, rows as i64, cols as i64) {
                        Tile::Wall
                    } else {
                        Tile::Floor
                    })
                    .collect()
            })
            .collect();

        let mut map = TileMap {
            tiles,
            rows,
            cols,
            tile_w: tile_w as f32,
            tile_h: tile_h as f32,
            world_w: world_w as f32,
            world_h: world_h as f32,
        };
        map.clear_center();
        map
    }

    #[cfg(test)]
    /// Map from explicit tiles. World size is taken as the grid extent.
    pub fn from_tiles(tiles: Vec<Vec<Tile>>, tile_w: f32, tile_h: f32) -> Self {
        let rows = tiles.len();
        let cols = tiles.first().map_or(0, |row| row.len());
        TileMap {
            tiles,
            rows,
            cols,
            tile_w,
            tile_h,
            world_w: cols as f32 * tile_w,
            world_h: rows as f32 * tile_h,
        }
    }

    fn clear_center(&mut self) {
        if self.rows == 0 || self.cols == 0 { return; }
        let (cr, cc) = self.center_cell();
        for r in cr.saturating_sub(1)..=cr + 1 {
            for c in cc.saturating_sub(1)..=cc + 1 {
                if r < self.rows && c < self.cols {
                    self.tiles[r][c] = Tile::Floor;
                }
            }
        }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn tile_size(&self) -> (f32, f32) { (self.tile_w, self.tile_h) }
    pub fn world_size(&self) -> (f32, f32) { (self.world_w, self.world_h) }

    /// Tile at `(row, col)`, or `None` outside the grid.
    pub fn tile_at(&self, row: usize, col: usize) -> Option<Tile> {
        self.tiles.get(row).and_then(|r| r.get(col)).copied()
    }

    /// In-bounds wall. Out-of-range cells are not walls.
    pub fn is_wall(&self, row: usize, col: usize) -> bool {
        self.tile_at(row, col).is_some_and(Tile::is_wall)
    }

    /// In-bounds floor.
    pub fn is_floor(&self, row: usize, col: usize) -> bool {
        self.tile_at(row, col).is_some_and(Tile::is_passable)
    }

    /// `(rows / 2, cols / 2)`.
    pub fn center_cell(&self) -> (usize, usize) {
        (self.rows / 2, self.cols / 2)
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, row: usize, col: usize) -> (f32, f32) {
        (
            col as f32 * self.tile_w + self.tile_w / 2.0,
            row as f32 * self.tile_h + self.tile_h / 2.0,
        )
    }

    /// World-space rectangle covered by a cell.
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        Rect::new(col as f32 * self.tile_w, row as f32 * self.tile_h, self.tile_w, self.tile_h)
    }

    /// Cell containing a world point, if it is on the grid.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if !(x >= 0.0 && y >= 0.0) || self.tile_w <= 0.0 || self.tile_h <= 0.0 {
            return None;
        }
        let col = (x / self.tile_w) as usize;
        let row = (y / self.tile_h) as usize;
        (row < self.rows && col < self.cols).then_some((row, col))
    }
}

/// Rules 1–4. Signed math so small maps cannot underflow.
fn generated_wall(r: i64, c: i64, rows: i64, cols: i64) -> bool {
    let border = r == 0 || r == rows - 1 || c == 0 || c == cols - 1;
    let chamber = (5..=7).contains(&r) && cols / 2 - 5 < c && c < cols / 2 + 5;
    let corridors = (rows / 2 - 3..=rows / 2 + 3).contains(&r)
        && (c == cols / 4 || c == 3 * cols / 4);
    let barrier = r == rows - 10 && 10 < c && c < cols - 10;
    border || chamber || corridors || barrier
}

/// Parse a map diagram: `'#'` = Wall, anything else = Floor.
#[cfg(test)]
pub fn map_from(rows: &[&str], tile_w: f32, tile_h: f32) -> TileMap {
    let tiles = rows
        .iter()
        .map(|row| row.chars().map(|ch| if ch == '#' { Tile::Wall } else { Tile::Floor }).collect())
        .collect();
    TileMap::from_tiles(tiles, tile_w, tile_h)
}
