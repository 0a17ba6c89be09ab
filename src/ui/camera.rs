/// Camera: the window of map cells the terminal shows.
///
/// `(x, y)` is the map cell drawn at the top-left of the viewport and may be
/// negative when a map smaller than the viewport is centered. The renderer
/// sets `view_w`/`view_h` from the terminal size every frame, then either
/// snaps onto the player (`center_on`) or scrolls with a dead zone (`follow`).

#[derive(Clone, Debug, Default)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    /// Map columns visible.
    pub view_w: usize,
    /// Map rows visible.
    pub view_h: usize,
}

/// Top-left of a viewport `view` cells long over a map `world` cells long.
/// A map that fits is centered; otherwise the origin is clamped so the
/// viewport never shows past the map edge.
fn clamp_axis(origin: i32, view: usize, world: usize) -> i32 {
    if world <= view {
        -((view as i32 - world as i32) / 2)
    } else {
        origin.clamp(0, world as i32 - view as i32)
    }
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    /// Scroll only when `(col, row)` leaves the inner 60% of the viewport.
    pub fn follow(&mut self, col: usize, row: usize, cols: usize, rows: usize) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        self.x = clamp_axis(dead_zone(self.x, col as i32, self.view_w), self.view_w, cols);
        self.y = clamp_axis(dead_zone(self.y, row as i32, self.view_h), self.view_h, rows);
    }

    /// Put `(col, row)` in the middle of the viewport, clamped to the map.
    pub fn center_on(&mut self, col: usize, row: usize, cols: usize, rows: usize) {
        if self.view_w == 0 || self.view_h == 0 { return; }
        self.x = clamp_axis(col as i32 - self.view_w as i32 / 2, self.view_w, cols);
        self.y = clamp_axis(row as i32 - self.view_h as i32 / 2, self.view_h, rows);
    }

    /// Map cell under the viewport cell `(vx, vy)`. May lie off the map.
    pub fn view_to_world(&self, vx: usize, vy: usize) -> (i32, i32) {
        (self.x + vx as i32, self.y + vy as i32)
    }

    /// Viewport cell showing the map cell `(col, row)`, or `None` when it
    /// is scrolled out of view.
    pub fn world_to_view(&self, col: usize, row: usize) -> Option<(usize, usize)> {
        let vx = col as i32 - self.x;
        let vy = row as i32 - self.y;
        let inside = (0..self.view_w as i32).contains(&vx) && (0..self.view_h as i32).contains(&vy);
        inside.then_some((vx as usize, vy as usize))
    }
}

/// New origin along one axis so `target` sits inside a margin of one fifth
/// of the view on each side.
fn dead_zone(origin: i32, target: i32, view: usize) -> i32 {
    let margin = view as i32 / 5;
    let low = origin + margin;
    let high = origin + view as i32 - margin - 1;
    if target < low {
        target - margin
    } else if target > high {
        target - view as i32 + margin + 1
    } else {
        origin
    }
}
