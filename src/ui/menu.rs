/// Main menu: three stacked buttons centered on the terminal.
///
/// Buttons are laid out in terminal cells so the same rectangles serve the
/// renderer and mouse hit-testing.

use crate::domain::geom::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    Start,
    Music,
    Exit,
}

pub const ITEMS: [MenuItem; 3] = [MenuItem::Start, MenuItem::Music, MenuItem::Exit];

pub const BUTTON_W: u16 = 24;
pub const BUTTON_H: u16 = 3;
const BUTTON_GAP: u16 = 1;
/// Rows reserved above the buttons for the title.
pub const TITLE_H: u16 = 4;

impl MenuItem {
    pub fn label(self, music_on: bool) -> &'static str {
        match self {
            MenuItem::Start => "Start",
            MenuItem::Music if music_on => "Music: On",
            MenuItem::Music => "Music: Off",
            MenuItem::Exit => "Exit",
        }
    }
}

#[derive(Default)]
pub struct Menu {
    pub cursor: usize,
}

impl Menu {
    pub fn new() -> Self {
        Menu { cursor: 0 }
    }

    pub fn selected(&self) -> MenuItem {
        ITEMS[self.cursor % ITEMS.len()]
    }

    pub fn move_up(&mut self) {
        self.cursor = (self.cursor + ITEMS.len() - 1) % ITEMS.len();
    }

    pub fn move_down(&mut self) {
        self.cursor = (self.cursor + 1) % ITEMS.len();
    }

    /// Button rectangles for a `term_w × term_h` terminal, in `ITEMS` order.
    /// Buttons are horizontally centered; the block (title plus buttons) is
    /// vertically centered and clamped to the top on tiny terminals.
    pub fn layout(term_w: u16, term_h: u16) -> [Rect; 3] {
        let n = ITEMS.len() as u16;
        let block_h = TITLE_H + n * BUTTON_H + (n - 1) * BUTTON_GAP;
        let top = term_h.saturating_sub(block_h) / 2 + TITLE_H;
        let left = term_w.saturating_sub(BUTTON_W) / 2;

        let mut rects = [Rect::new(0.0, 0.0, 0.0, 0.0); 3];
        for (i, r) in rects.iter_mut().enumerate() {
            let y = top + i as u16 * (BUTTON_H + BUTTON_GAP);
            *r = Rect::new(left as f32, y as f32, BUTTON_W as f32, BUTTON_H as f32);
        }
        rects
    }

    /// Item under the terminal cell `(col, row)`, if any.
    pub fn hit_test(col: u16, row: u16, term_w: u16, term_h: u16) -> Option<MenuItem> {
        // Sample the cell center so edges belong to exactly one cell.
        let (px, py) = (col as f32 + 0.5, row as f32 + 0.5);
        Self::layout(term_w, term_h)
            .iter()
            .position(|r| r.contains(px, py))
            .map(|i| ITEMS[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_both_ways() {
        let mut m = Menu::new();
        assert_eq!(m.selected(), MenuItem::Start);
        m.move_up();
        assert_eq!(m.selected(), MenuItem::Exit);
        m.move_down();
        m.move_down();
        assert_eq!(m.selected(), MenuItem::Music);
    }

    #[test]
    fn layout_is_centered_and_stacked() {
        let rects = Menu::layout(80, 24);
        // block = 4 + 9 + 2 = 15 rows → top = (24 - 15) / 2 + 4 = 8
        assert_eq!(rects[0], Rect::new(28.0, 8.0, 24.0, 3.0));
        assert_eq!(rects[1].top(), 12.0);
        assert_eq!(rects[2].top(), 16.0);
    }

    #[test]
    fn hit_test_maps_cells_to_items() {
        assert_eq!(Menu::hit_test(28, 8, 80, 24), Some(MenuItem::Start));
        assert_eq!(Menu::hit_test(51, 10, 80, 24), Some(MenuItem::Start));
        assert_eq!(Menu::hit_test(40, 13, 80, 24), Some(MenuItem::Music));
        assert_eq!(Menu::hit_test(40, 18, 80, 24), Some(MenuItem::Exit));
    }

    #[test]
    fn hit_test_misses_gaps_and_margins() {
        assert_eq!(Menu::hit_test(40, 11, 80, 24), None); // gap row
        assert_eq!(Menu::hit_test(27, 9, 80, 24), None);
        assert_eq!(Menu::hit_test(52, 9, 80, 24), None);
        assert_eq!(Menu::hit_test(40, 0, 80, 24), None);
    }

    #[test]
    fn tiny_terminal_clamps_to_top() {
        let rects = Menu::layout(10, 5);
        assert_eq!(rects[0].left(), 0.0);
        assert_eq!(rects[0].top(), TITLE_H as f32);
    }

    #[test]
    fn music_label_tracks_toggle() {
        assert_eq!(MenuItem::Music.label(true), "Music: On");
        assert_eq!(MenuItem::Music.label(false), "Music: Off");
    }
}
