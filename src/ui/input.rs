/// Terminal input tracker.
///
/// Movement needs "is this key held", which terminals do not report directly.
/// A key counts as held while Press/Repeat events keep arriving; it expires
/// after `HOLD_TIMEOUT` of silence, or immediately on a Release event when
/// the terminal supports keyboard enhancement.
///
/// Menu navigation uses edge-triggered presses and left mouse clicks.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    last_active: HashMap<KeyCode, Instant>,
    fresh_presses: Vec<KeyCode>,
    /// Left clicks this frame, as terminal `(column, row)`.
    clicks: Vec<(u16, u16)>,
    ctrl_c: bool,
    /// Honor Release events (set once keyboard enhancement is confirmed).
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            clicks: Vec::with_capacity(2),
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame before reading any state.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.clicks.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(m)) => {
                    if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                        self.clicks.push((m.column, m.row));
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
        }

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}
