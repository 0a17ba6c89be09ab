/// Gamepad input tracker using gilrs.
///
/// Mapping:
///   D-pad / Left Stick    →  Movement, menu cursor
///   A / Start             →  Confirm
///   B / Select            →  Back / Quit
///
/// Without the "gamepad" feature this compiles to a tracker that never
/// reports anything.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::info;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Per-direction state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

impl Dirs {
    fn clear_edges(&mut self) {
        for b in [&mut self.up, &mut self.down, &mut self.left, &mut self.right] {
            b.just_pressed = false;
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    dpad: Dirs,
    stick: Dirs,
    stick_x: f32,
    stick_y: f32,
    confirm: BtnState,
    cancel: BtnState,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                if g.gamepads().next().is_some() {
                    info!("gamepad connected");
                }
                Some(g)
            }
            Err(e) => {
                tracing::debug!(error = %e, "gamepad support unavailable");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            confirm: BtnState::default(),
            cancel: BtnState::default(),
        }
    }

    pub fn update(&mut self) {
        self.dpad.clear_edges();
        self.stick.clear_edges();
        self.confirm.just_pressed = false;
        self.cancel.just_pressed = false;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(axis, value, _) => {
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => info!("gamepad connected"),
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }

        // Stick Y is positive upward.
        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let state = match btn {
            Button::DPadUp => &mut self.dpad.up,
            Button::DPadDown => &mut self.dpad.down,
            Button::DPadLeft => &mut self.dpad.left,
            Button::DPadRight => &mut self.dpad.right,
            Button::South | Button::Start => &mut self.confirm,
            Button::East | Button::Select => &mut self.cancel,
            _ => return,
        };
        state.set(held);
    }

    // ── Edge queries ──

    pub fn confirm_pressed(&self) -> bool {
        self.confirm.just_pressed
    }
    pub fn cancel_pressed(&self) -> bool {
        self.cancel.just_pressed
    }
    pub fn up_pressed(&self) -> bool {
        self.dpad.up.just_pressed || self.stick.up.just_pressed
    }
    pub fn down_pressed(&self) -> bool {
        self.dpad.down.just_pressed || self.stick.down.just_pressed
    }

    // ── Movement (continuous, held) ──

    pub fn up_held(&self) -> bool {
        self.dpad.up.held || self.stick.up.held
    }
    pub fn down_held(&self) -> bool {
        self.dpad.down.held || self.stick.down.held
    }
    pub fn left_held(&self) -> bool {
        self.dpad.left.held || self.stick.left.held
    }
    pub fn right_held(&self) -> bool {
        self.dpad.right.held || self.stick.right.held
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.dpad = Dirs::default();
        self.stick = Dirs::default();
        self.confirm = BtnState::default();
        self.cancel = BtnState::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_edge_once() {
        let mut b = BtnState::default();
        b.set(true);
        assert!(b.held && b.just_pressed);
        b.just_pressed = false;
        b.set(true);
        assert!(!b.just_pressed);
        b.set(false);
        assert!(!b.held);
    }
}
