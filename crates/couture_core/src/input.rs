//! Platform-agnostic input state
//!
//! Platform adapters (the winit adapter in `couture_app`, a browser shim,
//! tests) translate native events into these types. The frame bridge reads
//! the accumulated state once per frame and then calls [`Input::start_frame`].

use glam::Vec2;
use rustc_hash::FxHashSet;

/// Keys the viewer reacts to.
///
/// Only the keys with a binding in the interaction layer are listed;
/// adapters drop everything else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Accumulated input for the current frame.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pressed_keys: FxHashSet<Key>,
    // Presses in arrival order, auto-repeat included
    key_presses: Vec<Key>,

    pressed_mouse: FxHashSet<MouseButton>,

    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,

    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Adapter API ==========

    /// Clears transient state (key presses, deltas).
    pub fn start_frame(&mut self) {
        self.key_presses.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Records a key event. Repeated `Pressed` events while held count as
    /// separate presses, like browser keydown auto-repeat.
    pub fn inject_key(&mut self, key: Key, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_keys.insert(key);
                self.key_presses.push(key);
            }
            ButtonState::Released => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_mouse.insert(button);
            }
            ButtonState::Released => {
                self.pressed_mouse.remove(&button);
            }
        }
    }

    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        if let Some(old) = self.mouse_position {
            self.mouse_delta += new_pos - old;
        }
        self.mouse_position = Some(new_pos);
    }

    pub fn inject_scroll(&mut self, delta_x: f32, delta_y: f32) {
        self.scroll_delta += Vec2::new(delta_x, delta_y);
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    // ========== Query API ==========

    #[must_use]
    pub fn is_key_held(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Key presses received since the last [`start_frame`](Self::start_frame).
    #[must_use]
    pub fn key_presses(&self) -> &[Key] {
        &self.key_presses
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_mouse.contains(&button)
    }

    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_repeat_counts_every_press() {
        let mut input = Input::new();
        input.inject_key(Key::W, ButtonState::Pressed);
        input.inject_key(Key::W, ButtonState::Pressed);
        assert_eq!(input.key_presses(), &[Key::W, Key::W]);
        assert!(input.is_key_held(Key::W));

        input.start_frame();
        assert!(input.key_presses().is_empty());
        assert!(input.is_key_held(Key::W));
    }

    #[test]
    fn first_cursor_sample_has_no_delta() {
        let mut input = Input::new();
        input.inject_mouse_position(10.0, 10.0);
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.inject_mouse_position(15.0, 7.0);
        assert_eq!(input.mouse_delta(), Vec2::new(5.0, -3.0));
    }
}
