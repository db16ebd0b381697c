//! Winit input adapter
//!
//! Translates winit window events into the viewer's platform-agnostic input.

use couture_core::{ButtonState, Input, Key, MouseButton};
use couture_studio::keyboard;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keys without a viewer binding map to `None`.
#[must_use]
pub fn translate_key(physical_key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = physical_key else {
        return None;
    };

    let key = match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,

        _ => return None,
    };

    Some(key)
}

#[must_use]
pub fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[must_use]
pub fn translate_element_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

/// Feeds one window event into `input`.
///
/// Returns `true` when the event was a panning key, which the host should
/// not forward to its own default handling.
pub fn process_window_event(input: &mut Input, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            if let Some(key) = translate_key(event.physical_key) {
                input.inject_key(key, translate_element_state(event.state));
                return keyboard::handles(key);
            }
        }

        WindowEvent::CursorMoved { position, .. } => {
            input.inject_mouse_position(position.x as f32, position.y as f32);
        }

        WindowEvent::MouseInput { state, button, .. } => {
            input.inject_mouse_button(translate_mouse_button(*button), translate_element_state(*state));
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => {
                    const PIXEL_SCALE: f32 = 0.01;
                    (pos.x as f32 * PIXEL_SCALE, pos.y as f32 * PIXEL_SCALE)
                }
            };
            input.inject_scroll(dx, dy);
        }

        WindowEvent::Resized(size) => {
            input.inject_resize(size.width, size.height);
        }

        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bound_keys_translate() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyW)), Some(Key::W));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Some(Key::ArrowLeft));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyQ)), None);
    }
}
