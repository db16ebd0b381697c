//! Keyboard panning of the model.

use couture_core::Key;
use glam::Vec2;

pub const DEFAULT_PAN_STEP: f32 = 4.0;

/// Stage offset change for one press of `key`, or `None` for keys that do
/// not pan. The model moves in the direction of the arrow.
#[must_use]
pub fn pan_delta(key: Key, step: f32) -> Option<Vec2> {
    match key {
        Key::ArrowDown | Key::S => Some(Vec2::new(0.0, -step)),
        Key::ArrowUp | Key::W => Some(Vec2::new(0.0, step)),
        Key::ArrowLeft | Key::A => Some(Vec2::new(-step, 0.0)),
        Key::ArrowRight | Key::D => Some(Vec2::new(step, 0.0)),
        Key::Space | Key::Escape => None,
    }
}

/// Whether the host should suppress the key's default action (page
/// scrolling, focus movement).
#[must_use]
pub fn handles(key: Key) -> bool {
    pan_delta(key, 0.0).is_some()
}

/// Sums the pan of every press this frame, auto-repeat included.
#[must_use]
pub fn accumulate(presses: &[Key], step: f32) -> Vec2 {
    presses.iter().filter_map(|&k| pan_delta(k, step)).sum()
}
