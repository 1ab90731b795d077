//! Keyboard state and the arrow-key orbit mapping.
//!
//! Physical key codes are used so the controls sit in the same place on
//! every keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event, decoupled from winit's platform data.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

/// Held keys plus the keys pressed since the last [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: HashSet<PhysicalKey>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Repeat events are ignored.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                self.pressed.insert(event.key);
                self.just_pressed.insert(event.key);
            }
            ElementState::Released => {
                self.pressed.remove(&event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&PhysicalKey::Code(key))
    }

    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&PhysicalKey::Code(key))
    }

    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
    }

    /// Drop everything, e.g. when the window loses focus and releases
    /// would otherwise be missed.
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
    }
}

/// Orbit direction requested by the arrow keys, each axis in `-1..=1`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Positive swings the camera to the right around the target.
    pub yaw: f32,
    /// Positive raises the camera.
    pub pitch: f32,
}

impl OrbitInput {
    pub fn from_keyboard(keyboard: &KeyboardState) -> Self {
        let axis = |neg: KeyCode, pos: KeyCode| {
            f32::from(u8::from(keyboard.is_pressed(pos)))
                - f32::from(u8::from(keyboard.is_pressed(neg)))
        };
        Self {
            yaw: axis(KeyCode::ArrowLeft, KeyCode::ArrowRight),
            pitch: axis(KeyCode::ArrowDown, KeyCode::ArrowUp),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn release(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Released,
            repeat: false,
        });
    }

    #[test]
    fn test_press_and_release() {
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::Escape);
        assert!(kb.is_pressed(KeyCode::Escape));
        assert!(kb.just_pressed(KeyCode::Escape));

        kb.clear_transients();
        assert!(kb.is_pressed(KeyCode::Escape));
        assert!(!kb.just_pressed(KeyCode::Escape));

        release(&mut kb, KeyCode::Escape);
        assert!(!kb.is_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_repeat_events_are_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(KeyCode::ArrowLeft),
            state: ElementState::Pressed,
            repeat: true,
        });
        assert!(!kb.is_pressed(KeyCode::ArrowLeft));
    }

    #[test]
    fn test_orbit_axes() {
        let mut kb = KeyboardState::new();
        assert!(OrbitInput::from_keyboard(&kb).is_idle());

        press(&mut kb, KeyCode::ArrowRight);
        press(&mut kb, KeyCode::ArrowDown);
        assert_eq!(
            OrbitInput::from_keyboard(&kb),
            OrbitInput {
                yaw: 1.0,
                pitch: -1.0
            }
        );

        // Opposing keys cancel.
        press(&mut kb, KeyCode::ArrowLeft);
        assert_eq!(OrbitInput::from_keyboard(&kb).yaw, 0.0);
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::ArrowUp);
        kb.reset();
        assert!(OrbitInput::from_keyboard(&kb).is_idle());
    }
}
