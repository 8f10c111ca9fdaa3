use std::collections::HashSet;

use crate::coords::{Vec2, ViewportMapper};

use super::types::{ButtonState, Event, Key, MouseButton};

/// Current input state for the engine window.
///
/// Holds "is down" information and the pointer position in logical
/// coordinates.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical units, clamped to the logical canvas.
    pub pointer: Option<Vec2>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds one event into the state. Events that carry no input are ignored.
    pub fn apply(&mut self, ev: &Event, viewport: &ViewportMapper) {
        match *ev {
            Event::Focused(f) => {
                self.focused = f;
                if !f {
                    // Releases are not delivered to unfocused windows.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            Event::PointerMoved { x, y } => {
                self.pointer = Some(viewport.to_logical(Vec2::new(x, y)));
            }

            Event::PointerLeft => {
                self.pointer = None;
            }

            Event::Key { key, state, .. } => match state {
                ButtonState::Pressed => {
                    self.keys_down.insert(key);
                }
                ButtonState::Released => {
                    self.keys_down.remove(&key);
                }
            },

            Event::PointerButton { button, state } => match state {
                ButtonState::Pressed => {
                    self.buttons_down.insert(button);
                }
                ButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },

            Event::QuitRequested | Event::Resized { .. } | Event::ScaleFactorChanged { .. } => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}
