//! Synthetic input: pending actions, the injection seam, and per-tick state.

use crate::geometry::Point;
use crate::key::Key;
use crate::result::MirarResult;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Mouse button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button
    #[default]
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

/// A synthetic input action awaiting execution by the render loop.
///
/// Exists from the moment a tester requests it until the loop has dispatched
/// the OS-level event and signaled completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    /// Pointer click at frame coordinates
    Click {
        /// X coordinate
        x: u32,
        /// Y coordinate
        y: u32,
    },
    /// Simultaneous key combination, in press order
    KeyCombo {
        /// Keys of the combo, modifiers first by convention
        keys: Vec<Key>,
    },
}

impl PendingAction {
    /// Create a click action
    #[must_use]
    pub const fn click(x: u32, y: u32) -> Self {
        Self::Click { x, y }
    }

    /// Create a key-combo action
    #[must_use]
    pub fn key_combo(keys: impl Into<Vec<Key>>) -> Self {
        Self::KeyCombo { keys: keys.into() }
    }
}

/// OS-level input injection seam.
///
/// The harness drives this exclusively from the render loop's draw phase, so
/// implementations never race with the application's own input handling.
pub trait InputInjector: Send {
    /// Move the pointer to frame coordinates
    fn pointer_move(&mut self, x: u32, y: u32) -> MirarResult<()>;
    /// Click a mouse button at the current pointer position
    fn click(&mut self, button: MouseButton) -> MirarResult<()>;
    /// Press and hold a key
    fn key_down(&mut self, key: Key) -> MirarResult<()>;
    /// Release a held key
    fn key_up(&mut self, key: Key) -> MirarResult<()>;
}

/// Input snapshot handed to the update phase, one per tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputState {
    cursor: Point,
    clicked: Vec<MouseButton>,
    held: Vec<Key>,
}

impl InputState {
    /// Current pointer position
    #[must_use]
    pub const fn cursor(&self) -> Point {
        self.cursor
    }

    /// Whether the button was pressed since the previous tick
    #[must_use]
    pub fn clicked(&self, button: MouseButton) -> bool {
        self.clicked.contains(&button)
    }

    /// Whether the key is currently held down
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Keys currently held down
    #[must_use]
    pub fn held_keys(&self) -> &[Key] {
        &self.held
    }
}

#[derive(Debug, Default)]
struct SyntheticState {
    cursor: Point,
    pending_clicks: Vec<MouseButton>,
    held: Vec<Key>,
}

/// Loopback injector for headless runs.
///
/// Events injected by the harness become the input state the host feeds to
/// the next update tick, standing in for the OS event pipeline. Clones share
/// state, so the same instance can serve as both the injector and the host's
/// input source.
#[derive(Debug, Clone, Default)]
pub struct SyntheticInput {
    state: Arc<Mutex<SyntheticState>>,
}

impl SyntheticInput {
    /// Create a new loopback input
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the input snapshot for the next tick.
    ///
    /// Click events are edge-triggered and drained by the call; cursor
    /// position and key-hold state persist.
    #[must_use]
    pub fn sample(&self) -> InputState {
        let mut state = self.state.lock().unwrap();
        InputState {
            cursor: state.cursor,
            clicked: std::mem::take(&mut state.pending_clicks),
            held: state.held.clone(),
        }
    }
}

impl InputInjector for SyntheticInput {
    fn pointer_move(&mut self, x: u32, y: u32) -> MirarResult<()> {
        self.state.lock().unwrap().cursor = Point::new(x, y);
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> MirarResult<()> {
        self.state.lock().unwrap().pending_clicks.push(button);
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> MirarResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.held.contains(&key) {
            state.held.push(key);
        }
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> MirarResult<()> {
        self.state.lock().unwrap().held.retain(|k| *k != key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clicks_are_edge_triggered() {
        let mut input = SyntheticInput::new();
        input.pointer_move(10, 20).unwrap();
        input.click(MouseButton::Left).unwrap();

        let state = input.sample();
        assert_eq!(state.cursor(), Point::new(10, 20));
        assert!(state.clicked(MouseButton::Left));
        assert!(!state.clicked(MouseButton::Right));

        // Drained on the next tick; cursor persists
        let state = input.sample();
        assert!(!state.clicked(MouseButton::Left));
        assert_eq!(state.cursor(), Point::new(10, 20));
    }

    #[test]
    fn test_key_hold_state_persists() {
        let mut input = SyntheticInput::new();
        input.key_down(Key::ControlLeft).unwrap();
        input.key_down(Key::C).unwrap();
        input.key_down(Key::C).unwrap();

        let state = input.sample();
        assert!(state.is_held(Key::ControlLeft));
        assert!(state.is_held(Key::C));
        assert_eq!(state.held_keys().len(), 2);

        input.key_up(Key::C).unwrap();
        let state = input.sample();
        assert!(state.is_held(Key::ControlLeft));
        assert!(!state.is_held(Key::C));
    }

    #[test]
    fn test_clones_share_state() {
        let mut writer = SyntheticInput::new();
        let reader = writer.clone();
        writer.key_down(Key::Space).unwrap();
        assert!(reader.sample().is_held(Key::Space));
    }

    #[test]
    fn test_pending_action_constructors() {
        assert_eq!(
            PendingAction::click(3, 4),
            PendingAction::Click { x: 3, y: 4 }
        );
        assert_eq!(
            PendingAction::key_combo([Key::ControlLeft, Key::S]),
            PendingAction::KeyCombo {
                keys: vec![Key::ControlLeft, Key::S]
            }
        );
    }
}
