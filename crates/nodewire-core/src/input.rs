//! Pointer input state for wiring gestures.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            Self::Down { position, .. } | Self::Up { position, .. } | Self::Move { position } => {
                *position
            }
        }
    }
}

/// Tracks the pointer across events.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position in surface coordinates.
    pub pointer_position: Point,
    /// Whether the primary button is held.
    pub is_dragging: bool,
    /// Button that starts and ends drags.
    primary: MouseButton,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(MouseButton::Left)
    }
}

impl InputState {
    /// Create an input state that drags with `primary`.
    pub fn new(primary: MouseButton) -> Self {
        Self {
            pointer_position: Point::ZERO,
            is_dragging: false,
            primary,
        }
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.pointer_position = event.position();
        match event {
            PointerEvent::Down { button, .. } if button == self.primary => {
                self.is_dragging = true;
            }
            PointerEvent::Up { button, .. } if button == self.primary => {
                self.is_dragging = false;
            }
            _ => {}
        }
    }

    pub fn primary_button(&self) -> MouseButton {
        self.primary
    }
}
