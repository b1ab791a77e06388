//! Input mapping from raw events to semantic actions
//!
//! Maps keyboard input to high-level actions like TogglePause, RemapAxis, etc.
//! Flight keys (arrows, WASD, QE, Enter, Space) are NOT mapped here - they go directly to PilotController.

use hyperspace_core::Axis;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Actions triggered by special input (not flight)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Pause or resume the simulation (P key)
    TogglePause,
    /// Show or hide the debug overlay (C key)
    ToggleOverlay,
    /// Show the next unmapped dimension on an axis (1/2/3 keys)
    RemapAxis(Axis),
    /// Save the session (F5 key)
    Save,
    /// Throw away the session and start a new universe (F9 key)
    Reset,
    /// Exit application (Escape key)
    Exit,
}

/// Maps raw input events to semantic actions
///
/// Flight keys are NOT mapped here - they go directly to the
/// PilotController. This mapper handles "special" keys only.
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for special keys, `None` for flight keys
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::KeyP => Some(InputAction::TogglePause),
            KeyCode::KeyC => Some(InputAction::ToggleOverlay),
            KeyCode::Digit1 | KeyCode::Numpad1 => Some(InputAction::RemapAxis(Axis::X)),
            KeyCode::Digit2 | KeyCode::Numpad2 => Some(InputAction::RemapAxis(Axis::Y)),
            KeyCode::Digit3 | KeyCode::Numpad3 => Some(InputAction::RemapAxis(Axis::Z)),
            KeyCode::F5 => Some(InputAction::Save),
            KeyCode::F9 => Some(InputAction::Reset),
            KeyCode::Escape => Some(InputAction::Exit),
            _ => None, // Flight keys handled by controller
        }
    }
}
