//! Pilot controller for keyboard flight controls
//!
//! Controls:
//! - Arrow Up/Down: normal forward/reverse thrust
//! - Enter/Space: super acceleration/deceleration
//! - Shift+Enter: engage warp
//! - Shift+Space: disengage warp
//! - W/S: pitch up/down
//! - A/D: yaw left/right
//! - Q/E: roll clockwise/counter-clockwise

use hyperspace_core::{PilotInput, ThrustInput};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// One-shot warp command raised by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarpRequest {
    Engage,
    Disengage,
}

/// Keyboard state for flying the ship
#[derive(Debug, Clone, Default)]
pub struct PilotController {
    // Thrust state
    forward: bool,
    reverse: bool,
    super_accelerate: bool,
    super_decelerate: bool,

    // Rotation state
    pitch_up: bool,
    pitch_down: bool,
    yaw_left: bool,
    yaw_right: bool,
    roll_cw: bool,
    roll_ccw: bool,

    shift: bool,

    // Warp command waiting for the next tick
    pending_warp: Option<WarpRequest>,
}

impl PilotController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process keyboard input
    ///
    /// Returns true if the key is a flight control.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::ArrowUp => { self.forward = pressed; true }
            KeyCode::ArrowDown => { self.reverse = pressed; true }
            KeyCode::KeyW => { self.pitch_up = pressed; true }
            KeyCode::KeyS => { self.pitch_down = pressed; true }
            KeyCode::KeyA => { self.yaw_left = pressed; true }
            KeyCode::KeyD => { self.yaw_right = pressed; true }
            KeyCode::KeyQ => { self.roll_cw = pressed; true }
            KeyCode::KeyE => { self.roll_ccw = pressed; true }
            KeyCode::ShiftLeft | KeyCode::ShiftRight => { self.shift = pressed; true }
            KeyCode::Enter | KeyCode::NumpadEnter => {
                if pressed && self.shift {
                    self.pending_warp = Some(WarpRequest::Engage);
                } else {
                    self.super_accelerate = pressed;
                }
                true
            }
            KeyCode::Space => {
                if pressed && self.shift {
                    self.pending_warp = Some(WarpRequest::Disengage);
                } else {
                    self.super_decelerate = pressed;
                }
                true
            }
            _ => false,
        }
    }

    /// Consume the pending warp command
    ///
    /// Returns the last warp key pressed since the previous call, then clears it.
    pub fn consume_warp(&mut self) -> Option<WarpRequest> {
        self.pending_warp.take()
    }

    /// Controls held right now
    pub fn pilot_input(&self) -> PilotInput {
        let mut thrust = ThrustInput::empty();
        thrust.set(ThrustInput::FORWARD, self.forward);
        thrust.set(ThrustInput::REVERSE, self.reverse);
        thrust.set(ThrustInput::SUPER_ACCELERATE, self.super_accelerate);
        thrust.set(ThrustInput::SUPER_DECELERATE, self.super_decelerate);

        PilotInput {
            thrust,
            pitch: axis(self.pitch_up, self.pitch_down),
            yaw: axis(self.yaw_left, self.yaw_right),
            roll: axis(self.roll_ccw, self.roll_cw),
        }
    }

    /// Check if any control is held
    pub fn is_active(&self) -> bool {
        self.forward || self.reverse || self.super_accelerate || self.super_decelerate
            || self.pitch_up || self.pitch_down || self.yaw_left || self.yaw_right
            || self.roll_cw || self.roll_ccw
    }

    /// Release every held key (e.g. when the window loses focus)
    pub fn release_all(&mut self) {
        let pending_warp = self.pending_warp;
        *self = Self { pending_warp, ..Self::default() };
    }
}

fn axis(positive: bool, negative: bool) -> f64 {
    (positive as i32 - negative as i32) as f64
}
