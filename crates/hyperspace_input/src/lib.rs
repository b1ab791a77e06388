//! Keyboard flight controls
//!
//! This crate turns winit key events into the per-tick [`hyperspace_core::PilotInput`]
//! and one-shot warp commands.

mod pilot_controller;

pub use pilot_controller::{PilotController, WarpRequest};
