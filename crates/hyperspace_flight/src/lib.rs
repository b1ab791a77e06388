//! Flight model for Hyperspace
//!
//! This crate provides the pilot's speed regimes:
//! - Normal forward/reverse thrust
//! - Super acceleration and deceleration
//! - Warp engage/disengage phases with completion signals

pub mod flight;

pub use flight::{
    FlightConfig, FlightEvent, FlightState, ThrustInput, WarpPhase, DEFAULT_MAX_SPEED,
    DEFAULT_REVERSE_SPEED_FLOOR,
};
