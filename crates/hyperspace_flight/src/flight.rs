//! Speed regimes for the pilot's ship
//!
//! Provides the clamped incremental speed model: normal thrust, super
//! acceleration/deceleration and the two warp phases.

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

/// Default top speed (units per second)
pub const DEFAULT_MAX_SPEED: f64 = 10_000.0;

/// Default floor for reversing
pub const DEFAULT_REVERSE_SPEED_FLOOR: f64 = -100.0;

/// Warp phases finish when speed is within this distance of their target
const WARP_SNAP_EPSILON: f64 = 1e-6;

bitflags! {
    /// Thrust controls held during a tick
    ///
    /// Unknown bits are dropped by [`ThrustInput::from_bits_truncate`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ThrustInput: u8 {
        /// Normal forward acceleration
        const FORWARD = 1 << 0;
        /// Normal reverse acceleration
        const REVERSE = 1 << 1;
        /// Super acceleration
        const SUPER_ACCELERATE = 1 << 2;
        /// Super deceleration
        const SUPER_DECELERATE = 1 << 3;
    }
}

/// Warp phase of the ship
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarpPhase {
    /// Normal controls active
    #[default]
    Idle,
    /// Accelerating toward max speed
    Engaging,
    /// Decelerating toward a stop
    Disengaging,
}

/// Signals emitted when a warp phase completes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightEvent {
    /// Engage phase reached max speed
    WarpSpeedReached,
    /// Disengage phase reached a full stop
    WarpDisengaged,
}

/// Tuning constants for the speed model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Forward speed ceiling
    pub max_speed: f64,
    /// Arrow-key acceleration (units/s²)
    pub normal_acceleration: f64,
    /// Super acceleration (units/s²)
    pub super_acceleration: f64,
    /// Super deceleration (units/s²)
    pub super_deceleration: f64,
    /// Acceleration while engaging warp (units/s²)
    pub warp_acceleration: f64,
    /// Deceleration while disengaging warp (units/s²)
    pub warp_deceleration: f64,
    /// Lowest speed reachable by reversing (negative)
    pub reverse_speed_floor: f64,
    /// Turn rate for pitch/yaw/roll (radians per second)
    pub rotation_speed: f64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            normal_acceleration: 1.0,
            super_acceleration: 500.0,
            super_deceleration: 500.0,
            warp_acceleration: DEFAULT_MAX_SPEED / 3.0,
            warp_deceleration: DEFAULT_MAX_SPEED / 3.0,
            reverse_speed_floor: DEFAULT_REVERSE_SPEED_FLOOR,
            rotation_speed: 1.2,
        }
    }
}

/// Speed and motion regime of the ship
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlightState {
    /// Current speed along the facing direction (negative = reversing)
    pub speed: f64,
    /// Current warp phase
    pub warp: WarpPhase,
    /// Super acceleration was applied on the last update
    pub super_accelerating: bool,
    /// Super deceleration was applied on the last update
    pub super_decelerating: bool,
}

impl FlightState {
    /// Create a stationary ship
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the warp engage phase
    ///
    /// Returns false (no change) if the ship is already engaging.
    pub fn engage_warp(&mut self) -> bool {
        if self.warp == WarpPhase::Engaging {
            return false;
        }
        self.warp = WarpPhase::Engaging;
        true
    }

    /// Start the warp disengage phase
    ///
    /// Returns false (no change) if the ship is already disengaging.
    pub fn disengage_warp(&mut self) -> bool {
        if self.warp == WarpPhase::Disengaging {
            return false;
        }
        self.warp = WarpPhase::Disengaging;
        true
    }

    /// Stop immediately and return to normal controls
    pub fn halt(&mut self) {
        *self = Self::default();
    }

    /// Advance the speed model by `dt` seconds
    ///
    /// Warp phases take precedence over every thrust control. Returns the
    /// completion signal of a warp phase on the tick it completes.
    pub fn update_speed(
        &mut self,
        dt: f64,
        input: ThrustInput,
        config: &FlightConfig,
    ) -> Option<FlightEvent> {
        self.super_accelerating = false;
        self.super_decelerating = false;

        match self.warp {
            WarpPhase::Engaging => {
                self.speed = (self.speed + config.warp_acceleration * dt).min(config.max_speed);
                if self.speed >= config.max_speed - WARP_SNAP_EPSILON {
                    self.speed = config.max_speed;
                    self.warp = WarpPhase::Idle;
                    return Some(FlightEvent::WarpSpeedReached);
                }
                None
            }
            WarpPhase::Disengaging => {
                self.speed = (self.speed - config.warp_deceleration * dt).max(0.0);
                if self.speed <= WARP_SNAP_EPSILON {
                    self.speed = 0.0;
                    self.warp = WarpPhase::Idle;
                    return Some(FlightEvent::WarpDisengaged);
                }
                None
            }
            WarpPhase::Idle => {
                if input.contains(ThrustInput::SUPER_ACCELERATE) {
                    self.super_accelerating = true;
                    self.speed = (self.speed + config.super_acceleration * dt).min(config.max_speed);
                }
                // Super deceleration brakes to a stop, pulling a reversing ship up to zero too
                if input.contains(ThrustInput::SUPER_DECELERATE) {
                    self.super_decelerating = true;
                    self.speed = (self.speed - config.super_deceleration * dt).max(0.0);
                }
                if input.contains(ThrustInput::FORWARD) {
                    self.speed = (self.speed + config.normal_acceleration * dt).min(config.max_speed);
                }
                if input.contains(ThrustInput::REVERSE) {
                    self.speed = (self.speed - config.normal_acceleration * dt)
                        .max(config.reverse_speed_floor);
                }
                None
            }
        }
    }

    /// Distance travelled along the facing direction this tick
    #[inline]
    pub fn displacement(&self, dt: f64) -> f64 {
        self.speed * dt
    }

    /// Speed as a fraction of max speed, for gauges
    pub fn speed_fraction(&self, config: &FlightConfig) -> f64 {
        if config.max_speed > 0.0 {
            self.speed / config.max_speed
        } else {
            0.0
        }
    }
}
