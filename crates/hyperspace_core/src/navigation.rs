//! Per-tick pilot integration
//!
//! Turns the pilot, updates its speed and moves it along its facing
//! direction. Movement only touches the three mapped dimensions, so the
//! pilot never drifts through the slice on its own.

use hyperspace_flight::{FlightConfig, FlightEvent, ThrustInput};
use hyperspace_math::LocalAxis;
use crate::axis::{project, Axis, AxisMapping};
use crate::world::PilotState;

/// Controls held during one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PilotInput {
    pub thrust: ThrustInput,
    /// Nose up (+) or down (-), in [-1, 1]
    pub pitch: f64,
    /// Nose left (+) or right (-), in [-1, 1]
    pub yaw: f64,
    /// Counter-clockwise (+) or clockwise (-), in [-1, 1]
    pub roll: f64,
}

impl PilotInput {
    /// Input with only thrust controls held
    pub fn thrust(thrust: ThrustInput) -> Self {
        Self { thrust, ..Self::default() }
    }
}

/// Apply rotation, speed and movement for `dt` seconds
pub fn integrate(
    pilot: &mut PilotState,
    mapping: &AxisMapping,
    input: &PilotInput,
    dt: f64,
    config: &FlightConfig,
) -> Option<FlightEvent> {
    let turn = config.rotation_speed * dt;
    for (axis, amount) in [
        (LocalAxis::X, input.pitch),
        (LocalAxis::Y, input.yaw),
        (LocalAxis::Z, input.roll),
    ] {
        let amount = amount.clamp(-1.0, 1.0);
        if amount != 0.0 {
            pilot.orientation = pilot.orientation.rotate_local(axis, amount * turn);
        }
    }

    let event = pilot.flight.update_speed(dt, input.thrust, config);

    let step = pilot.forward() * pilot.flight.displacement(dt);
    let delta = step.to_array();
    for axis in Axis::ALL {
        pilot.position[mapping.dimension(axis)] += delta[axis.index()];
    }
    pilot.rendered = project(&pilot.position, mapping);

    event
}
