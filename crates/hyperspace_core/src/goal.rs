//! Goal star capture

use serde::{Serialize, Deserialize};
use crate::world::WorldState;

/// When the goal star counts as reached
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Rendered diameter of a star
    pub star_size: f64,
    /// Vertical field of view in degrees
    pub fov_degrees: f64,
    /// Fraction of the screen height the goal must fill
    pub screen_fraction: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            star_size: 500.0,
            fov_degrees: 75.0,
            screen_fraction: 0.2,
        }
    }
}

impl GoalConfig {
    /// Distance at which the goal star fills `screen_fraction` of the view
    pub fn capture_distance(&self) -> f64 {
        let half_fov = (self.fov_degrees.to_radians() * 0.5).tan();
        self.star_size / (2.0 * self.screen_fraction * half_fov)
    }
}

/// Mark the goal achieved if the pilot has closed in on it
///
/// The goal must be visible, in front of the pilot and within the capture
/// distance. Returns true only on the call that flips the flag.
pub fn check_goal(world: &mut WorldState, config: &GoalConfig) -> bool {
    if world.goal_achieved() {
        return false;
    }
    let Some(goal) = world.goal().and_then(|k| world.get(k)) else {
        return false;
    };
    if !goal.visible {
        return false;
    }
    let offset = goal.rendered - world.pilot.rendered;
    let distance = offset.length();
    let in_front = offset.dot(world.pilot.forward()) > 0.0;
    if in_front && distance <= config.capture_distance() {
        world.set_goal_achieved(true);
        log::info!("Goal star reached at distance {:.0}", distance);
        return true;
    }
    false
}
