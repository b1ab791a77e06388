//! Pointer hover picking
//!
//! Projects visible stars onto the screen and finds the nearest one whose
//! hover box contains the pointer, reporting its true N-dimensional position.

use std::fmt;
use hyperspace_math::{DimensionVector, Vec3};
use crate::goal::GoalConfig;
use crate::object::ObjectKey;
use crate::world::WorldState;

/// Smallest half-size of a star's hover box in pixels
pub const MIN_HOVER_RADIUS: f64 = 15.0;
/// Largest half-size of a star's hover box in pixels
pub const MAX_HOVER_RADIUS: f64 = 60.0;

/// Size of the view in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of the view
    pub fn center(&self) -> [f64; 2] {
        [self.width * 0.5, self.height * 0.5]
    }

    /// Pixel position of a slice-space point seen from the pilot
    ///
    /// Returns `None` for points level with or behind the pilot.
    pub fn project(&self, world: &WorldState, point: Vec3, fov_degrees: f64) -> Option<[f64; 2]> {
        let local = world.pilot.orientation.conjugate().rotate(point - world.pilot.rendered);
        if local.z >= 0.0 {
            return None;
        }
        let half = (fov_degrees.to_radians() * 0.5).tan();
        let aspect = if self.height > 0.0 { self.width / self.height } else { 1.0 };
        let ndc_x = local.x / -local.z / (half * aspect);
        let ndc_y = local.y / -local.z / half;
        Some([(ndc_x + 1.0) * 0.5 * self.width, (1.0 - ndc_y) * 0.5 * self.height])
    }
}

/// The star under the pointer
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
    pub key: ObjectKey,
    /// Slice-space distance from the pilot
    pub distance: f64,
    /// True coordinates in every dimension
    pub position: DimensionVector,
}

impl fmt::Display for HoverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Star | distance {}", self.distance.trunc())?;
        for (dim, value) in self.position.iter().enumerate() {
            write!(f, " | D{} {}", dim + 1, value.trunc())?;
        }
        Ok(())
    }
}

/// Nearest visible star whose hover box contains `pointer`
///
/// A star's box is its projected diameter, clamped to
/// [`MIN_HOVER_RADIUS`]..=[`MAX_HOVER_RADIUS`] pixels either side of its
/// centre. Star size and field of view come from `optics`.
pub fn pick_star(
    world: &WorldState,
    viewport: &Viewport,
    optics: &GoalConfig,
    pointer: [f64; 2],
) -> Option<HoverInfo> {
    let pilot = world.pilot.rendered;
    let focal = viewport.height / (2.0 * (optics.fov_degrees.to_radians() * 0.5).tan());
    world
        .stars()
        .filter(|(_, o)| o.visible)
        .filter_map(|(key, obj)| {
            let [x, y] = viewport.project(world, obj.rendered, optics.fov_degrees)?;
            let distance = obj.rendered.distance(pilot);
            let radius = (optics.star_size / distance * focal).clamp(MIN_HOVER_RADIUS, MAX_HOVER_RADIUS);
            let hit = (pointer[0] - x).abs() <= radius && (pointer[1] - y).abs() <= radius;
            hit.then_some((key, obj, distance))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(key, obj, distance)| HoverInfo { key, distance, position: obj.position.clone() })
}
