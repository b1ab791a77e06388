//! Slice distance and visibility
//!
//! An object is visible when it lies close to the pilot in every dimension
//! that is *not* shown on a render axis. Its rendered size shrinks with that
//! distance through a simple perspective falloff.

use hyperspace_math::DimensionVector;
use serde::{Serialize, Deserialize};
use crate::axis::AxisMapping;

/// Default thickness of the visible slice
pub const DEFAULT_SLICE_THICKNESS: f64 = 150_000.0;

/// Default perspective factor for the size falloff
pub const DEFAULT_PERSPECTIVE_FACTOR: f64 = 15_000_000.0;

/// Which mapping decides visibility while a remap transition runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionVisibility {
    /// Use the mapping being transitioned to
    #[default]
    Target,
    /// Keep using the mapping in effect when the transition started
    Source,
}

/// Slice tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Objects at or beyond this slice distance are hidden
    pub thickness: f64,
    /// Larger values make size fall off more slowly
    pub perspective_factor: f64,
    /// Visibility policy during remap transitions
    pub transition_visibility: TransitionVisibility,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            thickness: DEFAULT_SLICE_THICKNESS,
            perspective_factor: DEFAULT_PERSPECTIVE_FACTOR,
            transition_visibility: TransitionVisibility::default(),
        }
    }
}

/// Visibility verdict for one object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    pub visible: bool,
    /// Render scale in (0, 1]
    pub scale: f64,
}

impl SliceConfig {
    /// Visibility for an object at the given slice distance
    pub fn visibility(&self, distance: f64) -> Visibility {
        Visibility {
            visible: distance < self.thickness,
            scale: self.perspective_factor / (self.perspective_factor + distance),
        }
    }
}

/// Euclidean distance between two positions over the unmapped dimensions only
///
/// Zero when the universe has exactly three dimensions.
pub fn slice_distance(
    position: &DimensionVector,
    pilot: &DimensionVector,
    mapping: &AxisMapping,
) -> f64 {
    let n = position.dimensions().min(pilot.dimensions());
    mapping
        .unmapped(n)
        .map(|d| {
            let delta = position[d] - pilot[d];
            delta * delta
        })
        .sum::<f64>()
        .sqrt()
}
