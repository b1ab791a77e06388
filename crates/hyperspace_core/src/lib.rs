//! Core of the hyperspace flight model
//!
//! This crate holds the N-dimensional universe and everything that changes it:
//!
//! - [`AxisMapping`] and [`project`] - which dimensions the three render axes show
//! - [`slice_distance`] and [`SliceConfig`] - visibility inside the current slice
//! - [`WorldState`] - pilot, mapping and celestial objects
//! - [`DimensionRemapper`] - animated axis remap transitions
//! - [`WorldGenerator`] - procedural stars, scenery and goals
//! - [`Snapshot`] - persistent session record
//! - [`Simulation`] - the per-tick driver
//! - [`RenderFrame`] - what gets handed to a renderer
//! - [`pick_star`] - the star under the pointer

mod axis;
mod slice;
mod object;
mod world;
mod remap;
mod navigation;
mod generation;
mod goal;
mod snapshot;
mod simulation;
mod texture;
mod frame;
mod hover;

pub use axis::{
    project, dimension_color, Axis, AxisMapping, MappingError, MappingRecord, DIMENSION_COLORS,
    MIN_DIMENSIONS,
};
pub use slice::{
    slice_distance, SliceConfig, TransitionVisibility, Visibility, DEFAULT_PERSPECTIVE_FACTOR,
    DEFAULT_SLICE_THICKNESS,
};
pub use object::{CelestialObject, ObjectKey, ObjectKind, TextureImage};
pub use world::{PilotState, WorldState, DEFAULT_DIMENSIONS};
pub use remap::{
    ActiveRemap, DimensionRemapper, RemapProgress, RemapRejection, RemapState, TransitionCache,
    DEFAULT_REMAP_DURATION,
};
pub use navigation::{integrate, PilotInput};
pub use generation::{GenerationConfig, WorldGenerator};
pub use goal::{check_goal, GoalConfig};
pub use snapshot::{GoalSnapshot, ObjectSnapshot, PilotSnapshot, Snapshot, SnapshotError};
pub use simulation::{SimEvent, Simulation, SimulationConfig, TickReport};
pub use texture::{apply_texture, plan_textures, texture_failed, TextureAction, DEFAULT_TEXTURE_DISTANCE};
pub use hover::{pick_star, HoverInfo, Viewport, MAX_HOVER_RADIUS, MIN_HOVER_RADIUS};
pub use frame::{CameraPose, InstanceFlags, LatestFrame, ObjectInstance, RenderFrame, SceneSink};

// Re-export commonly used types for convenience
pub use hyperspace_math::{DimensionVector, Quat, Vec3};
pub use hyperspace_flight::{FlightConfig, FlightEvent, FlightState, ThrustInput, WarpPhase};
