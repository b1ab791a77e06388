//! Dimension remap transitions
//!
//! Replacing the dimension shown on one render axis is animated over a fixed
//! duration. When a transition starts, the start and end rendered position of
//! every star is cached; each tick interpolates those endpoints and slerps the
//! pilot's orientation through a quarter turn. The new mapping only takes
//! effect when the transition commits at full progress.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use hyperspace_math::{Quat, Vec3};
use crate::axis::{project, Axis, AxisMapping, MappingError};
use crate::object::{ObjectKey, ObjectKind};
use crate::slice::{slice_distance, SliceConfig, TransitionVisibility};
use crate::world::WorldState;

/// Default transition length in seconds
pub const DEFAULT_REMAP_DURATION: f64 = 3.0;

/// Why a remap request was refused
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemapRejection {
    /// A transition is already running
    TransitionActive,
    /// The requested dimension is already shown on some axis
    DimensionAlreadyMapped(usize),
    /// The requested dimension does not exist
    DimensionOutOfRange(usize),
    /// Every dimension is already shown; nothing to cycle to
    NoUnmappedDimension,
}

impl fmt::Display for RemapRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemapRejection::TransitionActive => write!(f, "a remap transition is already running"),
            RemapRejection::DimensionAlreadyMapped(d) => {
                write!(f, "dimension {} is already mapped to an axis", d)
            }
            RemapRejection::DimensionOutOfRange(d) => write!(f, "dimension {} does not exist", d),
            RemapRejection::NoUnmappedDimension => write!(f, "no unmapped dimension left"),
        }
    }
}

impl std::error::Error for RemapRejection {}

impl From<MappingError> for RemapRejection {
    fn from(e: MappingError) -> Self {
        match e {
            MappingError::DuplicateDimension(d) => RemapRejection::DimensionAlreadyMapped(d),
            MappingError::DimensionOutOfRange { dimension, .. } => {
                RemapRejection::DimensionOutOfRange(dimension)
            }
        }
    }
}

/// Result of advancing the remapper by one tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RemapProgress {
    /// No transition running
    Idle,
    /// Transition running at this progress in [0, 1)
    Active(f64),
    /// Transition reached full progress and the new mapping is in effect
    Committed(AxisMapping),
}

/// Start and end rendered positions cached when a transition starts
#[derive(Clone, Debug, Default)]
pub struct TransitionCache {
    endpoints: HashMap<ObjectKey, (Vec3, Vec3)>,
}

impl TransitionCache {
    fn capture(world: &WorldState, from: &AxisMapping, to: &AxisMapping) -> Self {
        let endpoints = world
            .stars()
            .map(|(key, obj)| (key, (project(&obj.position, from), project(&obj.position, to))))
            .collect();
        Self { endpoints }
    }

    /// Cached endpoints of an object, if it existed when the transition started
    pub fn get(&self, key: ObjectKey) -> Option<(Vec3, Vec3)> {
        self.endpoints.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// A transition in progress
#[derive(Clone, Debug)]
pub struct ActiveRemap {
    axis: Axis,
    start_time: f64,
    duration: f64,
    progress: f64,
    old_mapping: AxisMapping,
    new_mapping: AxisMapping,
    old_orientation: Quat,
    new_orientation: Quat,
    pilot_endpoints: (Vec3, Vec3),
    cache: TransitionCache,
}

impl ActiveRemap {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn old_mapping(&self) -> &AxisMapping {
        &self.old_mapping
    }

    pub fn new_mapping(&self) -> &AxisMapping {
        &self.new_mapping
    }

    /// Orientation the pilot will have on commit
    pub fn target_orientation(&self) -> Quat {
        self.new_orientation
    }

    pub fn cache(&self) -> &TransitionCache {
        &self.cache
    }

    fn progress_at(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    fn visibility_mapping(&self, policy: TransitionVisibility) -> &AxisMapping {
        match policy {
            TransitionVisibility::Target => &self.new_mapping,
            TransitionVisibility::Source => &self.old_mapping,
        }
    }
}

/// Remapper state machine
#[derive(Clone, Debug, Default)]
pub enum RemapState {
    #[default]
    Idle,
    Active(ActiveRemap),
}

/// Starts, animates and commits remap transitions
#[derive(Clone, Debug)]
pub struct DimensionRemapper {
    duration: f64,
    state: RemapState,
}

impl Default for DimensionRemapper {
    fn default() -> Self {
        Self::new(DEFAULT_REMAP_DURATION)
    }
}

impl DimensionRemapper {
    /// Create a remapper whose transitions last `duration` seconds
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            state: RemapState::Idle,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RemapState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveRemap> {
        match &self.state {
            RemapState::Active(active) => Some(active),
            RemapState::Idle => None,
        }
    }

    /// Progress of the running transition
    pub fn progress(&self) -> Option<f64> {
        self.active().map(|a| a.progress)
    }

    /// Start showing dimension `dim` on `axis`
    ///
    /// Caches the endpoints of every star and the pilot, and picks the target
    /// orientation as a quarter turn about the axis paired with `axis`. The
    /// world itself is not modified until the transition commits.
    pub fn request(
        &mut self,
        world: &WorldState,
        axis: Axis,
        dim: usize,
        now: f64,
    ) -> Result<(), RemapRejection> {
        if self.is_active() {
            return Err(RemapRejection::TransitionActive);
        }
        let old_mapping = *world.mapping();
        let new_mapping = old_mapping.with_axis(axis, dim, world.dimensions())?;

        let old_orientation = world.pilot.orientation;
        let turn = Quat::from_axis_angle(axis.remap_rotation_axis(), FRAC_PI_2);
        let new_orientation = old_orientation * turn;

        let pilot_endpoints = (
            project(&world.pilot.position, &old_mapping),
            project(&world.pilot.position, &new_mapping),
        );
        let cache = TransitionCache::capture(world, &old_mapping, &new_mapping);

        log::info!(
            "Remapping axis {} to dimension {} ({} -> {}), {} stars cached",
            axis, dim, old_mapping, new_mapping, cache.len()
        );

        self.state = RemapState::Active(ActiveRemap {
            axis,
            start_time: now,
            duration: self.duration,
            progress: 0.0,
            old_mapping,
            new_mapping,
            old_orientation,
            new_orientation,
            pilot_endpoints,
            cache,
        });
        Ok(())
    }

    /// Animate the running transition up to time `now`
    ///
    /// Commits when progress reaches 1: the world's mapping becomes the new
    /// mapping, the pilot orientation becomes exactly the target and the
    /// cache is dropped. Objects without cached endpoints are hidden while
    /// the transition runs.
    pub fn advance(&mut self, world: &mut WorldState, slice: &SliceConfig, now: f64) -> RemapProgress {
        let active = match &mut self.state {
            RemapState::Idle => return RemapProgress::Idle,
            RemapState::Active(active) => active,
        };

        let t = active.progress_at(now);
        active.progress = t;

        if t >= 1.0 {
            let RemapState::Active(done) = std::mem::take(&mut self.state) else {
                return RemapProgress::Idle;
            };
            return Self::commit(done, world, slice);
        }

        world.pilot.orientation = Quat::slerp(active.old_orientation, active.new_orientation, t);
        world.pilot.rendered = active.pilot_endpoints.0.lerp(active.pilot_endpoints.1, t);

        let vis_mapping = *active.visibility_mapping(slice.transition_visibility);
        let pilot_position = world.pilot.position.clone();
        for (key, obj) in world.objects_mut() {
            match active.cache.get(key) {
                Some((start, end)) => {
                    obj.rendered = start.lerp(end, t);
                    let vis = slice.visibility(slice_distance(&obj.position, &pilot_position, &vis_mapping));
                    obj.visible = vis.visible;
                    obj.scale = vis.scale;
                }
                None => obj.visible = false,
            }
        }

        RemapProgress::Active(t)
    }

    fn commit(done: ActiveRemap, world: &mut WorldState, slice: &SliceConfig) -> RemapProgress {
        carry_scenery(world, &done.old_mapping, &done.new_mapping);
        world.set_mapping(done.new_mapping);
        world.pilot.orientation = done.new_orientation;
        world.refresh_pilot();
        world.refresh_objects(slice);
        log::info!("Remap committed: axis {} now shows dimension {}", done.axis, done.new_mapping.dimension(done.axis));
        RemapProgress::Committed(done.new_mapping)
    }

    /// Drop a running transition without committing it
    ///
    /// Used when the world is replaced underneath the remapper.
    pub fn abort(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            log::debug!("Remap transition aborted");
        }
        self.state = RemapState::Idle;
        was_active
    }
}

/// Move scenery onto the newly shown dimensions
///
/// Asteroids only exist around the pilot inside the slice, so each keeps its
/// 3D offset from the pilot and shares the pilot's unmapped coordinates.
fn carry_scenery(world: &mut WorldState, from: &AxisMapping, to: &AxisMapping) {
    let pilot = world.pilot.position.clone();
    let pilot_rendered = project(&pilot, from);
    for (_, obj) in world.objects_mut().filter(|(_, o)| o.kind == ObjectKind::Scenery) {
        let offset = (project(&obj.position, from) - pilot_rendered).to_array();
        let mut position = pilot.clone();
        for axis in Axis::ALL {
            position[to.dimension(axis)] += offset[axis.index()];
        }
        obj.position = position;
    }
}
