//! World state container
//!
//! `WorldState` owns the pilot, the active axis mapping and every celestial
//! object. Objects live in a slotmap so handles given out to background
//! workers stay safe after the object is removed.

use hyperspace_flight::FlightState;
use hyperspace_math::{DimensionVector, Quat, Vec3};
use slotmap::SlotMap;
use crate::axis::{project, AxisMapping, MIN_DIMENSIONS};
use crate::object::{CelestialObject, ObjectKey, ObjectKind};
use crate::slice::{slice_distance, SliceConfig};

/// Default number of dimensions
pub const DEFAULT_DIMENSIONS: usize = 5;

/// The pilot's ship
#[derive(Clone, Debug, PartialEq)]
pub struct PilotState {
    /// True position in all N dimensions
    pub position: DimensionVector,
    /// Position in the visible slice
    pub rendered: Vec3,
    pub orientation: Quat,
    pub flight: FlightState,
}

impl PilotState {
    /// Stationary pilot at the origin facing -Z
    pub fn new(dimensions: usize) -> Self {
        Self {
            position: DimensionVector::zeros(dimensions),
            rendered: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            flight: FlightState::new(),
        }
    }

    /// Unit vector the pilot faces in slice space
    pub fn forward(&self) -> Vec3 {
        self.orientation.rotate(Vec3::FORWARD)
    }
}

/// Everything that makes up one universe
#[derive(Clone, Debug)]
pub struct WorldState {
    dimensions: usize,
    pub pilot: PilotState,
    mapping: AxisMapping,
    objects: SlotMap<ObjectKey, CelestialObject>,
    goal: Option<ObjectKey>,
    goal_achieved: bool,
}

impl WorldState {
    /// Empty world of `dimensions` dimensions with the identity mapping
    ///
    /// # Panics
    /// Panics if `dimensions` is below three.
    pub fn new(dimensions: usize) -> Self {
        assert!(
            dimensions >= MIN_DIMENSIONS,
            "a world needs at least {} dimensions, got {}",
            MIN_DIMENSIONS,
            dimensions
        );
        Self {
            dimensions,
            pilot: PilotState::new(dimensions),
            mapping: AxisMapping::identity(),
            objects: SlotMap::with_key(),
            goal: None,
            goal_achieved: false,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Mapping currently in effect
    #[inline]
    pub fn mapping(&self) -> &AxisMapping {
        &self.mapping
    }

    /// Replace the mapping; only remap commits and restores call this
    pub(crate) fn set_mapping(&mut self, mapping: AxisMapping) {
        debug_assert!(mapping.validate(self.dimensions).is_ok());
        self.mapping = mapping;
    }

    /// Add an object and return its key
    pub fn spawn(&mut self, kind: ObjectKind, position: DimensionVector) -> ObjectKey {
        debug_assert_eq!(position.dimensions(), self.dimensions);
        let mut object = CelestialObject::new(kind, position);
        object.rendered = project(&object.position, &self.mapping);
        self.objects.insert(object)
    }

    /// Remove an object; clears the goal if it was the goal star
    pub fn despawn(&mut self, key: ObjectKey) -> Option<CelestialObject> {
        if self.goal == Some(key) {
            self.goal = None;
            self.goal_achieved = false;
        }
        self.objects.remove(key)
    }

    pub fn get(&self, key: ObjectKey) -> Option<&CelestialObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut CelestialObject> {
        self.objects.get_mut(key)
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Iterate over all objects
    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &CelestialObject)> {
        self.objects.iter()
    }

    /// Iterate mutably over all objects
    pub fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectKey, &mut CelestialObject)> {
        self.objects.iter_mut()
    }

    /// Iterate over stars only
    pub fn stars(&self) -> impl Iterator<Item = (ObjectKey, &CelestialObject)> {
        self.objects.iter().filter(|(_, o)| o.is_star())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn star_count(&self) -> usize {
        self.stars().count()
    }

    /// Remove every object of one kind
    pub fn clear_kind(&mut self, kind: ObjectKind) {
        self.objects.retain(|_, o| o.kind != kind);
        if self.goal.is_some_and(|g| !self.objects.contains_key(g)) {
            self.goal = None;
            self.goal_achieved = false;
        }
    }

    /// Return to a fresh universe: no objects, pilot at rest at the origin,
    /// identity mapping and no goal
    pub fn reset(&mut self) {
        self.objects.clear();
        self.pilot = PilotState::new(self.dimensions);
        self.mapping = AxisMapping::identity();
        self.goal = None;
        self.goal_achieved = false;
    }

    /// Current goal star
    pub fn goal(&self) -> Option<ObjectKey> {
        self.goal
    }

    /// Make `key` the goal and clear the achieved flag
    ///
    /// Returns false if `key` is not a star in this world.
    pub fn set_goal(&mut self, key: ObjectKey) -> bool {
        match self.objects.get(key) {
            Some(obj) if obj.is_star() => {
                self.goal = Some(key);
                self.goal_achieved = false;
                true
            }
            _ => false,
        }
    }

    pub fn goal_achieved(&self) -> bool {
        self.goal_achieved
    }

    pub(crate) fn set_goal_achieved(&mut self, achieved: bool) {
        self.goal_achieved = achieved;
    }

    /// Star whose true position equals `position` exactly
    pub fn find_star_at(&self, position: &DimensionVector) -> Option<ObjectKey> {
        self.stars().find(|(_, o)| &o.position == position).map(|(k, _)| k)
    }

    /// Project a true position through the current mapping
    #[inline]
    pub fn project(&self, position: &DimensionVector) -> Vec3 {
        project(position, &self.mapping)
    }

    /// Re-derive the pilot's rendered position from its true position
    pub fn refresh_pilot(&mut self) {
        self.pilot.rendered = project(&self.pilot.position, &self.mapping);
    }

    /// Re-derive rendered position and visibility of every object
    pub fn refresh_objects(&mut self, slice: &SliceConfig) {
        let mapping = self.mapping;
        let pilot = &self.pilot.position;
        for (_, obj) in self.objects.iter_mut() {
            obj.rendered = project(&obj.position, &mapping);
            let vis = slice.visibility(slice_distance(&obj.position, pilot, &mapping));
            obj.visible = vis.visible;
            obj.scale = vis.scale;
        }
    }
}
