//! Session snapshots
//!
//! A snapshot records the persistent part of a universe: pilot position and
//! orientation, axis mapping, goal star, goal flag and every star position.
//! Scenery is not stored; it is regenerated around the pilot on restore.
//! Snapshots are stored as RON.

use serde::{Serialize, Deserialize};
use std::fs;
use std::io;
use std::path::Path;

use hyperspace_math::{DimensionVector, Quat};
use crate::axis::{AxisMapping, MappingRecord};
use crate::generation::WorldGenerator;
use crate::world::WorldState;

/// Persisted pilot pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotSnapshot {
    pub position: DimensionVector,
    /// Orientation as `[x, y, z, w]`
    pub orientation: [f64; 4],
}

/// Persisted goal star
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSnapshot {
    #[serde(default)]
    pub position: Option<DimensionVector>,
}

/// Persisted star
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub position: DimensionVector,
}

/// Serializable record of a universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub pilot: PilotSnapshot,
    #[serde(default)]
    pub axis_mapping: Option<MappingRecord>,
    #[serde(default)]
    pub goal: GoalSnapshot,
    #[serde(default)]
    pub goal_achieved: bool,
    #[serde(default)]
    pub objects: Vec<ObjectSnapshot>,
}

impl Snapshot {
    /// Record the persistent state of `world`
    pub fn capture(world: &WorldState) -> Self {
        let goal_position = world
            .goal()
            .and_then(|k| world.get(k))
            .map(|o| o.position.clone());
        Self {
            pilot: PilotSnapshot {
                position: world.pilot.position.clone(),
                orientation: world.pilot.orientation.to_array(),
            },
            axis_mapping: Some((*world.mapping()).into()),
            goal: GoalSnapshot { position: goal_position },
            goal_achieved: world.goal_achieved(),
            objects: world
                .stars()
                .map(|(_, o)| ObjectSnapshot { position: o.position.clone() })
                .collect(),
        }
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Parse from a RON string
    pub fn from_ron(text: &str) -> Result<Self, SnapshotError> {
        Ok(ron::from_str(text)?)
    }

    /// Load a snapshot from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Save a snapshot to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let contents = self.to_ron()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Rebuild a world of `dimensions` dimensions from this snapshot
    ///
    /// Malformed parts fall back instead of failing: an invalid pilot becomes
    /// the origin, an invalid mapping becomes the identity, malformed stars are
    /// skipped, no stars at all regenerates the star field, and a goal that
    /// cannot be found is replaced by a random star with the achieved flag
    /// cleared. Scenery is spawned fresh around the restored pilot.
    pub fn restore(&self, dimensions: usize, generator: &mut WorldGenerator) -> WorldState {
        let mut world = WorldState::new(dimensions);
        let valid = |p: &DimensionVector| p.dimensions() == dimensions && p.is_finite();

        if valid(&self.pilot.position) {
            world.pilot.position = self.pilot.position.clone();
        } else {
            log::warn!("Snapshot pilot position is malformed, starting at the origin");
        }
        let orientation = Quat::from_array(self.pilot.orientation);
        let magnitude = orientation.magnitude();
        if orientation.is_finite() && magnitude > 0.0 {
            // Leave unit quaternions bit-exact
            world.pilot.orientation = if (magnitude - 1.0).abs() > 1e-9 {
                orientation.normalize()
            } else {
                orientation
            };
        } else {
            log::warn!("Snapshot orientation is malformed, using identity");
        }

        let mapping = self
            .axis_mapping
            .map(|r| AxisMapping::new(r.x, r.y, r.z, dimensions));
        match mapping {
            Some(Ok(mapping)) => world.set_mapping(mapping),
            Some(Err(e)) => log::warn!("Snapshot axis mapping rejected ({}), using identity", e),
            None => log::debug!("Snapshot has no axis mapping, using identity"),
        }
        world.refresh_pilot();

        let mut skipped = 0;
        for object in &self.objects {
            if valid(&object.position) {
                world.spawn(crate::object::ObjectKind::Star, object.position.clone());
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {} malformed stars in snapshot", skipped);
        }
        if world.star_count() == 0 {
            log::warn!("Snapshot has no stars, generating a new star field");
            generator.spawn_stars(&mut world);
        }
        generator.spawn_scenery(&mut world);

        let goal = self
            .goal
            .position
            .as_ref()
            .and_then(|p| world.find_star_at(p));
        match goal {
            Some(key) => {
                world.set_goal(key);
                world.set_goal_achieved(self.goal_achieved);
            }
            None => {
                log::warn!("Goal star not found in snapshot, picking a new goal");
                generator.pick_goal(&mut world);
            }
        }

        log::info!(
            "Restored universe: {} stars, mapping {}",
            world.star_count(),
            world.mapping()
        );
        world
    }
}

/// Error reading or writing a snapshot
#[derive(Debug)]
pub enum SnapshotError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax or shape)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SnapshotError {
    fn from(e: ron::error::SpannedError) -> Self {
        SnapshotError::Parse(e)
    }
}

impl From<ron::Error> for SnapshotError {
    fn from(e: ron::Error) -> Self {
        SnapshotError::Serialize(e)
    }
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "IO error: {}", e),
            SnapshotError::Parse(e) => write!(f, "Parse error: {}", e),
            SnapshotError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(e) => Some(e),
            SnapshotError::Parse(e) => Some(e),
            SnapshotError::Serialize(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationConfig;
    use crate::object::ObjectKind;

    fn generator(stars: usize) -> WorldGenerator {
        WorldGenerator::new(GenerationConfig {
            star_count: stars,
            asteroid_count: 3,
            seed: Some(11),
            ..GenerationConfig::default()
        })
    }

    fn sample_world() -> WorldState {
        let mut gen = generator(20);
        let mut world = WorldState::new(5);
        gen.regenerate(&mut world);
        world.pilot.position[3] = 123.5;
        world.pilot.orientation = Quat::from_axis_angle(hyperspace_math::Vec3::Y, 0.3);
        world.set_mapping(AxisMapping::new(3, 1, 4, 5).unwrap());
        world.set_goal_achieved(true);
        world
    }

    #[test]
    fn test_capture_skips_scenery() {
        let world = sample_world();
        let snap = Snapshot::capture(&world);
        assert_eq!(snap.objects.len(), 20);
        assert_eq!(snap.axis_mapping, Some(MappingRecord { x: 3, y: 1, z: 4 }));
        assert!(snap.goal_achieved);
        assert!(snap.goal.position.is_some());
    }

    #[test]
    fn test_ron_uses_camel_case_keys() {
        let snap = Snapshot::capture(&sample_world());
        let text = snap.to_ron().unwrap();
        assert!(text.contains("axisMapping"));
        assert!(text.contains("goalAchieved"));
        assert_eq!(Snapshot::from_ron(&text).unwrap(), snap);
    }

    #[test]
    fn test_restore_round_trip() {
        let world = sample_world();
        let snap = Snapshot::capture(&world);
        let restored = snap.restore(5, &mut generator(20));

        assert_eq!(restored.pilot.position, world.pilot.position);
        assert_eq!(restored.pilot.orientation, world.pilot.orientation);
        assert_eq!(restored.mapping(), world.mapping());
        assert_eq!(restored.star_count(), 20);
        assert!(restored.goal_achieved());
        let goal = restored.get(restored.goal().unwrap()).unwrap();
        assert_eq!(Some(&goal.position), snap.goal.position.as_ref());
        // scenery regenerated
        assert_eq!(restored.object_count(), 23);
    }

    #[test]
    fn test_restore_invalid_mapping_falls_back() {
        let mut snap = Snapshot::capture(&sample_world());
        snap.axis_mapping = Some(MappingRecord { x: 1, y: 1, z: 2 });
        let restored = snap.restore(5, &mut generator(20));
        assert_eq!(*restored.mapping(), AxisMapping::identity());

        snap.axis_mapping = Some(MappingRecord { x: 0, y: 1, z: 9 });
        let restored = snap.restore(5, &mut generator(20));
        assert_eq!(*restored.mapping(), AxisMapping::identity());
    }

    #[test]
    fn test_restore_missing_goal_picks_new_one() {
        let mut snap = Snapshot::capture(&sample_world());
        snap.goal.position = Some(DimensionVector::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
        let restored = snap.restore(5, &mut generator(20));
        assert!(restored.goal().is_some());
        assert!(!restored.goal_achieved());
    }

    #[test]
    fn test_restore_skips_malformed_objects() {
        let mut snap = Snapshot::capture(&sample_world());
        snap.objects.push(ObjectSnapshot { position: DimensionVector::from(vec![1.0, 2.0]) });
        snap.objects.push(ObjectSnapshot { position: DimensionVector::from(vec![f64::NAN; 5]) });
        let restored = snap.restore(5, &mut generator(20));
        assert_eq!(restored.star_count(), 20);
    }

    #[test]
    fn test_restore_empty_regenerates_stars() {
        let snap = Snapshot {
            pilot: PilotSnapshot {
                position: DimensionVector::zeros(5),
                orientation: [0.0, 0.0, 0.0, 1.0],
            },
            axis_mapping: None,
            goal: GoalSnapshot::default(),
            goal_achieved: false,
            objects: Vec::new(),
        };
        let restored = snap.restore(5, &mut generator(15));
        assert_eq!(restored.star_count(), 15);
        assert!(restored.goal().is_some());
    }

    #[test]
    fn test_minimal_document_parses() {
        let text = "(pilot: (position: [0.0, 0.0, 0.0], orientation: (0.0, 0.0, 0.0, 1.0)))";
        let snap = Snapshot::from_ron(text).unwrap();
        assert!(snap.objects.is_empty());
        assert_eq!(snap.axis_mapping, None);
    }

    #[test]
    fn test_restore_degenerate_orientation() {
        let mut snap = Snapshot::capture(&sample_world());
        snap.pilot.orientation = [0.0; 4];
        let restored = snap.restore(5, &mut generator(20));
        assert_eq!(restored.pilot.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("hyperspace_snapshot_{}.ron", std::process::id()));
        let snap = Snapshot::capture(&sample_world());
        snap.save(&path).unwrap();
        let loaded = Snapshot::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, snap);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Snapshot::load("/nonexistent/hyperspace/snapshot.ron").unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }

    #[test]
    fn test_spawned_star_kind() {
        let snap = Snapshot::capture(&sample_world());
        let restored = snap.restore(5, &mut generator(20));
        assert!(restored.stars().all(|(_, o)| o.kind == ObjectKind::Star));
    }
}
