//! Texture proximity bookkeeping
//!
//! Decides which stars need a texture fetched or a fetch cancelled, based on
//! their 3D distance from the pilot. The actual fetching happens elsewhere;
//! this module only flips the per-object flags and reports what to do.

use std::sync::Arc;
use hyperspace_math::DimensionVector;
use crate::object::{ObjectKey, TextureImage};
use crate::world::WorldState;

/// Default radius inside which stars are textured
pub const DEFAULT_TEXTURE_DISTANCE: f64 = 50_000.0;

/// Work produced by [`plan_textures`]
#[derive(Clone, Debug, PartialEq)]
pub enum TextureAction {
    /// Start fetching a texture for this star
    Request { key: ObjectKey, position: DimensionVector },
    /// Stop the outstanding fetch for this star
    Cancel { key: ObjectKey },
}

/// Update texture flags of every star and list the fetches to start or stop
///
/// A star inside `distance` requests a texture once per entry and shows it
/// once it has arrived. A star outside cancels any outstanding fetch and goes
/// back to its base look, keeping a loaded texture for the next visit.
pub fn plan_textures(world: &mut WorldState, distance: f64) -> Vec<TextureAction> {
    let pilot = world.pilot.rendered;
    let mut actions = Vec::new();
    for (key, obj) in world.objects_mut().filter(|(_, o)| o.is_star()) {
        if obj.rendered.distance(pilot) < distance {
            if obj.texture.is_some() {
                obj.texture_applied = true;
            } else if !obj.texture_requested && !obj.texture_failed {
                obj.texture_requested = true;
                actions.push(TextureAction::Request { key, position: obj.position.clone() });
            }
        } else {
            if obj.texture_requested {
                actions.push(TextureAction::Cancel { key });
            }
            obj.texture_requested = false;
            obj.texture_failed = false;
            obj.texture_applied = false;
        }
    }
    actions
}

/// Attach a fetched texture if its star still exists and still wants it
///
/// Returns false when the result is stale and was dropped.
pub fn apply_texture(world: &mut WorldState, key: ObjectKey, image: Arc<TextureImage>) -> bool {
    match world.get_mut(key) {
        Some(obj) if obj.texture_requested => {
            obj.attach_texture(image);
            true
        }
        _ => false,
    }
}

/// Record a fetch that gave up after its retries
///
/// The star is not requested again until it leaves the radius and comes back.
pub fn texture_failed(world: &mut WorldState, key: ObjectKey) {
    if let Some(obj) = world.get_mut(key) {
        obj.texture_requested = false;
        obj.texture_failed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn world_with_star_at(z: f64) -> (WorldState, ObjectKey) {
        let mut world = WorldState::new(5);
        let key = world.spawn(ObjectKind::Star, DimensionVector::from(vec![0.0, 0.0, z, 0.0, 0.0]));
        (world, key)
    }

    #[test]
    fn test_requests_once() {
        let (mut world, key) = world_with_star_at(-1_000.0);
        let actions = plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], TextureAction::Request { key: k, .. } if *k == key));
        assert!(plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE).is_empty());
    }

    #[test]
    fn test_leaving_radius_cancels() {
        let (mut world, key) = world_with_star_at(-1_000.0);
        plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        world.pilot.position[2] = 100_000.0;
        world.refresh_pilot();
        let actions = plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        assert_eq!(actions, vec![TextureAction::Cancel { key }]);
        assert!(!world.get(key).unwrap().texture_requested);
    }

    #[test]
    fn test_scenery_never_textured() {
        let mut world = WorldState::new(5);
        world.spawn(ObjectKind::Scenery, DimensionVector::zeros(5));
        assert!(plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE).is_empty());
    }

    #[test]
    fn test_apply_and_stale_results() {
        let (mut world, key) = world_with_star_at(-1_000.0);
        let image = Arc::new(TextureImage::solid(1, 1, [255; 4]));

        // Not requested yet: dropped
        assert!(!apply_texture(&mut world, key, image.clone()));

        plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        assert!(apply_texture(&mut world, key, image.clone()));
        assert!(world.get(key).unwrap().texture_applied);

        world.despawn(key);
        assert!(!apply_texture(&mut world, key, image));
    }

    #[test]
    fn test_failed_fetch_waits_for_reentry() {
        let (mut world, key) = world_with_star_at(-1_000.0);
        plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        texture_failed(&mut world, key);
        for _ in 0..10 {
            assert!(plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE).is_empty());
        }

        // Leave the radius and come back
        world.pilot.position[2] = 100_000.0;
        world.refresh_pilot();
        assert!(plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE).is_empty());
        assert!(!world.get(key).unwrap().texture_failed);
        world.pilot.position[2] = 0.0;
        world.refresh_pilot();
        let actions = plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        assert!(matches!(&actions[..], [TextureAction::Request { key: k, .. }] if *k == key));
    }

    #[test]
    fn test_loaded_texture_kept_outside_radius() {
        let (mut world, key) = world_with_star_at(-1_000.0);
        plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE);
        apply_texture(&mut world, key, Arc::new(TextureImage::solid(1, 1, [255; 4])));

        world.pilot.position[2] = 100_000.0;
        world.refresh_pilot();
        assert!(plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE).is_empty());
        let star = world.get(key).unwrap();
        assert!(star.texture.is_some());
        assert!(!star.texture_applied);

        // Shown again on return without a new fetch
        world.pilot.position[2] = 0.0;
        world.refresh_pilot();
        assert!(plan_textures(&mut world, DEFAULT_TEXTURE_DISTANCE).is_empty());
        assert!(world.get(key).unwrap().texture_applied);
    }
}
