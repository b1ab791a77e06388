//! Procedural universe generation
//!
//! Stars fill a spherical shell in the mapped dimensions and are spread
//! uniformly through the unmapped ones. Scenery asteroids are scattered in a
//! small shell around the pilot inside the current slice and recycled once
//! the pilot leaves them behind.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use hyperspace_math::DimensionVector;
use crate::axis::{Axis, AxisMapping};
use crate::object::{ObjectKey, ObjectKind};
use crate::world::WorldState;

/// Generation tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub star_count: usize,
    /// Inner radius of the star shell
    pub star_distance_min: f64,
    /// Outer radius of the star shell, also the extent of unmapped dimensions
    pub star_distance_max: f64,
    pub asteroid_count: usize,
    pub asteroid_radius_min: f64,
    pub asteroid_radius_max: f64,
    /// Asteroids further than this from the pilot are respawned nearby
    pub asteroid_reset_distance: f64,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            star_count: 6000,
            star_distance_min: 1_000.0,
            star_distance_max: 1_000_000.0,
            asteroid_count: 5000,
            asteroid_radius_min: 1_000.0,
            asteroid_radius_max: 3_000.0,
            asteroid_reset_distance: 5_000.0,
            seed: None,
        }
    }
}

/// Seeded source of stars, asteroids and goals
pub struct WorldGenerator {
    config: GenerationConfig,
    rng: StdRng,
}

impl WorldGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Random unit direction in 3D as (x, y, z)
    fn direction(&mut self) -> [f64; 3] {
        let theta = self.rng.gen::<f64>() * std::f64::consts::TAU;
        let phi = (2.0 * self.rng.gen::<f64>() - 1.0).acos();
        [phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()]
    }

    /// Radius with uniform density inside the shell `[min, max]`
    fn shell_radius(&mut self, min: f64, max: f64) -> f64 {
        let u: f64 = self.rng.gen();
        let (lo, hi) = (min.powi(3), max.powi(3));
        (u * (hi - lo) + lo).cbrt()
    }

    /// Position for a new star in an `n`-dimensional world
    pub fn star_position(&mut self, n: usize, mapping: &AxisMapping) -> DimensionVector {
        let max = self.config.star_distance_max;
        let mut position = DimensionVector::zeros(n);
        for d in mapping.unmapped(n) {
            position[d] = (self.rng.gen::<f64>() - 0.5) * max;
        }
        let r = self.shell_radius(self.config.star_distance_min, max);
        let dir = self.direction();
        for axis in Axis::ALL {
            position[mapping.dimension(axis)] = dir[axis.index()] * r;
        }
        position
    }

    /// Position for an asteroid near `pilot`, sharing its unmapped coordinates
    pub fn scenery_position(&mut self, pilot: &DimensionVector, mapping: &AxisMapping) -> DimensionVector {
        let mut position = pilot.clone();
        let r = self
            .rng
            .gen_range(self.config.asteroid_radius_min..=self.config.asteroid_radius_max.max(self.config.asteroid_radius_min));
        let dir = self.direction();
        for axis in Axis::ALL {
            position[mapping.dimension(axis)] += dir[axis.index()] * r;
        }
        position
    }

    /// Spawn the configured number of stars
    pub fn spawn_stars(&mut self, world: &mut WorldState) {
        let n = world.dimensions();
        let mapping = *world.mapping();
        for _ in 0..self.config.star_count {
            let position = self.star_position(n, &mapping);
            world.spawn(ObjectKind::Star, position);
        }
        log::debug!("Spawned {} stars", self.config.star_count);
    }

    /// Spawn the configured number of asteroids around the pilot
    pub fn spawn_scenery(&mut self, world: &mut WorldState) {
        let mapping = *world.mapping();
        for _ in 0..self.config.asteroid_count {
            let position = self.scenery_position(&world.pilot.position, &mapping);
            world.spawn(ObjectKind::Scenery, position);
        }
    }

    /// Pick a random star as the new goal
    pub fn pick_goal(&mut self, world: &mut WorldState) -> Option<ObjectKey> {
        let count = world.star_count();
        if count == 0 {
            return None;
        }
        let index = self.rng.gen_range(0..count);
        let key = world.stars().nth(index).map(|(k, _)| k)?;
        world.set_goal(key);
        Some(key)
    }

    /// Reset the world and fill it with a fresh universe
    pub fn regenerate(&mut self, world: &mut WorldState) {
        world.reset();
        self.spawn_stars(world);
        self.spawn_scenery(world);
        self.pick_goal(world);
        world.refresh_pilot();
        log::info!(
            "Generated universe: {} dimensions, {} objects",
            world.dimensions(),
            world.object_count()
        );
    }

    /// Move asteroids the pilot has left behind to fresh spots nearby
    ///
    /// Returns how many were moved.
    pub fn recycle_scenery(&mut self, world: &mut WorldState) -> usize {
        let reset = self.config.asteroid_reset_distance;
        let pilot_rendered = world.pilot.rendered;
        let stale: Vec<ObjectKey> = world
            .objects()
            .filter(|(_, o)| o.kind == ObjectKind::Scenery && o.rendered.distance(pilot_rendered) > reset)
            .map(|(k, _)| k)
            .collect();

        let mapping = *world.mapping();
        for &key in &stale {
            let position = self.scenery_position(&world.pilot.position, &mapping);
            let rendered = world.project(&position);
            if let Some(obj) = world.get_mut(key) {
                obj.position = position;
                obj.rendered = rendered;
            }
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::project;

    fn seeded(star_count: usize, asteroid_count: usize) -> WorldGenerator {
        WorldGenerator::new(GenerationConfig {
            star_count,
            asteroid_count,
            seed: Some(7),
            ..GenerationConfig::default()
        })
    }

    #[test]
    fn test_star_positions_in_shell() {
        let mut gen = seeded(0, 0);
        let mapping = AxisMapping::identity();
        for _ in 0..500 {
            let p = gen.star_position(5, &mapping);
            let r = project(&p, &mapping).length();
            assert!(r >= 1_000.0 - 1e-6 && r <= 1_000_000.0 + 1e-6, "radius {}", r);
            assert!(p[3].abs() <= 500_000.0);
            assert!(p[4].abs() <= 500_000.0);
        }
    }

    #[test]
    fn test_scenery_shares_unmapped_coordinates() {
        let mut gen = seeded(0, 0);
        let mapping = AxisMapping::new(0, 3, 2, 5).unwrap();
        let pilot = DimensionVector::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let p = gen.scenery_position(&pilot, &mapping);
        assert_eq!(p[1], 2.0);
        assert_eq!(p[4], 5.0);
        let offset = project(&p, &mapping) - project(&pilot, &mapping);
        assert!(offset.length() >= 1_000.0 - 1e-6 && offset.length() <= 3_000.0 + 1e-6);
    }

    #[test]
    fn test_regenerate_populates_and_picks_goal() {
        let mut gen = seeded(50, 20);
        let mut world = WorldState::new(5);
        gen.regenerate(&mut world);
        assert_eq!(world.star_count(), 50);
        assert_eq!(world.object_count(), 70);
        let goal = world.goal().expect("goal chosen");
        assert!(world.get(goal).unwrap().is_star());
        assert!(!world.goal_achieved());
    }

    #[test]
    fn test_same_seed_same_universe() {
        let mut a = WorldState::new(5);
        let mut b = WorldState::new(5);
        seeded(10, 0).regenerate(&mut a);
        seeded(10, 0).regenerate(&mut b);
        let pa: Vec<_> = a.stars().map(|(_, o)| o.position.clone()).collect();
        let pb: Vec<_> = b.stars().map(|(_, o)| o.position.clone()).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_pick_goal_without_stars() {
        let mut gen = seeded(0, 0);
        let mut world = WorldState::new(5);
        assert_eq!(gen.pick_goal(&mut world), None);
    }

    #[test]
    fn test_recycle_moves_distant_scenery() {
        let mut gen = seeded(0, 10);
        let mut world = WorldState::new(5);
        gen.spawn_scenery(&mut world);
        assert_eq!(gen.recycle_scenery(&mut world), 0);

        // Fly far away in a mapped dimension
        world.pilot.position[0] = 1_000_000.0;
        world.refresh_pilot();
        assert_eq!(gen.recycle_scenery(&mut world), 10);
        for (_, obj) in world.objects() {
            assert!(obj.rendered.distance(world.pilot.rendered) <= 3_000.0 + 1e-6);
        }
    }
}
