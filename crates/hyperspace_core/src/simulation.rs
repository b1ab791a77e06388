//! Fixed per-tick orchestration of a universe
//!
//! `Simulation` owns everything that changes a [`WorldState`] over time: the
//! remapper, the generator used for scenery and resets, and the simulation
//! clock. Each tick either animates a remap transition or runs normal
//! navigation, never both, and then checks the goal.

use serde::{Serialize, Deserialize};
use hyperspace_flight::{FlightConfig, FlightEvent};
use crate::axis::{Axis, AxisMapping};
use crate::generation::WorldGenerator;
use crate::goal::{check_goal, GoalConfig};
use crate::navigation::{integrate, PilotInput};
use crate::remap::{DimensionRemapper, RemapProgress, RemapRejection, DEFAULT_REMAP_DURATION};
use crate::slice::SliceConfig;
use crate::snapshot::Snapshot;
use crate::world::WorldState;

/// Tuning for everything the simulation drives
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub slice: SliceConfig,
    pub flight: FlightConfig,
    pub goal: GoalConfig,
    /// Remap transition length in seconds
    pub remap_duration: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            slice: SliceConfig::default(),
            flight: FlightConfig::default(),
            goal: GoalConfig::default(),
            remap_duration: DEFAULT_REMAP_DURATION,
        }
    }
}

/// Things that happened during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimEvent {
    /// A warp phase completed
    Flight(FlightEvent),
    /// A remap transition finished and this mapping is now in effect
    RemapCommitted(AxisMapping),
    /// The pilot reached the goal star
    GoalAchieved,
}

/// Outcome of one tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<SimEvent>,
    /// Progress of the running transition, if any
    pub transition_progress: Option<f64>,
    /// Scenery objects respawned near the pilot
    pub recycled: usize,
}

/// Drives a universe forward in time
pub struct Simulation {
    config: SimulationConfig,
    remapper: DimensionRemapper,
    generator: WorldGenerator,
    clock: f64,
}

impl Simulation {
    pub fn new(config: SimulationConfig, generator: WorldGenerator) -> Self {
        let remapper = DimensionRemapper::new(config.remap_duration);
        Self {
            config,
            remapper,
            generator,
            clock: 0.0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seconds of simulated time so far
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn remapper(&self) -> &DimensionRemapper {
        &self.remapper
    }

    pub fn is_remapping(&self) -> bool {
        self.remapper.is_active()
    }

    pub fn generator_mut(&mut self) -> &mut WorldGenerator {
        &mut self.generator
    }

    /// Fresh universe using the configured generator
    pub fn generate(&mut self, dimensions: usize) -> WorldState {
        let mut world = WorldState::new(dimensions);
        self.generator.regenerate(&mut world);
        world.refresh_objects(&self.config.slice);
        world
    }

    /// Rebuild a universe from a snapshot
    pub fn restore(&mut self, snapshot: &Snapshot, dimensions: usize) -> WorldState {
        self.remapper.abort();
        let mut world = snapshot.restore(dimensions, &mut self.generator);
        world.refresh_objects(&self.config.slice);
        world
    }

    /// Replace `world` with a brand new universe
    pub fn reset_world(&mut self, world: &mut WorldState) {
        self.remapper.abort();
        self.generator.regenerate(world);
        world.refresh_objects(&self.config.slice);
    }

    /// Start a transition showing `dim` on `axis`
    pub fn request_remap(&mut self, world: &WorldState, axis: Axis, dim: usize) -> Result<(), RemapRejection> {
        let result = self.remapper.request(world, axis, dim, self.clock);
        if let Err(reason) = &result {
            log::debug!("Remap of axis {} to dimension {} rejected: {}", axis, dim, reason);
        }
        result
    }

    /// Start a transition showing the next unmapped dimension on `axis`
    pub fn cycle_axis(&mut self, world: &WorldState, axis: Axis) -> Result<usize, RemapRejection> {
        if self.remapper.is_active() {
            log::debug!("Remap of axis {} rejected: transition running", axis);
            return Err(RemapRejection::TransitionActive);
        }
        let dim = world
            .mapping()
            .next_unmapped(axis, world.dimensions())
            .ok_or(RemapRejection::NoUnmappedDimension)?;
        self.request_remap(world, axis, dim)?;
        Ok(dim)
    }

    /// Begin accelerating to warp; ignored during a remap transition
    pub fn engage_warp(&mut self, world: &mut WorldState) -> bool {
        if self.remapper.is_active() {
            log::debug!("Warp engage ignored during remap");
            return false;
        }
        let engaged = world.pilot.flight.engage_warp();
        if engaged {
            log::info!("Warp engaged");
        }
        engaged
    }

    /// Begin decelerating out of warp; ignored during a remap transition
    pub fn disengage_warp(&mut self, world: &mut WorldState) -> bool {
        if self.remapper.is_active() {
            log::debug!("Warp disengage ignored during remap");
            return false;
        }
        let disengaging = world.pilot.flight.disengage_warp();
        if disengaging {
            log::info!("Warp disengaging");
        }
        disengaging
    }

    /// Advance the universe by `dt` seconds
    ///
    /// While a transition runs, controls are ignored and the pilot does not
    /// move. Non-finite or negative `dt` counts as zero.
    pub fn tick(&mut self, world: &mut WorldState, input: &PilotInput, dt: f64) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;
        let mut report = TickReport::default();

        match self.remapper.advance(world, &self.config.slice, self.clock) {
            RemapProgress::Active(t) => report.transition_progress = Some(t),
            RemapProgress::Committed(mapping) => report.events.push(SimEvent::RemapCommitted(mapping)),
            RemapProgress::Idle => self.navigate(world, input, dt, &mut report),
        }

        // The goal can be reached mid-transition too
        if check_goal(world, &self.config.goal) {
            report.events.push(SimEvent::GoalAchieved);
        }
        report
    }

    fn navigate(&mut self, world: &mut WorldState, input: &PilotInput, dt: f64, report: &mut TickReport) {
        let mapping = *world.mapping();
        if let Some(event) = integrate(&mut world.pilot, &mapping, input, dt, &self.config.flight) {
            match event {
                FlightEvent::WarpSpeedReached => log::info!("Warp speed reached"),
                FlightEvent::WarpDisengaged => log::info!("Warp disengaged"),
            }
            report.events.push(SimEvent::Flight(event));
        }

        report.recycled = self.generator.recycle_scenery(world);
        world.refresh_objects(&self.config.slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationConfig;
    use crate::object::ObjectKind;
    use hyperspace_flight::ThrustInput;
    use hyperspace_math::DimensionVector;

    fn simulation() -> Simulation {
        let generator = WorldGenerator::new(GenerationConfig {
            star_count: 30,
            asteroid_count: 10,
            seed: Some(3),
            ..GenerationConfig::default()
        });
        Simulation::new(SimulationConfig::default(), generator)
    }

    #[test]
    fn test_generate() {
        let mut sim = simulation();
        let world = sim.generate(5);
        assert_eq!(world.star_count(), 30);
        assert!(world.goal().is_some());
    }

    #[test]
    fn test_controls_frozen_during_remap() {
        let mut sim = simulation();
        let mut world = sim.generate(5);
        world.pilot.flight.speed = 100.0;
        let before = world.pilot.position.clone();
        sim.request_remap(&world, Axis::X, 3).unwrap();

        let report = sim.tick(&mut world, &PilotInput::thrust(ThrustInput::FORWARD), 1.0);
        assert!(report.transition_progress.is_some());
        assert_eq!(world.pilot.position, before);
        assert_eq!(world.pilot.flight.speed, 100.0);
    }

    #[test]
    fn test_remap_commits_after_duration() {
        let mut sim = simulation();
        let mut world = sim.generate(5);
        sim.request_remap(&world, Axis::Y, 4).unwrap();
        let mut committed = None;
        for _ in 0..4 {
            let report = sim.tick(&mut world, &PilotInput::default(), 1.0);
            for e in report.events {
                if let SimEvent::RemapCommitted(m) = e {
                    committed = Some(m);
                }
            }
        }
        assert_eq!(committed, Some(AxisMapping::new(0, 4, 2, 5).unwrap()));
        assert!(!sim.is_remapping());
    }

    #[test]
    fn test_warp_ignored_during_remap() {
        let mut sim = simulation();
        let mut world = sim.generate(5);
        sim.request_remap(&world, Axis::X, 3).unwrap();
        assert!(!sim.engage_warp(&mut world));
        assert!(!sim.disengage_warp(&mut world));
        assert_eq!(world.pilot.flight.warp, hyperspace_flight::WarpPhase::Idle);
    }

    #[test]
    fn test_cycle_axis_picks_next_unmapped() {
        let mut sim = simulation();
        let world = sim.generate(5);
        assert_eq!(sim.cycle_axis(&world, Axis::Z), Ok(3));
        assert_eq!(sim.cycle_axis(&world, Axis::X), Err(RemapRejection::TransitionActive));
    }

    #[test]
    fn test_cycle_axis_three_dimensions() {
        let mut sim = simulation();
        let world = sim.generate(3);
        assert_eq!(sim.cycle_axis(&world, Axis::X), Err(RemapRejection::NoUnmappedDimension));
    }

    #[test]
    fn test_bad_dt_is_zero() {
        let mut sim = simulation();
        let mut world = sim.generate(5);
        world.pilot.flight.speed = 10.0;
        let before = world.pilot.position.clone();
        sim.tick(&mut world, &PilotInput::default(), f64::NAN);
        sim.tick(&mut world, &PilotInput::default(), -1.0);
        assert_eq!(world.pilot.position, before);
        assert_eq!(sim.clock(), 0.0);
    }

    #[test]
    fn test_goal_reached_during_transition() {
        let mut sim = Simulation::new(
            SimulationConfig::default(),
            WorldGenerator::new(GenerationConfig { star_count: 0, asteroid_count: 0, seed: Some(3), ..GenerationConfig::default() }),
        );
        let mut world = WorldState::new(5);
        let goal = world.spawn(ObjectKind::Star, DimensionVector::from(vec![0.0, 0.0, -100.0, 0.0, 0.0]));
        world.set_goal(goal);

        // Remapping X turns the pilot about Z, so the goal stays ahead
        sim.request_remap(&world, Axis::X, 3).unwrap();
        let report = sim.tick(&mut world, &PilotInput::default(), 0.5);
        assert!(report.transition_progress.is_some());
        assert!(report.events.contains(&SimEvent::GoalAchieved));
        assert!(world.goal_achieved());
    }

    #[test]
    fn test_reset_aborts_transition() {
        let mut sim = simulation();
        let mut world = sim.generate(5);
        sim.request_remap(&world, Axis::X, 3).unwrap();
        sim.reset_world(&mut world);
        assert!(!sim.is_remapping());
        assert_eq!(*world.mapping(), AxisMapping::identity());
        assert_eq!(world.star_count(), 30);
    }
}
