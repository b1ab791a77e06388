//! Frame simulation system
//!
//! Manages the per-frame loop around [`Simulation::tick`]:
//! - Delta time calculation and capping
//! - Pause and resume
//! - Warp commands from the controller
//! - Held controls → pilot input

use std::time::Instant;
use hyperspace_core::{Simulation, TickReport, WorldState};
use hyperspace_input::{PilotController, WarpRequest};

/// Longest frame fed to the simulation, in seconds
pub const MAX_FRAME_DT: f64 = 0.25;

/// Longest first frame after resuming from pause, in seconds
pub const RESUME_FRAME_DT: f64 = 1.0 / 60.0;

/// Drives the simulation once per frame
pub struct SimulationSystem {
    last_frame: Instant,
    paused: bool,
    resumed: bool,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            paused: false,
            resumed: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume; returns the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            self.resumed = true;
        }
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        self.paused
    }

    /// Run one frame timed by the wall clock
    ///
    /// Returns `None` while paused.
    pub fn update(
        &mut self,
        simulation: &mut Simulation,
        world: &mut WorldState,
        controller: &mut PilotController,
    ) -> Option<TickReport> {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.step(simulation, world, controller, raw_dt)
    }

    /// Run one frame of `raw_dt` seconds
    ///
    /// Returns `None` while paused.
    pub fn step(
        &mut self,
        simulation: &mut Simulation,
        world: &mut WorldState,
        controller: &mut PilotController,
        raw_dt: f64,
    ) -> Option<TickReport> {
        if self.paused {
            // Warp keys pressed while paused are dropped
            controller.consume_warp();
            return None;
        }

        // Cap dt to prevent a huge jump after a stall
        let mut dt = raw_dt.min(MAX_FRAME_DT);
        if std::mem::take(&mut self.resumed) {
            dt = dt.min(RESUME_FRAME_DT);
        }

        match controller.consume_warp() {
            Some(WarpRequest::Engage) => {
                simulation.engage_warp(world);
            }
            Some(WarpRequest::Disengage) => {
                simulation.disengage_warp(world);
            }
            None => {}
        }

        Some(simulation.tick(world, &controller.pilot_input(), dt))
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperspace_core::{GenerationConfig, SimulationConfig, WarpPhase, WorldGenerator};
    use winit::event::ElementState;
    use winit::keyboard::KeyCode;

    fn setup() -> (Simulation, WorldState, PilotController) {
        let generator = WorldGenerator::new(GenerationConfig {
            star_count: 10,
            asteroid_count: 5,
            seed: Some(4),
            ..GenerationConfig::default()
        });
        let mut sim = Simulation::new(SimulationConfig::default(), generator);
        let world = sim.generate(5);
        (sim, world, PilotController::new())
    }

    #[test]
    fn test_dt_capped() {
        let (mut sim, mut world, mut controller) = setup();
        let mut system = SimulationSystem::new();
        system.step(&mut sim, &mut world, &mut controller, 10.0);
        assert!((sim.clock() - MAX_FRAME_DT).abs() < 1e-12);
    }

    #[test]
    fn test_paused_frames_do_not_advance() {
        let (mut sim, mut world, mut controller) = setup();
        let mut system = SimulationSystem::new();
        assert!(system.toggle_pause());
        assert!(system.step(&mut sim, &mut world, &mut controller, 0.1).is_none());
        assert_eq!(sim.clock(), 0.0);

        assert!(!system.toggle_pause());
        system.step(&mut sim, &mut world, &mut controller, 0.2);
        assert!((sim.clock() - RESUME_FRAME_DT).abs() < 1e-12);

        // Only the first frame after resuming is clamped
        system.step(&mut sim, &mut world, &mut controller, 0.2);
        assert!((sim.clock() - RESUME_FRAME_DT - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_warp_key_reaches_simulation() {
        let (mut sim, mut world, mut controller) = setup();
        let mut system = SimulationSystem::new();
        controller.process_keyboard(KeyCode::ShiftLeft, ElementState::Pressed);
        controller.process_keyboard(KeyCode::Enter, ElementState::Pressed);
        system.step(&mut sim, &mut world, &mut controller, 0.1);
        assert_eq!(world.pilot.flight.warp, WarpPhase::Engaging);
        assert!(world.pilot.flight.speed > 0.0);
    }
}
