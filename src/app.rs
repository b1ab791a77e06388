//! Application state
//!
//! [`App`] wires configuration, input, the simulation and the background
//! services together. It has no window of its own: callers feed it key events
//! and frame times, and it hands every frame to a [`SceneSink`].

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use hyperspace_core::{
    pick_star, HoverInfo, RenderFrame, SceneSink, SimEvent, Simulation, TickReport, Viewport,
    WorldGenerator, WorldState,
};
use hyperspace_input::PilotController;
use hyperspace_remote::{
    FilePersistence, LocalStore, PersistenceService, ProceduralTextures, RemoteError, TextureService,
};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::config::{AppConfig, PersistenceConfig};
use crate::input::{InputAction, InputMapper};
use crate::systems::{SessionEvent, SessionOrigin, SessionSystem, SimulationSystem, TextureSystem};

/// Longest wait for the session service at startup and shutdown
const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Collaborators the app talks to
pub struct Services {
    pub persistence: Arc<dyn PersistenceService>,
    pub textures: Arc<dyn TextureService>,
    pub local: LocalStore,
}

impl Services {
    /// File-backed sessions and procedural textures under `data_dir`
    pub fn from_config(config: &PersistenceConfig) -> Result<Self, AppError> {
        Ok(Self {
            persistence: Arc::new(FilePersistence::new(config.service_dir())?),
            textures: Arc::new(ProceduralTextures::default()),
            local: LocalStore::open(config.local_dir())?,
        })
    }
}

/// Startup failure
#[derive(Debug)]
pub enum AppError {
    Remote(RemoteError),
    Io(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Remote(e) => write!(f, "Session service unavailable: {}", e),
            AppError::Io(e) => write!(f, "Local storage unavailable: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Remote(e) => Some(e),
            AppError::Io(e) => Some(e),
        }
    }
}

impl From<RemoteError> for AppError {
    fn from(e: RemoteError) -> Self {
        AppError::Remote(e)
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e)
    }
}

/// Main application state
pub struct App<S: SceneSink> {
    simulation: Simulation,
    world: WorldState,
    controller: PilotController,
    clock: SimulationSystem,
    session: SessionSystem,
    textures: TextureSystem,
    sink: S,
    origin: SessionOrigin,
    show_overlay: bool,
    viewport: Viewport,
    pointer: Option<[f64; 2]>,
    frames: u64,
}

impl<S: SceneSink> App<S> {
    /// Build the app and its starting world
    pub fn new(config: &AppConfig, services: Services, sink: S) -> Self {
        let dimensions = config.dimensions();
        let mut simulation = Simulation::new(config.simulation(), WorldGenerator::new(config.generation()));
        let mut session = SessionSystem::new(
            services.persistence,
            config.persistence.retry_policy(),
            services.local,
            SESSION_TIMEOUT,
        );
        let (world, origin) = session.start(&mut simulation, dimensions);

        let textures = TextureSystem::new(
            services.textures,
            config.textures.retry_policy(),
            config.textures.workers,
            config.textures.distance,
        );
        textures.set_session(session.session());

        log::info!(
            "Universe ready: {} dimensions, {} objects, mapping {}",
            world.dimensions(),
            world.object_count(),
            world.mapping()
        );

        Self {
            simulation,
            world,
            controller: PilotController::new(),
            clock: SimulationSystem::new(),
            session,
            textures,
            sink,
            origin,
            show_overlay: config.debug.show_overlay,
            viewport: Viewport::default(),
            pointer: None,
            frames: 0,
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn session(&self) -> &SessionSystem {
        &self.session
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Route a key event
    ///
    /// Returns false when the app should exit.
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        match InputMapper::map_keyboard(key, state) {
            Some(action) => self.apply(action),
            None => {
                self.controller.process_keyboard(key, state);
                true
            }
        }
    }

    /// Perform an action
    ///
    /// Returns false for [`InputAction::Exit`].
    pub fn apply(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::TogglePause => {
                self.clock.toggle_pause();
            }
            InputAction::ToggleOverlay => {
                self.show_overlay = !self.show_overlay;
            }
            InputAction::RemapAxis(axis) => {
                if let Ok(dim) = self.simulation.cycle_axis(&self.world, axis) {
                    log::info!("Remapping axis {} to dimension {}", axis, dim);
                }
            }
            InputAction::Save => {
                if let Some(event) = self.session.save(&self.world) {
                    self.on_session_event(event);
                }
            }
            InputAction::Reset => {
                self.textures.clear();
                self.textures.set_session(None);
                self.session.reset(&mut self.simulation, &mut self.world);
            }
            InputAction::Exit => return false,
        }
        true
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The view was resized to `width` x `height` pixels
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
    }

    /// The pointer moved to pixel `(x, y)`
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = Some([x, y]);
    }

    /// The pointer left the view
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Nearest visible star under the pointer
    pub fn hovered(&self) -> Option<HoverInfo> {
        let pointer = self.pointer?;
        pick_star(&self.world, &self.viewport, &self.simulation.config().goal, pointer)
    }

    /// Release every held flight key (e.g. on focus loss)
    pub fn release_controls(&mut self) {
        self.controller.release_all();
    }

    /// Run one frame of `dt` seconds and submit it
    pub fn step(&mut self, dt: f64) -> Option<TickReport> {
        let report = self.clock.step(&mut self.simulation, &mut self.world, &mut self.controller, dt);
        self.after_tick(report)
    }

    /// Run one frame timed by the wall clock and submit it
    pub fn update(&mut self) -> Option<TickReport> {
        let report = self.clock.update(&mut self.simulation, &mut self.world, &mut self.controller);
        self.after_tick(report)
    }

    fn after_tick(&mut self, report: Option<TickReport>) -> Option<TickReport> {
        if let Some(report) = &report {
            for event in &report.events {
                match event {
                    SimEvent::GoalAchieved => log::info!("Goal star reached"),
                    SimEvent::RemapCommitted(mapping) => log::info!("Now showing {}", mapping),
                    SimEvent::Flight(_) => {}
                }
            }
        }

        let remapping = self.simulation.is_remapping();
        self.textures.update(&mut self.world, remapping);

        for event in self.session.poll() {
            self.on_session_event(event);
        }

        let frame = RenderFrame::build(&self.world, self.simulation.remapper().progress());
        self.sink.submit(&frame);
        self.frames += 1;
        report
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Registered(id) => self.textures.set_session(Some(id)),
            SessionEvent::Saved { remote } => {
                log::debug!("Session saved ({})", if remote { "service" } else { "local" });
            }
            SessionEvent::SaveFailed => log::warn!("Session could not be saved"),
        }
    }

    /// One-line status, if the overlay is shown
    pub fn overlay(&self) -> Option<String> {
        if !self.show_overlay {
            return None;
        }
        let pilot = &self.world.pilot;
        let transition = match self.simulation.remapper().progress() {
            Some(t) => format!(" remap {:>3.0}%", t * 100.0),
            None => String::new(),
        };
        let hover = match self.hovered() {
            Some(info) => format!(" | {}", info),
            None => String::new(),
        };
        Some(format!(
            "speed {:>9.1} | warp {:?} | mapping {} | stars {} | goal {}{}{}{}",
            pilot.flight.speed,
            pilot.flight.warp,
            self.world.mapping(),
            self.world.star_count(),
            if self.world.goal_achieved() { "reached" } else { "hunting" },
            transition,
            if self.is_paused() { " | paused" } else { "" },
            hover,
        ))
    }

    /// Save and wait for outstanding session calls
    pub fn shutdown(&mut self) {
        if let Some(event) = self.session.save(&self.world) {
            self.on_session_event(event);
        }
        for event in self.session.flush() {
            self.on_session_event(event);
        }
        log::info!("Shut down after {} frames", self.frames);
    }
}
