//! Application systems
//!
//! Per-frame systems around the core simulation, kept out of the app for testability.

mod session;
mod simulation;
mod textures;

pub use session::{SessionEvent, SessionOrigin, SessionSystem};
pub use simulation::{SimulationSystem, MAX_FRAME_DT, RESUME_FRAME_DT};
pub use textures::{TextureSystem, TextureUpdate};
