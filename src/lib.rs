//! Hyperspace - N-dimensional slice flight
//!
//! Application layer: configuration, key mapping, per-frame systems and the
//! [`App`] that ties them to the core simulation.

pub mod app;
pub mod config;
pub mod input;
pub mod systems;

pub use app::{App, AppError, Services};
pub use config::AppConfig;
