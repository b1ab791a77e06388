//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`HS_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use hyperspace_core::{
    FlightConfig, GenerationConfig, GoalConfig, SimulationConfig, SliceConfig,
    DEFAULT_DIMENSIONS, DEFAULT_REMAP_DURATION, DEFAULT_TEXTURE_DISTANCE, MIN_DIMENSIONS,
};
use hyperspace_remote::RetryPolicy;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Universe size and generation
    #[serde(default)]
    pub world: WorldConfig,
    /// Slice visibility
    #[serde(default)]
    pub slice: SliceConfig,
    /// Speed model
    #[serde(default)]
    pub flight: FlightConfig,
    /// Remap transitions
    #[serde(default)]
    pub remap: RemapConfig,
    /// Goal capture
    #[serde(default)]
    pub goal: GoalConfig,
    /// Texture streaming
    #[serde(default)]
    pub textures: TextureConfig,
    /// Session storage
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Headless runner
    #[serde(default)]
    pub run: RunConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`HS_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // HS_FLIGHT__MAX_SPEED=5000 -> flight.max_speed = 5000
        figment = figment.merge(Env::prefixed("HS_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Number of dimensions, raised to the minimum if configured too low
    pub fn dimensions(&self) -> usize {
        if self.world.dimensions < MIN_DIMENSIONS {
            log::warn!(
                "world.dimensions = {} is below {}; using {}",
                self.world.dimensions, MIN_DIMENSIONS, MIN_DIMENSIONS
            );
            MIN_DIMENSIONS
        } else {
            self.world.dimensions
        }
    }

    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            slice: self.slice.clone(),
            flight: self.flight.clone(),
            goal: self.goal.clone(),
            remap_duration: self.remap.duration,
        }
    }

    pub fn generation(&self) -> GenerationConfig {
        let w = &self.world;
        GenerationConfig {
            star_count: w.star_count,
            star_distance_min: w.star_distance_min,
            star_distance_max: w.star_distance_max,
            asteroid_count: w.asteroid_count,
            asteroid_radius_min: w.asteroid_radius_min,
            asteroid_radius_max: w.asteroid_radius_max,
            asteroid_reset_distance: w.asteroid_reset_distance,
            seed: w.seed,
        }
    }
}

/// Universe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Total number of dimensions (at least 3)
    pub dimensions: usize,
    /// Stars generated per universe
    pub star_count: usize,
    /// Inner radius of the star shell
    pub star_distance_min: f64,
    /// Outer radius of the star shell
    pub star_distance_max: f64,
    /// Scenery asteroids kept around the pilot
    pub asteroid_count: usize,
    pub asteroid_radius_min: f64,
    pub asteroid_radius_max: f64,
    /// Asteroids farther than this are respawned near the pilot
    pub asteroid_reset_distance: f64,
    /// Fixed RNG seed (random if unset)
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let generation = GenerationConfig::default();
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            star_count: generation.star_count,
            star_distance_min: generation.star_distance_min,
            star_distance_max: generation.star_distance_max,
            asteroid_count: generation.asteroid_count,
            asteroid_radius_min: generation.asteroid_radius_min,
            asteroid_radius_max: generation.asteroid_radius_max,
            asteroid_reset_distance: generation.asteroid_reset_distance,
            seed: None,
        }
    }
}

/// Remap transition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapConfig {
    /// Transition length in seconds
    pub duration: f64,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self { duration: DEFAULT_REMAP_DURATION }
    }
}

/// Texture streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Stars closer than this (in 3D) get textures
    pub distance: f64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    /// Fetch threads
    pub workers: usize,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_TEXTURE_DISTANCE,
            max_retries: 3,
            retry_delay_ms: 500,
            workers: 2,
        }
    }
}

impl TextureConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Root of the session service and the local fallback store
    pub data_dir: String,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            max_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

impl PersistenceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    /// Directory of the session service
    pub fn service_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("sessions")
    }

    /// Directory of the local fallback store
    pub fn local_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("local")
    }
}

/// Headless runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Ticks to simulate before exiting
    pub ticks: u64,
    /// Ticks per second
    pub tick_rate: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_rate: 60.0,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Show debug overlay
    pub show_overlay: bool,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_overlay: false,
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
