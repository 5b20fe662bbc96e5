//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! file and validate it before anything touches the hardware.
//!
//! # Usage
//!
//! ```rust,no_run
//! use carebot_common::config::{CareBotConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = CareBotConfig::load_validated(Path::new("carebot.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```
//!
//! # TOML Example
//!
//! ```toml
//! driver = "simulation"
//!
//! [shared]
//! log_level = "info"
//! service_name = "carebot-ward-3"
//!
//! [motion]
//! steps = 30
//! step_delay_ms = 300
//! min_intensity = 20.0
//! max_intensity = 80.0
//!
//! [schedule]
//! rotation_interval_s = 5400
//! sequence = ["supine", "left_lateral", "supine", "right_lateral"]
//!
//! [safety]
//! min_pressure = 500.0
//! sensor_timeout_ms = 500
//!
//! [estop]
//! debounce_ms = 300
//! ```

use crate::consts::{
    ALERT_HISTORY_CAPACITY, DEFAULT_DRIVER, ESTOP_DEBOUNCE_MS, MAX_DRIVE_INTENSITY,
    MIN_DRIVE_INTENSITY, MIN_PRESSURE_THRESHOLD, MOVE_STEPS, ROTATION_INTERVAL_S,
    SENSOR_TIMEOUT_MS, STEP_DELAY_MS,
};
use crate::hal::types::IntensityBand;
use crate::posture::{CatalogError, Posture, RotationSequence};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<CatalogError> for ConfigError {
    fn from(err: CatalogError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "carebot-ward-3"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: "carebot".to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stepped motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Interpolation ticks per move.
    pub steps: u32,
    /// Pause between ticks [ms].
    pub step_delay_ms: u64,
    /// Drive intensity lower bound [%].
    pub min_intensity: f64,
    /// Drive intensity upper bound [%].
    pub max_intensity: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            steps: MOVE_STEPS,
            step_delay_ms: STEP_DELAY_MS,
            min_intensity: MIN_DRIVE_INTENSITY,
            max_intensity: MAX_DRIVE_INTENSITY,
        }
    }
}

impl MotionConfig {
    /// Tick delay as `Duration`.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Intensity band.
    pub fn band(&self) -> IntensityBand {
        IntensityBand {
            min: self.min_intensity,
            max: self.max_intensity,
        }
    }
}

/// Rotation timing and order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Wait between rotations [s].
    pub rotation_interval_s: u64,
    /// Cyclic posture order.
    pub sequence: Vec<Posture>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rotation_interval_s: ROTATION_INTERVAL_S,
            sequence: RotationSequence::standard().postures().to_vec(),
        }
    }
}

impl ScheduleConfig {
    /// Interval as `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_s)
    }

    /// Validated rotation sequence.
    pub fn rotation_sequence(&self) -> Result<RotationSequence, CatalogError> {
        RotationSequence::new(self.sequence.clone())
    }
}

/// Safety gate thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Pressure below this means nobody is on the bed.
    pub min_pressure: f64,
    /// Bound on one sensor read [ms].
    pub sensor_timeout_ms: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_pressure: MIN_PRESSURE_THRESHOLD,
            sensor_timeout_ms: SENSOR_TIMEOUT_MS,
        }
    }
}

impl SafetyConfig {
    /// Sensor timeout as `Duration`.
    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_timeout_ms)
    }
}

/// Emergency stop button input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstopConfig {
    /// Edges closer together than this are ignored [ms].
    pub debounce_ms: u64,
}

impl Default for EstopConfig {
    fn default() -> Self {
        Self {
            debounce_ms: ESTOP_DEBOUNCE_MS,
        }
    }
}

impl EstopConfig {
    /// Debounce window as `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Alert history retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Alerts kept in memory for status queries.
    pub history_capacity: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            history_capacity: ALERT_HISTORY_CAPACITY,
        }
    }
}

/// Values produced by the simulated sensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Constant bed pressure reading.
    pub pressure: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { pressure: 1000.0 }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareBotConfig {
    /// Logging and identity.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Output backend name (see the driver registry).
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Stepped motion.
    #[serde(default)]
    pub motion: MotionConfig,
    /// Rotation schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Safety gate.
    #[serde(default)]
    pub safety: SafetyConfig,
    /// Emergency stop input.
    #[serde(default)]
    pub estop: EstopConfig,
    /// Alert history.
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Simulated sensors.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

impl Default for CareBotConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            driver: default_driver(),
            motion: MotionConfig::default(),
            schedule: ScheduleConfig::default(),
            safety: SafetyConfig::default(),
            estop: EstopConfig::default(),
            alerts: AlertConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl CareBotConfig {
    /// Load and validate in one go.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.driver.is_empty() {
            return Err(invalid("driver cannot be empty"));
        }
        if self.motion.steps == 0 {
            return Err(invalid("motion.steps must be at least 1"));
        }
        if !self.motion.band().is_valid() {
            return Err(invalid(
                "motion intensity band must satisfy 0 < min_intensity <= max_intensity < 100",
            ));
        }
        if self.schedule.rotation_interval_s == 0 {
            return Err(invalid("schedule.rotation_interval_s must be positive"));
        }
        self.schedule.rotation_sequence()?;
        if !self.safety.min_pressure.is_finite() || self.safety.min_pressure < 0.0 {
            return Err(invalid("safety.min_pressure must be a non-negative number"));
        }
        if self.safety.sensor_timeout_ms == 0 {
            return Err(invalid("safety.sensor_timeout_ms must be positive"));
        }
        if self.alerts.history_capacity == 0 {
            return Err(invalid("alerts.history_capacity must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
