//! Prelude module for common re-exports.
//!
//! ```rust
//! use carebot_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{CareBotConfig, ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Posture Catalog ────────────────────────────────────────────────
pub use crate::posture::{
    CatalogError, Channel, Posture, PostureCatalog, PostureEntry, RotationSequence, TargetProfile,
};

// ─── Output Backend ─────────────────────────────────────────────────
pub use crate::hal::output::{ActuatorOutput, OutputError};
pub use crate::hal::types::{ChannelState, Direction, DriveCommand, IntensityBand};

// ─── Alerts & Sensors ───────────────────────────────────────────────
pub use crate::alert::{AlertEvent, AlertSink, Severity};
pub use crate::sensor::{ObstructionDetector, PressureSensor, SensorError};
