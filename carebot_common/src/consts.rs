//! Reference constants for the CareBot workspace.
//!
//! Single source of truth for default timings, thresholds and paths.
//! Configuration defaults are taken from here, never duplicated.

/// Number of independently driven actuator channels.
pub const CHANNEL_COUNT: usize = 4;

/// Default rotation interval in seconds (90 minutes).
pub const ROTATION_INTERVAL_S: u64 = 90 * 60;

/// Default number of interpolation steps per move.
pub const MOVE_STEPS: u32 = 30;

/// Default delay between interpolation steps in milliseconds.
pub const STEP_DELAY_MS: u64 = 300;

/// Lower bound of the drive intensity band [%].
pub const MIN_DRIVE_INTENSITY: f64 = 20.0;

/// Upper bound of the drive intensity band [%].
pub const MAX_DRIVE_INTENSITY: f64 = 80.0;

/// Minimum pressure reading that counts as a patient on the bed.
pub const MIN_PRESSURE_THRESHOLD: f64 = 500.0;

/// Upper bound on a single pressure sensor read in milliseconds.
pub const SENSOR_TIMEOUT_MS: u64 = 500;

/// Emergency stop button debounce window in milliseconds.
pub const ESTOP_DEBOUNCE_MS: u64 = 300;

/// Number of alerts retained by the in-memory alert history.
pub const ALERT_HISTORY_CAPACITY: usize = 1000;

/// Default number of alerts returned by a history query.
pub const ALERT_QUERY_LIMIT: usize = 50;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/carebot/carebot.toml";

/// Default output driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert_eq!(CHANNEL_COUNT, 4);
        assert!(MOVE_STEPS >= 1);
        assert!(MIN_DRIVE_INTENSITY > 0.0);
        assert!(MIN_DRIVE_INTENSITY <= MAX_DRIVE_INTENSITY);
        assert!(MAX_DRIVE_INTENSITY < 100.0);
        assert!(ALERT_QUERY_LIMIT <= ALERT_HISTORY_CAPACITY);
    }

    #[test]
    fn rotation_interval_is_ninety_minutes() {
        assert_eq!(ROTATION_INTERVAL_S, 5400);
    }
}
