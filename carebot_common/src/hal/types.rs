//! Drive command types.
//!
//! - `Direction` - extend / retract / hold for one channel
//! - `DriveCommand` - direction plus drive intensity
//! - `IntensityBand` - clamp band keeping the motor away from 0% and 100%
//! - `ChannelState` - per-channel extension and last drive command

use crate::consts::{CHANNEL_COUNT, MAX_DRIVE_INTENSITY, MIN_DRIVE_INTENSITY};
use crate::posture::Channel;
use serde::{Deserialize, Serialize};

/// Motor direction for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lengthen the actuator.
    Extend,
    /// Shorten the actuator.
    Retract,
    /// Both direction pins low.
    #[default]
    Hold,
}

impl Direction {
    /// Direction that moves a channel from `previous` to `next`.
    #[inline]
    pub fn between(previous: f64, next: f64) -> Self {
        if next > previous {
            Direction::Extend
        } else if next < previous {
            Direction::Retract
        } else {
            Direction::Hold
        }
    }
}

/// Command sent to one channel's motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Motor direction.
    pub direction: Direction,
    /// PWM duty cycle [%].
    pub intensity: f64,
}

impl DriveCommand {
    /// Direction neutral, zero intensity.
    pub const NEUTRAL: Self = Self {
        direction: Direction::Hold,
        intensity: 0.0,
    };

    /// Whether the motor is fully de-energized.
    #[inline]
    pub fn is_neutral(&self) -> bool {
        self.direction == Direction::Hold && self.intensity == 0.0
    }
}

/// Band every non-halt drive intensity is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityBand {
    /// Lowest intensity ever commanded outside a halt [%].
    pub min: f64,
    /// Highest intensity ever commanded [%].
    pub max: f64,
}

impl IntensityBand {
    /// Reference band (20–80%).
    pub const STANDARD: Self = Self {
        min: MIN_DRIVE_INTENSITY,
        max: MAX_DRIVE_INTENSITY,
    };

    /// Clamp a step magnitude into the band.
    #[inline]
    pub fn clamp(&self, magnitude: f64) -> f64 {
        magnitude.abs().clamp(self.min, self.max)
    }

    /// Check `0 < min <= max < 100`.
    pub fn is_valid(&self) -> bool {
        self.min > 0.0 && self.min <= self.max && self.max < 100.0
    }

    /// Drive command for a step from `previous` to `next`.
    pub fn command(&self, previous: f64, next: f64) -> DriveCommand {
        DriveCommand {
            direction: Direction::between(previous, next),
            intensity: self.clamp(next - previous),
        }
    }
}

impl Default for IntensityBand {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Per-channel extension [%] and last drive command, owned by the driver.
///
/// Readers always receive a copy taken under the driver's lock, so a copy
/// never mixes values from two different interpolation ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelState {
    /// Current extension per channel, `Channel::ALL` order.
    pub values: [f64; CHANNEL_COUNT],
    /// Last command applied per channel, `Channel::ALL` order.
    pub drive: [DriveCommand; CHANNEL_COUNT],
}

impl ChannelState {
    /// Extension of one channel.
    #[inline]
    pub fn value(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }

    /// Last drive command of one channel.
    #[inline]
    pub fn drive(&self, channel: Channel) -> DriveCommand {
        self.drive[channel.index()]
    }

    /// Whether every channel is de-energized.
    pub fn all_neutral(&self) -> bool {
        self.drive.iter().all(DriveCommand::is_neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_follows_value_change() {
        assert_eq!(Direction::between(10.0, 20.0), Direction::Extend);
        assert_eq!(Direction::between(20.0, 10.0), Direction::Retract);
        assert_eq!(Direction::between(20.0, 20.0), Direction::Hold);
    }

    #[test]
    fn band_clamps_both_ends() {
        let band = IntensityBand::STANDARD;
        assert_eq!(band.clamp(0.0), 20.0);
        assert_eq!(band.clamp(-5.0), 20.0);
        assert_eq!(band.clamp(45.0), 45.0);
        assert_eq!(band.clamp(100.0), 80.0);
    }

    #[test]
    fn band_command_never_drives_at_zero() {
        let band = IntensityBand::STANDARD;
        let cmd = band.command(30.0, 30.0);
        assert_eq!(cmd.direction, Direction::Hold);
        assert_eq!(cmd.intensity, 20.0);

        let cmd = band.command(60.0, 0.0);
        assert_eq!(cmd.direction, Direction::Retract);
        assert_eq!(cmd.intensity, 60.0);
    }

    #[test]
    fn band_validation() {
        assert!(IntensityBand::STANDARD.is_valid());
        assert!(!IntensityBand { min: 0.0, max: 80.0 }.is_valid());
        assert!(!IntensityBand { min: 50.0, max: 40.0 }.is_valid());
        assert!(!IntensityBand { min: 20.0, max: 100.0 }.is_valid());
    }

    #[test]
    fn default_channel_state_is_neutral() {
        let state = ChannelState::default();
        assert!(state.all_neutral());
        assert_eq!(state.value(Channel::FootRight), 0.0);
    }
}
