//! Posture catalog: postures, actuator channels and per-posture targets.
//!
//! The catalog is process-wide static data. It is built once at startup,
//! validated for completeness, and never mutated afterwards.
//!
//! - `Posture` - closed set of target body orientations
//! - `Channel` - the four actuator outputs
//! - `TargetProfile` - per-channel extension target in percent
//! - `PostureCatalog` - posture -> (label, profile) lookup table
//! - `RotationSequence` - cyclic order the scheduler walks through

use crate::consts::CHANNEL_COUNT;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;
use thiserror::Error;

/// Error type for catalog construction and lookups.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Name does not match any posture.
    #[error("Unknown posture '{0}' (valid: supine, left_lateral, right_lateral)")]
    UnknownPosture(String),

    /// A posture has no catalog entry.
    #[error("Posture {0} has no catalog entry")]
    MissingPosture(Posture),

    /// A posture appears more than once.
    #[error("Posture {0} is defined more than once")]
    DuplicatePosture(Posture),

    /// A posture has an empty display label.
    #[error("Posture {0} has an empty label")]
    EmptyLabel(Posture),

    /// Target value outside [0, 100].
    #[error("Target {value} for channel {channel} is outside 0..=100")]
    ValueOutOfRange {
        /// Offending channel
        channel: Channel,
        /// Offending value
        value: f64,
    },

    /// Rotation sequence without postures.
    #[error("Rotation sequence is empty")]
    EmptySequence,
}

// ─── Posture ────────────────────────────────────────────────────────

/// Target body orientation the mechanism can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    /// Lying flat on the back (neutral).
    Supine,
    /// Tilted towards the left side.
    LeftLateral,
    /// Tilted towards the right side.
    RightLateral,
}

impl Posture {
    /// All postures in declaration order.
    pub const ALL: [Posture; 3] = [Posture::Supine, Posture::LeftLateral, Posture::RightLateral];

    /// Stable identifier (matches the serde name).
    pub const fn as_str(self) -> &'static str {
        match self {
            Posture::Supine => "supine",
            Posture::LeftLateral => "left_lateral",
            Posture::RightLateral => "right_lateral",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Posture {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Posture::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownPosture(s.to_string()))
    }
}

// ─── Channel ────────────────────────────────────────────────────────

/// One independently driven actuator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Upper body panel, left side (front-left).
    HeadLeft,
    /// Upper body panel, right side (front-right).
    HeadRight,
    /// Lower body panel, left side (rear-left).
    FootLeft,
    /// Lower body panel, right side (rear-right).
    FootRight,
}

impl Channel {
    /// All channels in output order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::HeadLeft,
        Channel::HeadRight,
        Channel::FootLeft,
        Channel::FootRight,
    ];

    /// Position of this channel in per-channel arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier (matches the serde name).
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::HeadLeft => "head_left",
            Channel::HeadRight => "head_right",
            Channel::FootLeft => "foot_left",
            Channel::FootRight => "foot_right",
        }
    }
}

const_assert_eq!(Channel::ALL.len(), CHANNEL_COUNT);

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── TargetProfile ──────────────────────────────────────────────────

/// Per-channel target extension in percent, every value within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetProfile {
    values: [f64; CHANNEL_COUNT],
}

impl TargetProfile {
    /// Build a profile from values in `Channel::ALL` order.
    ///
    /// # Errors
    /// Returns `CatalogError::ValueOutOfRange` for values outside [0, 100]
    /// (NaN included).
    pub fn new(values: [f64; CHANNEL_COUNT]) -> Result<Self, CatalogError> {
        for channel in Channel::ALL {
            let value = values[channel.index()];
            if !(0.0..=100.0).contains(&value) {
                return Err(CatalogError::ValueOutOfRange { channel, value });
            }
        }
        Ok(Self { values })
    }

    /// Target for one channel.
    #[inline]
    pub fn get(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }

    /// Raw values in `Channel::ALL` order.
    #[inline]
    pub const fn values(&self) -> [f64; CHANNEL_COUNT] {
        self.values
    }

    /// Iterate `(channel, target)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

impl Index<Channel> for TargetProfile {
    type Output = f64;

    fn index(&self, channel: Channel) -> &f64 {
        &self.values[channel.index()]
    }
}

// ─── PostureCatalog ─────────────────────────────────────────────────

/// One catalog row.
#[derive(Debug, Clone, PartialEq)]
pub struct PostureEntry {
    /// Posture this row describes.
    pub posture: Posture,
    /// Human readable label used in logs and alerts.
    pub label: String,
    /// Actuator targets for this posture.
    pub profile: TargetProfile,
}

/// Immutable posture lookup table, complete for every `Posture`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostureCatalog {
    entries: Vec<PostureEntry>,
}

impl PostureCatalog {
    /// Build and validate a catalog.
    ///
    /// # Errors
    /// - `DuplicatePosture` if a posture occurs twice
    /// - `MissingPosture` if a posture has no row
    /// - `EmptyLabel` if a label is blank
    pub fn new(entries: Vec<PostureEntry>) -> Result<Self, CatalogError> {
        let mut slots: [Option<PostureEntry>; 3] = [None, None, None];

        for entry in entries {
            if entry.label.trim().is_empty() {
                return Err(CatalogError::EmptyLabel(entry.posture));
            }
            let slot = &mut slots[entry.posture.index()];
            if slot.is_some() {
                return Err(CatalogError::DuplicatePosture(entry.posture));
            }
            *slot = Some(entry);
        }

        let mut ordered = Vec::with_capacity(Posture::ALL.len());
        for (posture, slot) in Posture::ALL.into_iter().zip(slots) {
            ordered.push(slot.ok_or(CatalogError::MissingPosture(posture))?);
        }

        Ok(Self { entries: ordered })
    }

    /// Reference catalog: supine flat, lateral postures tilted about 30°.
    pub fn standard() -> Self {
        let row = |posture, label: &str, values| PostureEntry {
            posture,
            label: label.to_string(),
            profile: TargetProfile { values },
        };

        Self {
            entries: vec![
                row(Posture::Supine, "앙와위 (등 대고 누운 자세)", [0.0, 0.0, 0.0, 0.0]),
                row(Posture::LeftLateral, "좌측와위 (왼쪽 기울임 30°)", [60.0, 10.0, 60.0, 10.0]),
                row(Posture::RightLateral, "우측와위 (오른쪽 기울임 30°)", [10.0, 60.0, 10.0, 60.0]),
            ],
        }
    }

    /// Catalog row for a posture.
    #[inline]
    pub fn entry(&self, posture: Posture) -> &PostureEntry {
        &self.entries[posture.index()]
    }

    /// Target profile for a posture.
    #[inline]
    pub fn profile(&self, posture: Posture) -> &TargetProfile {
        &self.entry(posture).profile
    }

    /// Display label for a posture.
    #[inline]
    pub fn label(&self, posture: Posture) -> &str {
        &self.entry(posture).label
    }
}

impl Default for PostureCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

// ─── RotationSequence ───────────────────────────────────────────────

/// Ordered, cyclic list of postures. Indices wrap modulo the length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSequence {
    postures: Vec<Posture>,
}

impl RotationSequence {
    /// Build a sequence.
    ///
    /// # Errors
    /// Returns `CatalogError::EmptySequence` for an empty list.
    pub fn new(postures: Vec<Posture>) -> Result<Self, CatalogError> {
        if postures.is_empty() {
            return Err(CatalogError::EmptySequence);
        }
        Ok(Self { postures })
    }

    /// Supine → left → supine → right.
    pub fn standard() -> Self {
        Self {
            postures: vec![
                Posture::Supine,
                Posture::LeftLateral,
                Posture::Supine,
                Posture::RightLateral,
            ],
        }
    }

    /// Number of postures in one period.
    #[inline]
    pub fn len(&self) -> usize {
        self.postures.len()
    }

    /// Always false; construction rejects empty sequences.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.postures.is_empty()
    }

    /// Posture at `index`, wrapping.
    #[inline]
    pub fn get(&self, index: usize) -> Posture {
        self.postures[index % self.postures.len()]
    }

    /// Index that follows `index`, wrapping.
    #[inline]
    pub fn advance(&self, index: usize) -> usize {
        (index + 1) % self.postures.len()
    }

    /// First posture of the sequence (the safe starting posture).
    #[inline]
    pub fn first(&self) -> Posture {
        self.postures[0]
    }

    /// Postures in order.
    pub fn postures(&self) -> &[Posture] {
        &self.postures
    }
}

impl Default for RotationSequence {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_complete() {
        let catalog = PostureCatalog::standard();
        let rebuilt = PostureCatalog::new(catalog.entries.clone()).unwrap();
        assert_eq!(rebuilt, catalog);
        for posture in Posture::ALL {
            assert!(!catalog.label(posture).is_empty());
        }
    }

    #[test]
    fn supine_targets_are_all_zero() {
        let catalog = PostureCatalog::standard();
        for (_, value) in catalog.profile(Posture::Supine).iter() {
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn lateral_profiles_mirror_each_other() {
        let catalog = PostureCatalog::standard();
        let left = catalog.profile(Posture::LeftLateral);
        let right = catalog.profile(Posture::RightLateral);
        assert_eq!(left[Channel::HeadLeft], right[Channel::HeadRight]);
        assert_eq!(left[Channel::FootLeft], right[Channel::FootRight]);
        assert_eq!(left[Channel::HeadLeft], 60.0);
        assert_eq!(left[Channel::HeadRight], 10.0);
    }

    #[test]
    fn all_standard_targets_in_range() {
        let catalog = PostureCatalog::standard();
        for posture in Posture::ALL {
            for (_, value) in catalog.profile(posture).iter() {
                assert!((0.0..=100.0).contains(&value));
            }
        }
    }

    #[test]
    fn profile_rejects_out_of_range() {
        let err = TargetProfile::new([0.0, 101.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::ValueOutOfRange {
                channel: Channel::HeadRight,
                value: 101.0
            }
        );
        assert!(TargetProfile::new([f64::NAN, 0.0, 0.0, 0.0]).is_err());
        assert!(TargetProfile::new([-0.5, 0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn catalog_rejects_missing_posture() {
        let mut entries = PostureCatalog::standard().entries;
        entries.retain(|e| e.posture != Posture::RightLateral);
        assert_eq!(
            PostureCatalog::new(entries),
            Err(CatalogError::MissingPosture(Posture::RightLateral))
        );
    }

    #[test]
    fn catalog_rejects_duplicate_and_blank_label() {
        let mut entries = PostureCatalog::standard().entries;
        entries.push(entries[0].clone());
        assert_eq!(
            PostureCatalog::new(entries),
            Err(CatalogError::DuplicatePosture(Posture::Supine))
        );

        let mut entries = PostureCatalog::standard().entries;
        entries[1].label = "  ".to_string();
        assert_eq!(
            PostureCatalog::new(entries),
            Err(CatalogError::EmptyLabel(Posture::LeftLateral))
        );
    }

    #[test]
    fn sequence_is_cyclic_with_period_four() {
        let seq = RotationSequence::standard();
        assert_eq!(seq.len(), 4);

        let mut index = 0;
        for _ in 0..5 {
            index = seq.advance(index);
        }
        assert_eq!(seq.get(index), Posture::LeftLateral);
        assert_eq!(seq.get(4), seq.get(0));
    }

    #[test]
    fn empty_sequence_rejected() {
        assert_eq!(RotationSequence::new(vec![]), Err(CatalogError::EmptySequence));
    }

    #[test]
    fn posture_names_round_trip_through_from_str() {
        for posture in Posture::ALL {
            assert_eq!(posture.as_str().parse::<Posture>().unwrap(), posture);
        }
        assert!(matches!(
            "prone".parse::<Posture>(),
            Err(CatalogError::UnknownPosture(_))
        ));
    }
}
