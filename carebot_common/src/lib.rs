//! CareBot Common Library
//!
//! This crate provides the shared vocabulary of the CareBot workspace:
//! posture catalog, actuator output contract, alert events, sensor
//! contract and configuration loading.
//!
//! # Module Structure
//!
//! - [`posture`] - Postures, channels, target profiles, rotation sequence
//! - [`hal`] - Output backend trait and drive command types
//! - [`alert`] - Alert events and the `AlertSink` consumer contract
//! - [`sensor`] - Pressure sensor contract consumed by the safety gate
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Reference constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use carebot_common::prelude::*;
//!
//! let catalog = PostureCatalog::standard();
//! let profile = catalog.profile(Posture::LeftLateral);
//! assert_eq!(profile[Channel::HeadLeft], 60.0);
//! ```

pub mod alert;
pub mod config;
pub mod consts;
pub mod hal;
pub mod posture;
pub mod prelude;
pub mod sensor;
