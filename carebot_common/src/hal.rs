//! Actuator output contract.
//!
//! This module contains the types shared between the actuator driver and
//! the pluggable hardware backends that translate drive commands into
//! pin levels and PWM duty cycles.

pub mod output;
pub mod types;
