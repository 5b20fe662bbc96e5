//! Safety module root.
//!
//! Pre-movement checks, verdict aggregation, and the hardware emergency
//! stop input.

pub mod checks;
pub mod estop;
pub mod gate;
