//! # CareBot
//!
//! Wires the posture catalog, actuator driver, safety gate, emergency stop
//! and rotation scheduler into one explicit context object, [`CareBot`],
//! built once from configuration and shared by `Arc`.
//!
//! # Module Structure
//!
//! - [`context`] - `CareBot` context, command surface and status query
//! - [`alerts`] - Alert sinks: tracing, bounded history, fan-out, channel
//! - [`error`] - Startup errors
//!
//! The HTTP/WebSocket layer and the summarizer sit outside this crate; they
//! only need `CareBot::status()`, `CareBot::recent_alerts()` and the
//! command methods.

#![warn(missing_docs)]

pub mod alerts;
pub mod context;
pub mod error;

pub use crate::alerts::{AlertHistory, ChannelAlertSink, FanOutSink, TracingAlertSink};
pub use crate::context::{CareBot, CareBotStatus};
pub use crate::error::StartupError;
