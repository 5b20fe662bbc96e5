//! Startup errors.

use carebot_common::config::ConfigError;
use carebot_common::hal::output::OutputError;
use carebot_common::posture::CatalogError;
use thiserror::Error;

/// Anything that prevents the context from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Posture catalog or sequence rejected.
    #[error("Posture catalog invalid: {0}")]
    Catalog(#[from] CatalogError),

    /// Output backend missing or failed to initialise.
    #[error("Actuator outputs unavailable: {0}")]
    Output(#[from] OutputError),
}
