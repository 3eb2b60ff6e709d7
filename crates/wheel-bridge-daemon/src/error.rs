//! Daemon errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("input error: {0}")]
    Input(#[from] wheel_bridge_input::InputError),

    #[error("failed to install signal handler: {0}")]
    Signal(std::io::Error),

    #[error("reading {device} device failed: {source}")]
    DeviceRead {
        device: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
