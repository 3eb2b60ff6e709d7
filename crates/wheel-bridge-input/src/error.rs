//! Input subsystem errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::locate::DeviceRole;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to open device {path}: {source}")]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no {role} device matched ({scanned} devices scanned, {denied} unreadable)")]
    DeviceNotFound {
        role: DeviceRole,
        /// Names of every device that could be opened during enumeration.
        names: Vec<String>,
        scanned: usize,
        /// Devices skipped because opening them was denied.
        denied: usize,
    },

    #[error("failed to grab {name}: {source}")]
    DeviceGrab {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to query absolute axes: {0}")]
    AxisQuery(String),

    #[error("failed to create virtual device: {0}")]
    VirtualDeviceCreate(String),

    #[error("failed to emit through virtual device: {0}")]
    Emit(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
