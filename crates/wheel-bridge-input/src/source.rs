//! Owned handles on the two real source devices.

use std::path::{Path, PathBuf};

use evdev::EventStream;
use tracing::{info, warn};
use wheel_bridge_types::SourceEvent;

use crate::error::InputError;
use crate::locate::{DeviceRole, LocatedDevice};
use crate::translate;

/// One opened source device wrapped in its async event stream, with the
/// kernel grab state tracked alongside.
///
/// The grab is an exclusivity lock distinct from handle ownership; it is
/// always released before the handle itself is closed.
pub struct SourceDevice {
    role: DeviceRole,
    name: String,
    path: PathBuf,
    stream: EventStream,
    grabbed: bool,
}

impl SourceDevice {
    pub fn open(role: DeviceRole, located: LocatedDevice) -> Result<Self, InputError> {
        let LocatedDevice { path, name, device } = located;
        let stream = device
            .into_event_stream()
            .map_err(|e| InputError::DeviceOpen {
                path: path.clone(),
                source: e,
            })?;
        Ok(Self {
            role,
            name,
            path,
            stream,
            grabbed: false,
        })
    }

    /// Wait for the next decoded event. Raw events irrelevant to the
    /// gesture engine resolve to `None`.
    pub async fn next(&mut self) -> std::io::Result<Option<SourceEvent>> {
        let raw = self.stream.next_event().await?;
        Ok(match self.role {
            DeviceRole::Mouse => translate::from_button_device(&raw),
            DeviceRole::Touch => translate::from_touch_device(&raw),
        })
    }

    /// Request kernel exclusivity on this device.
    ///
    /// The kernel refuses when another process already holds the grab; the
    /// caller decides whether that degrades a feature or not.
    pub fn grab(&mut self) -> Result<(), InputError> {
        if self.grabbed {
            return Ok(());
        }
        self.stream
            .device_mut()
            .grab()
            .map_err(|e| InputError::DeviceGrab {
                name: self.name.clone(),
                source: e,
            })?;
        self.grabbed = true;
        info!(device = %self.name, "grabbed device");
        Ok(())
    }

    /// Release kernel exclusivity. Best-effort: failure is logged, never
    /// escalated.
    pub fn ungrab(&mut self) {
        if !self.grabbed {
            return;
        }
        if let Err(e) = self.stream.device_mut().ungrab() {
            warn!(device = %self.name, error = %e, "failed to release device grab");
        } else {
            info!(device = %self.name, "released device grab");
        }
        self.grabbed = false;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }
}
