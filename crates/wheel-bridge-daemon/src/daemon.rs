//! Daemon orchestration: bootstrap, the multiplexed event loop, teardown.

use std::time::Instant;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use wheel_bridge_input::{axes, locate, DeviceRole, SourceDevice, WheelSink};
use wheel_bridge_types::{MiddleButtonMode, Settings, SourceEvent};

use crate::engine::{GestureEngine, GrabOp, EDGE_CADENCE};
use crate::error::DaemonError;

/// The running daemon: both source devices, the virtual wheel, and the
/// gesture engine driving it.
///
/// Single-threaded: every piece of mutable state is owned here and touched
/// only from the event loop.
pub struct Daemon {
    mouse: SourceDevice,
    touch: SourceDevice,
    sink: WheelSink,
    engine: GestureEngine,
    torn_down: bool,
}

impl Daemon {
    /// Locate the device pair, resolve touch geometry, create the virtual
    /// wheel, and apply the startup grab policy.
    ///
    /// Failure here is fatal; degraded conditions (missing axes, refused
    /// grab) are logged and the matching feature is disabled instead.
    pub fn bootstrap(settings: Settings) -> Result<Self, DaemonError> {
        let pair = locate::locate(&locate::DEFAULT_RULES)?;
        info!(
            device = %pair.mouse.name,
            path = %pair.mouse.path.display(),
            "using pointing-button device"
        );
        info!(
            device = %pair.touch.name,
            path = %pair.touch.path.display(),
            "using touch-surface device"
        );

        let bounds = if settings.edge_scroll {
            let bounds = axes::resolve_touch_bounds(&pair.touch.device, settings.edge_zone)?;
            if bounds.is_none() {
                warn!("touch surface reports no absolute axes, edge scrolling disabled");
            }
            bounds
        } else {
            None
        };

        let sink = WheelSink::create(settings.direction, settings.horizontal_scroll)?;

        let mut mouse = SourceDevice::open(DeviceRole::Mouse, pair.mouse)?;
        let touch = SourceDevice::open(DeviceRole::Touch, pair.touch)?;

        // Smart and block modes intercept the physical middle button;
        // native mode leaves the real clicks alone.
        if settings.middle_button != MiddleButtonMode::Native {
            if let Err(e) = mouse.grab() {
                warn!(error = %e, "could not grab pointing-button device, clicks will pass through");
            }
        }

        let engine = GestureEngine::new(settings, bounds);
        Ok(Self {
            mouse,
            touch,
            sink,
            engine,
            torn_down: false,
        })
    }

    /// Run the event loop until a termination signal arrives or an
    /// unrecoverable error occurs. Every exit path funnels through the
    /// same teardown.
    pub async fn run(&mut self) -> Result<(), DaemonError> {
        let result = self.event_loop().await;
        self.teardown();
        result
    }

    async fn event_loop(&mut self) -> Result<(), DaemonError> {
        let mut sigterm = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(DaemonError::Signal)?;
        let mut cadence = tokio::time::interval(EDGE_CADENCE);
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("bridging events");
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                    return Ok(());
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                    return Ok(());
                }
                event = self.mouse.next() => match event {
                    Ok(Some(SourceEvent::Button { pressed })) => self.handle_button(pressed),
                    Ok(_) => {}
                    Err(e) => read_error("pointing-button", e)?,
                },
                event = self.touch.next() => match event {
                    Ok(Some(ev)) => self.engine.on_touch(ev, Instant::now(), &mut self.sink),
                    Ok(None) => {}
                    Err(e) => read_error("touch-surface", e)?,
                },
                _ = cadence.tick() => {
                    self.engine.on_tick(Instant::now(), &mut self.sink);
                }
            }
        }
    }

    fn handle_button(&mut self, pressed: bool) {
        let Some(op) = self.engine.on_button(pressed, &mut self.sink) else {
            return;
        };
        match op {
            GrabOp::Grab => match self.touch.grab() {
                Ok(()) => self.engine.set_touch_grabbed(true),
                Err(e) => {
                    warn!(error = %e, "could not grab touch surface, cursor will move while scrolling");
                }
            },
            GrabOp::Ungrab => {
                self.touch.ungrab();
                self.engine.set_touch_grabbed(false);
            }
        }
    }

    /// Release every held grab. Grabs must go before the handles close;
    /// the handles and the virtual device close when the daemon drops.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.mouse.ungrab();
        self.touch.ungrab();
        info!("teardown complete");
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        // Normal shutdown and error paths both already ran teardown; this
        // covers the loop being cancelled from outside.
        self.teardown();
    }
}

/// Classify a source-device read failure: interruptions drop the event and
/// the loop continues, anything else tears the daemon down.
fn read_error(device: &str, e: std::io::Error) -> Result<(), DaemonError> {
    if matches!(
        e.kind(),
        std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
    ) {
        warn!(device, error = %e, "transient read error, event dropped");
        return Ok(());
    }
    error!(device, error = %e, "device read failed");
    Err(DaemonError::DeviceRead {
        device: device.to_string(),
        source: e,
    })
}
