//! The uinput-backed virtual wheel.

use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, EventType, KeyCode, RelativeAxisCode};
use tracing::info;
use wheel_bridge_types::ScrollDirection;

use crate::error::InputError;
use crate::ScrollSink;

/// High-resolution wheel units per logical tick, matching conventional
/// wheel-event granularity.
pub const HI_RES_PER_TICK: i32 = 120;

pub const VIRTUAL_DEVICE_NAME: &str = "wheel-bridge virtual wheel";

/// Apply the direction and horizontal-enable policy to a raw tick pair.
///
/// Traditional mode is a pure negation of both axes relative to natural
/// mode; disabling horizontal scrolling suppresses that axis entirely.
#[must_use]
pub fn orient_ticks(
    direction: ScrollDirection,
    horizontal_scroll: bool,
    vertical: i32,
    horizontal: i32,
) -> (i32, i32) {
    let horizontal = if horizontal_scroll { horizontal } else { 0 };
    match direction {
        ScrollDirection::Natural => (vertical, horizontal),
        ScrollDirection::Traditional => (-vertical, -horizontal),
    }
}

/// Synthetic input device exposing exactly the wheel axes and a middle
/// button, nothing else, so desktop environments treat it as a plain
/// scroll device rather than a second pointer.
pub struct WheelSink {
    device: VirtualDevice,
    direction: ScrollDirection,
    horizontal_scroll: bool,
}

impl WheelSink {
    /// Build the virtual device. Failure here means the uinput facility is
    /// unavailable and is fatal at startup.
    pub fn create(direction: ScrollDirection, horizontal_scroll: bool) -> Result<Self, InputError> {
        let mut keys = AttributeSet::<KeyCode>::new();
        keys.insert(KeyCode::BTN_MIDDLE);

        let mut axes = AttributeSet::<RelativeAxisCode>::new();
        axes.insert(RelativeAxisCode::REL_WHEEL);
        axes.insert(RelativeAxisCode::REL_HWHEEL);
        axes.insert(RelativeAxisCode::REL_WHEEL_HI_RES);
        axes.insert(RelativeAxisCode::REL_HWHEEL_HI_RES);

        let device = VirtualDevice::builder()
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .name(VIRTUAL_DEVICE_NAME)
            .with_keys(&keys)
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .with_relative_axes(&axes)
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?
            .build()
            .map_err(|e| InputError::VirtualDeviceCreate(e.to_string()))?;

        info!(name = VIRTUAL_DEVICE_NAME, "created virtual wheel device");
        Ok(Self {
            device,
            direction,
            horizontal_scroll,
        })
    }
}

impl ScrollSink for WheelSink {
    fn emit_scroll(&mut self, vertical: i32, horizontal: i32) -> Result<(), InputError> {
        let (v, h) = orient_ticks(self.direction, self.horizontal_scroll, vertical, horizontal);

        let mut events = Vec::with_capacity(4);
        if v != 0 {
            events.push(evdev::InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_WHEEL.0,
                v,
            ));
            events.push(evdev::InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_WHEEL_HI_RES.0,
                v * HI_RES_PER_TICK,
            ));
        }
        if h != 0 {
            events.push(evdev::InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_HWHEEL.0,
                h,
            ));
            events.push(evdev::InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_HWHEEL_HI_RES.0,
                h * HI_RES_PER_TICK,
            ));
        }

        // Nothing moved: no report, no synchronization marker.
        if events.is_empty() {
            return Ok(());
        }
        self.device
            .emit(&events)
            .map_err(|e| InputError::Emit(e.to_string()))
    }

    fn emit_click(&mut self) -> Result<(), InputError> {
        // Press and release are separate reports; emit() appends the
        // synchronization marker after each.
        self.device
            .emit(&[evdev::InputEvent::new(
                EventType::KEY.0,
                KeyCode::BTN_MIDDLE.0,
                1,
            )])
            .map_err(|e| InputError::Emit(e.to_string()))?;
        self.device
            .emit(&[evdev::InputEvent::new(
                EventType::KEY.0,
                KeyCode::BTN_MIDDLE.0,
                0,
            )])
            .map_err(|e| InputError::Emit(e.to_string()))
    }
}
