//! Decoding raw evdev events into source events.

use evdev::{AbsoluteAxisCode, EventSummary, KeyCode, SynchronizationCode};
use wheel_bridge_types::SourceEvent;

/// Decode an event from the pointing-button device.
///
/// Only middle-button edges matter; key autorepeat (value 2) and every
/// other event type are discarded.
#[must_use]
pub fn from_button_device(ev: &evdev::InputEvent) -> Option<SourceEvent> {
    match ev.destructure() {
        EventSummary::Key(_, key, value) if key == KeyCode::BTN_MIDDLE => match value {
            0 => Some(SourceEvent::Button { pressed: false }),
            1 => Some(SourceEvent::Button { pressed: true }),
            _ => None,
        },
        _ => None,
    }
}

/// Decode an event from the touch-surface device.
#[must_use]
pub fn from_touch_device(ev: &evdev::InputEvent) -> Option<SourceEvent> {
    match ev.destructure() {
        EventSummary::Key(_, key, value) if key == KeyCode::BTN_TOUCH => match value {
            0 => Some(SourceEvent::Touch { touching: false }),
            1 => Some(SourceEvent::Touch { touching: true }),
            _ => None,
        },
        EventSummary::AbsoluteAxis(_, axis, value) if axis == AbsoluteAxisCode::ABS_X => {
            Some(SourceEvent::AbsoluteX(value))
        }
        EventSummary::AbsoluteAxis(_, axis, value) if axis == AbsoluteAxisCode::ABS_Y => {
            Some(SourceEvent::AbsoluteY(value))
        }
        EventSummary::Synchronization(_, code, _) if code == SynchronizationCode::SYN_REPORT => {
            Some(SourceEvent::Report)
        }
        _ => None,
    }
}
