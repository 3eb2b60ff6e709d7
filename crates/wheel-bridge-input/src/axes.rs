//! Absolute-axis geometry of the touch surface.

use evdev::{AbsoluteAxisCode, Device};
use tracing::debug;
use wheel_bridge_types::TouchBounds;

use crate::error::InputError;

/// Read the touch surface's `ABS_X`/`ABS_Y` ranges and derive edge-zone
/// thresholds.
///
/// Returns `Ok(None)` when either axis is absent: edge scrolling is then
/// disabled for the session, never treated as a fatal condition.
pub fn resolve_touch_bounds(
    device: &Device,
    zone_fraction: f64,
) -> Result<Option<TouchBounds>, InputError> {
    let mut x = None;
    let mut y = None;

    let axes = device
        .get_absinfo()
        .map_err(|e| InputError::AxisQuery(e.to_string()))?;
    for (code, info) in axes {
        match code {
            AbsoluteAxisCode::ABS_X => x = Some((info.minimum(), info.maximum())),
            AbsoluteAxisCode::ABS_Y => y = Some((info.minimum(), info.maximum())),
            _ => {}
        }
    }

    match (x, y) {
        (Some((x_min, x_max)), Some((y_min, y_max))) => {
            let bounds = TouchBounds::new(x_min, x_max, y_min, y_max, zone_fraction);
            debug!(
                x_min,
                x_max, y_min, y_max, "resolved touch-surface geometry"
            );
            Ok(Some(bounds))
        }
        _ => {
            debug!("touch surface reports no absolute X/Y ranges");
            Ok(None)
        }
    }
}
