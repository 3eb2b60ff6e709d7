//! evdev/uinput boundary for wheel-bridge.
//!
//! This crate owns everything that touches the kernel input layer: locating
//! the two halves of the bridged device pair, reading and grabbing them,
//! querying the touch surface's absolute axes, and emitting synthetic wheel
//! events through a uinput virtual device. The gesture engine upstream only
//! ever sees [`SourceEvent`](wheel_bridge_types::SourceEvent)s and the
//! [`ScrollSink`] trait.

pub mod axes;
pub mod error;
pub mod locate;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod sink;
pub mod source;
pub mod translate;

pub use error::InputError;
pub use locate::{DeviceRole, MatchRules};
pub use sink::WheelSink;
pub use source::SourceDevice;

/// Emits synthetic scroll and click output.
///
/// The uinput-backed implementation is [`WheelSink`]; tests drive the
/// gesture engine against a recording implementation instead.
pub trait ScrollSink {
    /// Emit whole scroll ticks on the vertical and horizontal axes.
    ///
    /// A call where both axes resolve to zero produces no output at all,
    /// not even a synchronization marker.
    fn emit_scroll(&mut self, vertical: i32, horizontal: i32) -> Result<(), InputError>;

    /// Emit a middle-button press immediately followed by a release.
    fn emit_click(&mut self) -> Result<(), InputError>;
}
