//! Events the input layer hands to the gesture engine.

/// A single decoded event from one of the two bridged source devices.
///
/// Absolute-axis samples arrive one axis at a time; the engine buffers them
/// and evaluates motion only on the [`SourceEvent::Report`] marker that
/// closes a hardware report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// Middle-button state change on the pointing-button device.
    Button { pressed: bool },
    /// Finger-contact state change on the touch surface.
    Touch { touching: bool },
    /// Absolute X sample from the touch surface.
    AbsoluteX(i32),
    /// Absolute Y sample from the touch surface.
    AbsoluteY(i32),
    /// Synchronization marker closing one hardware report.
    Report,
}
