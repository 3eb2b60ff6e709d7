//! Core daemon for wheel-bridge.
//!
//! Fuses a pointing-button device and a touch-surface device into one
//! synthetic scroll-and-click stream: configuration loading, the gesture
//! state machine, the multiplexed event loop with signal-driven teardown,
//! and the diagnostics reporter.

pub mod config;
pub mod daemon;
pub mod diagnostics;
pub mod engine;
pub mod error;

pub use daemon::Daemon;
pub use engine::{GestureEngine, GrabOp};
pub use error::DaemonError;
