//! The validated daemon settings record.

use std::str::FromStr;
use std::time::Duration;

/// Orientation of emitted scroll ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Content follows the finger, touchscreen style.
    Natural,
    /// Wheel style: both axes inverted relative to natural.
    Traditional,
}

impl FromStr for ScrollDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "natural" => Ok(Self::Natural),
            "traditional" => Ok(Self::Traditional),
            _ => Err(()),
        }
    }
}

/// What happens to the physical middle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddleButtonMode {
    /// Button device is grabbed; a hold with no scroll is replayed as a click.
    Smart,
    /// Button device is grabbed; clicks are swallowed entirely.
    Block,
    /// Button device is never grabbed; real clicks pass through untouched.
    Native,
}

impl FromStr for MiddleButtonMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" => Ok(Self::Smart),
            "block" => Ok(Self::Block),
            "native" => Ok(Self::Native),
            _ => Err(()),
        }
    }
}

/// Validated configuration, immutable after load.
///
/// Every field is guaranteed to hold a value from its valid domain: the
/// loader replaces invalid or missing input with the field's default rather
/// than ever leaving a field unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub direction: ScrollDirection,
    pub horizontal_scroll: bool,
    /// Touch-surface travel, in device units, per emitted tick.
    pub sensitivity: i32,
    /// Per-axis jitter rejection threshold in device units.
    pub dead_zone: i32,
    /// Grab the touch surface while the button is held so the cursor stays put.
    pub pointer_lock: bool,
    pub middle_button: MiddleButtonMode,
    pub edge_scroll: bool,
    /// Fraction of each axis range forming an edge zone, 0 < f < 0.5.
    pub edge_zone: f64,
    /// How long a finger must dwell in an edge zone before continuous
    /// scrolling activates. Valid domain 100–1000 ms.
    pub edge_dwell: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            direction: ScrollDirection::Natural,
            horizontal_scroll: true,
            sensitivity: 15,
            dead_zone: 5,
            pointer_lock: true,
            middle_button: MiddleButtonMode::Smart,
            edge_scroll: true,
            edge_zone: 0.25,
            edge_dwell: Duration::from_millis(300),
        }
    }
}
