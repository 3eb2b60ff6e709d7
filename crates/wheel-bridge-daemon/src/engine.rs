//! The gesture state machine.
//!
//! Consumes decoded events from both source devices and drives the scroll
//! sink. Holding the middle button turns touch-surface motion into wheel
//! ticks; a hold with no qualifying motion is replayed as a click in smart
//! mode; dwelling in an edge zone switches to continuous scrolling.
//!
//! The engine owns all mutable session state and performs no I/O beyond
//! the sink it is handed, so tests construct it directly and feed it
//! synthetic event sequences.

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wheel_bridge_input::ScrollSink;
use wheel_bridge_types::{Edge, EdgeSet, MiddleButtonMode, Settings, SourceEvent, TouchBounds};

/// Movement beyond this many device units while waiting in an edge zone
/// restarts the dwell countdown.
const EDGE_JITTER: i32 = 50;

/// Minimum interval between continuous edge-scroll emissions. Doubles as
/// the event loop's bounded wait so dwell expiry is observed on time.
pub const EDGE_CADENCE: Duration = Duration::from_millis(50);

/// Sensitivity value that maps to a 1x edge-scroll speed factor.
const EDGE_REFERENCE_SENSITIVITY: f64 = 15.0;

/// Grab-state change the event loop should apply to the touch device.
///
/// The engine never talks to the kernel itself; the loop applies the
/// operation and reports the outcome back via
/// [`GestureEngine::set_touch_grabbed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabOp {
    Grab,
    Ungrab,
}

/// Edge-dwell sub-state, reset whenever the gesture or the zone changes.
#[derive(Debug, Default)]
struct EdgeDwell {
    current: EdgeSet,
    entered_at: Option<Instant>,
    entry_pos: (i32, i32),
    active: bool,
    last_emit: Option<Instant>,
}

impl EdgeDwell {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Session state for the button-hold scroll gesture.
pub struct GestureEngine {
    settings: Settings,
    bounds: Option<TouchBounds>,
    middle_held: bool,
    finger_down: bool,
    touch_grabbed: bool,
    moved_since_press: bool,
    last_pos: Option<(i32, i32)>,
    pending_x: Option<i32>,
    pending_y: Option<i32>,
    accum_x: f64,
    accum_y: f64,
    edge: EdgeDwell,
}

impl GestureEngine {
    #[must_use]
    pub fn new(settings: Settings, bounds: Option<TouchBounds>) -> Self {
        Self {
            settings,
            bounds,
            middle_held: false,
            finger_down: false,
            touch_grabbed: false,
            moved_since_press: false,
            last_pos: None,
            pending_x: None,
            pending_y: None,
            accum_x: 0.0,
            accum_y: 0.0,
            edge: EdgeDwell::default(),
        }
    }

    /// Handle a middle-button edge from the pointing-button device.
    ///
    /// Returns the grab-state change the loop should apply, if any.
    pub fn on_button(&mut self, pressed: bool, sink: &mut dyn ScrollSink) -> Option<GrabOp> {
        if pressed {
            self.middle_held = true;
            self.moved_since_press = false;
            if self.settings.pointer_lock && !self.touch_grabbed {
                return Some(GrabOp::Grab);
            }
            return None;
        }

        let was_held = self.middle_held;
        self.middle_held = false;
        if was_held
            && self.settings.middle_button == MiddleButtonMode::Smart
            && !self.moved_since_press
        {
            // The real click was suppressed by the startup grab; a hold
            // with no scroll was a click all along.
            debug!("hold produced no scroll, replaying as click");
            if let Err(e) = sink.emit_click() {
                warn!(error = %e, "failed to emit click");
            }
        }
        self.accum_x = 0.0;
        self.accum_y = 0.0;
        self.edge.reset();
        if self.touch_grabbed {
            Some(GrabOp::Ungrab)
        } else {
            None
        }
    }

    /// Record the grab outcome the loop obtained from the kernel.
    pub fn set_touch_grabbed(&mut self, grabbed: bool) {
        self.touch_grabbed = grabbed;
    }

    /// Handle a decoded event from the touch surface.
    pub fn on_touch(&mut self, ev: SourceEvent, now: Instant, sink: &mut dyn ScrollSink) {
        match ev {
            SourceEvent::Touch { touching } => {
                self.finger_down = touching;
                if !touching {
                    // A lifted finger cannot carry an ongoing gesture.
                    self.last_pos = None;
                    self.pending_x = None;
                    self.pending_y = None;
                    self.accum_x = 0.0;
                    self.accum_y = 0.0;
                    self.edge.reset();
                }
            }
            SourceEvent::AbsoluteX(x) => self.pending_x = Some(x),
            SourceEvent::AbsoluteY(y) => self.pending_y = Some(y),
            SourceEvent::Report => self.on_report(now, sink),
            SourceEvent::Button { .. } => {}
        }
    }

    /// Advance time-based edge-dwell state with no new input.
    ///
    /// Touch surfaces stop reporting while the finger holds still, so
    /// dwell expiry and continuous emission are driven from the event
    /// loop's bounded wait.
    pub fn on_tick(&mut self, now: Instant, sink: &mut dyn ScrollSink) {
        if !self.middle_held || !self.finger_down {
            return;
        }
        if let Some((x, y)) = self.last_pos {
            self.evaluate_edges(x, y, now, sink);
        }
    }

    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.middle_held
    }

    #[must_use]
    pub fn is_edge_scrolling(&self) -> bool {
        self.edge.active
    }

    /// Evaluate one coherent (x, y) sample closed by a sync marker.
    fn on_report(&mut self, now: Instant, sink: &mut dyn ScrollSink) {
        let (px, py) = (self.pending_x.take(), self.pending_y.take());
        if px.is_none() && py.is_none() {
            return;
        }
        let Some((lx, ly)) = self.last_pos else {
            // No history to diff against; record a coherent sample if the
            // report carried both axes.
            if let (Some(x), Some(y)) = (px, py) {
                self.last_pos = Some((x, y));
            }
            return;
        };
        let (nx, ny) = (px.unwrap_or(lx), py.unwrap_or(ly));

        if !self.middle_held {
            self.last_pos = Some((nx, ny));
            return;
        }

        if self.evaluate_edges(nx, ny, now, sink) {
            // Continuous edge scrolling claimed this sample.
            self.last_pos = Some((nx, ny));
            return;
        }

        let dx = f64::from(nx - lx);
        let dy = f64::from(ny - ly);
        let dead = f64::from(self.settings.dead_zone);
        if dead > 0.0 && dx.abs() < dead && dy.abs() < dead {
            // Jitter: discard without advancing the reference position, so
            // slow real motion still accumulates displacement across
            // samples while oscillation never does.
            return;
        }

        self.accum_x += dx;
        self.accum_y += dy;
        let sensitivity = f64::from(self.settings.sensitivity);
        let vertical = drain_ticks(&mut self.accum_y, sensitivity);
        let horizontal = drain_ticks(&mut self.accum_x, sensitivity);
        if vertical != 0 || horizontal != 0 {
            self.moved_since_press = true;
            if let Err(e) = sink.emit_scroll(vertical, horizontal) {
                warn!(error = %e, "failed to emit scroll ticks");
            }
        }
        self.last_pos = Some((nx, ny));
    }

    /// Edge-dwell tracking. Returns true when edge scrolling owns the
    /// sample and delta-based scrolling must not run.
    fn evaluate_edges(
        &mut self,
        x: i32,
        y: i32,
        now: Instant,
        sink: &mut dyn ScrollSink,
    ) -> bool {
        if !self.settings.edge_scroll {
            return false;
        }
        let Some(bounds) = self.bounds else {
            return false;
        };

        let edges = bounds.edges_at(x, y);
        if edges.is_empty() {
            // Leaving the zone cancels any pending or active dwell.
            self.edge.reset();
            return false;
        }

        match self.edge.entered_at {
            Some(entered_at) if edges == self.edge.current => {
                if !self.edge.active {
                    let (ex, ey) = self.edge.entry_pos;
                    if (x - ex).abs() > EDGE_JITTER || (y - ey).abs() > EDGE_JITTER {
                        // Still positioning: restart the countdown here.
                        self.edge.entered_at = Some(now);
                        self.edge.entry_pos = (x, y);
                        return false;
                    }
                    if now.duration_since(entered_at) < self.settings.edge_dwell {
                        return false;
                    }
                    // Dwell complete. The delta accumulators start clean so
                    // a later resumption does not inherit edge displacement.
                    self.edge.active = true;
                    self.moved_since_press = true;
                    self.accum_x = 0.0;
                    self.accum_y = 0.0;
                    debug!(?edges, "edge scrolling activated");
                }
                if let Some(last) = self.edge.last_emit {
                    if now.duration_since(last) < EDGE_CADENCE {
                        return true;
                    }
                }
                let (v, h) = self.edge_tick_pair(bounds, x, y);
                if let Err(e) = sink.emit_scroll(v, h) {
                    warn!(error = %e, "failed to emit edge scroll");
                }
                self.edge.last_emit = Some(now);
                true
            }
            _ => {
                // First entry, or the edge set changed (e.g. bottom edge
                // into a corner): restart the countdown from here.
                self.edge.current = edges;
                self.edge.entered_at = Some(now);
                self.edge.entry_pos = (x, y);
                self.edge.active = false;
                self.edge.last_emit = None;
                false
            }
        }
    }

    /// Per-axis tick counts for the current edge set at this position.
    fn edge_tick_pair(&self, bounds: TouchBounds, x: i32, y: i32) -> (i32, i32) {
        let sensitivity = f64::from(self.settings.sensitivity);
        let edges = self.edge.current;
        let mut vertical = 0;
        let mut horizontal = 0;
        if edges.top {
            vertical = -edge_ticks(bounds.depth_fraction(Edge::Top, x, y), sensitivity);
        }
        if edges.bottom {
            vertical = edge_ticks(bounds.depth_fraction(Edge::Bottom, x, y), sensitivity);
        }
        if edges.left {
            horizontal = -edge_ticks(bounds.depth_fraction(Edge::Left, x, y), sensitivity);
        }
        if edges.right {
            horizontal = edge_ticks(bounds.depth_fraction(Edge::Right, x, y), sensitivity);
        }
        (vertical, horizontal)
    }
}

/// Drain whole ticks from a fractional accumulator, leaving the remainder
/// for future samples. Truncates toward zero so both scroll directions
/// behave symmetrically.
fn drain_ticks(accum: &mut f64, sensitivity: f64) -> i32 {
    if sensitivity <= 0.0 || accum.abs() < sensitivity {
        return 0;
    }
    let ticks = (*accum / sensitivity).trunc();
    *accum -= ticks * sensitivity;
    #[allow(clippy::cast_possible_truncation)]
    {
        ticks as i32
    }
}

/// Map dwell depth past an edge threshold to a per-emission tick count:
/// linear in depth, clamped to 1..=3, scaled inversely by sensitivity,
/// and up to double rate at full depth.
fn edge_ticks(depth_fraction: f64, sensitivity: f64) -> i32 {
    let base = (1.0 + 2.0 * depth_fraction) * (EDGE_REFERENCE_SENSITIVITY / sensitivity);
    let scaled = base.clamp(1.0, 3.0) * (1.0 + depth_fraction);
    #[allow(clippy::cast_possible_truncation)]
    {
        scaled.round().max(1.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_exact_threshold_leaves_zero() {
        let mut accum = 15.0;
        assert_eq!(drain_ticks(&mut accum, 15.0), 1);
        assert!(accum.abs() < f64::EPSILON);
    }

    #[test]
    fn drain_is_chunking_independent() {
        let mut whole = 15.0;
        let one_shot = drain_ticks(&mut whole, 15.0);

        let mut chunked = 0.0;
        let mut total = 0;
        for _ in 0..3 {
            chunked += 5.0;
            total += drain_ticks(&mut chunked, 15.0);
        }
        assert_eq!(one_shot, total);
        assert!(chunked.abs() < f64::EPSILON);
    }

    #[test]
    fn drain_keeps_subtick_remainder() {
        let mut accum = 20.0;
        assert_eq!(drain_ticks(&mut accum, 15.0), 1);
        assert!((accum - 5.0).abs() < 1e-9);
    }

    #[test]
    fn drain_truncates_toward_zero_for_negatives() {
        let mut accum = -25.0;
        assert_eq!(drain_ticks(&mut accum, 15.0), -1);
        assert!((accum + 10.0).abs() < 1e-9);
    }

    #[test]
    fn drain_below_threshold_is_untouched() {
        let mut accum = 14.9;
        assert_eq!(drain_ticks(&mut accum, 15.0), 0);
        assert!((accum - 14.9).abs() < f64::EPSILON);
    }

    #[test]
    fn edge_ticks_monotonic_in_depth() {
        for sensitivity in [8.0, 15.0, 30.0] {
            let mut prev = 0;
            for step in 0..=10 {
                let ticks = edge_ticks(f64::from(step) / 10.0, sensitivity);
                assert!(
                    ticks >= prev,
                    "ticks dropped from {prev} to {ticks} at depth {step}/10, sensitivity {sensitivity}"
                );
                prev = ticks;
            }
        }
    }

    #[test]
    fn edge_ticks_at_least_one() {
        assert!(edge_ticks(0.0, 30.0) >= 1);
        assert!(edge_ticks(0.0, 8.0) >= 1);
    }

    #[test]
    fn edge_ticks_scale_inversely_with_sensitivity() {
        // A larger sensitivity value (more travel per tick) never scrolls
        // faster than a smaller one at the same depth.
        for step in 0..=10 {
            let depth = f64::from(step) / 10.0;
            assert!(edge_ticks(depth, 30.0) <= edge_ticks(depth, 8.0));
        }
    }
}
