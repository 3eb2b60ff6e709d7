//! Gesture flows driven end-to-end through the engine with a recording sink.

use std::time::{Duration, Instant};

use wheel_bridge_daemon::engine::{GestureEngine, GrabOp};
use wheel_bridge_input::mock::RecordingSink;
use wheel_bridge_types::{MiddleButtonMode, Settings, SourceEvent, TouchBounds};

/// Baseline settings for delta-scroll tests: no dead zone, no edge zones,
/// no pointer lock, smart middle button, sensitivity 15.
fn settings() -> Settings {
    Settings {
        dead_zone: 0,
        edge_scroll: false,
        pointer_lock: false,
        ..Settings::default()
    }
}

/// Settings for edge-scroll tests. The huge sensitivity keeps the
/// delta-scroll path silent so every recorded tick comes from edge
/// scrolling.
fn edge_settings() -> Settings {
    Settings {
        dead_zone: 0,
        sensitivity: 10_000,
        edge_scroll: true,
        pointer_lock: false,
        ..Settings::default()
    }
}

/// 0..1000 on both axes with 25% zones: thresholds at 250 / 750.
fn bounds() -> TouchBounds {
    TouchBounds::new(0, 1000, 0, 1000, 0.25)
}

fn engine(settings: Settings) -> GestureEngine {
    GestureEngine::new(settings, None)
}

fn edge_engine(settings: Settings) -> GestureEngine {
    GestureEngine::new(settings, Some(bounds()))
}

/// Feed one coherent hardware report: both axes, then the sync marker.
fn sample(engine: &mut GestureEngine, sink: &mut RecordingSink, now: Instant, x: i32, y: i32) {
    engine.on_touch(SourceEvent::AbsoluteX(x), now, sink);
    engine.on_touch(SourceEvent::AbsoluteY(y), now, sink);
    engine.on_touch(SourceEvent::Report, now, sink);
}

fn touch_down(engine: &mut GestureEngine, sink: &mut RecordingSink, now: Instant) {
    engine.on_touch(SourceEvent::Touch { touching: true }, now, sink);
}

#[test]
fn tap_replays_click_in_smart_mode() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();

    engine.on_button(true, &mut sink);
    engine.on_button(false, &mut sink);

    assert_eq!(sink.clicks, 1);
    assert!(sink.scrolls.is_empty());
}

#[test]
fn tap_is_swallowed_in_block_mode() {
    let mut engine = engine(Settings {
        middle_button: MiddleButtonMode::Block,
        ..settings()
    });
    let mut sink = RecordingSink::new();

    engine.on_button(true, &mut sink);
    engine.on_button(false, &mut sink);

    assert_eq!(sink.clicks, 0);
    assert!(sink.scrolls.is_empty());
}

#[test]
fn native_mode_never_synthesizes_clicks() {
    let mut engine = engine(Settings {
        middle_button: MiddleButtonMode::Native,
        ..settings()
    });
    let mut sink = RecordingSink::new();

    engine.on_button(true, &mut sink);
    engine.on_button(false, &mut sink);

    assert_eq!(sink.clicks, 0);
}

#[test]
fn drag_scrolls_and_suppresses_the_click() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 100, 100);
    sample(&mut engine, &mut sink, t, 100, 115);
    engine.on_button(false, &mut sink);

    assert_eq!(sink.scrolls, vec![(1, 0)]);
    assert_eq!(sink.clicks, 0);
}

#[test]
fn chunked_deltas_emit_exactly_one_tick() {
    // Three deltas of 5 sum to one sensitivity threshold: one tick, same
    // as a single delta of 15.
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 0, 0);
    for y in [5, 10, 15] {
        sample(&mut engine, &mut sink, t, 0, y);
    }

    assert_eq!(sink.scrolls, vec![(1, 0)]);
    assert_eq!(sink.total_vertical(), 1);
}

#[test]
fn subtick_remainder_carries_across_samples() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 0, 0);
    // 10 + 10 + 10 = 30 units of travel at 15 per tick: two ticks, none
    // of the motion truncated away.
    for y in [10, 20, 30] {
        sample(&mut engine, &mut sink, t, 0, y);
    }

    assert_eq!(sink.total_vertical(), 2);
}

#[test]
fn dead_zone_is_per_axis_or_not_combined() {
    let mut engine = engine(Settings {
        dead_zone: 5,
        ..settings()
    });
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 100, 100);

    // Both axes below threshold: discarded, reference position unchanged.
    sample(&mut engine, &mut sink, t, 104, 104);
    assert!(sink.scrolls.is_empty());

    // One axis clears the threshold: registers on the x accumulator even
    // though y moved nothing.
    sample(&mut engine, &mut sink, t, 106, 100);
    sample(&mut engine, &mut sink, t, 121, 100);
    assert_eq!(sink.scrolls, vec![(0, 1)]);
}

#[test]
fn jitter_does_not_creep_but_slow_motion_registers() {
    let mut engine = engine(Settings {
        dead_zone: 5,
        ..settings()
    });
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 100, 100);

    // Oscillation around the rest point stays inside the dead zone
    // forever because discarded samples do not move the reference.
    for _ in 0..20 {
        sample(&mut engine, &mut sink, t, 103, 101);
        sample(&mut engine, &mut sink, t, 98, 99);
    }
    assert!(sink.scrolls.is_empty());

    // Slow one-direction drift accumulates displacement from the same
    // reference until it clears the threshold.
    sample(&mut engine, &mut sink, t, 100, 102);
    sample(&mut engine, &mut sink, t, 100, 104);
    sample(&mut engine, &mut sink, t, 100, 106);
    sample(&mut engine, &mut sink, t, 100, 115);
    assert_eq!(sink.total_vertical(), 1);
}

#[test]
fn motion_without_button_is_ignored() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 0, 0);
    sample(&mut engine, &mut sink, t, 0, 300);

    assert!(sink.scrolls.is_empty());
}

#[test]
fn lifting_the_finger_abandons_accumulated_motion() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 0, 0);
    sample(&mut engine, &mut sink, t, 0, 10);

    engine.on_touch(SourceEvent::Touch { touching: false }, t, &mut sink);
    touch_down(&mut engine, &mut sink, t);

    // New contact elsewhere: no delta against the old position, and the
    // 10 units from before the lift are gone.
    sample(&mut engine, &mut sink, t, 500, 500);
    sample(&mut engine, &mut sink, t, 500, 510);

    assert!(sink.scrolls.is_empty());
}

#[test]
fn horizontal_drag_is_not_a_tap() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();
    let t = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t);
    sample(&mut engine, &mut sink, t, 0, 0);
    sample(&mut engine, &mut sink, t, 15, 0);
    engine.on_button(false, &mut sink);

    assert_eq!(sink.scrolls, vec![(0, 1)]);
    assert_eq!(sink.clicks, 0);
}

#[test]
fn pointer_lock_requests_grab_for_the_hold() {
    let mut engine = engine(Settings {
        pointer_lock: true,
        ..settings()
    });
    let mut sink = RecordingSink::new();

    assert_eq!(engine.on_button(true, &mut sink), Some(GrabOp::Grab));
    engine.set_touch_grabbed(true);
    assert_eq!(engine.on_button(false, &mut sink), Some(GrabOp::Ungrab));
    engine.set_touch_grabbed(false);
}

#[test]
fn refused_grab_degrades_without_an_ungrab() {
    let mut engine = engine(Settings {
        pointer_lock: true,
        ..settings()
    });
    let mut sink = RecordingSink::new();

    assert_eq!(engine.on_button(true, &mut sink), Some(GrabOp::Grab));
    // The loop could not grab: nothing to release later.
    assert_eq!(engine.on_button(false, &mut sink), None);
}

#[test]
fn no_grab_requested_without_pointer_lock() {
    let mut engine = engine(settings());
    let mut sink = RecordingSink::new();

    assert_eq!(engine.on_button(true, &mut sink), None);
    assert_eq!(engine.on_button(false, &mut sink), None);
}

#[test]
fn edge_dwell_activates_after_exactly_the_dwell_duration() {
    let mut engine = edge_engine(edge_settings());
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();
    let dwell = Settings::default().edge_dwell;

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    // Finger lands straight in the bottom zone and holds still.
    sample(&mut engine, &mut sink, t0, 500, 900);
    engine.on_tick(t0, &mut sink);
    assert!(sink.scrolls.is_empty());

    // One tick short of the dwell: still waiting.
    engine.on_tick(t0 + dwell - Duration::from_millis(1), &mut sink);
    assert!(sink.scrolls.is_empty());
    assert!(!engine.is_edge_scrolling());

    // Exactly the dwell duration: continuous scrolling starts.
    engine.on_tick(t0 + dwell, &mut sink);
    assert!(engine.is_edge_scrolling());
    assert_eq!(sink.scrolls.len(), 1);
    let (v, h) = sink.scrolls[0];
    assert!(v > 0, "bottom edge scrolls downward, got {v}");
    assert_eq!(h, 0);
}

#[test]
fn movement_while_waiting_restarts_the_countdown() {
    let mut engine = edge_engine(edge_settings());
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 500, 500);
    // Enter the bottom zone, then slide 60 units while waiting: past the
    // jitter threshold, so the countdown restarts at the new position.
    sample(&mut engine, &mut sink, t0 + ms(10), 500, 900);
    sample(&mut engine, &mut sink, t0 + ms(150), 500, 960);

    // 250 ms after the restart: not yet.
    engine.on_tick(t0 + ms(400), &mut sink);
    assert!(sink.scrolls.is_empty());

    // 320 ms after the restart: active.
    engine.on_tick(t0 + ms(470), &mut sink);
    assert_eq!(sink.scrolls.len(), 1);
}

#[test]
fn leaving_the_zone_cancels_the_dwell() {
    let mut engine = edge_engine(edge_settings());
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 500, 500);
    sample(&mut engine, &mut sink, t0 + ms(10), 500, 900);
    // Back out of the zone before the dwell completes.
    sample(&mut engine, &mut sink, t0 + ms(100), 500, 500);

    engine.on_tick(t0 + ms(600), &mut sink);
    assert!(sink.scrolls.is_empty());
    assert!(!engine.is_edge_scrolling());
}

#[test]
fn active_edge_scroll_owns_the_samples() {
    // Left-edge dwell with vertical finger drift: were delta scrolling
    // still running, the drift would emit vertical ticks. Edge scrolling
    // claims the samples, so only horizontal (left) ticks appear.
    let mut engine = edge_engine(Settings {
        sensitivity: 40,
        ..edge_settings()
    });
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 100, 500);
    engine.on_tick(t0, &mut sink);
    engine.on_tick(t0 + ms(310), &mut sink);
    assert!(engine.is_edge_scrolling());

    sample(&mut engine, &mut sink, t0 + ms(400), 100, 560);
    sample(&mut engine, &mut sink, t0 + ms(470), 100, 620);

    assert!(!sink.scrolls.is_empty());
    for (v, h) in &sink.scrolls {
        assert_eq!(*v, 0, "vertical drift must not leak into delta ticks");
        assert!(*h < 0, "left edge scrolls left, got {h}");
    }
}

#[test]
fn emission_is_rate_limited_while_dwelling() {
    let mut engine = edge_engine(edge_settings());
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 500, 900);
    engine.on_tick(t0, &mut sink);
    engine.on_tick(t0 + ms(310), &mut sink);
    assert_eq!(sink.scrolls.len(), 1);

    // 10 ms later: inside the cadence window, nothing new.
    engine.on_tick(t0 + ms(320), &mut sink);
    assert_eq!(sink.scrolls.len(), 1);

    // Past the cadence: next emission.
    engine.on_tick(t0 + ms(370), &mut sink);
    assert_eq!(sink.scrolls.len(), 2);
}

#[test]
fn releasing_the_button_stops_edge_scrolling() {
    let mut engine = edge_engine(edge_settings());
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();
    let ms = Duration::from_millis;

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 500, 900);
    engine.on_tick(t0, &mut sink);
    engine.on_tick(t0 + ms(310), &mut sink);
    assert!(engine.is_edge_scrolling());

    engine.on_button(false, &mut sink);
    assert!(!engine.is_edge_scrolling());

    let emitted = sink.scrolls.len();
    engine.on_tick(t0 + ms(600), &mut sink);
    assert_eq!(sink.scrolls.len(), emitted);
}

#[test]
fn edge_dwell_counts_as_movement_for_tap_detection() {
    let mut engine = edge_engine(edge_settings());
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 500, 900);
    engine.on_tick(t0, &mut sink);
    engine.on_tick(t0 + Settings::default().edge_dwell, &mut sink);
    assert!(engine.is_edge_scrolling());

    engine.on_button(false, &mut sink);
    assert_eq!(sink.clicks, 0, "an edge-scroll hold is not a tap");
}

#[test]
fn edge_scroll_disabled_without_geometry() {
    // Geometry unresolved (no absolute axes): edge zones never claim
    // samples and plain delta scrolling keeps working.
    let mut engine = GestureEngine::new(
        Settings {
            dead_zone: 0,
            pointer_lock: false,
            edge_scroll: true,
            ..Settings::default()
        },
        None,
    );
    let mut sink = RecordingSink::new();
    let t0 = Instant::now();

    engine.on_button(true, &mut sink);
    touch_down(&mut engine, &mut sink, t0);
    sample(&mut engine, &mut sink, t0, 500, 900);
    engine.on_tick(t0 + Duration::from_millis(600), &mut sink);
    assert!(sink.scrolls.is_empty());

    sample(&mut engine, &mut sink, t0 + Duration::from_millis(700), 500, 915);
    assert_eq!(sink.scrolls, vec![(1, 0)]);
}
