//! End-to-end properties of the face, driven through the public API the
//! way the app drives it: assistant handle -> bridge -> scheduler tick.

use std::time::{Duration, Instant};

use otto_core::status::{ALERT_COLOR, BASELINE_COLOR};
use otto_core::{AssistantHandle, AssistantStatus, Emotion};
use otto_face::bridge::StatusBridge;
use otto_face::face::{Face, SchedulerTiming};

const FRAME: Duration = Duration::from_millis(16);

/// Timing that keeps every stochastic behavior far in the future
fn quiet_timing() -> SchedulerTiming {
    SchedulerTiming {
        evil_first: Duration::from_secs(10_000),
        evil_interval: Duration::from_secs(10_000),
        sheep_first: Duration::from_secs(10_000),
        sheep_interval: Duration::from_secs(10_000),
        fly_first: Duration::from_secs(10_000),
        fly_interval: Duration::from_secs(10_000),
    }
}

#[test]
fn status_scenario_drives_colors_emotions_and_transitions() {
    let start = Instant::now();
    let handle = AssistantHandle::new();
    let mut face = Face::with_timing(start, 15.0, quiet_timing());
    let mut bridge = StatusBridge::new();

    // The first poll observes Idle and applies the baseline once
    bridge.poll(start, &handle, &mut face);
    assert_eq!(face.scheduler().target_color(), BASELINE_COLOR);
    let base = face.scheduler().transitions_started();

    let sequence = [
        (AssistantStatus::WakeDetected, ALERT_COLOR, Emotion::Happy),
        (
            AssistantStatus::ListeningCommand,
            ALERT_COLOR,
            Emotion::Curious,
        ),
        (
            AssistantStatus::ProcessingCommand,
            ALERT_COLOR,
            Emotion::Focused,
        ),
        (AssistantStatus::Idle, BASELINE_COLOR, Emotion::Happy),
    ];

    let mut now = start;
    for (i, (status, expected_color, expected_emotion)) in sequence.iter().enumerate() {
        handle.set_status(*status);
        now += FRAME;
        bridge.poll(now, &handle, &mut face);
        face.tick(now);

        assert_eq!(face.scheduler().target_color(), *expected_color);
        assert_eq!(face.scheduler().emotion(), *expected_emotion);
        // Exactly one transition per distinct status change
        assert_eq!(face.scheduler().transitions_started(), base + i as u64 + 1);

        // Re-polling the same status creates nothing new
        bridge.poll(now, &handle, &mut face);
        assert_eq!(face.scheduler().transitions_started(), base + i as u64 + 1);
    }
}

#[test]
fn sheep_latch_cleared_by_wake_status() {
    let start = Instant::now();
    let mut timing = quiet_timing();
    timing.sheep_first = Duration::from_millis(50);
    let handle = AssistantHandle::new();
    let mut face = Face::with_timing(start, 15.0, timing);
    let mut bridge = StatusBridge::new();

    bridge.poll(start, &handle, &mut face);

    // Run through the whole 15s sheep episode plus slack
    let mut now = start;
    for _ in 0..1100 {
        now += FRAME;
        bridge.poll(now, &handle, &mut face);
        face.tick(now);
    }
    assert!(face.scheduler().eyes_squinted(), "asleep after counting");

    // Squint holds frame after frame until the wake word arrives
    for _ in 0..20 {
        now += FRAME;
        let snapshot = face.tick(now);
        assert_eq!(snapshot.eye_height_scale, 0.2);
    }

    handle.set_status(AssistantStatus::WakeDetected);
    now += FRAME;
    bridge.poll(now, &handle, &mut face);
    assert!(!face.scheduler().eyes_squinted(), "wake clears the latch");
    let snapshot = face.tick(now);
    assert!(snapshot.eye_height_scale > 0.2);
}

#[test]
fn blocking_behaviors_suppress_secondary_tier_end_to_end() {
    let start = Instant::now();
    let mut timing = quiet_timing();
    timing.evil_first = Duration::from_millis(50);
    timing.evil_interval = Duration::from_secs(10_000);
    let handle = AssistantHandle::new();
    let mut face = Face::with_timing(start, 15.0, timing);
    let mut bridge = StatusBridge::new();

    bridge.poll(start, &handle, &mut face);

    let mut saw_evil = false;
    let mut now = start;
    for _ in 0..400 {
        now += FRAME;
        bridge.poll(now, &handle, &mut face);
        face.tick(now);
        if face.scheduler().evil_active() {
            saw_evil = true;
            assert!(!face.scheduler().laugh_active());
            assert!(!face.scheduler().think_active());
            assert!(!face.scheduler().fly_active());
            assert!(!face.scheduler().sheep_active());
        }
    }
    assert!(saw_evil, "evil mode must have run");
}

#[test]
fn alert_status_suppresses_blocking_triggers() {
    let start = Instant::now();
    let mut timing = quiet_timing();
    timing.evil_first = Duration::from_millis(50);
    let handle = AssistantHandle::new();
    let mut face = Face::with_timing(start, 15.0, timing);
    let mut bridge = StatusBridge::new();

    // Go alert before the evil trigger time arrives
    handle.set_status(AssistantStatus::ProcessingCommand);
    bridge.poll(start, &handle, &mut face);

    let mut now = start;
    for _ in 0..400 {
        now += FRAME;
        bridge.poll(now, &handle, &mut face);
        face.tick(now);
        assert!(!face.scheduler().evil_active());
        assert!(!face.scheduler().sheep_active());
    }
}

#[test]
fn caption_pushed_by_assistant_fades_out() {
    let start = Instant::now();
    let handle = AssistantHandle::new();
    let mut face = Face::with_timing(start, 15.0, quiet_timing());
    let mut bridge = StatusBridge::new();

    handle.set_caption("it is four o'clock");
    bridge.poll(start, &handle, &mut face);

    assert!(face.caption(start + Duration::from_secs(5)).is_some());
    assert!(face.caption(start + Duration::from_secs(20)).is_none());
}
