//! Status Bridge
//!
//! Translates the voice loop's observable state into face inputs, once
//! per frame. Discrete status changes become color/emotion targets and
//! exactly one recenter transition each; the caption and talking flag are
//! copied through continuously. Unknown or unexpected statuses fall back
//! to the baseline look - the face must keep drawing no matter what the
//! assistant reports.

use std::time::Instant;

use otto_core::{AssistantHandle, AssistantStatus};

use crate::face::{Easing, Face};

/// Frame-by-frame translator from assistant state to face inputs
#[derive(Debug, Default)]
pub struct StatusBridge {
    last_status: Option<AssistantStatus>,
    last_caption_generation: u64,
    /// Talking requested by the current status (on top of the explicit
    /// talking flag the assistant sets while synthesizing)
    status_talking: bool,
}

impl StatusBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the handle and push any changes into the face
    pub fn poll(&mut self, now: Instant, handle: &AssistantHandle, face: &mut Face) {
        let status = handle.status();
        if self.last_status != Some(status) {
            self.apply_status_change(now, status, face);
            self.last_status = Some(status);
        }

        face.set_talking(handle.talking() || self.status_talking);

        let (text, generation) = handle.caption();
        if generation != self.last_caption_generation {
            face.set_caption(now, text);
            self.last_caption_generation = generation;
        }
    }

    /// One status change: one color target, one emotion, one transition
    fn apply_status_change(&mut self, now: Instant, status: AssistantStatus, face: &mut Face) {
        let visuals = status.visuals();
        tracing::debug!(status = status.description(), "status change");

        // A detected wake word is the one external event that clears the
        // post-sheep sleep latch
        if status == AssistantStatus::WakeDetected {
            face.wake(now);
        }

        face.set_eye_color(visuals.color);
        face.set_emotion(now, visuals.emotion, false);
        face.set_idle_drift(visuals.idle_drift);
        self.status_talking = visuals.talking;

        let easing = if visuals.snappy {
            Easing::Elastic
        } else {
            Easing::Cubic
        };
        face.slide_to_position(now, 0.0, 0.0, easing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otto_core::status::{ALERT_COLOR, BASELINE_COLOR};
    use otto_core::Emotion;

    #[test]
    fn test_status_change_starts_exactly_one_transition() {
        let start = Instant::now();
        let handle = AssistantHandle::new();
        let mut face = Face::new(start, 15.0);
        let mut bridge = StatusBridge::new();

        // Idle differs from "no status seen yet", so the first poll counts
        bridge.poll(start, &handle, &mut face);
        let after_first = face.scheduler().transitions_started();

        handle.set_status(AssistantStatus::WakeDetected);
        bridge.poll(start, &handle, &mut face);
        assert_eq!(face.scheduler().transitions_started(), after_first + 1);

        // Same status again: no new transition
        bridge.poll(start, &handle, &mut face);
        bridge.poll(start, &handle, &mut face);
        assert_eq!(face.scheduler().transitions_started(), after_first + 1);
    }

    #[test]
    fn test_wake_sets_alert_color_and_happy() {
        let start = Instant::now();
        let handle = AssistantHandle::new();
        let mut face = Face::new(start, 15.0);
        let mut bridge = StatusBridge::new();

        handle.set_status(AssistantStatus::WakeDetected);
        bridge.poll(start, &handle, &mut face);

        assert_eq!(face.scheduler().target_color(), ALERT_COLOR);
        assert_eq!(face.scheduler().emotion(), Emotion::Happy);
    }

    #[test]
    fn test_return_to_idle_restores_baseline() {
        let start = Instant::now();
        let handle = AssistantHandle::new();
        let mut face = Face::new(start, 15.0);
        let mut bridge = StatusBridge::new();

        handle.set_status(AssistantStatus::ProcessingCommand);
        bridge.poll(start, &handle, &mut face);
        handle.set_status(AssistantStatus::Idle);
        bridge.poll(start, &handle, &mut face);

        assert_eq!(face.scheduler().target_color(), BASELINE_COLOR);
    }

    #[test]
    fn test_caption_flows_through_once_per_generation() {
        let start = Instant::now();
        let handle = AssistantHandle::new();
        let mut face = Face::new(start, 15.0);
        let mut bridge = StatusBridge::new();

        handle.set_caption("the answer is 42");
        bridge.poll(start, &handle, &mut face);
        let (text, _) = face.caption(start).unwrap();
        assert_eq!(text, "the answer is 42");
    }

    #[test]
    fn test_talking_follows_status_and_flag() {
        let start = Instant::now();
        let handle = AssistantHandle::new();
        let mut face = Face::new(start, 15.0);
        let mut bridge = StatusBridge::new();

        // ListeningCommand implies lip-sync even without the flag
        handle.set_status(AssistantStatus::ListeningCommand);
        bridge.poll(start, &handle, &mut face);
        let snapshot = face.tick(start + std::time::Duration::from_millis(16));
        assert!(snapshot.talking);
    }
}
