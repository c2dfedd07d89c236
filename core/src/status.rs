//! Assistant Status
//!
//! The discrete states the voice loop moves through. The face polls the
//! current status once per frame and maps it onto a color/emotion target;
//! the mapping lives here so the face never needs to know what a status
//! *means*, only what it looks like.

use crate::emotion::{Emotion, Rgb};

/// Baseline idle eye color (deep sky blue)
pub const BASELINE_COLOR: Rgb = Rgb::new(0, 191, 255);

/// Alert eye color while engaged with the user (light green)
pub const ALERT_COLOR: Rgb = Rgb::new(144, 238, 144);

/// States of the voice-assistant loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AssistantStatus {
    /// Nothing happening
    Idle = 0,
    /// Passively listening for the wake word
    ListeningWake = 1,
    /// Wake word just detected
    WakeDetected = 2,
    /// Actively listening for a command
    ListeningCommand = 3,
    /// Command captured, waiting on the chat backend
    ProcessingCommand = 4,
    /// Response spoken to completion
    FinishedResponse = 5,
    /// Something went wrong; shown briefly, then back to idle
    Error = 6,
    /// User said goodbye; loop is winding down
    Goodbye = 7,
    /// Collaborator-reported: teach mode entered (no machinery here)
    LearningMode = 8,
    /// Collaborator-reported: teach mode awaiting input
    LearningInput = 9,
}

impl AssistantStatus {
    /// Decode from the atomic representation used by [`crate::AssistantHandle`].
    ///
    /// Unknown values fall back to `Idle` rather than panicking; the face
    /// must keep drawing no matter what the voice loop reports.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::ListeningWake,
            2 => Self::WakeDetected,
            3 => Self::ListeningCommand,
            4 => Self::ProcessingCommand,
            5 => Self::FinishedResponse,
            6 => Self::Error,
            7 => Self::Goodbye,
            8 => Self::LearningMode,
            9 => Self::LearningInput,
            _ => Self::Idle,
        }
    }

    /// Short human-readable description (status bar / logs)
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ListeningWake => "Listening for wake word",
            Self::WakeDetected => "Wake word detected",
            Self::ListeningCommand => "Listening for command",
            Self::ProcessingCommand => "Processing command",
            Self::FinishedResponse => "Finished saying response",
            Self::Error => "Error occurred",
            Self::Goodbye => "Goodbye",
            Self::LearningMode => "Learning mode",
            Self::LearningInput => "Learning input",
        }
    }

    /// The visual target the face should steer toward for this status.
    pub fn visuals(&self) -> StatusVisuals {
        match self {
            Self::WakeDetected => StatusVisuals {
                color: ALERT_COLOR,
                emotion: Emotion::Happy,
                talking: false,
                idle_drift: false,
                snappy: true,
            },
            Self::ListeningCommand => StatusVisuals {
                color: ALERT_COLOR,
                emotion: Emotion::Curious,
                talking: true,
                idle_drift: false,
                snappy: false,
            },
            Self::ProcessingCommand => StatusVisuals {
                color: ALERT_COLOR,
                emotion: Emotion::Focused,
                talking: false,
                idle_drift: false,
                snappy: false,
            },
            Self::Error => StatusVisuals {
                color: Rgb::new(255, 0, 0),
                emotion: Emotion::Sad,
                talking: false,
                idle_drift: false,
                snappy: false,
            },
            // Everything else is the baseline ambient display
            _ => StatusVisuals {
                color: BASELINE_COLOR,
                emotion: Emotion::Happy,
                talking: false,
                idle_drift: true,
                snappy: false,
            },
        }
    }
}

/// What a status looks like on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusVisuals {
    /// Target eye color
    pub color: Rgb,
    /// Target emotion (drives mouth curve, brow angle, blink cadence)
    pub emotion: Emotion,
    /// Whether the mouth should lip-sync
    pub talking: bool,
    /// Whether idle look-around should run
    pub idle_drift: bool,
    /// Whether the recenter transition should use the elastic snap
    pub snappy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_roundtrip() {
        for status in [
            AssistantStatus::Idle,
            AssistantStatus::ListeningWake,
            AssistantStatus::WakeDetected,
            AssistantStatus::ListeningCommand,
            AssistantStatus::ProcessingCommand,
            AssistantStatus::FinishedResponse,
            AssistantStatus::Error,
            AssistantStatus::Goodbye,
            AssistantStatus::LearningMode,
            AssistantStatus::LearningInput,
        ] {
            assert_eq!(AssistantStatus::from_u8(status as u8), status);
        }
    }

    #[test]
    fn test_unknown_status_falls_back_to_idle() {
        assert_eq!(AssistantStatus::from_u8(200), AssistantStatus::Idle);
    }

    #[test]
    fn test_wake_is_alert_and_snappy() {
        let visuals = AssistantStatus::WakeDetected.visuals();
        assert_eq!(visuals.color, ALERT_COLOR);
        assert!(visuals.snappy);
        assert!(!visuals.idle_drift);
    }

    #[test]
    fn test_idle_is_baseline() {
        let visuals = AssistantStatus::Idle.visuals();
        assert_eq!(visuals.color, BASELINE_COLOR);
        assert!(visuals.idle_drift);
        assert!(!visuals.talking);
    }
}
