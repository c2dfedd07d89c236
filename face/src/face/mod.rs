//! The Face - Otto's Animated Eyes
//!
//! Everything that makes the eyes feel alive: the transition/easing
//! engine, the per-behavior animation state, the frame scheduler that
//! arbitrates between them, and the renderer that paints the resolved
//! frame. The face runs its model in a fixed virtual 800x600 pixel space
//! (the renderer scales to whatever terminal it actually has), so every
//! distance and speed below reads in virtual pixels.

mod behaviors;
mod render;
mod scheduler;
mod surface;
mod transition;

use std::time::Instant;

use otto_core::Rgb;

pub use render::Renderer;
pub use scheduler::{DisplayShape, EyeVariant, FrameSnapshot, Scheduler, SchedulerTiming};
pub use surface::PixelSurface;
pub use transition::{Easing, Point, TransitionManager};

/// Virtual canvas width the animation model runs in
pub const VIRTUAL_WIDTH: f32 = 800.0;
/// Virtual canvas height
pub const VIRTUAL_HEIGHT: f32 = 600.0;
/// Eye width in virtual pixels
pub const EYE_WIDTH: f32 = 100.0;
/// Eye height in virtual pixels
pub const EYE_HEIGHT: f32 = 130.0;
/// Gap between the two eye centers
pub const EYE_SPACING: f32 = 140.0;
/// Horizontal screen center
pub const CENTER_X: f32 = VIRTUAL_WIDTH / 2.0;
/// Vertical screen center
pub const CENTER_Y: f32 = VIRTUAL_HEIGHT / 2.0;

/// The face: one scheduler, the host-facing operations, and the caption/
/// talking pass-throughs. Constructed once at startup and owned by the
/// app; no globals anywhere.
pub struct Face {
    scheduler: Scheduler,
    caption: Option<CaptionState>,
    caption_fade_secs: f32,
}

/// Caption text with its arrival time (for fade-out)
#[derive(Clone, Debug)]
pub struct CaptionState {
    pub text: String,
    pub since: Instant,
}

impl Face {
    /// Create a face whose behavior timers are measured from `now`
    pub fn new(now: Instant, caption_fade_secs: f32) -> Self {
        Self::with_timing(now, caption_fade_secs, SchedulerTiming::default())
    }

    /// Create a face with custom behavior timing (tests drive the
    /// blocking behaviors on demand this way)
    pub fn with_timing(now: Instant, caption_fade_secs: f32, timing: SchedulerTiming) -> Self {
        Self {
            scheduler: Scheduler::with_timing(now, timing),
            caption: None,
            caption_fade_secs,
        }
    }

    /// Advance one frame and resolve what to draw
    pub fn tick(&mut self, now: Instant) -> FrameSnapshot {
        // Expire the caption before the renderer sees it
        if let Some(ref caption) = self.caption {
            if now.duration_since(caption.since).as_secs_f32() > self.caption_fade_secs {
                self.caption = None;
            }
        }
        self.scheduler.tick(now)
    }

    /// Steer the eye color toward a new target
    pub fn set_eye_color(&mut self, color: Rgb) {
        self.scheduler.set_eye_color(color);
    }

    /// Set the display emotion; with `smooth` the eyes also glide home
    pub fn set_emotion(&mut self, now: Instant, emotion: otto_core::Emotion, smooth: bool) {
        self.scheduler.set_emotion(now, emotion, smooth);
    }

    /// Glide the look offset to a new position with the given easing
    pub fn slide_to_position(&mut self, now: Instant, x: f32, y: f32, easing: Easing) {
        self.scheduler.slide_to(now, x, y, easing);
    }

    /// External wake reset: clears the sleep squint latch and any running
    /// blocking behavior
    pub fn wake(&mut self, now: Instant) {
        self.scheduler.wake(now);
    }

    /// Enable or disable idle look-around
    pub fn set_idle_drift(&mut self, enabled: bool) {
        self.scheduler.set_idle_drift(enabled);
    }

    /// Toggle mouth lip-sync
    pub fn set_talking(&mut self, talking: bool) {
        self.scheduler.set_talking(talking);
    }

    /// Replace the caption (restarts its fade clock)
    pub fn set_caption(&mut self, now: Instant, text: impl Into<String>) {
        let text = text.into();
        self.caption = if text.is_empty() {
            None
        } else {
            Some(CaptionState { text, since: now })
        };
    }

    /// Current caption with how far through its fade it is, `None` once
    /// expired. Opacity is 1.0 until the final two seconds, then ramps to 0.
    pub fn caption(&self, now: Instant) -> Option<(&str, f32)> {
        let caption = self.caption.as_ref()?;
        let elapsed = now.duration_since(caption.since).as_secs_f32();
        if elapsed > self.caption_fade_secs {
            return None;
        }
        let remaining = self.caption_fade_secs - elapsed;
        let opacity = (remaining / 2.0).clamp(0.0, 1.0);
        Some((caption.text.as_str(), opacity))
    }

    /// Access the scheduler (tests, status bar)
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_caption_fades_then_expires() {
        let start = Instant::now();
        let mut face = Face::new(start, 15.0);
        face.set_caption(start, "hello there");

        let (text, opacity) = face.caption(start + Duration::from_secs(5)).unwrap();
        assert_eq!(text, "hello there");
        assert_eq!(opacity, 1.0);

        // Inside the 2s fade ramp
        let (_, opacity) = face.caption(start + Duration::from_millis(14_500)).unwrap();
        assert!(opacity < 1.0 && opacity > 0.0);

        assert!(face.caption(start + Duration::from_secs(16)).is_none());
    }

    #[test]
    fn test_empty_caption_clears() {
        let start = Instant::now();
        let mut face = Face::new(start, 15.0);
        face.set_caption(start, "something");
        face.set_caption(start, "");
        assert!(face.caption(start).is_none());
    }
}
