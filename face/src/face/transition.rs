//! Position Transitions and Easing
//!
//! Pure curve math plus the one-at-a-time transition record that moves the
//! look offset. Starting a new transition supersedes the in-flight one;
//! there is no cancel primitive because last-writer-wins is the contract.

use std::time::{Duration, Instant};

/// Default travel time for a look transition
const DEFAULT_DURATION: Duration = Duration::from_secs(1);

/// A 2D look offset in virtual pixels
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Selectable easing curves.
///
/// Each curve is a pure `f: [0,1] -> R` with `f(0) == 0` and `f(1) == 1`
/// exactly. Elastic and bounce overshoot in between; progress is clamped
/// before evaluation, the output is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    /// Smooth acceleration and deceleration; the idle-drift default
    #[default]
    Cubic,
    /// Springy snap that overshoots the target before settling
    Elastic,
    /// Playful piecewise-quadratic bounce
    Bounce,
}

impl Easing {
    /// Evaluate the curve at `t`
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::Cubic => ease_in_out_cubic(t),
            Self::Elastic => ease_out_elastic(t),
            Self::Bounce => ease_out_bounce(t),
        }
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn ease_out_elastic(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let c4 = (2.0 * std::f32::consts::PI) / 8.0;
    2.0_f32.powf(-10.0 * t) * ((t * 5.0 - 0.75) * c4).sin() + 1.0
}

fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;
    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

/// One in-flight interpolation between two look offsets
#[derive(Clone, Debug)]
struct Transition {
    started: Instant,
    from: Point,
    to: Point,
    easing: Easing,
}

/// Owns at most one live [`Transition`] and the easing selection for the
/// next one.
#[derive(Debug)]
pub struct TransitionManager {
    active: Option<Transition>,
    easing: Easing,
    duration: Duration,
}

impl TransitionManager {
    pub fn new() -> Self {
        Self {
            active: None,
            easing: Easing::default(),
            duration: DEFAULT_DURATION,
        }
    }

    /// Select the curve used by subsequent [`start`](Self::start) calls
    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    /// Override the travel time for subsequent transitions
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Begin a transition at `now`, superseding any in-flight one
    pub fn start(&mut self, now: Instant, from: Point, to: Point) {
        self.active = Some(Transition {
            started: now,
            from,
            to,
            easing: self.easing,
        });
    }

    /// Interpolated position at `now`.
    ///
    /// `None` before the first [`start`](Self::start); exactly the target
    /// once the duration has elapsed.
    pub fn current_position(&self, now: Instant) -> Option<Point> {
        let transition = self.active.as_ref()?;

        let elapsed = now.saturating_duration_since(transition.started);
        if elapsed >= self.duration {
            return Some(transition.to);
        }

        let progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
        let eased = transition.easing.apply(progress);

        Some(Point::new(
            transition.from.x + (transition.to.x - transition.from.x) * eased,
            transition.from.y + (transition.to.y - transition.from.y) * eased,
        ))
    }

    /// Target of the in-flight (or last) transition
    pub fn target(&self) -> Option<Point> {
        self.active.as_ref().map(|t| t.to)
    }
}

impl Default for TransitionManager {
    fn default() -> Self {
        Self::new()
    }
}
