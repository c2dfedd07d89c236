//! Animation Scheduler
//!
//! The per-frame state machine. Owns a timer for every candidate behavior
//! and runs one evaluation pass per tick in strict priority order:
//!
//! 1. Blocking tier - evil mode and sheep counting. Either one owns the
//!    whole frame, force-clears every lower-tier in-flight flag, and
//!    leaves a cooldown window behind it.
//! 2. Secondary tier - thinking, laughing, fly hunt; fixed precedence,
//!    at most one started per frame.
//! 3. Idle tier - blinking, look-around drift, happy bounce, shape drift,
//!    plus the exponential color/mouth/brow smoothing that runs on every
//!    frame no matter what.
//!
//! The pass ends by resolving a single [`FrameSnapshot`]; the renderer
//! consumes that and never touches a timer.

use std::f32::consts::PI;
use std::time::{Duration, Instant};

use rand::Rng;

use otto_core::status::BASELINE_COLOR;
use otto_core::{Emotion, Rgb};

use super::behaviors::{EvilMode, Flame, Fly, FlyPhase, SheepCounting};
use super::transition::{Easing, Point, TransitionManager};

/// Exponential smoothing factor for eye color, per frame
pub const COLOR_SMOOTHING: f32 = 0.05;
/// A blink from open to open
const BLINK_DURATION: Duration = Duration::from_millis(200);
/// Quiet window after a blocking behavior ends
const BLOCKING_COOLDOWN: Duration = Duration::from_secs(2);
/// Pause at an idle glance before drifting back to center
const IDLE_CENTER_DELAY: Duration = Duration::from_millis(800);
/// Eye height while the sleep latch is set
const SQUINT_HEIGHT_SCALE: f32 = 0.2;
/// Thinking episode length
const THINK_DURATION: Duration = Duration::from_secs(5);
/// Laughing episode length
const LAUGH_DURATION: Duration = Duration::from_secs(2);
/// Question mark bob per frame
const QUESTION_BOUNCE_SPEED: f32 = 0.15;
/// Laugh bounce advance per frame
const LAUGH_BOUNCE_SPEED: f32 = 0.3;
/// Laugh bounce amplitude
const LAUGH_BOUNCE_AMOUNT: f32 = 10.0;
/// Wing flutter advance per frame
const WING_SPEED: f32 = 0.5;

/// Offsets the idle glance picks from
const IDLE_DIRECTIONS: [Point; 4] = [
    Point::new(60.0, 0.0),
    Point::new(-60.0, 0.0),
    Point::new(0.0, 40.0),
    Point::new(0.0, -40.0),
];

/// First-trigger delays and re-trigger intervals for the behaviors whose
/// cadence is fixed rather than drawn from a range. Tests shrink these to
/// drive behaviors on demand.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerTiming {
    pub evil_first: Duration,
    pub evil_interval: Duration,
    pub sheep_first: Duration,
    pub sheep_interval: Duration,
    pub fly_first: Duration,
    pub fly_interval: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            evil_first: Duration::from_secs(20),
            evil_interval: Duration::from_secs(45),
            sheep_first: Duration::from_secs(60),
            sheep_interval: Duration::from_secs(3),
            fly_first: Duration::from_secs(30),
            fly_interval: Duration::from_secs(30),
        }
    }
}

/// Baseline eye silhouette while idle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayShape {
    #[default]
    Neutral,
    Happy,
}

impl DisplayShape {
    /// Resting height multiplier
    pub fn height_scale(self) -> f32 {
        match self {
            Self::Neutral => 1.0,
            Self::Happy => 0.9,
        }
    }

    /// Corner rounding of the eye rectangle in virtual pixels
    pub fn corner_radius(self) -> f32 {
        match self {
            Self::Neutral => 20.0,
            Self::Happy => 30.0,
        }
    }
}

/// Which silhouette owns the eyes this frame. Exactly one variant per
/// frame; the renderer dispatches on this and nothing else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EyeVariant {
    /// Rounded rectangle (shape-flavored), possibly blinking or squinted
    Baseline,
    /// Inverted-V eyes bouncing with laughter
    Laughing { bounce: f32 },
    /// Plus-sign eyes with a bobbing question mark overhead
    Thinking { question_bounce: f32 },
    /// Sharp silhouette, flames below
    Evil { bounce: f32 },
}

/// Fly overlay for the renderer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlyView {
    Buzzing { pos: Point, wing_phase: f32 },
    Zapping { pos: Point },
    Corpse { pos: Point },
}

/// A sheep ready to draw
#[derive(Clone, Copy, Debug)]
pub struct SheepView {
    pub x: f32,
    pub y: f32,
    pub direction: f32,
}

/// Everything the renderer needs for one frame, resolved before any
/// drawing begins
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub variant: EyeVariant,
    pub color: Rgb,
    pub look: Point,
    /// Final eye height multiplier (shape, blink, drowsiness, squint)
    pub eye_height_scale: f32,
    /// Vertical offset applied to both eyes
    pub eye_bounce: f32,
    pub shape: DisplayShape,
    pub brow_angle: f32,
    pub brow_bounce: f32,
    pub mouth_curve: f32,
    pub mouth_open: f32,
    pub talking: bool,
    pub fly: Option<FlyView>,
    pub sheep: Vec<SheepView>,
    pub flames: Vec<Flame>,
}

/// Per-behavior timer block for the fixed-duration secondary behaviors
#[derive(Debug)]
struct TimedBehavior {
    next: Instant,
    active: bool,
    started: Instant,
    bounce: f32,
}

impl TimedBehavior {
    fn new(next: Instant) -> Self {
        Self {
            next,
            active: false,
            started: next,
            bounce: 0.0,
        }
    }

    fn trigger(&mut self, now: Instant) {
        self.active = true;
        self.started = now;
        self.bounce = 0.0;
    }
}

/// The scheduler. One instance, owned by the [`super::Face`], living for
/// the process lifetime. Nothing persists; timers re-randomize at startup.
#[derive(Debug)]
pub struct Scheduler {
    timing: SchedulerTiming,

    // Color and look position
    current_color: [f32; 3],
    target_color: Rgb,
    transitions: TransitionManager,
    look: Point,
    transitions_started: u64,

    // Display emotion and baseline shape
    emotion: Emotion,
    shape: DisplayShape,
    shape_next: Instant,

    // Idle look-around
    idle_enabled: bool,
    idle_next: Instant,
    idle_returning: bool,

    // Blink
    blink_next: Instant,
    blink_started: Option<Instant>,

    // Secondary tier
    laugh: TimedBehavior,
    think: TimedBehavior,
    fly: Fly,
    fly_next: Instant,
    wing_phase: f32,

    // Blocking tier
    evil: Option<EvilMode>,
    evil_next: Instant,
    sheep: Option<SheepCounting>,
    sheep_next: Instant,
    eyes_squinted: bool,
    last_blocking_end: Option<Instant>,

    // Happy bounce
    bounce_next: Instant,
    bounce_amount: f32,
    bounce_target: f32,

    // Mouth and brows
    talking: bool,
    talk_phase: f32,
    mouth_open: f32,
    target_mouth_open: f32,
    mouth_curve: f32,
    brow_angle: f32,
    brow_bounce_phase: f32,
}

impl Scheduler {
    /// Production timing
    pub fn new(now: Instant) -> Self {
        Self::with_timing(now, SchedulerTiming::default())
    }

    /// Custom timing (tests drive behaviors by shrinking the delays)
    pub fn with_timing(now: Instant, timing: SchedulerTiming) -> Self {
        let mut rng = rand::thread_rng();
        let baseline = BASELINE_COLOR;
        Self {
            timing,
            current_color: [
                f32::from(baseline.r),
                f32::from(baseline.g),
                f32::from(baseline.b),
            ],
            target_color: baseline,
            transitions: TransitionManager::new(),
            look: Point::default(),
            transitions_started: 0,
            emotion: Emotion::Happy,
            shape: DisplayShape::Happy,
            shape_next: now + Duration::from_secs_f32(rng.gen_range(4.0..8.0)),
            idle_enabled: true,
            idle_next: now + Duration::from_secs_f32(rng.gen_range(2.0..4.0)),
            idle_returning: false,
            blink_next: now + Duration::from_secs_f32(rng.gen_range(3.0..5.0)),
            blink_started: None,
            laugh: TimedBehavior::new(now + Duration::from_secs_f32(rng.gen_range(5.0..8.0))),
            think: TimedBehavior::new(now + Duration::from_secs_f32(rng.gen_range(3.0..6.0))),
            fly: Fly::new(now),
            fly_next: now + timing.fly_first,
            wing_phase: 0.0,
            evil: None,
            evil_next: now + timing.evil_first,
            sheep: None,
            sheep_next: now + timing.sheep_first,
            eyes_squinted: false,
            last_blocking_end: None,
            bounce_next: now + Duration::from_secs_f32(rng.gen_range(5.0..7.0)),
            bounce_amount: 0.0,
            bounce_target: 0.0,
            talking: false,
            talk_phase: 0.0,
            mouth_open: 0.0,
            target_mouth_open: 0.0,
            mouth_curve: 0.0,
            brow_angle: 0.0,
            brow_bounce_phase: 0.0,
        }
    }

    // ------------------------------------------------------------------
    // Host-facing operations
    // ------------------------------------------------------------------

    /// Steer toward a new eye color. Leaving the baseline cancels every
    /// playful behavior mid-flight; the face goes attentive.
    pub fn set_eye_color(&mut self, color: Rgb) {
        self.target_color = color;
        if color != BASELINE_COLOR {
            self.cancel_lower_tiers();
        }
    }

    /// Change the display emotion; with `smooth`, glide the look offset
    /// home as well
    pub fn set_emotion(&mut self, now: Instant, emotion: Emotion, smooth: bool) {
        self.emotion = emotion;
        if smooth {
            self.slide_to(now, 0.0, 0.0, Easing::Cubic);
        }
    }

    /// Glide the look offset toward `(x, y)`
    pub fn slide_to(&mut self, now: Instant, x: f32, y: f32, easing: Easing) {
        self.transitions.set_easing(easing);
        self.transitions.start(now, self.look, Point::new(x, y));
        self.transitions_started += 1;
    }

    /// Wake reset: clear the sleep latch and any blocking behavior, and
    /// push the next sheep run out by the full first-trigger delay
    pub fn wake(&mut self, now: Instant) {
        self.eyes_squinted = false;
        self.evil = None;
        self.sheep = None;
        self.sheep_next = now + self.timing.sheep_first;
        self.cancel_lower_tiers();
    }

    /// Enable or disable idle look-around
    pub fn set_idle_drift(&mut self, enabled: bool) {
        self.idle_enabled = enabled;
    }

    /// Toggle mouth lip-sync
    pub fn set_talking(&mut self, talking: bool) {
        if talking && !self.talking {
            self.talk_phase = 0.0;
            self.target_mouth_open = rand::thread_rng().gen_range(0.3..1.0) * 25.0;
        }
        self.talking = talking;
    }

    // ------------------------------------------------------------------
    // The per-frame evaluation pass
    // ------------------------------------------------------------------

    /// Run one evaluation pass and resolve the frame
    pub fn tick(&mut self, now: Instant) -> FrameSnapshot {
        // Smoothing runs every frame regardless of behavior
        self.smooth_color();
        if let Some(pos) = self.transitions.current_position(now) {
            self.look = pos;
        }

        let is_baseline = self.is_baseline();

        // --- Blocking tier -------------------------------------------
        let blocked = self.animation_blocked(now);
        if is_baseline && !blocked && !self.eyes_squinted {
            if self.evil.is_none() && now >= self.evil_next {
                self.evil = Some(EvilMode::new(now));
                self.cancel_lower_tiers();
            } else if self.sheep.is_none() && now >= self.sheep_next {
                self.sheep = Some(SheepCounting::new(now));
                self.cancel_lower_tiers();
                self.idle_returning = false;
            }
        }

        if let Some(mut evil) = self.evil.take() {
            if evil.update(now) {
                self.evil = Some(evil);
            } else {
                self.evil_next = now + self.timing.evil_interval;
                self.last_blocking_end = Some(now);
            }
        }

        if let Some(mut sheep) = self.sheep.take() {
            if sheep.update(now) {
                self.sheep = Some(sheep);
            } else {
                // Falling asleep: the squint latch survives until wake()
                self.sheep_next = now + self.timing.sheep_interval;
                self.eyes_squinted = true;
                self.last_blocking_end = Some(now);
            }
        }

        // Invariant: while a blocking behavior holds the frame, no lower
        // tier flag may stay set
        if self.blocking_active() {
            self.cancel_lower_tiers();
        }

        // --- Secondary tier ------------------------------------------
        let blocked = self.animation_blocked(now);
        if is_baseline && !blocked && !self.eyes_squinted {
            if !self.think.active && now >= self.think.next {
                self.think.trigger(now);
            } else if !self.laugh.active && now >= self.laugh.next {
                self.laugh.trigger(now);
            } else if self.fly.phase == FlyPhase::Dormant && now >= self.fly_next {
                self.fly.spawn(now);
                self.fly_next = now + self.timing.fly_interval;
            }
        }

        if self.think.active {
            if now.duration_since(self.think.started) >= THINK_DURATION {
                self.think.active = false;
                self.think.next =
                    now + Duration::from_secs_f32(rand::thread_rng().gen_range(10.0..15.0));
            } else {
                self.think.bounce += QUESTION_BOUNCE_SPEED;
            }
        }

        if self.laugh.active {
            if now.duration_since(self.laugh.started) >= LAUGH_DURATION {
                self.laugh.active = false;
                self.laugh.next =
                    now + Duration::from_secs_f32(rand::thread_rng().gen_range(8.0..12.0));
            } else {
                self.laugh.bounce += LAUGH_BOUNCE_SPEED;
            }
        }

        if !self.blocking_active() {
            self.fly.update(now);
            self.wing_phase += WING_SPEED;
        }

        // --- Idle tier -----------------------------------------------
        if !self.blocking_active() && !self.eyes_squinted {
            if self.blink_started.is_none() && now >= self.blink_next {
                self.blink_started = Some(now);
            }
            if let Some(started) = self.blink_started {
                if now.duration_since(started) >= BLINK_DURATION {
                    self.blink_started = None;
                    self.blink_next = now + self.blink_interval();
                }
            }

            if self.idle_enabled && now >= self.idle_next {
                self.advance_idle_drift(now);
            }

            if is_baseline {
                self.advance_shape_drift(now);
                self.advance_happy_bounce(now);
            }
        }

        // Mouth and brows smooth toward their targets every frame
        self.update_mouth();
        self.update_brows();

        self.resolve(now)
    }

    /// Pick the single render variant for this frame
    fn resolve(&self, now: Instant) -> FrameSnapshot {
        let variant = if let Some(ref evil) = self.evil {
            EyeVariant::Evil {
                bounce: evil.bounce_offset(),
            }
        } else if self.sheep.is_some() {
            EyeVariant::Baseline
        } else if self.think.active {
            EyeVariant::Thinking {
                question_bounce: self.think.bounce.sin() * 15.0,
            }
        } else if self.laugh.active {
            EyeVariant::Laughing {
                bounce: self.laugh.bounce.sin() * LAUGH_BOUNCE_AMOUNT,
            }
        } else {
            EyeVariant::Baseline
        };

        let eye_height_scale = self.resolve_height_scale(now);

        let eye_bounce = match variant {
            EyeVariant::Baseline if self.sheep.is_none() => self.bounce_amount,
            _ => 0.0,
        };

        let fly = if self.blocking_active() {
            None
        } else {
            match self.fly.phase {
                FlyPhase::Dormant => None,
                FlyPhase::Buzzing => Some(FlyView::Buzzing {
                    pos: self.fly.pos,
                    wing_phase: self.wing_phase,
                }),
                FlyPhase::Zapping => Some(FlyView::Zapping { pos: self.fly.pos }),
                FlyPhase::Dead => Some(FlyView::Corpse { pos: self.fly.pos }),
            }
        };

        let sheep = self
            .sheep
            .as_ref()
            .map(|counting| {
                counting
                    .rows
                    .iter()
                    .enumerate()
                    .flat_map(|(row, sheep)| {
                        let direction = SheepCounting::direction(row);
                        sheep.iter().map(move |s| SheepView {
                            x: s.x,
                            y: s.y,
                            direction,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let flames = self
            .evil
            .as_ref()
            .map(|evil| evil.particles.clone())
            .unwrap_or_default();

        FrameSnapshot {
            variant,
            color: self.color(),
            look: self.look,
            eye_height_scale,
            eye_bounce,
            shape: self.shape,
            brow_angle: self.brow_angle,
            brow_bounce: self.brow_bounce(),
            mouth_curve: self.mouth_curve,
            mouth_open: self.mouth_open,
            talking: self.talking,
            fly,
            sheep,
            flames,
        }
    }

    fn resolve_height_scale(&self, now: Instant) -> f32 {
        // The sleep latch overrides everything until an external wake
        if self.eyes_squinted {
            return SQUINT_HEIGHT_SCALE;
        }

        if let Some(ref sheep) = self.sheep {
            return 1.0 - sheep.drowsiness * 0.8;
        }

        let mut scale = self.shape.height_scale();
        if let Some(started) = self.blink_started {
            let progress =
                (now.duration_since(started).as_secs_f32() / BLINK_DURATION.as_secs_f32()).min(1.0);
            scale *= 1.0 - (progress * PI).sin();
        }
        scale
    }

    // ------------------------------------------------------------------
    // Tier helpers
    // ------------------------------------------------------------------

    fn blocking_active(&self) -> bool {
        self.evil.is_some() || self.sheep.is_some()
    }

    /// Blocking behavior running, or still inside its cooldown window
    fn animation_blocked(&self, now: Instant) -> bool {
        self.blocking_active()
            || self
                .last_blocking_end
                .is_some_and(|end| now < end + BLOCKING_COOLDOWN)
    }

    /// Force-clear every lower-tier in-flight flag
    fn cancel_lower_tiers(&mut self) {
        self.laugh.active = false;
        self.think.active = false;
        self.blink_started = None;
        self.fly.cancel();
    }

    fn advance_idle_drift(&mut self, now: Instant) {
        let mut rng = rand::thread_rng();
        if !self.idle_returning {
            let direction = IDLE_DIRECTIONS[rng.gen_range(0..IDLE_DIRECTIONS.len())];
            self.transitions.set_easing(Easing::Cubic);
            self.transitions.start(now, self.look, direction);
            self.transitions_started += 1;
            self.idle_returning = true;
            self.idle_next = now + IDLE_CENTER_DELAY;
        } else {
            self.transitions.set_easing(Easing::Cubic);
            self.transitions.start(now, self.look, Point::default());
            self.transitions_started += 1;
            self.idle_returning = false;
            self.idle_next = now + Duration::from_secs_f32(rng.gen_range(1.5..3.0));
        }
    }

    fn advance_shape_drift(&mut self, now: Instant) {
        if now >= self.shape_next {
            let mut rng = rand::thread_rng();
            self.shape = if rng.gen_bool(0.5) {
                DisplayShape::Neutral
            } else {
                DisplayShape::Happy
            };
            self.shape_next = now + Duration::from_secs_f32(rng.gen_range(4.0..8.0));
        }
    }

    fn advance_happy_bounce(&mut self, now: Instant) {
        if self.shape == DisplayShape::Happy && !self.laugh.active {
            if now >= self.bounce_next {
                let mut rng = rand::thread_rng();
                self.bounce_target = rng.gen_range(3.0..8.0);
                self.bounce_next = now + Duration::from_secs_f32(rng.gen_range(5.0..7.0));
            }
            self.bounce_amount += (self.bounce_target - self.bounce_amount) * 0.1;
            if (self.bounce_amount - self.bounce_target).abs() < 0.1 {
                self.bounce_target = 0.0;
            }
        } else {
            self.bounce_amount = 0.0;
            self.bounce_target = 0.0;
        }
    }

    fn blink_interval(&self) -> Duration {
        let mut rng = rand::thread_rng();
        let range = match self.emotion {
            Emotion::Excited => 1.0..2.0,
            Emotion::Sad => 4.0..6.0,
            Emotion::Happy => 2.0..3.0,
            _ => match self.shape {
                DisplayShape::Happy => 2.0..3.0,
                DisplayShape::Neutral => 3.0..5.0,
            },
        };
        Duration::from_secs_f32(rng.gen_range(range))
    }

    // ------------------------------------------------------------------
    // Smoothing
    // ------------------------------------------------------------------

    fn smooth_color(&mut self) {
        let target = [
            f32::from(self.target_color.r),
            f32::from(self.target_color.g),
            f32::from(self.target_color.b),
        ];
        for (current, target) in self.current_color.iter_mut().zip(target) {
            *current += (target - *current) * COLOR_SMOOTHING;
            *current = current.clamp(0.0, 255.0);
        }
    }

    fn update_mouth(&mut self) {
        if self.talking {
            self.talk_phase += 0.15;
            if self.talk_phase >= PI {
                self.talk_phase = 0.0;
                self.target_mouth_open = rand::thread_rng().gen_range(0.3..1.0) * 25.0;
            }
            let open = self.talk_phase.sin().abs() * self.target_mouth_open;
            self.mouth_open += (open - self.mouth_open) * 0.3;
        } else {
            self.mouth_open += (0.0 - self.mouth_open) * 0.2;
        }

        let target_curve = if self.talking {
            0.3
        } else {
            mouth_curve_for(self.emotion)
        };
        self.mouth_curve += (target_curve - self.mouth_curve) * 0.1;
    }

    fn update_brows(&mut self) {
        let target = brow_angle_for(self.emotion);
        self.brow_angle += (target - self.brow_angle) * 0.1;

        if let Some((speed, _)) = brow_bounce_pattern(self.emotion) {
            self.brow_bounce_phase += speed;
        }
    }

    fn brow_bounce(&self) -> f32 {
        match brow_bounce_pattern(self.emotion) {
            Some((_, amplitude)) => self.brow_bounce_phase.sin() * amplitude,
            None => 0.0,
        }
    }

    // ------------------------------------------------------------------
    // Observations
    // ------------------------------------------------------------------

    /// Current color, rounded to integer channels
    pub fn color(&self) -> Rgb {
        Rgb::new(
            self.current_color[0].round() as u8,
            self.current_color[1].round() as u8,
            self.current_color[2].round() as u8,
        )
    }

    /// Target color the eyes are steering toward
    pub fn target_color(&self) -> Rgb {
        self.target_color
    }

    /// Whether the current color has converged to the idle baseline
    /// (within one unit per channel; exponential smoothing never lands
    /// exactly)
    pub fn is_baseline(&self) -> bool {
        let baseline = [
            f32::from(BASELINE_COLOR.r),
            f32::from(BASELINE_COLOR.g),
            f32::from(BASELINE_COLOR.b),
        ];
        self.current_color
            .iter()
            .zip(baseline)
            .all(|(current, target)| (current - target).abs() <= 1.0)
    }

    /// Display emotion currently driving mouth, brows and blink cadence
    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    /// Sleep latch state
    pub fn eyes_squinted(&self) -> bool {
        self.eyes_squinted
    }

    /// Whether evil mode owns the frame
    pub fn evil_active(&self) -> bool {
        self.evil.is_some()
    }

    /// Whether sheep counting owns the frame
    pub fn sheep_active(&self) -> bool {
        self.sheep.is_some()
    }

    /// Secondary-tier flags (tests assert the force-clear invariant)
    pub fn laugh_active(&self) -> bool {
        self.laugh.active
    }

    pub fn think_active(&self) -> bool {
        self.think.active
    }

    pub fn fly_active(&self) -> bool {
        self.fly.phase != FlyPhase::Dormant
    }

    /// Total sheep counted across the current run
    pub fn sheep_count(&self) -> u32 {
        self.sheep.as_ref().map(|s| s.count).unwrap_or(0)
    }

    /// Number of transitions started since construction
    pub fn transitions_started(&self) -> u64 {
        self.transitions_started
    }

    /// Where the eyes are currently looking
    pub fn look(&self) -> Point {
        self.look
    }
}

/// Mouth curve per emotion: positive smiles, negative frowns
fn mouth_curve_for(emotion: Emotion) -> f32 {
    match emotion {
        Emotion::Happy => 0.8,
        Emotion::Sad => -0.6,
        Emotion::Angry => -0.8,
        Emotion::Calm => 0.2,
        Emotion::Excited => 1.0,
        Emotion::Worried => -0.3,
        Emotion::Curious => 0.4,
        Emotion::Focused => 0.0,
        Emotion::Neutral => 0.2,
    }
}

/// Brow target angle per emotion, degrees-ish in virtual pixels
fn brow_angle_for(emotion: Emotion) -> f32 {
    match emotion {
        Emotion::Happy => 18.0,
        Emotion::Sad => -22.0,
        Emotion::Angry => 35.0,
        Emotion::Calm => 12.0,
        Emotion::Excited => 25.0,
        Emotion::Worried => -18.0,
        Emotion::Curious => 20.0,
        Emotion::Focused => 8.0,
        Emotion::Neutral => 10.0,
    }
}

/// Brow bob (speed, amplitude) for the emotions that get one
fn brow_bounce_pattern(emotion: Emotion) -> Option<(f32, f32)> {
    match emotion {
        Emotion::Happy => Some((0.05, 3.0)),
        Emotion::Excited => Some((0.08, 4.0)),
        Emotion::Calm | Emotion::Neutral => Some((0.03, 2.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otto_core::status::ALERT_COLOR;

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

    fn run_frames(scheduler: &mut Scheduler, start: Instant, frames: u32) -> Instant {
        let mut now = start;
        for _ in 0..frames {
            now += FRAME;
            scheduler.tick(now);
        }
        now
    }

    #[test]
    fn test_color_smoothing_converges_within_bound() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.set_eye_color(ALERT_COLOR);

        // k = 0.05 needs at most log(255)/-log(0.95) ~ 109 iterations
        let now = run_frames(&mut scheduler, start, 120);
        let color = scheduler.tick(now + FRAME).color;
        assert!((f32::from(color.r) - f32::from(ALERT_COLOR.r)).abs() <= 1.0);
        assert!((f32::from(color.g) - f32::from(ALERT_COLOR.g)).abs() <= 1.0);
        assert!((f32::from(color.b) - f32::from(ALERT_COLOR.b)).abs() <= 1.0);
    }

    #[test]
    fn test_evil_blocks_and_clears_secondary_flags() {
        let start = Instant::now();
        let mut timing = quiet_timing();
        timing.evil_first = Duration::from_millis(100);
        let mut scheduler = Scheduler::with_timing(start, timing);

        // Force a laugh to be in flight before evil triggers
        scheduler.laugh.trigger(start);
        assert!(scheduler.laugh_active());

        let now = run_frames(&mut scheduler, start, 10);
        assert!(scheduler.evil_active());
        assert!(!scheduler.laugh_active());
        assert!(!scheduler.think_active());
        assert!(!scheduler.fly_active());

        // Evil owns the render variant for the whole episode
        let snapshot = scheduler.tick(now + FRAME);
        assert!(matches!(snapshot.variant, EyeVariant::Evil { .. }));
    }

    #[test]
    fn test_blocking_tier_mutual_exclusion() {
        let start = Instant::now();
        let mut timing = quiet_timing();
        // Both want to trigger immediately; evil wins, sheep must wait
        timing.evil_first = Duration::from_millis(50);
        timing.sheep_first = Duration::from_millis(50);
        let mut scheduler = Scheduler::with_timing(start, timing);

        let mut now = start;
        for _ in 0..1200 {
            now += FRAME;
            scheduler.tick(now);
            assert!(
                !(scheduler.evil_active() && scheduler.sheep_active()),
                "evil and sheep may never overlap"
            );
            if scheduler.evil_active() || scheduler.sheep_active() {
                assert!(!scheduler.laugh_active());
                assert!(!scheduler.think_active());
                assert!(!scheduler.fly_active());
            }
        }
    }

    #[test]
    fn test_evil_ends_and_reschedules() {
        let start = Instant::now();
        let mut timing = quiet_timing();
        timing.evil_first = Duration::from_millis(50);
        let mut scheduler = Scheduler::with_timing(start, timing);

        let now = run_frames(&mut scheduler, start, 10);
        assert!(scheduler.evil_active());

        // 5s episode + slack
        run_frames(&mut scheduler, now, 330);
        assert!(!scheduler.evil_active());
    }

    #[test]
    fn test_sheep_latch_survives_until_wake() {
        let start = Instant::now();
        let mut timing = quiet_timing();
        timing.sheep_first = Duration::from_millis(50);
        let mut scheduler = Scheduler::with_timing(start, timing);

        // Run through the whole 15s sheep episode
        let mut now = run_frames(&mut scheduler, start, 10);
        assert!(scheduler.sheep_active());
        now = run_frames(&mut scheduler, now, 1000);
        assert!(!scheduler.sheep_active());
        assert!(scheduler.eyes_squinted());

        // Every subsequent frame renders at 20% height
        for _ in 0..50 {
            now += FRAME;
            let snapshot = scheduler.tick(now);
            assert_eq!(snapshot.eye_height_scale, 0.2);
        }

        // External wake clears the latch
        scheduler.wake(now);
        assert!(!scheduler.eyes_squinted());
        let snapshot = scheduler.tick(now + FRAME);
        assert!(snapshot.eye_height_scale > 0.2);
    }

    #[test]
    fn test_alert_color_cancels_playful_behaviors() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.laugh.trigger(start);
        scheduler.think.trigger(start);

        scheduler.set_eye_color(ALERT_COLOR);
        assert!(!scheduler.laugh_active());
        assert!(!scheduler.think_active());
        assert!(!scheduler.fly_active());
    }

    #[test]
    fn test_non_baseline_blocks_new_triggers() {
        let start = Instant::now();
        let mut timing = quiet_timing();
        timing.evil_first = Duration::from_millis(50);
        let mut scheduler = Scheduler::with_timing(start, timing);
        scheduler.set_eye_color(ALERT_COLOR);

        // Give the color time to leave the baseline, then pass the evil
        // trigger time; nothing may start
        run_frames(&mut scheduler, start, 300);
        assert!(!scheduler.evil_active());
    }

    #[test]
    fn test_blink_squishes_then_reopens() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.blink_next = start;

        let mut min_scale = f32::MAX;
        let mut now = start;
        for _ in 0..30 {
            now += FRAME;
            let snapshot = scheduler.tick(now);
            min_scale = min_scale.min(snapshot.eye_height_scale);
        }
        // Mid-blink the eye is nearly shut
        assert!(min_scale < 0.2);
        // And afterwards open again
        let snapshot = scheduler.tick(now + FRAME);
        assert!(snapshot.eye_height_scale > 0.8);
    }

    #[test]
    fn test_idle_drift_goes_out_and_returns() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.idle_next = start;

        // First leg: out to one of the four glance offsets
        let now = run_frames(&mut scheduler, start, 80);
        let away = scheduler.look();
        assert!(away.x.abs() > 1.0 || away.y.abs() > 1.0);

        // The return leg (queued by the 0.8s center delay) lands before
        // the earliest possible next glance at ~2.3s
        run_frames(&mut scheduler, now, 45);
        let home = scheduler.look();
        assert!(home.x.abs() < 1.0 && home.y.abs() < 1.0);
    }

    #[test]
    fn test_slide_counts_one_transition() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.set_idle_drift(false);
        let before = scheduler.transitions_started();
        scheduler.slide_to(start, 0.0, 0.0, Easing::Elastic);
        assert_eq!(scheduler.transitions_started(), before + 1);
    }

    #[test]
    fn test_talking_opens_the_mouth() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.set_talking(true);
        let now = run_frames(&mut scheduler, start, 30);
        let snapshot = scheduler.tick(now + FRAME);
        assert!(snapshot.mouth_open > 0.0);

        scheduler.set_talking(false);
        let now = run_frames(&mut scheduler, now, 120);
        let snapshot = scheduler.tick(now + FRAME);
        assert!(snapshot.mouth_open < 0.5);
    }

    #[test]
    fn test_emotion_steers_mouth_and_brows() {
        let start = Instant::now();
        let mut scheduler = Scheduler::with_timing(start, quiet_timing());
        scheduler.set_emotion(start, Emotion::Sad, false);
        let now = run_frames(&mut scheduler, start, 200);
        let snapshot = scheduler.tick(now + FRAME);
        assert!(snapshot.mouth_curve < -0.5);
        assert!(snapshot.brow_angle < -20.0);
    }
}
