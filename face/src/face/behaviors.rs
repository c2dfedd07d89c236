//! Stateful Behaviors
//!
//! The three behaviors with real internal state: the fly hunt, the
//! sheep-counting sequence, and evil mode's flame particles. Each owns
//! its own timers and positions; the scheduler decides when they run and
//! resolves which one owns the frame.

use std::time::{Duration, Instant};

use rand::Rng;

use super::transition::Point;
use super::{CENTER_X, CENTER_Y, VIRTUAL_HEIGHT, VIRTUAL_WIDTH};

// ============================================================================
// Fly hunt
// ============================================================================

/// Fixed fly lifetime before the eyes zap it regardless of position
const FLY_LIFETIME: Duration = Duration::from_secs(5);
/// Zap fires when the fly loiters this close to screen center...
const ZAP_RANGE: f32 = 150.0;
/// ...for at least this long, continuously
const REQUIRED_CLOSE_TIME: Duration = Duration::from_millis(500);
/// Laser duration
const ZAP_DURATION: Duration = Duration::from_millis(300);
/// How long the corpse stays on screen
const CORPSE_DURATION: Duration = Duration::from_secs(1);
/// Chase speed toward the current target
const FLY_SPEED: f32 = 0.08;
/// Retarget when this close to the current target
const RETARGET_DISTANCE: f32 = 10.0;

/// What the fly is doing right now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlyPhase {
    /// No fly on screen
    Dormant,
    /// Buzzing around, being hunted
    Buzzing,
    /// Lasers on
    Zapping,
    /// X-marked corpse
    Dead,
}

/// The fly-catching behavior
#[derive(Debug)]
pub struct Fly {
    pub phase: FlyPhase,
    pub pos: Point,
    target: Point,
    spawned: Instant,
    /// First frame the fly was inside the zap radius; cleared whenever it
    /// leaves the radius so a partial accrual never carries over
    close_since: Option<Instant>,
    zap_started: Instant,
    died: Instant,
}

impl Fly {
    pub fn new(now: Instant) -> Self {
        Self {
            phase: FlyPhase::Dormant,
            pos: Point::default(),
            target: Point::default(),
            spawned: now,
            close_since: None,
            zap_started: now,
            died: now,
        }
    }

    /// Put a fresh fly on screen, entering from the top center
    pub fn spawn(&mut self, now: Instant) {
        let mut rng = rand::thread_rng();
        self.phase = FlyPhase::Buzzing;
        self.pos = Point::new(CENTER_X, 0.0);
        self.target = Point::new(
            rng.gen_range(VIRTUAL_WIDTH * 0.25..VIRTUAL_WIDTH * 0.75),
            rng.gen_range(VIRTUAL_HEIGHT * 0.25..VIRTUAL_HEIGHT * 0.75),
        );
        self.spawned = now;
        self.close_since = None;
    }

    /// Kill any ongoing hunt (blocking behavior took over, or alert color)
    pub fn cancel(&mut self) {
        self.phase = FlyPhase::Dormant;
        self.close_since = None;
    }

    /// Advance one frame. Returns `true` while anything fly-related is
    /// still on screen.
    pub fn update(&mut self, now: Instant) -> bool {
        match self.phase {
            FlyPhase::Dormant => false,
            FlyPhase::Buzzing => {
                self.buzz(now);
                true
            }
            FlyPhase::Zapping => {
                if now.duration_since(self.zap_started) >= ZAP_DURATION {
                    self.phase = FlyPhase::Dead;
                    self.died = now;
                }
                true
            }
            FlyPhase::Dead => {
                if now.duration_since(self.died) >= CORPSE_DURATION {
                    self.phase = FlyPhase::Dormant;
                }
                self.phase != FlyPhase::Dormant
            }
        }
    }

    fn buzz(&mut self, now: Instant) {
        let mut rng = rand::thread_rng();

        let dx = self.target.x - self.pos.x;
        let dy = self.target.y - self.pos.y;
        if (dx * dx + dy * dy).sqrt() < RETARGET_DISTANCE {
            self.retarget(&mut rng);
        }

        self.pos.x += dx * FLY_SPEED + rng.gen_range(-0.5..0.5);
        self.pos.y += dy * FLY_SPEED + rng.gen_range(-0.5..0.5);

        // Zap when the lifetime runs out, or after loitering near center
        if now.duration_since(self.spawned) >= FLY_LIFETIME {
            self.start_zap(now);
            return;
        }

        let center_dist = ((self.pos.x - CENTER_X).powi(2) + (self.pos.y - CENTER_Y).powi(2)).sqrt();
        if center_dist < ZAP_RANGE {
            let close_since = *self.close_since.get_or_insert(now);
            if now.duration_since(close_since) >= REQUIRED_CLOSE_TIME {
                self.start_zap(now);
            }
        } else {
            self.close_since = None;
        }
    }

    fn retarget(&mut self, rng: &mut impl Rng) {
        // Occasionally dash to a screen edge, otherwise anywhere
        if rng.gen_bool(0.3) {
            self.target = match rng.gen_range(0..4) {
                0 => Point::new(rng.gen_range(0.0..VIRTUAL_WIDTH), 0.0),
                1 => Point::new(rng.gen_range(0.0..VIRTUAL_WIDTH), VIRTUAL_HEIGHT),
                2 => Point::new(0.0, rng.gen_range(0.0..VIRTUAL_HEIGHT)),
                _ => Point::new(VIRTUAL_WIDTH, rng.gen_range(0.0..VIRTUAL_HEIGHT)),
            };
        } else {
            self.target = Point::new(
                rng.gen_range(0.0..VIRTUAL_WIDTH),
                rng.gen_range(0.0..VIRTUAL_HEIGHT),
            );
        }
    }

    fn start_zap(&mut self, now: Instant) {
        self.phase = FlyPhase::Zapping;
        self.zap_started = now;
        self.close_since = None;
    }

    /// Whether the close-timer is currently accruing (test hook)
    #[cfg(test)]
    fn close_timer_running(&self) -> bool {
        self.close_since.is_some()
    }
}

// ============================================================================
// Sheep counting
// ============================================================================

/// Total length of one sheep-counting run
pub const SHEEP_DURATION: Duration = Duration::from_secs(15);
/// Rows of marching sheep
pub const SHEEP_ROWS: usize = 3;
/// Maximum simultaneous sheep per row
const SHEEP_PER_ROW: usize = 10;
/// Vertical gap between rows
const SHEEP_ROW_SPACING: f32 = 50.0;
/// Horizontal speed in virtual pixels per frame
const SHEEP_SPEED: f32 = 2.0;
/// Spawn probability per row per frame while the row has room
const SHEEP_SPAWN_CHANCE: f64 = 0.02;
/// Sheep leave the field this far past the edges
const SHEEP_EXIT_MARGIN: f32 = 100.0;

/// One marching sheep
#[derive(Clone, Debug)]
pub struct Sheep {
    pub x: f32,
    pub y: f32,
    pub counted: bool,
}

/// The sheep-counting behavior. Rows alternate travel direction; each
/// sheep is counted exactly once as it crosses the horizontal center in
/// its row's direction of travel.
#[derive(Debug)]
pub struct SheepCounting {
    started: Instant,
    pub rows: [Vec<Sheep>; SHEEP_ROWS],
    pub count: u32,
    pub drowsiness: f32,
}

impl SheepCounting {
    /// Travel direction per row: +1 rightward, -1 leftward
    pub fn direction(row: usize) -> f32 {
        if row % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            rows: Default::default(),
            count: 0,
            drowsiness: 0.0,
        }
    }

    /// Fraction of the run completed
    pub fn progress(&self, now: Instant) -> f32 {
        now.duration_since(self.started).as_secs_f32() / SHEEP_DURATION.as_secs_f32()
    }

    /// Advance one frame. Returns `false` once the run is over.
    pub fn update(&mut self, now: Instant) -> bool {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return false;
        }

        let mut rng = rand::thread_rng();
        for row in 0..SHEEP_ROWS {
            let direction = Self::direction(row);

            if self.rows[row].len() < SHEEP_PER_ROW && rng.gen_bool(SHEEP_SPAWN_CHANCE) {
                let start_x = if direction > 0.0 {
                    -50.0
                } else {
                    VIRTUAL_WIDTH + 50.0
                };
                self.rows[row].push(Sheep {
                    x: start_x,
                    y: CENTER_Y + 100.0 + row as f32 * SHEEP_ROW_SPACING,
                    counted: false,
                });
            }

            let mut counted_this_frame = 0;
            self.rows[row].retain_mut(|sheep| {
                sheep.x += SHEEP_SPEED * direction;

                let crossed = (direction > 0.0 && sheep.x > CENTER_X)
                    || (direction < 0.0 && sheep.x < CENTER_X);
                if crossed && !sheep.counted {
                    sheep.counted = true;
                    counted_this_frame += 1;
                }

                sheep.x > -SHEEP_EXIT_MARGIN && sheep.x < VIRTUAL_WIDTH + SHEEP_EXIT_MARGIN
            });
            self.count += counted_this_frame;
        }

        self.drowsiness = (progress * 1.2).min(1.0);
        true
    }
}

// ============================================================================
// Evil mode
// ============================================================================

/// How long evil mode holds the screen
pub const EVIL_DURATION: Duration = Duration::from_secs(5);
/// Flame birth probability per frame
const FLAME_BIRTH_CHANCE: f64 = 0.3;
/// Flame life lost per frame
const FLAME_DECAY: f32 = 0.02;
/// Sinusoidal bounce advance per frame
const EVIL_BOUNCE_SPEED: f32 = 0.3;
/// Bounce amplitude in virtual pixels
const EVIL_BOUNCE_AMOUNT: f32 = 15.0;

/// A rising flame particle
#[derive(Clone, Debug)]
pub struct Flame {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    /// Remaining life in `[0, 1]`; drives size and brightness
    pub life: f32,
    pub size: f32,
}

/// Evil mode: sharp eyes, bounce, flames rising from the bottom edge
#[derive(Debug)]
pub struct EvilMode {
    started: Instant,
    bounce: f32,
    pub particles: Vec<Flame>,
}

impl EvilMode {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            bounce: 0.0,
            particles: Vec::new(),
        }
    }

    /// Fraction of the episode completed
    pub fn progress(&self, now: Instant) -> f32 {
        now.duration_since(self.started).as_secs_f32() / EVIL_DURATION.as_secs_f32()
    }

    /// Vertical eye offset this frame
    pub fn bounce_offset(&self) -> f32 {
        self.bounce.sin() * EVIL_BOUNCE_AMOUNT
    }

    /// Advance one frame. Returns `false` once the episode is over.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.progress(now) >= 1.0 {
            return false;
        }

        self.bounce += EVIL_BOUNCE_SPEED;

        let mut rng = rand::thread_rng();
        if rng.gen_bool(FLAME_BIRTH_CHANCE) {
            self.particles.push(Flame {
                x: rng.gen_range(0.0..VIRTUAL_WIDTH),
                y: VIRTUAL_HEIGHT + 10.0,
                speed: rng.gen_range(5.0..8.0),
                life: 1.0,
                size: rng.gen_range(10.0..20.0),
            });
        }

        self.particles.retain_mut(|flame| {
            flame.y -= flame.speed;
            flame.life -= FLAME_DECAY;
            flame.life > 0.0
        });

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheep_counted_exactly_once() {
        let start = Instant::now();
        let mut counting = SheepCounting::new(start);
        // Plant one sheep just left of center, traveling right
        counting.rows[0].push(Sheep {
            x: CENTER_X - 1.0,
            y: CENTER_Y + 100.0,
            counted: false,
        });

        let mut now = start;
        let mut last_count = 0;
        for _ in 0..200 {
            now += Duration::from_millis(16);
            counting.update(now);
            assert!(counting.count >= last_count, "count never decreases");
            last_count = counting.count;
        }
        // The planted sheep crossed once; stochastic spawns start far
        // off-screen and cannot reach center in 200 frames at speed 2
        assert_eq!(counting.count, 1);
    }

    #[test]
    fn test_sheep_leftward_row_counts_on_leftward_crossing() {
        let start = Instant::now();
        let mut counting = SheepCounting::new(start);
        assert_eq!(SheepCounting::direction(1), -1.0);
        counting.rows[1].push(Sheep {
            x: CENTER_X + 1.0,
            y: CENTER_Y + 150.0,
            counted: false,
        });
        counting.update(start + Duration::from_millis(16));
        assert_eq!(counting.count, 1);
        assert!(counting.rows[1][0].counted);
    }

    #[test]
    fn test_sheep_run_ends_after_duration() {
        let start = Instant::now();
        let mut counting = SheepCounting::new(start);
        assert!(counting.update(start + Duration::from_secs(1)));
        assert!(!counting.update(start + SHEEP_DURATION));
    }

    #[test]
    fn test_drowsiness_scales_and_caps() {
        let start = Instant::now();
        let mut counting = SheepCounting::new(start);
        counting.update(start + Duration::from_secs(5));
        let early = counting.drowsiness;
        assert!(early > 0.0 && early < 1.0);
        counting.update(start + Duration::from_secs(14));
        assert_eq!(counting.drowsiness, 1.0);
    }

    #[test]
    fn test_fly_close_timer_resets_when_out_of_range() {
        let start = Instant::now();
        let mut fly = Fly::new(start);
        fly.spawn(start);

        // Park the fly near center; first update latches the close timer
        fly.pos = Point::new(CENTER_X, CENTER_Y);
        fly.target = fly.pos;
        fly.update(start + Duration::from_millis(16));
        assert!(fly.close_timer_running());

        // Drag it out of range: the partial accrual must be discarded
        fly.pos = Point::new(0.0, 0.0);
        fly.target = fly.pos;
        fly.update(start + Duration::from_millis(32));
        assert!(!fly.close_timer_running());
        assert_eq!(fly.phase, FlyPhase::Buzzing);
    }

    #[test]
    fn test_fly_zaps_after_loitering() {
        let start = Instant::now();
        let mut fly = Fly::new(start);
        fly.spawn(start);
        fly.pos = Point::new(CENTER_X, CENTER_Y);
        fly.target = fly.pos;

        let mut now = start;
        // Latch, then exceed the half-second loiter requirement
        fly.update(now + Duration::from_millis(16));
        now += Duration::from_millis(700);
        fly.pos = Point::new(CENTER_X, CENTER_Y);
        fly.update(now);
        assert_eq!(fly.phase, FlyPhase::Zapping);
    }

    #[test]
    fn test_fly_force_zaps_at_lifetime() {
        let start = Instant::now();
        let mut fly = Fly::new(start);
        fly.spawn(start);
        // Keep it far from center the whole time
        fly.pos = Point::new(0.0, 0.0);
        fly.target = Point::new(0.0, 0.0);
        fly.update(start + FLY_LIFETIME);
        assert_eq!(fly.phase, FlyPhase::Zapping);
    }

    #[test]
    fn test_fly_corpse_then_dormant() {
        let start = Instant::now();
        let mut fly = Fly::new(start);
        fly.spawn(start);
        fly.pos = Point::new(CENTER_X, CENTER_Y);
        fly.start_zap(start);

        fly.update(start + ZAP_DURATION);
        assert_eq!(fly.phase, FlyPhase::Dead);

        fly.update(start + ZAP_DURATION + CORPSE_DURATION);
        assert_eq!(fly.phase, FlyPhase::Dormant);
    }

    #[test]
    fn test_flames_decay_and_die() {
        let start = Instant::now();
        let mut evil = EvilMode::new(start);
        evil.particles.push(Flame {
            x: 100.0,
            y: 500.0,
            speed: 6.0,
            life: 0.03,
            size: 12.0,
        });

        let mut now = start;
        for _ in 0..3 {
            now += Duration::from_millis(16);
            evil.update(now);
        }
        // 0.03 - 2 * 0.02 < 0, removed
        assert!(evil.particles.iter().all(|f| f.life > 0.0));
    }

    #[test]
    fn test_evil_episode_ends() {
        let start = Instant::now();
        let mut evil = EvilMode::new(start);
        assert!(evil.update(start + Duration::from_secs(1)));
        assert!(!evil.update(start + EVIL_DURATION));
    }
}
