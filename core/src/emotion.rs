//! Emotion Model
//!
//! Maps a small fixed catalog of named emotions to colors and blends the
//! current emotion with the one it replaced. Purely cosmetic state: the
//! face uses the blended color, the voice loop uses [`EmotionModel::describe`]
//! when asked how it feels. Nothing here persists across restarts.

use std::time::Instant;

use rand::Rng;

/// An RGB triple. Color math in the face happens in f32 space; this is the
/// integer form used at the catalog/API boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear blend: `self * ratio + other * (1 - ratio)`
    pub fn blend(self, other: Rgb, ratio: f32) -> Rgb {
        let ratio = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (f32::from(a) * ratio + f32::from(b) * (1.0 - ratio)).round() as u8
        };
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// The emotion catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Calm,
    Excited,
    Worried,
    Curious,
    Focused,
}

impl Emotion {
    /// Catalog color for this emotion
    pub fn color(&self) -> Rgb {
        match self {
            Self::Neutral | Self::Calm => Rgb::new(0, 191, 255),
            Self::Happy => Rgb::new(144, 238, 144),
            Self::Sad => Rgb::new(70, 130, 180),
            Self::Angry => Rgb::new(255, 0, 0),
            Self::Excited => Rgb::new(255, 215, 0),
            Self::Worried => Rgb::new(147, 112, 219),
            Self::Curious => Rgb::new(64, 224, 208),
            Self::Focused => Rgb::new(255, 165, 0),
        }
    }

    /// Parse a catalog name. Unknown names return `None`; callers treat
    /// that as a silent no-op.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "neutral" => Some(Self::Neutral),
            "happy" => Some(Self::Happy),
            "sad" => Some(Self::Sad),
            "angry" => Some(Self::Angry),
            "calm" => Some(Self::Calm),
            "excited" => Some(Self::Excited),
            "worried" => Some(Self::Worried),
            "curious" => Some(Self::Curious),
            "focused" => Some(Self::Focused),
            _ => None,
        }
    }

    /// Catalog name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Calm => "calm",
            Self::Excited => "excited",
            Self::Worried => "worried",
            Self::Curious => "curious",
            Self::Focused => "focused",
        }
    }
}

/// Blending emotion state: a primary emotion at some intensity, and the
/// previous primary fading underneath it.
#[derive(Debug)]
pub struct EmotionModel {
    primary: Emotion,
    secondary: Option<Emotion>,
    intensity: f32,
    /// Auxiliary mood scalar nudged by [`EmotionModel::decay`]
    curiosity: f32,
    last_change: Instant,
    /// Seconds until the next natural drift
    drift_window: f32,
}

impl EmotionModel {
    /// Start calm, moderately curious
    pub fn new() -> Self {
        Self {
            primary: Emotion::Calm,
            secondary: None,
            intensity: 0.5,
            curiosity: 0.5,
            last_change: Instant::now(),
            drift_window: rand::thread_rng().gen_range(30.0..120.0),
        }
    }

    /// Install a new primary emotion, demoting the old one to secondary.
    ///
    /// Returns the blended color for convenience. Intensity is clamped to
    /// `[0, 1]`; 1.0 means the secondary contributes nothing.
    pub fn set_emotion(&mut self, emotion: Emotion, intensity: f32) -> Rgb {
        self.secondary = Some(self.primary);
        self.primary = emotion;
        self.intensity = intensity.clamp(0.0, 1.0);
        self.last_change = Instant::now();
        self.blended_color()
    }

    /// Same as [`set_emotion`](Self::set_emotion) but by catalog name;
    /// unknown names are a silent no-op.
    pub fn set_emotion_by_name(&mut self, name: &str, intensity: f32) -> Option<Rgb> {
        Emotion::from_name(name).map(|e| self.set_emotion(e, intensity))
    }

    /// Blend of primary and secondary by intensity
    pub fn blended_color(&self) -> Rgb {
        match self.secondary {
            Some(secondary) => self.primary.color().blend(secondary.color(), self.intensity),
            None => self.primary.color(),
        }
    }

    /// Current primary emotion
    pub fn primary(&self) -> Emotion {
        self.primary
    }

    /// Current curiosity level in `[0, 1]`
    pub fn curiosity(&self) -> f32 {
        self.curiosity
    }

    /// Natural mood drift. After the randomized window since the last
    /// change, nudge curiosity by ±0.2 (biased upward when calm or happy)
    /// and re-randomize the window.
    pub fn decay(&mut self, now: Instant) {
        if now.duration_since(self.last_change).as_secs_f32() <= self.drift_window {
            return;
        }

        let mut rng = rand::thread_rng();
        self.curiosity = (self.curiosity + rng.gen_range(-0.2..0.2)).clamp(0.0, 1.0);
        if matches!(self.primary, Emotion::Calm | Emotion::Happy) {
            self.curiosity = (self.curiosity + 0.1).min(1.0);
        }

        self.drift_window = rng.gen_range(30.0..120.0);
        self.last_change = now;
    }

    /// Text description for "how are you feeling" style queries
    pub fn describe(&self) -> String {
        match self.secondary {
            Some(secondary) if self.intensity < 1.0 => format!(
                "feeling {} with a hint of {}",
                self.primary.name(),
                secondary.name()
            ),
            _ => format!("feeling {}", self.primary.name()),
        }
    }
}

impl Default for EmotionModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_intensity_ignores_secondary() {
        let mut model = EmotionModel::new();
        model.set_emotion(Emotion::Angry, 0.5);
        let color = model.set_emotion(Emotion::Happy, 1.0);
        assert_eq!(color, Emotion::Happy.color());
        assert_eq!(model.blended_color(), Emotion::Happy.color());
    }

    #[test]
    fn test_blend_is_weighted_average() {
        let mut model = EmotionModel::new();
        model.set_emotion(Emotion::Angry, 1.0); // (255, 0, 0)
        let color = model.set_emotion(Emotion::Calm, 0.5); // (0, 191, 255)
        // Halfway between angry and calm
        assert_eq!(color, Rgb::new(128, 96, 128));
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let mut model = EmotionModel::new();
        let before = model.primary();
        assert!(model.set_emotion_by_name("euphoric", 0.9).is_none());
        assert_eq!(model.primary(), before);
    }

    #[test]
    fn test_set_emotion_demotes_primary() {
        let mut model = EmotionModel::new();
        model.set_emotion(Emotion::Happy, 0.5);
        model.set_emotion(Emotion::Sad, 0.5);
        assert_eq!(model.primary(), Emotion::Sad);
        assert!(model.describe().contains("hint of happy"));
    }

    #[test]
    fn test_decay_keeps_curiosity_in_bounds() {
        let mut model = EmotionModel::new();
        for _ in 0..100 {
            // A negative window makes any elapsed time count as expired
            model.drift_window = -1.0;
            model.decay(Instant::now());
            assert!((0.0..=1.0).contains(&model.curiosity()));
        }
    }

    #[test]
    fn test_intensity_clamped() {
        let mut model = EmotionModel::new();
        let color = model.set_emotion(Emotion::Happy, 7.5);
        assert_eq!(color, Emotion::Happy.color());
    }
}
