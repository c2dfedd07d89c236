//! Timer Utility
//!
//! "Set a timer for five minutes" support. Parses a duration out of a
//! command phrase, keeps the pending alarms sorted, and hands back the due
//! ones when polled. The face surfaces due alarms as captions; nothing
//! here talks to the display directly.

use std::time::{Duration, Instant};

/// A pending named alarm
#[derive(Clone, Debug)]
pub struct Alarm {
    /// What to announce when it fires
    pub label: String,
    /// When it fires
    pub due: Instant,
}

/// Pending alarms, soonest first
#[derive(Debug, Default)]
pub struct Timers {
    alarms: Vec<Alarm>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an alarm `duration` from now
    pub fn schedule(&mut self, label: impl Into<String>, duration: Duration) {
        self.alarms.push(Alarm {
            label: label.into(),
            due: Instant::now() + duration,
        });
        self.alarms.sort_by_key(|alarm| alarm.due);
    }

    /// Remove and return every alarm due at `now`
    pub fn take_due(&mut self, now: Instant) -> Vec<Alarm> {
        let split = self.alarms.partition_point(|alarm| alarm.due <= now);
        self.alarms.drain(..split).collect()
    }

    /// Number of pending alarms
    pub fn pending(&self) -> usize {
        self.alarms.len()
    }
}

/// Pull a duration out of a spoken timer command.
///
/// Understands "N second(s)", "N minute(s)" and "N hour(s)", plus a few
/// spoken digits. Returns `None` when no duration is present.
pub fn parse_duration(command: &str) -> Option<Duration> {
    let words: Vec<&str> = command.split_whitespace().collect();

    for (i, word) in words.iter().enumerate() {
        let unit_secs = match word.trim_end_matches('s') {
            "second" => 1,
            "minute" => 60,
            "hour" => 3600,
            _ => continue,
        };

        // The quantity precedes the unit ("five minutes", "30 seconds")
        let quantity = i
            .checked_sub(1)
            .and_then(|j| parse_quantity(words[j]))
            .unwrap_or(1);

        return Some(Duration::from_secs(quantity * unit_secs));
    }

    None
}

fn parse_quantity(word: &str) -> Option<u64> {
    if let Ok(n) = word.parse::<u64>() {
        return Some(n);
    }
    match word {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "ten" => Some(10),
        "fifteen" => Some(15),
        "twenty" => Some(20),
        "thirty" => Some(30),
        _ => None,
    }
}
