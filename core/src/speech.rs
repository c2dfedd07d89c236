//! Speech Collaborator Interfaces
//!
//! Traits for the microphone and the synthesizer. Recognition quality
//! and voice quality are someone else's problem; the assistant only needs
//! "give me a phrase" and "say this". Blocking audio backends implement
//! these by parking their work on a blocking task; the loop itself stays
//! async.

use async_trait::async_trait;

/// Listens on the microphone and yields recognized phrases
#[async_trait]
pub trait SpeechRecognizer: Send {
    /// Block until a phrase is heard, or `None` on silence/timeout.
    async fn listen(&mut self) -> anyhow::Result<Option<String>>;
}

/// Speaks text out loud
#[async_trait]
pub trait SpeechSynthesizer: Send {
    /// Speak to completion. Callers serialize access; implementations may
    /// assume one utterance at a time.
    async fn say(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Recognizer that replays a fixed script, then reports silence.
///
/// Used by tests and by `--demo` runs where no microphone exists.
pub struct ScriptedRecognizer {
    phrases: std::vec::IntoIter<String>,
}

impl ScriptedRecognizer {
    /// Create from a list of phrases to "hear" in order
    pub fn new(phrases: Vec<String>) -> Self {
        Self {
            phrases: phrases.into_iter(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn listen(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.phrases.next())
    }
}

/// Synthesizer that drops everything on the floor
pub struct SilentSynthesizer;

#[async_trait]
impl SpeechSynthesizer for SilentSynthesizer {
    async fn say(&mut self, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
