//! Assistant Loop and Shared Handle
//!
//! Two threads of control share this module: the voice loop (blocks on
//! microphone, network, synthesis) and the face's render tick (never
//! blocks). They meet in [`AssistantHandle`], a cluster of fields the
//! voice loop writes and the face reads optimistically once per frame.
//! A one-frame-stale read is harmless, so there are no channels and no
//! locking beyond a small mutex around the caption text.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::chat::ChatClient;
use crate::config::OttoConfig;
use crate::emotion::{Emotion, EmotionModel};
use crate::speech::{SpeechRecognizer, SpeechSynthesizer};
use crate::status::AssistantStatus;
use crate::timers::{self, Timers};

/// System prompt for the chat backend
const SYSTEM_PROMPT: &str =
    "You are Otto, a small desk companion. Answer briefly and warmly; two sentences at most.";

/// How long the wake acknowledgement lingers before listening resumes
const WAKE_ACK_PAUSE: Duration = Duration::from_millis(400);

/// Back-off after a silent listen so the loop never spins
const LISTEN_IDLE_PAUSE: Duration = Duration::from_millis(250);

struct Shared {
    status: AtomicU8,
    talking: AtomicBool,
    quit: AtomicBool,
    /// Caption text plus a generation counter so the face can detect
    /// changes without comparing strings
    caption: Mutex<String>,
    caption_generation: AtomicU64,
}

/// Cloneable handle to the assistant's observable state.
///
/// The face polls this once per frame; the voice loop writes it whenever
/// something happens. Reads and writes are individually atomic; there is
/// no synchronization between fields.
#[derive(Clone)]
pub struct AssistantHandle {
    inner: Arc<Shared>,
}

impl AssistantHandle {
    /// Fresh handle in the idle state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                status: AtomicU8::new(AssistantStatus::Idle as u8),
                talking: AtomicBool::new(false),
                quit: AtomicBool::new(false),
                caption: Mutex::new(String::new()),
                caption_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Current status (possibly one frame stale)
    pub fn status(&self) -> AssistantStatus {
        AssistantStatus::from_u8(self.inner.status.load(Ordering::Relaxed))
    }

    /// Move to a new status
    pub fn set_status(&self, status: AssistantStatus) {
        self.inner.status.store(status as u8, Ordering::Relaxed);
        tracing::info!(status = status.description(), "assistant status");
    }

    /// Whether the mouth should lip-sync right now
    pub fn talking(&self) -> bool {
        self.inner.talking.load(Ordering::Relaxed)
    }

    /// Toggle the lip-sync flag
    pub fn set_talking(&self, talking: bool) {
        self.inner.talking.store(talking, Ordering::Relaxed);
    }

    /// Replace the caption text
    pub fn set_caption(&self, text: impl Into<String>) {
        *self.inner.caption.lock() = text.into();
        self.inner
            .caption_generation
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Caption text plus its generation counter. The face resets its fade
    /// clock whenever the generation moves.
    pub fn caption(&self) -> (String, u64) {
        let text = self.inner.caption.lock().clone();
        let generation = self.inner.caption_generation.load(Ordering::Relaxed);
        (text, generation)
    }

    /// Ask everything to shut down
    pub fn request_quit(&self) {
        self.inner.quit.store(true, Ordering::Relaxed);
    }

    /// Whether shutdown was requested by either side
    pub fn quit_requested(&self) -> bool {
        self.inner.quit.load(Ordering::Relaxed)
    }
}

impl Default for AssistantHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The voice loop: wake word, command capture, chat, speech.
///
/// Owns its collaborators outright; the synthesizer is only ever driven
/// from this loop, which is what serializes speech output.
pub struct Assistant {
    handle: AssistantHandle,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    chat: ChatClient,
    emotions: EmotionModel,
    timers: Timers,
    wake_word: String,
}

impl Assistant {
    /// Wire up an assistant from config and collaborators
    pub fn new(
        config: &OttoConfig,
        handle: AssistantHandle,
        recognizer: Box<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            handle,
            recognizer,
            synthesizer,
            chat: ChatClient::new(&config.backend)?,
            emotions: EmotionModel::new(),
            timers: Timers::new(),
            wake_word: config.wake_word.to_lowercase(),
        })
    }

    /// Run until goodbye or an external quit request.
    ///
    /// Every error inside one turn of the loop is absorbed into the Error
    /// status and a caption; the loop only ends on goodbye or quit.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        while !self.handle.quit_requested() {
            self.fire_due_timers().await;
            self.handle.set_status(AssistantStatus::ListeningWake);

            let heard = match self.recognizer.listen().await {
                Ok(Some(phrase)) => phrase.to_lowercase(),
                Ok(None) => {
                    tokio::time::sleep(LISTEN_IDLE_PAUSE).await;
                    continue;
                }
                Err(err) => {
                    self.report_error(&format!("microphone trouble: {err}")).await;
                    continue;
                }
            };

            if !heard.contains(&self.wake_word) {
                continue;
            }

            self.handle.set_status(AssistantStatus::WakeDetected);
            self.emotions.set_emotion(Emotion::Happy, 0.8);
            tokio::time::sleep(WAKE_ACK_PAUSE).await;

            self.handle.set_status(AssistantStatus::ListeningCommand);
            let command = match self.recognizer.listen().await {
                Ok(Some(phrase)) => phrase.to_lowercase(),
                Ok(None) => {
                    self.handle.set_status(AssistantStatus::Idle);
                    continue;
                }
                Err(err) => {
                    self.report_error(&format!("microphone trouble: {err}")).await;
                    continue;
                }
            };

            if command.contains("goodbye") || command.contains("good bye") {
                self.handle.set_status(AssistantStatus::Goodbye);
                self.say("Goodbye! Talk soon.").await;
                self.handle.request_quit();
                break;
            }

            self.handle_command(&command).await;
        }

        Ok(())
    }

    /// Dispatch a captured command
    async fn handle_command(&mut self, command: &str) {
        // Timer requests are handled locally, no backend round-trip
        if command.contains("timer") {
            if let Some(duration) = timers::parse_duration(command) {
                self.timers.schedule("Timer is up!", duration);
                self.say(&format!(
                    "Timer set for {} seconds.",
                    duration.as_secs()
                ))
                .await;
                self.handle.set_status(AssistantStatus::Idle);
                return;
            }
        }

        if command.contains("how are you") || command.contains("how do you feel") {
            let feeling = format!("I'm {}.", self.emotions.describe());
            self.say(&feeling).await;
            self.handle.set_status(AssistantStatus::Idle);
            return;
        }

        self.handle.set_status(AssistantStatus::ProcessingCommand);
        self.emotions.set_emotion(Emotion::Focused, 0.7);

        match self.chat.ask(Some(SYSTEM_PROMPT), command).await {
            Ok(reply) => {
                self.handle.set_caption(&reply);
                self.say(&reply).await;
                self.handle.set_status(AssistantStatus::FinishedResponse);
                self.emotions.set_emotion(Emotion::Happy, 0.6);
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.report_error("Sorry, I couldn't reach my brain just now.")
                    .await;
            }
        }

        self.emotions.decay(Instant::now());
        self.handle.set_status(AssistantStatus::Idle);
    }

    /// Announce any alarms that have come due
    async fn fire_due_timers(&mut self) {
        for alarm in self.timers.take_due(Instant::now()) {
            self.handle.set_caption(&alarm.label);
            self.say(&alarm.label).await;
        }
    }

    /// Speak with the lip-sync flag held for the duration
    async fn say(&mut self, text: &str) {
        self.handle.set_talking(true);
        if let Err(err) = self.synthesizer.say(text).await {
            tracing::warn!(error = %err, "speech synthesis failed");
        }
        self.handle.set_talking(false);
    }

    async fn report_error(&mut self, message: &str) {
        self.handle.set_status(AssistantStatus::Error);
        self.handle.set_caption(message);
        self.say(message).await;
        self.handle.set_status(AssistantStatus::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{ScriptedRecognizer, SilentSynthesizer};

    fn test_assistant(phrases: Vec<&str>) -> Assistant {
        let config = OttoConfig::default();
        Assistant::new(
            &config,
            AssistantHandle::new(),
            Box::new(ScriptedRecognizer::new(
                phrases.into_iter().map(String::from).collect(),
            )),
            Box::new(SilentSynthesizer),
        )
        .unwrap()
    }

    #[test]
    fn test_handle_starts_idle_and_silent() {
        let handle = AssistantHandle::new();
        assert_eq!(handle.status(), AssistantStatus::Idle);
        assert!(!handle.talking());
        assert!(!handle.quit_requested());
    }

    #[test]
    fn test_caption_generation_moves_on_set() {
        let handle = AssistantHandle::new();
        let (_, gen_before) = handle.caption();
        handle.set_caption("hello");
        let (text, gen_after) = handle.caption();
        assert_eq!(text, "hello");
        assert!(gen_after > gen_before);
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = AssistantHandle::new();
        let clone = handle.clone();
        handle.set_status(AssistantStatus::ProcessingCommand);
        assert_eq!(clone.status(), AssistantStatus::ProcessingCommand);
    }

    #[tokio::test]
    async fn test_goodbye_ends_the_loop() {
        let mut assistant = test_assistant(vec!["hey otto", "goodbye otto"]);
        let handle = assistant.handle.clone();
        assistant.run().await.unwrap();
        assert!(handle.quit_requested());
        assert_eq!(handle.status(), AssistantStatus::Goodbye);
    }

    #[tokio::test]
    async fn test_timer_command_schedules_locally() {
        let mut assistant = test_assistant(vec![]);
        assistant
            .handle_command("set a timer for five minutes")
            .await;
        assert_eq!(assistant.timers.pending(), 1);
        assert_eq!(assistant.handle.status(), AssistantStatus::Idle);
    }

    #[tokio::test]
    async fn test_feeling_query_skips_the_backend() {
        let mut assistant = test_assistant(vec![]);
        assistant.handle_command("how are you today").await;
        assert_eq!(assistant.handle.status(), AssistantStatus::Idle);
    }
}
