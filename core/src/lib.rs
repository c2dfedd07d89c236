//! Otto Core - Headless Voice-Companion Logic
//!
//! This crate holds everything about Otto that is not the face: the
//! assistant status machine, the emotion model, the chat backend client,
//! the speech collaborator interfaces, the timer utility, and the shared
//! handle the render surface polls every frame.
//!
//! # Architecture
//!
//! The voice loop runs as its own task and blocks freely (microphone,
//! network, synthesis). The face polls an [`AssistantHandle`] once per
//! frame and tolerates a one-frame-stale status, so the handle uses plain
//! atomics and a small mutex rather than channels.

pub mod assistant;
pub mod chat;
pub mod config;
pub mod emotion;
pub mod error;
pub mod speech;
pub mod status;
pub mod timers;

pub use assistant::{Assistant, AssistantHandle};
pub use chat::{ChatClient, ChatRequest};
pub use config::OttoConfig;
pub use emotion::{Emotion, EmotionModel, Rgb};
pub use error::{ChatError, ConfigError};
pub use status::AssistantStatus;
