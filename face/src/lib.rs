//! Otto Face - Terminal Face for the Otto Voice Companion
//!
//! A pair of glowing robot eyes (plus brows, mouth and caption) rendered
//! into the terminal at a fixed tick, driven by status changes from the
//! voice loop in `otto-core`.
//!
//! # Architecture
//!
//! - **Face**: animation scheduler, easing engine and per-behavior state
//! - **Renderer**: half-block pixel surface, pure consumer of resolved frames
//! - **Bridge**: per-frame translation from assistant status to face inputs
//! - **App**: the event/render loop host

pub mod app;
pub mod bridge;
pub mod face;

pub use app::App;
