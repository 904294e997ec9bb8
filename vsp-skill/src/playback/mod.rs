//! Playback continuity core
//!
//! Classification of inbound requests, the pure transition engine and the
//! actions it emits.

pub mod action;
pub mod classifier;
pub mod engine;

pub use action::{PlayBehavior, PlaybackAction};
pub use classifier::classify;
pub use engine::{transition, Transition};
