//! # VSP Common Library
//!
//! Shared code for the Voice Skill Player including:
//! - Track catalog (immutable, loaded once at startup)
//! - Persisted playback record and its in-memory state form
//! - Playback event taxonomy consumed by the transition engine
//! - Bootstrap configuration loading
//! - Database initialization

pub mod catalog;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod playback;

pub use catalog::{Catalog, Track};
pub use error::{Error, Result};
pub use events::PlaybackEvent;
pub use playback::{PlaybackRecord, PlaybackSettings, PlaybackState};
