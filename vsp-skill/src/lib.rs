//! # VSP Skill Library (vsp-skill)
//!
//! Playback continuity for a voice-driven audio player.
//!
//! **Purpose:** Classify voice platform requests, advance each user's
//! persisted position through the track catalog, and answer with play, stop
//! or enqueue directives carrying signed stream URLs.
//!
//! **Architecture:** pure classifier and transition engine wrapped by a
//! load/save invocation loop behind an axum endpoint.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod playback;
pub mod request;
pub mod response;
pub mod signing;
pub mod skill;

pub use error::{Error, Result};
pub use skill::Skill;
