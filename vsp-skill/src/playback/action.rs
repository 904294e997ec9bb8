//! Outbound playback actions
//!
//! Produced by the transition engine, consumed by the response assembler.
//! Actions reference tracks by catalog index only; URLs are resolved at
//! render time.

use serde::{Deserialize, Serialize};

/// How a play directive treats the client's existing queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayBehavior {
    /// Stop current audio and replace the whole queue
    ReplaceAll,
    /// Append after the current stream (look-ahead)
    Enqueue,
}

impl std::fmt::Display for PlayBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayBehavior::ReplaceAll => write!(f, "REPLACE_ALL"),
            PlayBehavior::Enqueue => write!(f, "ENQUEUE"),
        }
    }
}

/// Action the response layer renders for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlaybackAction {
    /// Greeting with a prompt to start playback
    Welcome,
    Help,
    /// Play `index` from `offset_ms`, replacing the client queue
    StartPlayback {
        index: usize,
        offset_ms: u64,
        behavior: PlayBehavior,
        /// Speak a confirmation before playing
        announce: bool,
    },
    /// Queue `index` after the stream identified by `expected_previous_token`
    EnqueueNext {
        index: usize,
        expected_previous_token: String,
    },
    StopPlayback,
    /// Echo an unhandled intent name
    Reflect {
        intent_name: String,
    },
    /// Generic failure speech, session kept open
    Apology,
    /// No output (lifecycle callbacks)
    Silent,
}

impl std::fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackAction::Welcome => write!(f, "Welcome"),
            PlaybackAction::Help => write!(f, "Help"),
            PlaybackAction::StartPlayback {
                index,
                offset_ms,
                behavior,
                ..
            } => write!(f, "StartPlayback({}, {}ms, {})", index, offset_ms, behavior),
            PlaybackAction::EnqueueNext {
                index,
                expected_previous_token,
            } => write!(f, "EnqueueNext({}, after {})", index, expected_previous_token),
            PlaybackAction::StopPlayback => write!(f, "StopPlayback"),
            PlaybackAction::Reflect { intent_name } => write!(f, "Reflect({})", intent_name),
            PlaybackAction::Apology => write!(f, "Apology"),
            PlaybackAction::Silent => write!(f, "Silent"),
        }
    }
}
