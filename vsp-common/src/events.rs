//! Playback event taxonomy
//!
//! Every inbound invocation is classified into exactly one [`PlaybackEvent`].
//! Two disjoint sources feed this enum:
//! - user navigation commands (play, resume, stop, next, previous, start over)
//! - playback lifecycle callbacks reported by the audio platform
//!
//! The transition engine matches exhaustively on this enum, so adding a
//! category forces every consumer to decide how to handle it.

use serde::{Deserialize, Serialize};

/// Classified inbound event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlaybackEvent {
    /// Skill opened without a specific command
    Launch,
    Help,
    /// Start the playlist from the first track
    PlayFresh,
    /// Continue from the persisted track and offset
    Resume,
    /// Stop, pause, or cancel
    Stop,
    Next,
    Previous,
    /// Restart the current track from the beginning
    StartOver,

    // === Playback lifecycle callbacks ===
    PlaybackStarted,
    PlaybackFinished,
    /// Playback stopped at the reported offset
    PlaybackStopped {
        offset_ms: u64,
    },
    /// Current stream is about to end; time to queue the next one
    PlaybackNearlyFinished,
    PlaybackFailed {
        /// Platform-reported error description, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Platform reported an error caused by one of our responses
    SystemException {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    SessionEnded,

    // === Fallthrough ===
    /// Intent request that no command matches
    UnknownIntent {
        name: String,
    },
    /// Request could not be classified (or classification failed)
    UnroutableError,
}

impl PlaybackEvent {
    /// Explicit user navigation that replaces the playback queue
    ///
    /// These are the events that override a pending look-ahead.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            PlaybackEvent::PlayFresh
                | PlaybackEvent::Resume
                | PlaybackEvent::Next
                | PlaybackEvent::Previous
                | PlaybackEvent::StartOver
        )
    }

    /// Callback originating from the audio platform rather than the user
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            PlaybackEvent::PlaybackStarted
                | PlaybackEvent::PlaybackFinished
                | PlaybackEvent::PlaybackStopped { .. }
                | PlaybackEvent::PlaybackNearlyFinished
                | PlaybackEvent::PlaybackFailed { .. }
                | PlaybackEvent::SystemException { .. }
        )
    }
}

impl std::fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackEvent::Launch => write!(f, "Launch"),
            PlaybackEvent::Help => write!(f, "Help"),
            PlaybackEvent::PlayFresh => write!(f, "PlayFresh"),
            PlaybackEvent::Resume => write!(f, "Resume"),
            PlaybackEvent::Stop => write!(f, "Stop"),
            PlaybackEvent::Next => write!(f, "Next"),
            PlaybackEvent::Previous => write!(f, "Previous"),
            PlaybackEvent::StartOver => write!(f, "StartOver"),
            PlaybackEvent::PlaybackStarted => write!(f, "PlaybackStarted"),
            PlaybackEvent::PlaybackFinished => write!(f, "PlaybackFinished"),
            PlaybackEvent::PlaybackStopped { offset_ms } => {
                write!(f, "PlaybackStopped({}ms)", offset_ms)
            }
            PlaybackEvent::PlaybackNearlyFinished => write!(f, "PlaybackNearlyFinished"),
            PlaybackEvent::PlaybackFailed { .. } => write!(f, "PlaybackFailed"),
            PlaybackEvent::SystemException { .. } => write!(f, "SystemException"),
            PlaybackEvent::SessionEnded => write!(f, "SessionEnded"),
            PlaybackEvent::UnknownIntent { name } => write!(f, "UnknownIntent({})", name),
            PlaybackEvent::UnroutableError => write!(f, "UnroutableError"),
        }
    }
}
