//! Playback transition engine
//!
//! Pure mapping from (persisted state, classified event) to (next state,
//! action). No I/O; the result depends only on the catalog and the inputs.
//!
//! # Look-ahead hand-off
//!
//! The platform forbids starting a stream from a finished callback, so
//! automatic progression is split in two:
//! 1. `PlaybackNearlyFinished`: queue the next track and point the token at
//!    it, leaving the index on the audible track (`next_stream_enqueued = true`)
//! 2. `PlaybackFinished`: the queued track is now audible; advance the index
//!
//! Any explicit navigation in between takes the index as ground truth and
//! drops the pending look-ahead. Its replace-all play directive supersedes
//! whatever the client had queued.
//!
//! Forward movement wraps around the catalog; backward movement stops at the
//! first track.

use super::action::{PlayBehavior, PlaybackAction};
use tracing::{debug, info, warn};
use vsp_common::{Catalog, PlaybackEvent, PlaybackState};

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: PlaybackState,
    pub action: PlaybackAction,
}

impl Transition {
    fn new(state: PlaybackState, action: PlaybackAction) -> Self {
        Self { state, action }
    }

    fn silent(state: PlaybackState) -> Self {
        Self::new(state, PlaybackAction::Silent)
    }
}

/// Apply `event` to `state`
pub fn transition(catalog: &Catalog, state: PlaybackState, event: &PlaybackEvent) -> Transition {
    let state = state.normalized(catalog);

    if state.next_stream_enqueued && event.is_navigation() {
        info!(
            "{} during enqueue window: keeping track {} and discarding look-ahead {}",
            event, state.current_track_index, state.current_token
        );
    }

    match event {
        PlaybackEvent::Launch => Transition::new(state, PlaybackAction::Welcome),
        PlaybackEvent::Help => Transition::new(state, PlaybackAction::Help),

        PlaybackEvent::PlayFresh => start_track(catalog, 0, true),

        PlaybackEvent::Resume => {
            let index = state.current_track_index;
            let offset_ms = state.offset_ms;
            let state = PlaybackState {
                current_token: catalog.media_key(index).to_string(),
                next_stream_enqueued: false,
                ..state
            };
            Transition::new(state, start_playback(index, offset_ms, false))
        }

        PlaybackEvent::Next => start_track(catalog, next_index(catalog, state.current_track_index), false),

        PlaybackEvent::Previous => start_track(catalog, previous_index(state.current_track_index), false),

        PlaybackEvent::StartOver => start_track(catalog, state.current_track_index, false),

        PlaybackEvent::Stop => Transition::new(state, PlaybackAction::StopPlayback),

        PlaybackEvent::PlaybackNearlyFinished => enqueue_look_ahead(catalog, state),

        PlaybackEvent::PlaybackFinished => Transition::silent(reconcile_finished(catalog, state)),

        PlaybackEvent::PlaybackStopped { offset_ms } => {
            debug!(
                "Saving offset {}ms for track {}",
                offset_ms, state.current_track_index
            );
            Transition::silent(PlaybackState {
                offset_ms: *offset_ms,
                ..state
            })
        }

        PlaybackEvent::PlaybackStarted => {
            info!("Playback started on track {}", state.current_track_index);
            Transition::silent(state)
        }

        PlaybackEvent::PlaybackFailed { reason } => {
            warn!(
                "Playback failed on track {}: {}",
                state.current_track_index,
                reason.as_deref().unwrap_or("no reason given")
            );
            Transition::silent(state)
        }

        PlaybackEvent::SystemException { reason } => {
            warn!(
                "Platform reported exception: {}",
                reason.as_deref().unwrap_or("no details")
            );
            Transition::silent(state)
        }

        PlaybackEvent::SessionEnded => {
            info!("Session ended");
            Transition::silent(state)
        }

        PlaybackEvent::UnknownIntent { name } => Transition::new(
            state,
            PlaybackAction::Reflect {
                intent_name: name.clone(),
            },
        ),

        PlaybackEvent::UnroutableError => Transition::new(state, PlaybackAction::Apology),
    }
}

/// Forward step; wraps past the last track
pub fn next_index(catalog: &Catalog, index: usize) -> usize {
    (index + 1) % catalog.len()
}

/// Backward step; clamps at the first track
pub fn previous_index(index: usize) -> usize {
    index.saturating_sub(1)
}

fn start_playback(index: usize, offset_ms: u64, announce: bool) -> PlaybackAction {
    PlaybackAction::StartPlayback {
        index,
        offset_ms,
        behavior: PlayBehavior::ReplaceAll,
        announce,
    }
}

/// Play `index` from the beginning, replacing the client queue
fn start_track(catalog: &Catalog, index: usize, announce: bool) -> Transition {
    let state = PlaybackState {
        current_track_index: index,
        offset_ms: 0,
        current_token: catalog.media_key(index).to_string(),
        next_stream_enqueued: false,
    };
    Transition::new(state, start_playback(index, 0, announce))
}

/// Queue the track after the audible one without moving the index
fn enqueue_look_ahead(catalog: &Catalog, state: PlaybackState) -> Transition {
    let look_ahead = next_index(catalog, state.current_track_index);

    // Chain onto whatever stream was last handed to the client
    let expected_previous_token = state.current_token.clone();

    debug!(
        "Enqueueing track {} after track {}",
        look_ahead, state.current_track_index
    );

    let state = PlaybackState {
        offset_ms: 0,
        current_token: catalog.media_key(look_ahead).to_string(),
        next_stream_enqueued: true,
        ..state
    };

    Transition::new(
        state,
        PlaybackAction::EnqueueNext {
            index: look_ahead,
            expected_previous_token,
        },
    )
}

/// Deferred index advance once a queued look-ahead has become audible
///
/// Without a pending look-ahead the finished stream was the last one the
/// client had, and the state stays where it is.
fn reconcile_finished(catalog: &Catalog, state: PlaybackState) -> PlaybackState {
    if !state.next_stream_enqueued {
        warn!(
            "Track {} finished with nothing enqueued; playlist holds at this track",
            state.current_track_index
        );
        return state;
    }

    let index = next_index(catalog, state.current_track_index);
    info!(
        "Look-ahead confirmed, advancing from track {} to {}",
        state.current_track_index, index
    );

    PlaybackState {
        current_track_index: index,
        next_stream_enqueued: false,
        ..state
    }
}
