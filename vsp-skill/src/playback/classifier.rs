//! Event classifier
//!
//! Maps an inbound request onto exactly one [`PlaybackEvent`]. Rules are
//! tried in order and the first whose predicate matches wins; the final
//! rule catches any remaining intent request. Anything left over, or any
//! rule that fails while building its event, becomes `UnroutableError`.

use crate::error::{Error, Result};
use crate::request::Request;
use tracing::warn;
use vsp_common::PlaybackEvent;

/// One entry of the ordered rule list
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Request) -> bool,
    pub build: fn(&Request) -> Result<PlaybackEvent>,
}

const INTENT_REQUEST: &str = "IntentRequest";

/// Ordered rule list; order matters only for the trailing catch-all
pub const RULES: &[Rule] = &[
    Rule {
        name: "launch",
        matches: |r| is_request_type(r, "LaunchRequest"),
        build: |_| Ok(PlaybackEvent::Launch),
    },
    Rule {
        name: "help",
        matches: |r| is_intent(r, &["AMAZON.HelpIntent"]),
        build: |_| Ok(PlaybackEvent::Help),
    },
    Rule {
        name: "play",
        matches: |r| is_intent(r, &["PlayAudio"]),
        build: |_| Ok(PlaybackEvent::PlayFresh),
    },
    Rule {
        name: "resume",
        matches: |r| is_intent(r, &["AMAZON.ResumeIntent"]),
        build: |_| Ok(PlaybackEvent::Resume),
    },
    Rule {
        // Utterances like "stop" arrive as PauseIntent while audio is playing
        name: "stop",
        matches: |r| {
            is_intent(
                r,
                &["AMAZON.CancelIntent", "AMAZON.StopIntent", "AMAZON.PauseIntent"],
            )
        },
        build: |_| Ok(PlaybackEvent::Stop),
    },
    Rule {
        name: "next",
        matches: |r| is_intent(r, &["AMAZON.NextIntent"]),
        build: |_| Ok(PlaybackEvent::Next),
    },
    Rule {
        name: "previous",
        matches: |r| is_intent(r, &["AMAZON.PreviousIntent"]),
        build: |_| Ok(PlaybackEvent::Previous),
    },
    Rule {
        name: "start_over",
        matches: |r| is_intent(r, &["AMAZON.StartOverIntent"]),
        build: |_| Ok(PlaybackEvent::StartOver),
    },
    Rule {
        name: "playback_started",
        matches: |r| is_request_type(r, "AudioPlayer.PlaybackStarted"),
        build: |_| Ok(PlaybackEvent::PlaybackStarted),
    },
    Rule {
        name: "playback_finished",
        matches: |r| is_request_type(r, "AudioPlayer.PlaybackFinished"),
        build: |_| Ok(PlaybackEvent::PlaybackFinished),
    },
    Rule {
        name: "playback_stopped",
        matches: |r| is_request_type(r, "AudioPlayer.PlaybackStopped"),
        build: playback_stopped,
    },
    Rule {
        name: "playback_nearly_finished",
        matches: |r| is_request_type(r, "AudioPlayer.PlaybackNearlyFinished"),
        build: |_| Ok(PlaybackEvent::PlaybackNearlyFinished),
    },
    Rule {
        name: "playback_failed",
        matches: |r| is_request_type(r, "AudioPlayer.PlaybackFailed"),
        build: |r| {
            Ok(PlaybackEvent::PlaybackFailed {
                reason: r.error_description(),
            })
        },
    },
    Rule {
        name: "system_exception",
        matches: |r| is_request_type(r, "System.ExceptionEncountered"),
        build: |r| {
            Ok(PlaybackEvent::SystemException {
                reason: r.error_description(),
            })
        },
    },
    Rule {
        name: "session_ended",
        matches: |r| is_request_type(r, "SessionEndedRequest"),
        build: |_| Ok(PlaybackEvent::SessionEnded),
    },
    // Must stay last: matches every intent request
    Rule {
        name: "intent_reflector",
        matches: |r| is_request_type(r, INTENT_REQUEST),
        build: |r| {
            let name = r.intent_name().ok_or_else(|| {
                Error::Classification("IntentRequest without an intent name".to_string())
            })?;
            Ok(PlaybackEvent::UnknownIntent {
                name: name.to_string(),
            })
        },
    },
];

fn is_request_type(request: &Request, request_type: &str) -> bool {
    request.request_type == request_type
}

fn is_intent(request: &Request, names: &[&str]) -> bool {
    is_request_type(request, INTENT_REQUEST)
        && request.intent_name().is_some_and(|name| names.contains(&name))
}

fn playback_stopped(request: &Request) -> Result<PlaybackEvent> {
    let offset = request.offset_in_milliseconds.ok_or_else(|| {
        Error::Classification("PlaybackStopped without offsetInMilliseconds".to_string())
    })?;

    let offset_ms = if offset < 0 {
        warn!("PlaybackStopped reported negative offset {}ms, using 0", offset);
        0
    } else {
        offset as u64
    };

    Ok(PlaybackEvent::PlaybackStopped { offset_ms })
}

/// Classify a request, surfacing failures
pub fn try_classify(request: &Request) -> Result<PlaybackEvent> {
    for rule in RULES {
        if (rule.matches)(request) {
            return (rule.build)(request);
        }
    }

    Err(Error::Classification(format!(
        "No rule matches request type '{}'",
        request.request_type
    )))
}

/// Classify a request; total over all inputs
pub fn classify(request: &Request) -> PlaybackEvent {
    match try_classify(request) {
        Ok(event) => event,
        Err(e) => {
            warn!("{}", e);
            PlaybackEvent::UnroutableError
        }
    }
}
