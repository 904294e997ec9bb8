//! Outbound response envelope
//!
//! Serializes to the voice platform's response JSON. Absent parts are
//! omitted entirely; an empty envelope is a valid reply to lifecycle
//! callbacks.

use crate::playback::PlayBehavior;
use serde::{Deserialize, Serialize};

pub const RESPONSE_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        OutputSpeech::PlainText { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            OutputSpeech::PlainText { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Card {
    Standard {
        title: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<CardImage>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    pub small_image_url: String,
    pub large_image_url: String,
}

/// AudioPlayer directives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "AudioPlayer.Play")]
    Play(PlayDirective),
    #[serde(rename = "AudioPlayer.Stop")]
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayDirective {
    pub play_behavior: PlayBehavior,
    pub audio_item: AudioItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioItem {
    pub stream: Stream,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    /// Media key of the track; echoed back in AudioPlayer callbacks
    pub token: String,
    pub url: String,
    pub offset_in_milliseconds: u64,
    /// Only set for enqueue; the client drops the item if it no longer matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_previous_token: Option<String>,
}

impl Directive {
    pub fn play(behavior: PlayBehavior, stream: Stream) -> Self {
        Directive::Play(PlayDirective {
            play_behavior: behavior,
            audio_item: AudioItem { stream },
        })
    }
}

impl ResponseEnvelope {
    /// Envelope with no speech, card or directives
    pub fn empty() -> Self {
        ResponseBuilder::new().build()
    }
}

/// Incremental envelope construction
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    body: ResponseBody,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(mut self, text: impl Into<String>) -> Self {
        self.body.output_speech = Some(OutputSpeech::plain(text));
        self
    }

    /// Reprompt text; keeps the session open
    pub fn ask(mut self, text: impl Into<String>) -> Self {
        self.body.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::plain(text),
        });
        self.body.should_end_session = Some(false);
        self
    }

    pub fn card(mut self, card: Card) -> Self {
        self.body.card = Some(card);
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.body.directives.push(directive);
        self
    }

    pub fn end_session(mut self, end: bool) -> Self {
        self.body.should_end_session = Some(end);
        self
    }

    pub fn build(self) -> ResponseEnvelope {
        ResponseEnvelope {
            version: RESPONSE_VERSION.to_string(),
            response: self.body,
        }
    }
}
