//! Action rendering
//!
//! Turns a [`PlaybackAction`] into a response envelope. Catalog indices are
//! resolved to signed stream URLs here; a signing failure fails the whole
//! render of a playback action so the caller can answer with an apology and
//! persist nothing. Speech responses never depend on the signer.

use super::envelope::{Card, CardImage, Directive, ResponseBuilder, ResponseEnvelope, Stream};
use crate::error::Result;
use crate::playback::{PlayBehavior, PlaybackAction};
use crate::signing::UrlSigner;
use tracing::warn;
use vsp_common::config::CardConfig;
use vsp_common::Catalog;

pub const WELCOME_SPEECH: &str = "Hello, I can play your music, just say play my music";
pub const HELP_SPEECH: &str = "Just say play my music";
pub const PLAYING_SPEECH: &str = "Playing your music";
pub const PAUSED_SPEECH: &str = "Paused";
pub const APOLOGY_SPEECH: &str = "Sorry, I had trouble doing what you asked. Please try again.";

/// Rendered response plus the stream URL it handed out, if any
#[derive(Debug, Clone)]
pub struct Rendered {
    pub envelope: ResponseEnvelope,
    pub stream_url: Option<String>,
}

impl Rendered {
    fn speech_only(envelope: ResponseEnvelope) -> Self {
        Self {
            envelope,
            stream_url: None,
        }
    }
}

pub struct ResponseAssembler<'a> {
    catalog: &'a Catalog,
    signer: &'a dyn UrlSigner,
    card: &'a CardConfig,
}

impl<'a> ResponseAssembler<'a> {
    pub fn new(catalog: &'a Catalog, signer: &'a dyn UrlSigner, card: &'a CardConfig) -> Self {
        Self {
            catalog,
            signer,
            card,
        }
    }

    pub fn render(&self, action: &PlaybackAction) -> Result<Rendered> {
        match action {
            PlaybackAction::Welcome => Ok(Rendered::speech_only(
                ResponseBuilder::new()
                    .speak(WELCOME_SPEECH)
                    .card(self.skill_card())
                    .ask(WELCOME_SPEECH)
                    .build(),
            )),

            PlaybackAction::Help => Ok(Rendered::speech_only(
                ResponseBuilder::new().speak(HELP_SPEECH).ask(HELP_SPEECH).build(),
            )),

            PlaybackAction::StartPlayback {
                index,
                offset_ms,
                behavior,
                announce,
            } => {
                let track = self.catalog.track(*index);
                let url = self.signer.sign(&track.media_key)?;
                let stream = Stream {
                    token: track.media_key.clone(),
                    url: url.clone(),
                    offset_in_milliseconds: *offset_ms,
                    expected_previous_token: None,
                };

                let mut builder = ResponseBuilder::new();
                if *announce {
                    builder = builder.speak(PLAYING_SPEECH);
                }
                let envelope = builder
                    .card(self.track_card(*index)?)
                    .directive(Directive::play(*behavior, stream))
                    .end_session(true)
                    .build();

                Ok(Rendered {
                    envelope,
                    stream_url: Some(url),
                })
            }

            // Look-ahead replies to an AudioPlayer callback: directive only,
            // no speech, card or session flag
            PlaybackAction::EnqueueNext {
                index,
                expected_previous_token,
            } => {
                let track = self.catalog.track(*index);
                let url = self.signer.sign(&track.media_key)?;
                let stream = Stream {
                    token: track.media_key.clone(),
                    url: url.clone(),
                    offset_in_milliseconds: 0,
                    expected_previous_token: Some(expected_previous_token.clone()),
                };

                Ok(Rendered {
                    envelope: ResponseBuilder::new()
                        .directive(Directive::play(PlayBehavior::Enqueue, stream))
                        .build(),
                    stream_url: Some(url),
                })
            }

            PlaybackAction::StopPlayback => Ok(Rendered::speech_only(
                ResponseBuilder::new()
                    .speak(PAUSED_SPEECH)
                    .directive(Directive::Stop)
                    .end_session(true)
                    .build(),
            )),

            PlaybackAction::Reflect { intent_name } => Ok(Rendered::speech_only(
                ResponseBuilder::new()
                    .speak(format!("You just triggered {}.", intent_name))
                    .build(),
            )),

            PlaybackAction::Apology => Ok(Rendered::speech_only(apology())),

            PlaybackAction::Silent => Ok(Rendered::speech_only(ResponseEnvelope::empty())),
        }
    }

    fn card_image(&self) -> Result<CardImage> {
        Ok(CardImage {
            small_image_url: self.signer.sign(&self.card.small_image_key)?,
            large_image_url: self.signer.sign(&self.card.large_image_key)?,
        })
    }

    /// Track title and artist with the skill artwork
    fn track_card(&self, index: usize) -> Result<Card> {
        let track = self.catalog.track(index);
        Ok(Card::Standard {
            title: track.title.clone(),
            text: track.artist.clone(),
            image: Some(self.card_image()?),
        })
    }

    /// Greeting card; artwork is dropped when it cannot be signed
    fn skill_card(&self) -> Card {
        let image = match self.card_image() {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Welcome card sent without artwork: {}", e);
                None
            }
        };

        Card::Standard {
            title: self.card.title.clone(),
            text: self.card.text.clone(),
            image,
        }
    }
}

/// Generic failure reply; needs no catalog or signer
pub fn apology() -> ResponseEnvelope {
    ResponseBuilder::new()
        .speak(APOLOGY_SPEECH)
        .ask(APOLOGY_SPEECH)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use vsp_common::catalog::TrackEntry;

    struct FakeSigner;

    impl UrlSigner for FakeSigner {
        fn sign(&self, media_key: &str) -> Result<String> {
            Ok(format!("https://signed/{}", media_key))
        }
    }

    struct FailingSigner;

    impl UrlSigner for FailingSigner {
        fn sign(&self, _media_key: &str) -> Result<String> {
            Err(Error::Signing("media host offline".to_string()))
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            (0..3)
                .map(|i| TrackEntry {
                    title: format!("Track {}", i),
                    artist: format!("Artist {}", i),
                    media_key: format!("Media/track{}.mp3", i),
                })
                .collect(),
        )
        .unwrap()
    }

    fn render(action: PlaybackAction) -> Rendered {
        let catalog = catalog();
        let card = CardConfig::default();
        ResponseAssembler::new(&catalog, &FakeSigner, &card)
            .render(&action)
            .unwrap()
    }

    fn play_stream(envelope: &ResponseEnvelope) -> (PlayBehavior, &Stream) {
        match envelope.response.directives.as_slice() {
            [Directive::Play(play)] => (play.play_behavior, &play.audio_item.stream),
            other => panic!("expected one play directive, got {:?}", other),
        }
    }

    #[test]
    fn test_start_playback_announced() {
        let rendered = render(PlaybackAction::StartPlayback {
            index: 0,
            offset_ms: 0,
            behavior: PlayBehavior::ReplaceAll,
            announce: true,
        });
        let response = &rendered.envelope.response;

        assert_eq!(response.output_speech.as_ref().map(|s| s.text()), Some(PLAYING_SPEECH));
        assert_eq!(response.should_end_session, Some(true));
        assert_eq!(rendered.stream_url.as_deref(), Some("https://signed/Media/track0.mp3"));

        let (behavior, stream) = play_stream(&rendered.envelope);
        assert_eq!(behavior, PlayBehavior::ReplaceAll);
        assert_eq!(stream.token, "Media/track0.mp3");
        assert_eq!(stream.url, "https://signed/Media/track0.mp3");
        assert_eq!(stream.offset_in_milliseconds, 0);
        assert!(stream.expected_previous_token.is_none());

        match &response.card {
            Some(Card::Standard { title, text, image }) => {
                assert_eq!(title, "Track 0");
                assert_eq!(text, "Artist 0");
                let image = image.as_ref().unwrap();
                assert_eq!(image.small_image_url, "https://signed/Media/Note108.png");
                assert_eq!(image.large_image_url, "https://signed/Media/Note512.png");
            }
            None => panic!("playback response without card"),
        }
    }

    #[test]
    fn test_resume_is_silent_with_offset() {
        let rendered = render(PlaybackAction::StartPlayback {
            index: 1,
            offset_ms: 12345,
            behavior: PlayBehavior::ReplaceAll,
            announce: false,
        });
        assert!(rendered.envelope.response.output_speech.is_none());
        let (_, stream) = play_stream(&rendered.envelope);
        assert_eq!(stream.offset_in_milliseconds, 12345);
        assert_eq!(stream.token, "Media/track1.mp3");
    }

    #[test]
    fn test_enqueue_next() {
        let rendered = render(PlaybackAction::EnqueueNext {
            index: 2,
            expected_previous_token: "Media/track1.mp3".to_string(),
        });
        let response = &rendered.envelope.response;
        assert!(response.output_speech.is_none());
        assert!(response.card.is_none());
        assert!(response.should_end_session.is_none());

        let (behavior, stream) = play_stream(&rendered.envelope);
        assert_eq!(behavior, PlayBehavior::Enqueue);
        assert_eq!(stream.token, "Media/track2.mp3");
        assert_eq!(stream.expected_previous_token.as_deref(), Some("Media/track1.mp3"));
    }

    #[test]
    fn test_stop() {
        let rendered = render(PlaybackAction::StopPlayback);
        let response = &rendered.envelope.response;
        assert_eq!(response.output_speech.as_ref().map(|s| s.text()), Some(PAUSED_SPEECH));
        assert_eq!(response.directives, vec![Directive::Stop]);
        assert_eq!(response.should_end_session, Some(true));
        assert!(rendered.stream_url.is_none());
    }

    #[test]
    fn test_speech_responses() {
        let welcome = render(PlaybackAction::Welcome).envelope.response;
        assert_eq!(welcome.output_speech.as_ref().map(|s| s.text()), Some(WELCOME_SPEECH));
        assert_eq!(welcome.should_end_session, Some(false));
        assert!(matches!(welcome.card, Some(Card::Standard { ref title, .. }) if title == "My music"));

        let help = render(PlaybackAction::Help).envelope.response;
        assert_eq!(help.reprompt.as_ref().map(|r| r.output_speech.text()), Some(HELP_SPEECH));

        let reflect = render(PlaybackAction::Reflect {
            intent_name: "AMAZON.ShuffleOnIntent".to_string(),
        })
        .envelope
        .response;
        assert_eq!(
            reflect.output_speech.as_ref().map(|s| s.text()),
            Some("You just triggered AMAZON.ShuffleOnIntent.")
        );

        let sorry = render(PlaybackAction::Apology).envelope.response;
        assert_eq!(sorry.output_speech.as_ref().map(|s| s.text()), Some(APOLOGY_SPEECH));
        assert_eq!(sorry.should_end_session, Some(false));
    }

    #[test]
    fn test_silent_is_empty() {
        let rendered = render(PlaybackAction::Silent);
        assert_eq!(rendered.envelope, ResponseEnvelope::empty());
    }

    #[test]
    fn test_signing_failure_fails_render() {
        let catalog = catalog();
        let card = CardConfig::default();
        let assembler = ResponseAssembler::new(&catalog, &FailingSigner, &card);

        let result = assembler.render(&PlaybackAction::StartPlayback {
            index: 0,
            offset_ms: 0,
            behavior: PlayBehavior::ReplaceAll,
            announce: false,
        });
        assert!(matches!(result, Err(Error::Signing(_))));

        // Speech-only actions that need no artwork still render
        assert!(assembler.render(&PlaybackAction::StopPlayback).is_ok());
        assert!(assembler.render(&PlaybackAction::Silent).is_ok());
    }

    #[test]
    fn test_welcome_survives_signing_failure() {
        let catalog = catalog();
        let card = CardConfig::default();
        let assembler = ResponseAssembler::new(&catalog, &FailingSigner, &card);

        let welcome = assembler.render(&PlaybackAction::Welcome).unwrap().envelope.response;
        assert_eq!(welcome.output_speech.as_ref().map(|s| s.text()), Some(WELCOME_SPEECH));
        assert_eq!(welcome.should_end_session, Some(false));
        match welcome.card {
            Some(Card::Standard { title, image, .. }) => {
                assert_eq!(title, "My music");
                assert!(image.is_none());
            }
            None => panic!("welcome response without card"),
        }

        let help = assembler.render(&PlaybackAction::Help).unwrap().envelope.response;
        assert_eq!(help.output_speech.as_ref().map(|s| s.text()), Some(HELP_SPEECH));
    }
}
