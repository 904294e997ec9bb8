//! Invocation dispatch
//!
//! One invocation runs strictly in sequence:
//! classify -> load -> transition -> render -> save.
//!
//! Rendering happens before the save so a signing failure persists nothing.
//! Any error is absorbed here and answered with the apology response; the
//! caller always gets a well-formed envelope.
//!
//! Invocations for the same user are not serialised against each other. Two
//! overlapping invocations both load the same record and the later save wins.

use crate::db::{load_state, save_state, LoadedPlayback, PlaybackStore};
use crate::error::{Error, Result};
use crate::playback::{classify, transition, Transition};
use crate::request::RequestEnvelope;
use crate::response::{apology, ResponseAssembler, ResponseEnvelope};
use crate::signing::UrlSigner;
use std::sync::Arc;
use tracing::{error, info, warn};
use vsp_common::config::CardConfig;
use vsp_common::Catalog;

pub struct Skill<S> {
    catalog: Arc<Catalog>,
    store: S,
    signer: Arc<dyn UrlSigner>,
    card: CardConfig,
}

impl<S: PlaybackStore> Skill<S> {
    pub fn new(catalog: Arc<Catalog>, store: S, signer: Arc<dyn UrlSigner>, card: CardConfig) -> Self {
        Self {
            catalog,
            store,
            signer,
            card,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a raw request body; malformed JSON gets the apology response
    pub async fn handle_bytes(&self, body: &[u8]) -> ResponseEnvelope {
        match serde_json::from_slice::<RequestEnvelope>(body) {
            Ok(envelope) => self.handle(&envelope).await,
            Err(e) => {
                warn!("Rejecting malformed request body: {}", e);
                apology()
            }
        }
    }

    /// Handle one request envelope; never fails
    pub async fn handle(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        match self.invoke(envelope).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Invocation failed for request type '{}': {}",
                    envelope.request.request_type, e
                );
                apology()
            }
        }
    }

    /// Run one invocation, surfacing the first failure
    pub async fn invoke(&self, envelope: &RequestEnvelope) -> Result<ResponseEnvelope> {
        let user_id = envelope
            .user_id()
            .ok_or_else(|| Error::Classification("request carries no user identity".to_string()))?;

        let event = classify(&envelope.request);
        let loaded = load_state(&self.store, &self.catalog, user_id).await?;

        let Transition { state, action } = transition(&self.catalog, loaded.state, &event);
        info!("user={} event={} action={}", user_id, event, action);

        let rendered =
            ResponseAssembler::new(&self.catalog, self.signer.as_ref(), &self.card).render(&action)?;

        let url = rendered.stream_url.or(loaded.url);
        save_state(&self.store, user_id, &state, url).await?;

        Ok(rendered.envelope)
    }

    /// Persisted state for `user_id`, without saving anything
    pub async fn state_for(&self, user_id: &str) -> Result<LoadedPlayback> {
        load_state(&self.store, &self.catalog, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryPlaybackStore;
    use crate::response::assembler::{APOLOGY_SPEECH, PAUSED_SPEECH, PLAYING_SPEECH, WELCOME_SPEECH};
    use crate::response::Directive;
    use serde_json::json;
    use vsp_common::catalog::TrackEntry;
    use vsp_common::{PlaybackRecord, PlaybackState};

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

    struct FailingStore;

    impl PlaybackStore for FailingStore {
        async fn get(&self, _user_id: &str) -> Result<Option<PlaybackRecord>> {
            Err(Error::Persistence("store unavailable".to_string()))
        }

        async fn put(&self, _user_id: &str, _record: &PlaybackRecord) -> Result<()> {
            panic!("nothing may be saved after a failed load");
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(
                (0..5)
                    .map(|i| TrackEntry {
                        title: format!("Track {}", i),
                        artist: "Artist".to_string(),
                        media_key: format!("Media/track{}.mp3", i),
                    })
                    .collect(),
            )
            .unwrap(),
        )
    }

    fn skill_with<S: PlaybackStore>(store: S, signer: Arc<dyn UrlSigner>) -> Skill<S> {
        Skill::new(catalog(), store, signer, CardConfig::default())
    }

    fn skill() -> Skill<MemoryPlaybackStore> {
        skill_with(MemoryPlaybackStore::new(), Arc::new(FakeSigner))
    }

    fn intent(name: &str) -> RequestEnvelope {
        serde_json::from_value(json!({
            "version": "1.0",
            "context": { "System": { "user": { "userId": "user-1" } } },
            "request": { "type": "IntentRequest", "intent": { "name": name } }
        }))
        .unwrap()
    }

    fn callback(request_type: &str, offset: Option<i64>) -> RequestEnvelope {
        let mut request = json!({ "type": request_type, "token": "Media/track0.mp3" });
        if let Some(offset) = offset {
            request["offsetInMilliseconds"] = json!(offset);
        }
        serde_json::from_value(json!({
            "context": { "System": { "user": { "userId": "user-1" } } },
            "request": request
        }))
        .unwrap()
    }

    fn speech(response: &ResponseEnvelope) -> Option<&str> {
        response.response.output_speech.as_ref().map(|s| s.text())
    }

    #[tokio::test]
    async fn test_play_fresh_persists_state_and_url() {
        let skill = skill();
        let response = skill.handle(&intent("PlayAudio")).await;
        assert_eq!(speech(&response), Some(PLAYING_SPEECH));

        let loaded = skill.state_for("user-1").await.unwrap();
        assert!(loaded.existed);
        assert_eq!(loaded.state, PlaybackState::initial(skill.catalog()));
        assert_eq!(loaded.url.as_deref(), Some("https://signed/Media/track0.mp3"));
    }

    #[tokio::test]
    async fn test_stop_resume_cycle() {
        let skill = skill();
        skill.handle(&intent("PlayAudio")).await;
        skill.handle(&intent("AMAZON.NextIntent")).await;

        let response = skill.handle(&intent("AMAZON.PauseIntent")).await;
        assert_eq!(speech(&response), Some(PAUSED_SPEECH));
        assert_eq!(response.response.directives, vec![Directive::Stop]);

        let response = skill
            .handle(&callback("AudioPlayer.PlaybackStopped", Some(12345)))
            .await;
        assert_eq!(response, ResponseEnvelope::empty());

        let response = skill.handle(&intent("AMAZON.ResumeIntent")).await;
        match response.response.directives.as_slice() {
            [Directive::Play(play)] => {
                assert_eq!(play.audio_item.stream.token, "Media/track1.mp3");
                assert_eq!(play.audio_item.stream.offset_in_milliseconds, 12345);
            }
            other => panic!("expected play directive, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_callback_keeps_previous_url() {
        let skill = skill();
        skill.handle(&intent("PlayAudio")).await;
        skill.handle(&callback("AudioPlayer.PlaybackStarted", None)).await;

        let loaded = skill.state_for("user-1").await.unwrap();
        assert_eq!(loaded.url.as_deref(), Some("https://signed/Media/track0.mp3"));
    }

    #[tokio::test]
    async fn test_missing_user_gets_apology_and_saves_nothing() {
        let skill = skill();
        let envelope: RequestEnvelope =
            serde_json::from_value(json!({ "request": { "type": "LaunchRequest" } })).unwrap();

        let response = skill.handle(&envelope).await;
        assert_eq!(speech(&response), Some(APOLOGY_SPEECH));
        assert_eq!(skill.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_apology() {
        let skill = skill();
        let response = skill.handle_bytes(b"not json").await;
        assert_eq!(speech(&response), Some(APOLOGY_SPEECH));
        assert_eq!(response.response.should_end_session, Some(false));
    }

    #[tokio::test]
    async fn test_store_failure_gets_apology() {
        let skill = skill_with(FailingStore, Arc::new(FakeSigner));
        let response = skill.handle(&intent("AMAZON.NextIntent")).await;
        assert_eq!(speech(&response), Some(APOLOGY_SPEECH));
        assert!(matches!(
            skill.invoke(&intent("AMAZON.NextIntent")).await,
            Err(Error::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_signing_failure_persists_nothing() {
        let skill = skill_with(MemoryPlaybackStore::new(), Arc::new(FailingSigner));

        let response = skill.handle(&intent("PlayAudio")).await;
        assert_eq!(speech(&response), Some(APOLOGY_SPEECH));
        assert_eq!(skill.store().len().await, 0);

        // Speech-only events still work without a signer
        let response = skill.handle(&intent("AMAZON.StopIntent")).await;
        assert_eq!(speech(&response), Some(PAUSED_SPEECH));

        let launch: RequestEnvelope = serde_json::from_value(json!({
            "context": { "System": { "user": { "userId": "user-1" } } },
            "request": { "type": "LaunchRequest" }
        }))
        .unwrap();
        let response = skill.handle(&launch).await;
        assert_eq!(speech(&response), Some(WELCOME_SPEECH));
        assert_eq!(response.response.should_end_session, Some(false));
    }

    #[tokio::test]
    async fn test_unroutable_request_gets_apology() {
        let skill = skill();
        let response = skill
            .handle(&callback("AudioPlayer.PlaybackStopped", None))
            .await;
        assert_eq!(speech(&response), Some(APOLOGY_SPEECH));
    }
}
