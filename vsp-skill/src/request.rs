//! Inbound request envelope
//!
//! Only the subset of the voice platform's request JSON the skill reads.
//! Unknown fields are ignored; every field except `request.type` is optional
//! so that a sparse callback still deserializes and reaches the classifier.

use serde::{Deserialize, Serialize};

/// Top-level request envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<Context>,
    #[serde(default)]
    pub request: Request,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemContext {
    #[serde(default)]
    pub user: Option<User>,
}

/// The request body proper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// e.g. `IntentRequest`, `AudioPlayer.PlaybackStopped`
    #[serde(rename = "type", default)]
    pub request_type: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    /// Stream token reported by AudioPlayer callbacks
    #[serde(default)]
    pub token: Option<String>,
    /// Reported by AudioPlayer callbacks; required for PlaybackStopped
    #[serde(default)]
    pub offset_in_milliseconds: Option<i64>,
    /// Error object attached to PlaybackFailed / System.ExceptionEncountered
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// Reason attached to SessionEndedRequest
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub name: String,
}

impl RequestEnvelope {
    /// User identity the playback record is keyed by
    ///
    /// AudioPlayer callbacks carry no session, so the context is checked first.
    /// A blank id counts as absent.
    pub fn user_id(&self) -> Option<&str> {
        let from_context = self
            .context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.user.as_ref())
            .map(|u| u.user_id.as_str())
            .filter(|id| !id.is_empty());

        let from_session = || {
            self.session
                .as_ref()
                .and_then(|s| s.user.as_ref())
                .map(|u| u.user_id.as_str())
                .filter(|id| !id.is_empty())
        };

        from_context.or_else(from_session)
    }
}

impl Request {
    /// Intent name, when this is an intent request carrying one
    pub fn intent_name(&self) -> Option<&str> {
        self.intent
            .as_ref()
            .map(|i| i.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Short description of the attached error, for logging
    pub fn error_description(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        match error.get("message").and_then(|m| m.as_str()) {
            Some(message) => Some(message.to_string()),
            None => Some(error.to_string()),
        }
    }
}
