//! HTTP request handlers

use super::AppState;
use crate::db::PlaybackStore;
use crate::response::ResponseEnvelope;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, error};
use vsp_common::{PlaybackState, Track};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    tracks: Vec<Track>,
}

#[derive(Debug, Serialize)]
pub struct PlaybackStatusResponse {
    user_id: String,
    /// False when no record exists and `state` shows the defaults
    exists: bool,
    state: PlaybackState,
    url: Option<String>,
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "vsp-skill".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Skill Endpoint
// ============================================================================

/// POST /skill - Handle one voice platform request
///
/// Always answers 200 with a well-formed envelope. The body is taken raw so
/// that an unparseable request still gets the apology response.
pub async fn skill_request<S: PlaybackStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Json<ResponseEnvelope> {
    debug!("Skill request: {} bytes", body.len());
    Json(state.skill.handle_bytes(&body).await)
}

// ============================================================================
// Inspection Endpoints
// ============================================================================

/// GET /catalog
pub async fn get_catalog<S: PlaybackStore>(State(state): State<AppState<S>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        tracks: state.skill.catalog().tracks().to_vec(),
    })
}

/// GET /playback/:user_id - Persisted playback state, read-only
pub async fn get_playback<S: PlaybackStore>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<PlaybackStatusResponse>, (StatusCode, Json<StatusResponse>)> {
    match state.skill.state_for(&user_id).await {
        Ok(loaded) => Ok(Json(PlaybackStatusResponse {
            user_id,
            exists: loaded.existed,
            state: loaded.state,
            url: loaded.url,
        })),
        Err(e) => {
            error!("Failed to load playback state for {}: {}", user_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: format!("error: {}", e),
                }),
            ))
        }
    }
}
