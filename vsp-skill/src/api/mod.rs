//! HTTP API
//!
//! `POST /skill` is the voice platform endpoint; the remaining routes are
//! read-only inspection for operators.

pub mod handlers;

use crate::db::PlaybackStore;
use crate::skill::Skill;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
pub struct AppState<S> {
    pub skill: Arc<Skill<S>>,
}

// Derived Clone would require S: Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            skill: Arc::clone(&self.skill),
        }
    }
}

impl<S: PlaybackStore> AppState<S> {
    pub fn new(skill: Skill<S>) -> Self {
        Self {
            skill: Arc::new(skill),
        }
    }
}

/// Create the API router
pub fn create_router<S: PlaybackStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/skill", post(handlers::skill_request::<S>))
        .route("/catalog", get(handlers::get_catalog::<S>))
        .route("/playback/:user_id", get(handlers::get_playback::<S>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
