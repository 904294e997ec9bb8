//! Playback record persistence
//!
//! Records are stored per user identity as opaque JSON in the
//! `playback_records` table. A missing row is not an error: first contact
//! loads the initial state. An unreadable row is, and fails the invocation
//! instead of silently restarting the user's playlist.

use crate::error::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;
use vsp_common::{Catalog, PlaybackRecord, PlaybackState};

/// Key-value store of playback records keyed by user identity
pub trait PlaybackStore: Send + Sync + 'static {
    fn get(&self, user_id: &str) -> impl Future<Output = Result<Option<PlaybackRecord>>> + Send;

    fn put(&self, user_id: &str, record: &PlaybackRecord) -> impl Future<Output = Result<()>> + Send;
}

// ============================================================================
// SQLite store
// ============================================================================

#[derive(Debug, Clone)]
pub struct SqlitePlaybackStore {
    pool: SqlitePool,
}

impl SqlitePlaybackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl PlaybackStore for SqlitePlaybackStore {
    async fn get(&self, user_id: &str) -> Result<Option<PlaybackRecord>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT record FROM playback_records WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match value {
            Some(json) => serde_json::from_str(&json).map(Some).map_err(|e| {
                Error::Persistence(format!("Unreadable playback record for '{}': {}", user_id, e))
            }),
            None => Ok(None),
        }
    }

    async fn put(&self, user_id: &str, record: &PlaybackRecord) -> Result<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| Error::Persistence(format!("Failed to encode playback record: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO playback_records (user_id, record, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(user_id) DO UPDATE SET
                record = excluded.record,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryPlaybackStore {
    records: RwLock<HashMap<String, PlaybackRecord>>,
}

impl MemoryPlaybackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl PlaybackStore for MemoryPlaybackStore {
    async fn get(&self, user_id: &str) -> Result<Option<PlaybackRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: &PlaybackRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(user_id.to_string(), record.clone());
        Ok(())
    }
}

// ============================================================================
// State conversion
// ============================================================================

/// State loaded at the start of an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPlayback {
    pub state: PlaybackState,
    /// Stream URL stored with the record, kept when no new one is issued
    pub url: Option<String>,
    /// False for a user identity seen for the first time
    pub existed: bool,
}

/// Load and validate the playback state for `user_id`
pub async fn load_state<S: PlaybackStore>(
    store: &S,
    catalog: &Catalog,
    user_id: &str,
) -> Result<LoadedPlayback> {
    match store.get(user_id).await? {
        Some(record) => Ok(LoadedPlayback {
            state: PlaybackState::from_record(&record, catalog),
            url: record.playback_settings.url,
            existed: true,
        }),
        None => {
            debug!("No playback record for {}, starting fresh", user_id);
            Ok(LoadedPlayback {
                state: PlaybackState::initial(catalog),
                url: None,
                existed: false,
            })
        }
    }
}

/// Persist `state` for `user_id`
pub async fn save_state<S: PlaybackStore>(
    store: &S,
    user_id: &str,
    state: &PlaybackState,
    url: Option<String>,
) -> Result<()> {
    store
        .put(user_id, &PlaybackRecord::from_state(state, url))
        .await
}
