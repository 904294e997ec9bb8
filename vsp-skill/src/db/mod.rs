//! Database access for vsp-skill

pub mod playback;

pub use playback::{
    load_state, save_state, LoadedPlayback, MemoryPlaybackStore, PlaybackStore,
    SqlitePlaybackStore,
};
