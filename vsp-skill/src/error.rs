//! Error types for vsp-skill
//!
//! Every variant is absorbed at the invocation boundary and turned into an
//! apology response; none of them may take the process down.

use thiserror::Error;

/// Main error type for the skill service
#[derive(Error, Debug)]
pub enum Error {
    /// Errors raised by shared code (catalog, config, database init)
    #[error(transparent)]
    Common(#[from] vsp_common::Error),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be mapped to an event category
    #[error("Classification error: {0}")]
    Classification(String),

    /// Media URL could not be produced
    #[error("Signing error: {0}")]
    Signing(String),

    /// Stored record unreadable or store unavailable
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Convenience Result type using vsp-skill Error
pub type Result<T> = std::result::Result<T, Error>;
