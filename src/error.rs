//! Unified error handling for the tamalink crate
//!
//! Domain-specific errors (currently only [`HotspotError`]) stay in their own
//! modules; this module wraps them into a single [`Error`] enum usable across
//! module boundaries.
//!
//! Persistence errors from the exclusion store and cycle cursor deliberately
//! never surface here: both components degrade to in-memory state on I/O
//! failure (see their module docs).

use std::io;
use thiserror::Error;

pub use crate::hotspot::HotspotError;

/// Unified error type for the tamalink crate
#[derive(Error, Debug)]
pub enum Error {
    /// Access-point lifecycle errors (daemons, interfaces, privileges)
    #[error("Hotspot error: {0}")]
    Hotspot(#[from] HotspotError),

    /// Catalog data file validation errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// MAC address parsing errors
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a catalog validation error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a MAC parsing error
    pub fn invalid_mac(msg: impl Into<String>) -> Self {
        Self::InvalidMac(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
