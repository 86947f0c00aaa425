//! Error types for the star system provider.
//!
//! Most failures inside this crate are degraded conditions (a remote authority is down, a
//! stored payload is corrupt, one write fails) that are logged and absorbed at the public
//! boundary. The enums here carry those failures between internal layers, where `?`
//! propagation keeps the code linear until the boundary decides how to degrade.

pub mod config;
pub mod fetch;

use thiserror::Error;

use crate::error::config::ConfigError;

/// Main error type for the provider.
///
/// Aggregates domain-specific errors and external library errors, using `#[from]` so the
/// `?` operator converts them automatically.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Database error (query failures, connection issues, constraint violations).
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
    /// Filesystem error preparing the data directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Serializing a star system payload failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// A record without a usable system address reached the write path.
    #[error("Star system {name:?} has no usable system address ({address}) and cannot be persisted")]
    MissingIdentity { name: String, address: u64 },
    /// Internal error indicating a bug in this crate.
    #[error("Internal error, this indicates a bug: {0:?}")]
    InternalError(String),
}
