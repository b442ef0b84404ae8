//! Crate-level error type.
//!
//! Startup, configuration and archive loading propagate `Error`. The playback
//! controller never returns errors; media failures are logged where they occur.

use std::path::PathBuf;

use thiserror::Error;

use crate::playback::MediaError;

#[derive(Debug, Error)]
pub enum Error {
    /// The `config` crate failed to read or deserialize settings.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Settings were readable but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A TOML archive catalog could not be parsed.
    #[error("catalog {path:?}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A catalog parsed but describes an inconsistent archive.
    #[error("catalog {path:?}: {reason}")]
    InvalidCatalog { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The audio output could not be opened.
    #[error("media error: {0}")]
    Media(#[from] MediaError),
}

pub type Result<T> = std::result::Result<T, Error>;
