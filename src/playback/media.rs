//! The media resource seam.
//!
//! The controller drives exactly one `MediaResource`. Implementors wrap a
//! platform player (rodio here); tests use a recording fake.

use std::time::Duration;

use thiserror::Error;

use super::types::{LoadToken, MediaEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The audio output device could not be opened.
    #[error("audio output unavailable: {0}")]
    Output(String),

    /// The locator could not be opened.
    #[error("cannot open {locator}: {reason}")]
    Load { locator: String, reason: String },

    /// The media was opened but could not be decoded.
    #[error("cannot decode {locator}: {reason}")]
    Decode { locator: String, reason: String },

    /// This resource cannot handle the locator's scheme.
    #[error("unsupported locator: {0}")]
    Unsupported(String),

    /// A transport command arrived with nothing loaded.
    #[error("nothing loaded")]
    NotLoaded,

    #[error("seek failed: {0}")]
    Seek(String),
}

/// Capability object for the underlying media player.
///
/// Loading may complete asynchronously; completion, progress and failures are
/// reported through `poll_events`, each event tagged with the token passed to
/// the `load` that produced it.
pub trait MediaResource {
    /// Bind `locator`, replacing whatever was bound. Leaves the media paused.
    fn load(&mut self, locator: &str, token: LoadToken) -> Result<(), MediaError>;

    /// Start or continue playback of the bound media.
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), MediaError>;

    /// Drain events produced since the last call. Failures after a
    /// successful `load` (a stream that dies mid-track, say) arrive here as
    /// `MediaEventKind::Error` rather than as `Ended`.
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}
