//! Observable playback state and media event types.

use std::time::Duration;

use crate::library::Track;

use super::media::MediaError;

/// Identifies one binding of a locator to the media resource.
///
/// Every (re)load gets a fresh token. Events carry the token of the load that
/// produced them, so callbacks from a superseded load can be told apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Periodic position report from the media clock.
    Position(Duration),
    /// Total duration, known once the media has been opened.
    DurationKnown(Duration),
    /// The media reached its natural end.
    Ended,
    /// Load, decode or playback failure reported after the fact.
    Error(MediaError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub token: LoadToken,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(token: LoadToken, kind: MediaEventKind) -> Self {
        Self { token, kind }
    }
}

/// Coarse status used by surfaces that only distinguish three states (MPRIS).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The single playback record of a session.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    /// Navigation context for next/prev.
    pub queue: Vec<Track>,
    /// Playback requested. Not rolled back when the media layer fails.
    pub is_playing: bool,
    pub is_repeat: bool,
    pub is_shuffle: bool,
    pub current_time: Duration,
    /// Filled in asynchronously once the media reports it.
    pub duration: Option<Duration>,
    /// Most recent media failure for the current binding.
    pub last_error: Option<String>,
}

impl PlaybackState {
    pub fn status(&self) -> PlaybackStatus {
        match (&self.current_track, self.is_playing) {
            (None, _) => PlaybackStatus::Stopped,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.id.as_str())
    }

    /// Position of the current track in the queue, matched by id.
    pub fn current_index(&self) -> Option<usize> {
        let id = self.current_id()?;
        self.queue.iter().position(|t| t.id == id)
    }
}
