use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::library::Track;

use super::media::{MediaError, MediaResource};
use super::types::{LoadToken, MediaEvent, MediaEventKind, PlaybackState};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Step {
    Next,
    Prev,
}

/// Single source of truth for what is playing and what comes next.
///
/// Owns the media resource and the session's `PlaybackState`. Commands never
/// fail: media errors are logged and kept in `last_error`, and `is_playing`
/// reflects what was requested rather than what the media confirmed.
pub struct PlaybackController<M: MediaResource> {
    media: M,
    state: PlaybackState,
    /// Locator currently bound to `media`, if any.
    bound: Option<String>,
    /// Token of the current binding; events carrying any other token are stale.
    token: LoadToken,
    rng: StdRng,
}

impl<M: MediaResource> PlaybackController<M> {
    pub fn new(media: M) -> Self {
        Self::with_rng(media, StdRng::from_entropy())
    }

    /// Build a controller with a caller-supplied RNG for shuffle picks.
    pub fn with_rng(media: M, rng: StdRng) -> Self {
        Self {
            media,
            state: PlaybackState::default(),
            bound: None,
            token: LoadToken::default(),
            rng,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    #[cfg(test)]
    pub fn media(&self) -> &M {
        &self.media
    }

    #[cfg(test)]
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Make `track` current and start it.
    ///
    /// `queue` becomes the navigation context when it is non-empty and contains
    /// `track`; otherwise the queue is just `[track]`.
    pub fn play_track(&mut self, track: Track, queue: Option<Vec<Track>>) {
        let queue = match queue {
            Some(q) if q.iter().any(|t| t.id == track.id) => q,
            Some(q) if !q.is_empty() => {
                debug!(id = %track.id, "track not in supplied queue; using it alone");
                vec![track.clone()]
            }
            _ => vec![track.clone()],
        };
        self.state.queue = queue;
        self.start(track);
    }

    pub fn pause_track(&mut self) {
        if self.state.current_track.is_none() {
            return;
        }
        self.media.pause();
        self.state.is_playing = false;
    }

    /// Pause and rewind. Current track and queue are kept.
    pub fn stop_track(&mut self) {
        if self.state.current_track.is_none() {
            return;
        }
        self.media.pause();
        if self.bound.is_some() {
            if let Err(e) = self.media.seek(Duration::ZERO) {
                self.record_error(e);
            }
        }
        self.state.is_playing = false;
        self.state.current_time = Duration::ZERO;
    }

    /// Continue the current track from where it was paused.
    pub fn resume(&mut self) {
        let Some(track) = self.state.current_track.clone() else {
            return;
        };
        if self.state.is_playing || !track.is_playable() {
            return;
        }
        if self.bound.as_deref() == Some(track.locator.trim()) {
            self.state.is_playing = true;
            if let Err(e) = self.media.play() {
                self.record_error(e);
            }
        } else {
            self.start(track);
        }
    }

    pub fn next_track(&mut self) {
        self.step(Step::Next);
    }

    pub fn prev_track(&mut self) {
        self.step(Step::Prev);
    }

    pub fn toggle_repeat(&mut self) {
        self.state.is_repeat = !self.state.is_repeat;
    }

    pub fn toggle_shuffle(&mut self) {
        self.state.is_shuffle = !self.state.is_shuffle;
    }

    /// Seek the current track. Clamped to the known duration.
    pub fn set_audio_time(&mut self, position: Duration) {
        let playable = self
            .state
            .current_track
            .as_ref()
            .is_some_and(Track::is_playable);
        if !playable || self.bound.is_none() {
            return;
        }

        let position = match self.state.duration {
            Some(total) => position.min(total),
            None => position,
        };
        match self.media.seek(position) {
            Ok(()) => self.state.current_time = position,
            Err(e) => self.record_error(e),
        }
    }

    /// Install a new navigation context.
    ///
    /// Playback continues if the new queue still holds the current track;
    /// otherwise it is stopped and the controller goes back to idle.
    pub fn replace_queue(&mut self, queue: Vec<Track>) {
        let keeps_current = match self.state.current_id() {
            Some(id) => queue.iter().any(|t| t.id == id),
            None => true,
        };
        self.state.queue = queue;
        if keeps_current {
            return;
        }

        debug!("current track left the queue; stopping");
        self.media.pause();
        self.unbind();
        self.state.current_track = None;
        self.state.is_playing = false;
        self.state.current_time = Duration::ZERO;
        self.state.duration = None;
    }

    /// Drain the media resource and apply its events.
    pub fn poll_media(&mut self) {
        for event in self.media.poll_events() {
            self.handle_media_event(event);
        }
    }

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if event.token != self.token || self.bound.is_none() {
            trace!(?event, "dropping stale media event");
            return;
        }

        match event.kind {
            MediaEventKind::Position(p) => self.state.current_time = p,
            MediaEventKind::DurationKnown(d) => self.state.duration = Some(d),
            MediaEventKind::Ended => self.on_ended(),
            MediaEventKind::Error(e) => self.record_error(e),
        }
    }

    fn on_ended(&mut self) {
        debug!(id = ?self.state.current_id(), "track ended");
        self.state.is_playing = false;
        self.state.current_time = Duration::ZERO;
        // The media has drained; whatever plays next needs a fresh load.
        self.bound = None;

        if self.state.is_repeat {
            if let Some(track) = self.state.current_track.clone() {
                self.start(track);
            }
        } else {
            self.step(Step::Next);
        }
    }

    fn step(&mut self, step: Step) {
        let len = self.state.queue.len();
        if len == 0 {
            return;
        }
        let Some(current) = self.state.current_index() else {
            return;
        };

        let index = if self.state.is_shuffle {
            self.rng.gen_range(0..len)
        } else {
            match step {
                Step::Next => (current + 1) % len,
                Step::Prev => (current + len - 1) % len,
            }
        };
        let track = self.state.queue[index].clone();
        self.start(track);
    }

    /// Make `track` current and request playback, rebinding the media when the
    /// locator changed.
    fn start(&mut self, track: Track) {
        self.state.current_time = Duration::ZERO;
        self.state.last_error = None;

        if !track.is_playable() {
            warn!(id = %track.id, "track has no media locator; not playing");
            self.media.pause();
            self.unbind();
            self.state.duration = None;
            self.state.is_playing = false;
            self.state.current_track = Some(track);
            return;
        }

        let locator = track.locator.trim().to_string();
        let rebind = self.bound.as_deref() != Some(locator.as_str());
        debug!(id = %track.id, rebind, "starting track");
        self.state.current_track = Some(track);
        self.state.is_playing = true;

        if rebind {
            self.unbind();
            self.state.duration = None;
            if let Err(e) = self.media.load(&locator, self.token) {
                self.record_error(e);
                return;
            }
            self.bound = Some(locator);
        }

        if let Err(e) = self.media.play() {
            self.record_error(e);
        }
    }

    fn unbind(&mut self) {
        self.token = self.token.next();
        self.bound = None;
    }

    fn record_error(&mut self, e: MediaError) {
        warn!(error = %e, "media failure");
        self.state.last_error = Some(e.to_string());
    }
}
