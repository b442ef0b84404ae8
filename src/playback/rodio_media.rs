//! `MediaResource` backed by a `rodio` sink.
//!
//! Opening/decoding a local file and preparing a paused `Sink` happens in
//! `load`; end-of-track and position are observed by polling the sink. A sink
//! that drains well before the decoder's reported length is treated as a
//! truncated or undecodable stream and reported as an error instead of an end.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info};

use crate::config::AudioSettings;

use super::media::{MediaError, MediaResource};
use super::types::{LoadToken, MediaEvent, MediaEventKind};

/// How far short of the reported length a drained sink may stop and still
/// count as a normal end.
const EARLY_END_SLACK: Duration = Duration::from_secs(2);

pub struct RodioMedia {
    stream: OutputStream,
    sink: Option<Sink>,
    token: LoadToken,
    volume: f32,
    events: Vec<MediaEvent>,
    ended_reported: bool,
    locator: String,
    total: Option<Duration>,
    last_pos: Duration,
}

impl RodioMedia {
    /// Open the default output device.
    pub fn open(settings: &AudioSettings) -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would land
        // on top of the TUI.
        stream.log_on_drop(false);
        info!("audio output opened");

        Ok(Self {
            stream,
            sink: None,
            token: LoadToken::default(),
            volume: settings.volume,
            events: Vec::new(),
            ended_reported: false,
            locator: String::new(),
            total: None,
            last_pos: Duration::ZERO,
        })
    }
}

/// Map a locator to a local path. `file://` is accepted, other schemes are not.
pub(super) fn local_path(locator: &str) -> Result<&Path, MediaError> {
    if let Some(rest) = locator.strip_prefix("file://") {
        return Ok(Path::new(rest));
    }
    if locator.contains("://") {
        return Err(MediaError::Unsupported(locator.to_string()));
    }
    Ok(Path::new(locator))
}

/// True when playback stopped at `last_pos` while the decoder promised `total`.
pub(super) fn ended_early(last_pos: Duration, total: Option<Duration>) -> bool {
    total.is_some_and(|t| last_pos.saturating_add(EARLY_END_SLACK) < t)
}

fn mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl MediaResource for RodioMedia {
    fn load(&mut self, locator: &str, token: LoadToken) -> Result<(), MediaError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.token = token;
        self.ended_reported = false;
        self.locator = locator.to_string();
        self.total = None;
        self.last_pos = Duration::ZERO;

        let path = local_path(locator)?;
        let file = File::open(path).map_err(|e| MediaError::Load {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;

        self.total = source.total_duration();
        if let Some(total) = self.total {
            self.events
                .push(MediaEvent::new(token, MediaEventKind::DurationKnown(total)));
        }

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        self.sink = Some(sink);
        debug!(locator, "loaded");
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let sink = self.sink.as_ref().ok_or(MediaError::NotLoaded)?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        let sink = self.sink.as_ref().ok_or(MediaError::NotLoaded)?;
        sink.try_seek(position)
            .map_err(|e| MediaError::Seek(e.to_string()))?;
        self.last_pos = position;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if let Some(sink) = self.sink.as_ref() {
            if sink.empty() {
                if !self.ended_reported {
                    self.ended_reported = true;
                    let kind = if ended_early(self.last_pos, self.total) {
                        MediaEventKind::Error(MediaError::Decode {
                            locator: self.locator.clone(),
                            reason: format!(
                                "stream stopped at {} of {}",
                                mmss(self.last_pos),
                                mmss(self.total.unwrap_or_default())
                            ),
                        })
                    } else {
                        MediaEventKind::Ended
                    };
                    self.events.push(MediaEvent::new(self.token, kind));
                }
            } else {
                self.last_pos = sink.get_pos();
                if !sink.is_paused() {
                    self.events.push(MediaEvent::new(
                        self.token,
                        MediaEventKind::Position(self.last_pos),
                    ));
                }
            }
        }
        std::mem::take(&mut self.events)
    }
}
