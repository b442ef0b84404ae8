//! Playback controller and the media resource it drives.
//!
//! `PlaybackController` holds the session's playback state (current track,
//! queue, transport flags) and is the only thing that talks to the media
//! resource. Surfaces read its state and call its commands.

mod controller;
mod media;
mod rodio_media;
mod types;

pub use controller::PlaybackController;
pub use media::{MediaError, MediaResource};
pub use rodio_media::RodioMedia;
pub use types::*;
