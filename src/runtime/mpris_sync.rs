use crate::mpris::MprisHandle;
use crate::playback::PlaybackState;

pub fn update_mpris(mpris: &MprisHandle, playback: &PlaybackState) {
    mpris.set_track_metadata(playback.current_track.as_ref(), playback.duration);
    mpris.set_playback(playback.status());
}
