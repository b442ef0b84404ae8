use std::env;
use std::path::{Path, PathBuf};

use crate::config;
use crate::library::{Library, load_catalog, scan};
use crate::playback::{MediaResource, PlaybackController};

/// Where the archive comes from: the first CLI argument, then
/// `library.catalog`, then the working directory.
pub fn archive_source(arg: Option<String>, settings: &config::LibrarySettings) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| settings.catalog.clone())
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn is_catalog(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

/// Read a TOML catalog or scan a directory tree.
pub fn load_library(
    source: &Path,
    settings: &config::LibrarySettings,
) -> crate::error::Result<Library> {
    if is_catalog(source) {
        load_catalog(source)
    } else {
        Ok(scan(source, settings))
    }
}

/// Apply the configured starting modes through the controller's toggles.
pub fn apply_playback_defaults<M: MediaResource>(
    controller: &mut PlaybackController<M>,
    settings: &config::Settings,
) {
    if settings.playback.shuffle != controller.state().is_shuffle {
        controller.toggle_shuffle();
    }
    if settings.playback.repeat != controller.state().is_repeat {
        controller.toggle_repeat();
    }
}
