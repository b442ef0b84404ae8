use std::collections::BTreeMap;
use std::path::{Component, Path};

use lofty::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::duration_label;
use super::model::{Era, Library, Track};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Era a file belongs to: the first directory below the archive root, or
/// `None` for files sitting directly in the root.
fn era_of(relative: &Path) -> Option<String> {
    let mut components = relative.components();
    let first = components.next()?;
    // A single component is the file itself.
    components.next()?;
    match first {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    }
}

fn read_track(path: &Path, root: &Path, era: &str) -> Track {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut duration = String::new();

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let d = tagged.properties().duration();
            if !d.is_zero() {
                duration = duration_label(d);
            }
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    if !v.trim().is_empty() {
                        title = v.trim().to_string();
                    }
                }
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    Track {
        id: relative.to_string_lossy().into_owned(),
        title,
        duration_label: duration,
        locator: path.to_string_lossy().into_owned(),
        era: era.to_string(),
    }
}

/// Scan `dir` as an archive: each immediate subdirectory is an era, loose
/// files in `dir` itself go to `settings.loose_era_name`.
///
/// Eras are sorted by name and tracks by title, both case-insensitive. Empty
/// eras are dropped.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Library {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = era folders are read one level deep only.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(2)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut eras: BTreeMap<String, Era> = BTreeMap::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path);
        let era_name = era_of(relative).unwrap_or_else(|| settings.loose_era_name.clone());
        let track = read_track(path, dir, &era_name);

        eras.entry(era_name.to_lowercase())
            .or_insert_with(|| Era {
                name: era_name.clone(),
                tracks: Vec::new(),
            })
            .tracks
            .push(track);
    }

    let eras: Vec<Era> = eras
        .into_values()
        .map(|mut era| {
            era.tracks
                .sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
            era
        })
        .filter(|era| !era.tracks.is_empty())
        .collect();

    let library = Library { artist: None, eras };
    info!(
        dir = %dir.display(),
        eras = library.eras.len(),
        tracks = library.track_count(),
        "scanned archive"
    );
    library
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn titles(era: &Era) -> Vec<&str> {
        era.tracks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn era_of_uses_first_directory() {
        assert_eq!(era_of(Path::new("Debut/a.mp3")).as_deref(), Some("Debut"));
        assert_eq!(era_of(Path::new("Debut/disc 2/a.mp3")).as_deref(), Some("Debut"));
        assert_eq!(era_of(Path::new("a.mp3")), None);
    }

    #[test]
    fn scan_groups_subdirectories_into_sorted_eras() {
        let dir = tempdir().unwrap();
        let debut = dir.path().join("debut");
        let later = dir.path().join("Later Years");
        fs::create_dir_all(&debut).unwrap();
        fs::create_dir_all(&later).unwrap();

        fs::write(debut.join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(debut.join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(debut.join("notes.txt"), b"ignore me").unwrap();
        fs::write(later.join("c.flac"), b"not a real flac").unwrap();
        fs::write(dir.path().join("loose.mp3"), b"not real").unwrap();

        let lib = scan(dir.path(), &LibrarySettings::default());
        let names: Vec<&str> = lib.eras.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["debut", "Later Years", "Singles"]);

        assert_eq!(titles(&lib.eras[0]), vec!["A", "b"]);
        assert_eq!(lib.eras[0].tracks[0].era, "debut");
        assert_eq!(
            lib.eras[0].tracks[0].id,
            Path::new("debut").join("A.ogg").to_string_lossy()
        );
        assert!(lib.eras[0].tracks[0].is_playable());
        // Unreadable tags leave the duration unknown.
        assert_eq!(lib.eras[0].tracks[0].duration_label, "");
        assert_eq!(titles(&lib.eras[2]), vec!["loose"]);
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        let era = dir.path().join("era");
        let hidden_era = dir.path().join(".cache");
        fs::create_dir_all(&era).unwrap();
        fs::create_dir_all(&hidden_era).unwrap();
        fs::write(era.join(".hidden.mp3"), b"not real").unwrap();
        fs::write(era.join("visible.mp3"), b"not real").unwrap();
        fs::write(hidden_era.join("x.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let lib = scan(dir.path(), &settings);

        assert_eq!(lib.eras.len(), 1);
        assert_eq!(titles(&lib.eras[0]), vec!["visible"]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        let era = dir.path().join("era");
        let nested = era.join("bonus");
        fs::create_dir_all(&nested).unwrap();
        fs::write(era.join("top.mp3"), b"not real").unwrap();
        fs::write(nested.join("deep.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let lib = scan(dir.path(), &settings);
        assert_eq!(lib.track_count(), 1);
        assert_eq!(titles(&lib.eras[0]), vec!["top"]);
    }

    #[test]
    fn scan_of_empty_directory_is_empty() {
        let dir = tempdir().unwrap();
        let lib = scan(dir.path(), &LibrarySettings::default());
        assert!(lib.is_empty());
        assert!(lib.eras.is_empty());
    }
}
