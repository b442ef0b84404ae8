//! TOML archive catalogs.
//!
//! ```toml
//! artist = "Some Artist"
//!
//! [[eras]]
//! name = "Debut"
//!
//! [[eras.tracks]]
//! title = "Opening"
//! duration = "3:07"
//! locator = "audio/opening.mp3"
//!
//! [[eras.tracks]]
//! id = "debut-demo"
//! title = "Unreleased demo"   # no locator: listed but not playable
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

use super::display::slug;
use super::model::{Era, Library, Track};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    artist: Option<String>,
    #[serde(default)]
    eras: Vec<CatalogEra>,
}

#[derive(Debug, Deserialize)]
struct CatalogEra {
    name: String,
    #[serde(default)]
    tracks: Vec<CatalogTrack>,
}

#[derive(Debug, Deserialize)]
struct CatalogTrack {
    id: Option<String>,
    title: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    locator: String,
}

fn has_scheme(locator: &str) -> bool {
    locator
        .split_once("://")
        .map(|(scheme, _)| {
            !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
        })
        .unwrap_or(false)
}

/// Resolve a catalog locator against the catalog's directory.
///
/// Blank locators stay blank; URIs and absolute paths are kept as written.
fn resolve_locator(locator: &str, base: &Path) -> String {
    let locator = locator.trim();
    if locator.is_empty() || has_scheme(locator) || Path::new(locator).is_absolute() {
        return locator.to_string();
    }
    base.join(locator).to_string_lossy().into_owned()
}

/// Claim `candidate`, or `candidate-2`, `candidate-3`, ... when it is taken.
fn unique_id(candidate: String, taken: &mut HashSet<String>) -> String {
    let mut id = candidate.clone();
    let mut n = 2;
    while taken.contains(&id) {
        id = format!("{}-{}", candidate, n);
        n += 1;
    }
    taken.insert(id.clone());
    id
}

fn parse_catalog(text: &str, path: &Path) -> Result<Library> {
    let file: CatalogFile = toml::from_str(text).map_err(|source| Error::Catalog {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or(Path::new("."));

    // Explicit ids are reserved first so generated ones can step around them.
    let mut taken: HashSet<String> = HashSet::new();
    for t in file.eras.iter().flat_map(|e| e.tracks.iter()) {
        if let Some(id) = t.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            if !taken.insert(id.to_string()) {
                return Err(Error::InvalidCatalog {
                    path: path.to_path_buf(),
                    reason: format!("duplicate track id {id:?}"),
                });
            }
        }
    }

    let mut eras = Vec::with_capacity(file.eras.len());
    for era in file.eras {
        let era_slug = slug(&era.name);
        let mut tracks = Vec::with_capacity(era.tracks.len());
        for (n, t) in era.tracks.into_iter().enumerate() {
            let id = match t.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
                Some(id) => id.to_string(),
                None => unique_id(format!("{}-{}", era_slug, n + 1), &mut taken),
            };
            tracks.push(Track {
                id,
                title: t.title,
                duration_label: t.duration.trim().to_string(),
                locator: resolve_locator(&t.locator, base),
                era: era.name.clone(),
            });
        }
        eras.push(Era {
            name: era.name,
            tracks,
        });
    }

    Ok(Library {
        artist: file.artist.filter(|a| !a.trim().is_empty()),
        eras,
    })
}

/// Load an archive from a TOML catalog file.
pub fn load_catalog(path: &Path) -> Result<Library> {
    let text = fs::read_to_string(path)?;
    let library = parse_catalog(&text, path)?;
    info!(
        catalog = %path.display(),
        eras = library.eras.len(),
        tracks = library.track_count(),
        "loaded catalog"
    );
    Ok(library)
}
