/// A playable unit of the archive.
///
/// `locator` is a filesystem path or URI. A blank locator marks an entry the
/// archive knows about but has no audio for; such a track never plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Opaque identity, stable for the lifetime of the session.
    pub id: String,
    pub title: String,
    /// Human-readable duration, e.g. `3:07`. Empty when unknown.
    pub duration_label: String,
    pub locator: String,
    /// Name of the era the track belongs to.
    pub era: String,
}

impl Track {
    pub fn is_playable(&self) -> bool {
        !self.locator.trim().is_empty()
    }

    /// `Era - Title`, used where tracks from several eras are listed together.
    pub fn display(&self) -> String {
        if self.era.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.era, self.title)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Era {
    pub name: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    /// Artist the archive is about, when the source names one.
    pub artist: Option<String>,
    pub eras: Vec<Era>,
}

impl Library {
    pub fn is_empty(&self) -> bool {
        self.eras.iter().all(|e| e.tracks.is_empty())
    }

    pub fn track_count(&self) -> usize {
        self.eras.iter().map(|e| e.tracks.len()).sum()
    }

    pub fn all_tracks(&self) -> impl Iterator<Item = &Track> {
        self.eras.iter().flat_map(|e| e.tracks.iter())
    }

    /// Tracks whose `Era - Title` text fuzzy-matches `query`, in archive order.
    ///
    /// A blank query matches nothing: search results only exist once the
    /// user typed something.
    pub fn search(&self, query: &str) -> Vec<Track> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.all_tracks()
            .filter(|t| fuzzy_match_positions(&t.display(), query).is_some())
            .cloned()
            .collect()
    }
}

/// Fuzzy/subsequence match: return the character positions in `text` that
/// match `query` (case-insensitive), or `None` if not matched.
pub fn fuzzy_match_positions(text: &str, query: &str) -> Option<Vec<usize>> {
    if query.is_empty() {
        return Some(Vec::new());
    }

    let mut positions: Vec<usize> = Vec::new();
    let mut text_iter = text.chars().enumerate();

    for qc in query.chars() {
        loop {
            match text_iter.next() {
                Some((ti, tc)) if tc.to_lowercase().eq(qc.to_lowercase()) => {
                    positions.push(ti);
                    break;
                }
                Some(_) => continue,
                None => return None,
            }
        }
    }

    Some(positions)
}
