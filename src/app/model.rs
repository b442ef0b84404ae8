//! Application model types: `App` and `View`.
//!
//! The `App` struct holds the archive, which section is on screen, the
//! selected row and the search state used by the UI and runtime.

use crate::library::{Library, Track};

/// Which section of the archive the track list shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    /// Tracks of the era at this index.
    Era(usize),
    /// Search results across all eras.
    Search,
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub view: View,
    /// Row of the visible section under the cursor.
    pub selected: usize,

    pub search_mode: bool,
    pub search_query: String,

    pub follow_playback: bool,
    pub detail_window: bool,
    /// Where the archive was loaded from, shown in the status bar.
    pub source: Option<String>,

    /// Era to return to when search is cleared.
    last_era: usize,
}

impl App {
    /// Create a new `App` showing the first era of `library`.
    pub fn new(library: Library) -> Self {
        Self {
            library,
            view: View::Era(0),
            selected: 0,
            search_mode: false,
            search_query: String::new(),
            follow_playback: true,
            detail_window: false,
            source: None,
            last_era: 0,
        }
    }

    /// Record where the archive came from.
    pub fn set_source(&mut self, source: String) {
        self.source = Some(source);
    }

    /// The tracks currently listed. This is also the queue handed to the
    /// controller when a row is played.
    pub fn visible_tracks(&self) -> Vec<Track> {
        match self.view {
            View::Era(i) => self
                .library
                .eras
                .get(i)
                .map(|e| e.tracks.clone())
                .unwrap_or_default(),
            View::Search => self.library.search(&self.search_query),
        }
    }

    /// Title of the visible section.
    pub fn section_title(&self) -> String {
        match self.view {
            View::Era(i) => self
                .library
                .eras
                .get(i)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| "empty archive".to_string()),
            View::Search => format!("search: {}", self.search_query.trim()),
        }
    }

    pub fn selected_track(&self) -> Option<Track> {
        self.visible_tracks().get(self.selected).cloned()
    }

    /// Return true if the archive contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.library.is_empty()
    }

    /// Move selection to the next row, wrapping to the first.
    pub fn next(&mut self) {
        let len = self.visible_tracks().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection to the previous row, wrapping to the last.
    pub fn prev(&mut self) {
        let len = self.visible_tracks().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_tracks().len().saturating_sub(1);
    }

    /// Show the next era. From search results, go back to the last era shown.
    pub fn next_era(&mut self) {
        self.switch_era(1);
    }

    /// Show the previous era. From search results, go back to the last era shown.
    pub fn prev_era(&mut self) {
        let n = self.library.eras.len();
        self.switch_era(n.saturating_sub(1));
    }

    fn switch_era(&mut self, offset: usize) {
        let n = self.library.eras.len();
        if n == 0 {
            return;
        }
        let target = match self.view {
            View::Era(i) => (i + offset) % n,
            View::Search => self.last_era.min(n - 1),
        };
        self.search_mode = false;
        self.view = View::Era(target);
        self.last_era = target;
        self.selected = 0;
    }

    /// Start typing a search; the list switches to search results.
    pub fn enter_search_mode(&mut self) {
        if let View::Era(i) = self.view {
            self.last_era = i;
        }
        self.view = View::Search;
        self.search_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }

    /// Stop typing; the results stay on screen.
    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    /// Drop the search and return to the era shown before it.
    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.search_mode = false;
        self.view = View::Era(self.last_era);
        self.selected = 0;
    }

    /// Append a character to the search query and refresh the view.
    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected = 0;
    }

    /// Remove the last character from the search query and refresh the view.
    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.selected = 0;
    }

    pub fn toggle_detail_window(&mut self) {
        self.detail_window = !self.detail_window;
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Put the cursor on `track_id` if it is listed. Returns whether it was.
    pub fn select_track(&mut self, track_id: &str) -> bool {
        match self.visible_tracks().iter().position(|t| t.id == track_id) {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }

    /// Clamp `selected` into the visible list.
    fn ensure_selected_visible(&mut self) {
        let len = self.visible_tracks().len();
        if self.selected >= len {
            self.selected = 0;
        }
    }
}
