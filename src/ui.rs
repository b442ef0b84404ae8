//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Tabs, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, View};
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{Track, fuzzy_match_positions, parse_duration_label};
use crate::playback::{PlaybackState, PlaybackStatus};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("[/]".to_string(), "prev/next era".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next track".to_string());
    // H/L is filled dynamically from config.
    map.insert("x".to_string(), "stop".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("K".to_string(), "details".to_string());
    map.insert("Q".to_string(), "queue this list".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "[/]", "h/l", "H/L", "enter", "space/p", "x", "gg/G", "K", "Q", "/", "s", "r",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Total length of the current track: what the media reported, else the
/// archive's label.
fn total_duration(playback: &PlaybackState) -> Option<Duration> {
    playback.duration.or_else(|| {
        playback
            .current_track
            .as_ref()
            .and_then(|t| parse_duration_label(&t.duration_label))
    })
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Fraction of the current track already played, in `0.0..=1.0`.
fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> f64 {
    match total {
        Some(t) if !t.is_zero() => (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn status_text(app: &App, playback: &PlaybackState, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push(" CURSOR: Follow".to_string());
    } else {
        parts.push(" CURSOR: Free-roam".to_string());
    }

    match (&playback.current_track, playback.status()) {
        (Some(track), status) => {
            let state = match status {
                PlaybackStatus::Playing => "Playing",
                _ => "Paused",
            };
            let time = now_playing_time_text(playback.current_time, total_duration(playback), ui);
            match time {
                Some(time) => parts.push(format!("Track: {} [{}]", track.display(), time)),
                None => parts.push(format!("Track: {}", track.display())),
            }
            if track.is_playable() {
                parts.push(state.to_string());
            } else {
                parts.push("Unavailable".to_string());
            }
        }
        (None, _) => parts.push("Stopped".to_string()),
    }

    parts.push(if playback.is_repeat {
        "Repeat: ON".to_string()
    } else {
        "Repeat: OFF".to_string()
    });
    parts.push(if playback.is_shuffle {
        "Shuffle: ON".to_string()
    } else {
        "Shuffle: OFF".to_string()
    });

    if let Some(err) = &playback.last_error {
        parts.push(format!("Error: {}", err));
    }

    if let Some(source) = &app.source {
        parts.push(format!("Archive: {}", source));
    }

    parts.join(" • ")
}

/// Row text for a track: search hits show their era and the matched
/// characters uppercased.
fn row_text(track: &Track, view: View, query: &str) -> String {
    let text = match view {
        View::Search => track.display(),
        View::Era(_) => track.title.clone(),
    };
    let mut label = match (view, fuzzy_match_positions(&text, query)) {
        (View::Search, Some(positions)) if !positions.is_empty() => {
            let mut rendered = String::new();
            let mut pos_iter = positions.into_iter();
            let mut next_pos = pos_iter.next();

            for (ci, ch) in text.chars().enumerate() {
                if next_pos == Some(ci) {
                    for up in ch.to_uppercase() {
                        rendered.push(up);
                    }
                    next_pos = pos_iter.next();
                } else {
                    rendered.push(ch);
                }
            }
            rendered
        }
        _ => text,
    };

    if !track.duration_label.trim().is_empty() {
        label = format!("{}  ({})", label, track.duration_label.trim());
    }
    if !track.is_playable() {
        label.push_str("  [no audio]");
    }
    label
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn detail_text(track: Option<&Track>) -> String {
    let Some(track) = track else {
        return "No track selected".to_string();
    };
    let or_dash = |s: &str| {
        if s.trim().is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "Title: {}\nEra: {}\nDuration: {}\nId: {}\nLocator: {}",
        track.title,
        or_dash(&track.era),
        or_dash(&track.duration_label),
        track.id,
        if track.is_playable() {
            track.locator.clone()
        } else {
            "(no audio)".to_string()
        }
    )
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    playback: &PlaybackState,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let title = match &app.library.artist {
        Some(artist) => format!(" eraplay · {} ", artist),
        None => " eraplay ".to_string(),
    };
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Era tabs; none is highlighted while search results are shown.
    let era_names: Vec<String> = app.library.eras.iter().map(|e| e.name.clone()).collect();
    let active_era = match app.view {
        View::Era(i) => Some(i),
        View::Search => None,
    };
    let tabs = Tabs::new(era_names)
        .block(Block::default().borders(Borders::ALL).title(" eras "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .select(active_era);
    frame.render_widget(tabs, chunks[1]);

    let status_par = Paragraph::new(status_text(app, playback, ui_settings))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[2]);

    // Progress
    let total = total_duration(playback);
    let progress_label = match total {
        Some(t) => format!(
            "{} / {}",
            format_mmss(playback.current_time),
            format_mmss(t)
        ),
        None => format_mmss(playback.current_time),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().cyan())
        .ratio(progress_ratio(playback.current_time, total))
        .label(progress_label);
    frame.render_widget(gauge, chunks[3]);

    // Main list
    {
        let tracks = app.visible_tracks();
        let query = app.search_query.trim();
        let playing_id = playback.current_id();

        // Only build ListItems for the visible window, centred on the cursor.
        let total = tracks.len();
        let list_height = chunks[4].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let mut visible_items: Vec<ListItem> = tracks[start..end]
            .iter()
            .map(|t| {
                let marker = if playing_id == Some(t.id.as_str()) {
                    "♪ "
                } else {
                    "  "
                };
                let item = ListItem::new(format!("{}{}", marker, row_text(t, app.view, query)));
                if t.is_playable() {
                    item
                } else {
                    item.dim()
                }
            })
            .collect();
        if total == 0 {
            let hint = match app.view {
                View::Search if app.search_query.trim().is_empty() => "  type to search",
                _ if !app.has_tracks() => "  no tracks found",
                _ => "  no matches",
            };
            visible_items.push(ListItem::new(hint).dim());
        }

        let section = match app.view {
            View::Search if app.search_mode => format!(" {}_ ", app.section_title()),
            _ => format!(" {} ", app.section_title()),
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(section))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[4], &mut state);
    }

    // Detail popup over the list
    if app.detail_window {
        let popup_area = centered_rect_sized(72, 9, chunks[4]);
        frame.render_widget(Clear, popup_area);

        let selected = app.selected_track();
        let detail = Paragraph::new(detail_text(selected.as_ref()))
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" details (K closes, enter plays alone) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(detail, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[5]);
}
