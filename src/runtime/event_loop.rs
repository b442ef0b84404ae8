use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, View};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::playback::{MediaResource, PlaybackController, PlaybackStatus};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// What MPRIS was last told, so it is only updated on change.
#[derive(Clone, Debug, PartialEq)]
struct MprisSnapshot {
    track_id: Option<String>,
    status: PlaybackStatus,
    duration: Option<Duration>,
}

impl<M: MediaResource> From<&PlaybackController<M>> for MprisSnapshot {
    fn from(controller: &PlaybackController<M>) -> Self {
        let state = controller.state();
        Self {
            track_id: state.current_id().map(str::to_string),
            status: state.status(),
            duration: state.duration,
        }
    }
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    last_mpris: Option<MprisSnapshot>,
}

/// Main terminal event loop: polls the media, keeps the cursor on the playing
/// track, draws, and dispatches MPRIS commands and keys. Returns `Ok(())` when
/// shutdown is requested.
#[allow(clippy::too_many_arguments)]
pub fn run<M: MediaResource>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<M>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> crate::error::Result<()> {
    let tick = Duration::from_millis(settings.ui.tick_ms);

    loop {
        controller.poll_media();

        // Follow now-playing, including auto-advance.
        if app.follow_playback && !app.search_mode {
            if let Some(id) = controller.state().current_id() {
                app.select_track(id);
            }
        }

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        let snapshot = MprisSnapshot::from(&*controller);
        if state.last_mpris.as_ref() != Some(&snapshot) {
            update_mpris(mpris, controller.state());
            state.last_mpris = Some(snapshot);
        }

        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                controller.state(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, controller) {
                return Ok(());
            }
        }

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Play the row under the cursor with the visible list as its queue.
fn play_selected<M: MediaResource>(app: &mut App, controller: &mut PlaybackController<M>) {
    let Some(track) = app.selected_track() else {
        return;
    };
    app.follow_playback_on();
    controller.play_track(track, Some(app.visible_tracks()));
}

/// Shift the current position by `offset_micros`, clamped at zero.
fn seek_by<M: MediaResource>(controller: &mut PlaybackController<M>, offset_micros: i64) {
    if controller.current_track().is_none() {
        return;
    }
    let now = controller.state().current_time;
    let delta = Duration::from_micros(offset_micros.unsigned_abs());
    let target = if offset_micros < 0 {
        now.saturating_sub(delta)
    } else {
        now.saturating_add(delta)
    };
    controller.set_audio_time(target);
}

/// Apply an MPRIS (or key-mapped) command. Returns `true` on quit.
pub(crate) fn handle_control_cmd<M: MediaResource>(
    cmd: ControlCmd,
    app: &mut App,
    controller: &mut PlaybackController<M>,
) -> bool {
    debug!(?cmd, "control command");
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => {
            if controller.current_track().is_some() {
                controller.resume();
            } else {
                play_selected(app, controller);
            }
        }
        ControlCmd::Pause => controller.pause_track(),
        ControlCmd::PlayPause => {
            if controller.is_playing() {
                controller.pause_track();
            } else if controller.current_track().is_some() {
                controller.resume();
            } else {
                play_selected(app, controller);
            }
        }
        ControlCmd::Stop => controller.stop_track(),
        ControlCmd::Next => controller.next_track(),
        ControlCmd::Prev => controller.prev_track(),
        ControlCmd::Seek(offset) => seek_by(controller, offset),
    }
    false
}

/// Handle one key press. Returns `true` when the user asked to quit.
pub(crate) fn handle_key_event<M: MediaResource>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<M>,
    state: &mut EventLoopState,
) -> bool {
    if app.search_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.next();
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.prev();
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_search_char(c);
                }
            }
            KeyCode::Enter => {
                app.exit_search_mode();
                play_selected(app, controller);
            }
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => {
            if app.detail_window {
                app.toggle_detail_window();
            } else if app.view == View::Search {
                app.clear_search();
            }
        }
        KeyCode::Char('s') => controller.toggle_shuffle(),
        KeyCode::Char('r') => controller.toggle_repeat(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char(']') => {
            app.follow_playback_off();
            app.next_era();
        }
        KeyCode::Char('[') => {
            app.follow_playback_off();
            app.prev_era();
        }
        KeyCode::Enter => {
            if app.detail_window {
                // From the details popup the track plays on its own.
                if let Some(track) = app.selected_track() {
                    app.toggle_detail_window();
                    app.follow_playback_on();
                    controller.play_track(track, None);
                }
            } else {
                let selected_is_playing = controller.is_playing()
                    && app
                        .selected_track()
                        .is_some_and(|t| controller.state().current_id() == Some(t.id.as_str()));
                if !selected_is_playing {
                    play_selected(app, controller);
                }
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            handle_control_cmd(ControlCmd::PlayPause, app, controller);
        }
        KeyCode::Char('x') => {
            handle_control_cmd(ControlCmd::Stop, app, controller);
        }
        KeyCode::Char('l') => {
            handle_control_cmd(ControlCmd::Next, app, controller);
        }
        KeyCode::Char('h') => {
            handle_control_cmd(ControlCmd::Prev, app, controller);
        }
        KeyCode::Char('L') => {
            let micros = settings.controls.scrub_seconds.saturating_mul(1_000_000);
            seek_by(controller, micros.min(i64::MAX as u64) as i64);
        }
        KeyCode::Char('H') => {
            let micros = settings.controls.scrub_seconds.saturating_mul(1_000_000);
            seek_by(controller, -(micros.min(i64::MAX as u64) as i64));
        }
        KeyCode::Char('K') => app.toggle_detail_window(),
        KeyCode::Char('Q') => {
            // The visible list becomes the queue; playback stops if it no
            // longer holds the current track.
            let tracks = app.visible_tracks();
            if !tracks.is_empty() {
                controller.replace_queue(tracks);
            }
        }
        _ => {}
    }

    false
}

#[cfg(test)]
mod tests;
