use super::*;
use crate::library::{Era, Library, Track};
use crate::playback::{LoadToken, MediaError, MediaEvent};

#[derive(Default)]
struct Quiet {
    seeks: Vec<Duration>,
}

impl MediaResource for Quiet {
    fn load(&mut self, _locator: &str, _token: LoadToken) -> Result<(), MediaError> {
        Ok(())
    }
    fn play(&mut self) -> Result<(), MediaError> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        self.seeks.push(position);
        Ok(())
    }
    fn poll_events(&mut self) -> Vec<MediaEvent> {
        Vec::new()
    }
}

fn t(era: &str, title: &str) -> Track {
    Track {
        id: format!("{}/{}", era.to_lowercase(), title.to_lowercase()),
        title: title.into(),
        duration_label: String::new(),
        locator: format!("/music/{}/{}.flac", era, title),
        era: era.into(),
    }
}

fn setup() -> (App, PlaybackController<Quiet>, config::Settings, EventLoopState) {
    let library = Library {
        artist: Some("Someone".into()),
        eras: vec![
            Era {
                name: "Early".into(),
                tracks: vec![t("Early", "One"), t("Early", "Two"), t("Early", "Three")],
            },
            Era {
                name: "Late".into(),
                tracks: vec![t("Late", "Four")],
            },
        ],
    };
    (
        App::new(library),
        PlaybackController::new(Quiet::default()),
        config::Settings::default(),
        EventLoopState::default(),
    )
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn current(c: &PlaybackController<Quiet>) -> Option<&str> {
    c.state().current_id()
}

#[test]
fn enter_plays_selection_with_visible_era_as_queue() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Char('j')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);

    assert_eq!(current(&c), Some("early/two"));
    assert_eq!(c.state().queue.len(), 3);
    assert!(c.is_playing());
    assert!(app.follow_playback);

    // Browsing another era does not change the queue.
    handle_key_event(press(KeyCode::Char(']')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('l')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(current(&c), Some("early/three"));
    handle_key_event(press(KeyCode::Char('l')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(current(&c), Some("early/one"));
    handle_key_event(press(KeyCode::Char('h')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(current(&c), Some("early/three"));
}

#[test]
fn enter_in_details_plays_track_alone() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Char('K')), &settings, &mut app, &mut c, &mut st);
    assert!(app.detail_window);

    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);
    assert!(!app.detail_window);
    assert_eq!(current(&c), Some("early/one"));
    assert_eq!(c.state().queue.len(), 1);

    handle_key_event(press(KeyCode::Char('l')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(current(&c), Some("early/one"));
}

#[test]
fn space_toggles_pause_and_resume() {
    let (mut app, mut c, settings, mut st) = setup();
    // Nothing current: play/pause starts the selection.
    handle_key_event(press(KeyCode::Char(' ')), &settings, &mut app, &mut c, &mut st);
    assert!(c.is_playing());
    assert_eq!(current(&c), Some("early/one"));

    handle_key_event(press(KeyCode::Char('p')), &settings, &mut app, &mut c, &mut st);
    assert!(!c.is_playing());
    assert_eq!(c.state().status(), PlaybackStatus::Paused);

    handle_key_event(press(KeyCode::Char(' ')), &settings, &mut app, &mut c, &mut st);
    assert!(c.is_playing());
    assert_eq!(current(&c), Some("early/one"));
}

#[test]
fn stop_rewinds_and_keeps_track() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('L')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(c.state().current_time, Duration::from_secs(5));

    handle_key_event(press(KeyCode::Char('x')), &settings, &mut app, &mut c, &mut st);
    assert!(!c.is_playing());
    assert_eq!(c.state().current_time, Duration::ZERO);
    assert_eq!(current(&c), Some("early/one"));
}

#[test]
fn gg_and_g_jump_to_ends() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Char('G')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(app.selected, 2);
    assert!(!app.follow_playback);

    handle_key_event(press(KeyCode::Char('g')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(app.selected, 2);
    handle_key_event(press(KeyCode::Char('g')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(app.selected, 0);

    // An unrelated key cancels the pending prefix.
    handle_key_event(press(KeyCode::Char('G')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('g')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('s')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('g')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(app.selected, 2);
}

#[test]
fn search_enter_plays_results_as_queue() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Char('/')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('e')), &settings, &mut app, &mut c, &mut st);
    // "q" is typed into the query, not treated as quit.
    assert!(!handle_key_event(press(KeyCode::Char('q')), &settings, &mut app, &mut c, &mut st));
    handle_key_event(press(KeyCode::Backspace), &settings, &mut app, &mut c, &mut st);
    assert_eq!(app.search_query, "e");

    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);
    assert!(!app.search_mode);
    let ids: Vec<&str> = c.state().queue.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["early/one", "early/two", "early/three", "late/four"]);
    assert_eq!(current(&c), Some("early/one"));

    handle_key_event(press(KeyCode::Esc), &settings, &mut app, &mut c, &mut st);
    assert_eq!(app.view, View::Era(0));
}

#[test]
fn toggles_flip_controller_modes() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Char('s')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('r')), &settings, &mut app, &mut c, &mut st);
    assert!(c.state().is_shuffle);
    assert!(c.state().is_repeat);
    handle_key_event(press(KeyCode::Char('r')), &settings, &mut app, &mut c, &mut st);
    assert!(!c.state().is_repeat);
}

#[test]
fn quit_key_and_command_request_shutdown() {
    let (mut app, mut c, settings, mut st) = setup();
    assert!(handle_key_event(press(KeyCode::Char('q')), &settings, &mut app, &mut c, &mut st));
    assert!(handle_control_cmd(ControlCmd::Quit, &mut app, &mut c));
    assert!(!handle_control_cmd(ControlCmd::Next, &mut app, &mut c));
}

#[test]
fn mpris_seek_is_relative_and_clamped() {
    let (mut app, mut c, _settings, _st) = setup();
    // Nothing playing: ignored.
    handle_control_cmd(ControlCmd::Seek(3_000_000), &mut app, &mut c);
    assert!(c.media().seeks.is_empty());

    handle_control_cmd(ControlCmd::Play, &mut app, &mut c);
    handle_control_cmd(ControlCmd::Seek(3_000_000), &mut app, &mut c);
    assert_eq!(c.state().current_time, Duration::from_secs(3));

    handle_control_cmd(ControlCmd::Seek(-10_000_000), &mut app, &mut c);
    assert_eq!(c.state().current_time, Duration::ZERO);
    assert_eq!(
        c.media().seeks,
        vec![Duration::from_secs(3), Duration::ZERO]
    );
}

#[test]
fn mpris_pause_then_play_resumes_same_track() {
    let (mut app, mut c, _settings, _st) = setup();
    app.next();
    handle_control_cmd(ControlCmd::Play, &mut app, &mut c);
    assert_eq!(current(&c), Some("early/two"));

    handle_control_cmd(ControlCmd::Pause, &mut app, &mut c);
    app.next();
    handle_control_cmd(ControlCmd::Play, &mut app, &mut c);
    assert!(c.is_playing());
    assert_eq!(current(&c), Some("early/two"));
}

#[test]
fn queue_key_adopts_visible_list() {
    let (mut app, mut c, settings, mut st) = setup();
    app.next();
    handle_key_event(press(KeyCode::Char('K')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);
    assert_eq!(c.state().queue.len(), 1);

    handle_key_event(press(KeyCode::Char('Q')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(c.state().queue.len(), 3);
    assert!(c.is_playing());
    assert_eq!(current(&c), Some("early/two"));

    handle_key_event(press(KeyCode::Char('l')), &settings, &mut app, &mut c, &mut st);
    assert_eq!(current(&c), Some("early/three"));
}

#[test]
fn queue_key_on_another_era_stops_playback() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char(']')), &settings, &mut app, &mut c, &mut st);
    handle_key_event(press(KeyCode::Char('Q')), &settings, &mut app, &mut c, &mut st);

    assert!(c.current_track().is_none());
    assert!(!c.is_playing());
    let ids: Vec<&str> = c.state().queue.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["late/four"]);
}

#[test]
fn queue_key_ignores_empty_list() {
    let (mut app, mut c, settings, mut st) = setup();
    handle_key_event(press(KeyCode::Enter), &settings, &mut app, &mut c, &mut st);
    app.enter_search_mode();
    app.exit_search_mode();
    handle_key_event(press(KeyCode::Char('Q')), &settings, &mut app, &mut c, &mut st);

    assert_eq!(c.state().queue.len(), 3);
    assert!(c.is_playing());
}
