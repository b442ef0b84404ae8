use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::config::resolve_config_path;
use crate::mpris::ControlCmd;
use crate::playback::{PlaybackController, RodioMedia};

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> crate::error::Result<()> {
    let settings = settings::load_settings();
    logging::init_tracing(&settings.logging)?;
    info!(config = ?resolve_config_path(), "starting eraplay");

    let source = startup::archive_source(env::args().nth(1), &settings.library);
    let library = startup::load_library(&source, &settings.library)?;

    let media = RodioMedia::open(&settings.audio)?;
    let mut controller = PlaybackController::new(media);
    startup::apply_playback_defaults(&mut controller, &settings);

    let mut app = App::new(library);
    app.follow_playback = settings.ui.follow_playback;
    app.set_source(source.display().to_string());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.stop_track();
    info!("eraplay exiting");
    run_result
}
