use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::LoggingSettings;

/// Environment variable that overrides `logging.filter`.
pub const LOG_ENV: &str = "ERAPLAY_LOG";

fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&settings.filter))
}

/// Install the global `tracing` subscriber.
///
/// The terminal is owned by the UI, so events go to `logging.file` when set
/// and are discarded otherwise.
pub fn init_tracing(settings: &LoggingSettings) -> crate::error::Result<()> {
    let writer = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::sink),
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(())
}
