use crate::config;

/// Load settings, falling back to defaults when the file is unreadable or
/// invalid. Runs before logging is up, so problems go to stderr.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(e) = s.validate() {
                eprintln!("eraplay: {e}; using defaults");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("eraplay: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
