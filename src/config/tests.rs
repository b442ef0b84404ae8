use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_eraplay_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ERAPLAY_CONFIG_PATH", "/tmp/eraplay-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/eraplay-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("eraplay")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("eraplay")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat = true

[audio]
volume = 0.5

[controls]
scrub_seconds = 9

[ui]
follow_playback = false
header_text = "hello"
tick_ms = 40
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "

[library]
catalog = "/srv/archive/catalog.toml"
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false
loose_era_name = "Loose"

[logging]
filter = "eraplay=debug"
file = "/tmp/eraplay.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ERAPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ERAPLAY__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert!(s.playback.repeat);
    assert_eq!(s.audio.volume, 0.5);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.tick_ms, 40);
    assert_eq!(s.ui.now_playing_time_fields.len(), 2);
    assert!(matches!(s.ui.now_playing_time_fields[0], TimeField::Elapsed));
    assert!(matches!(s.ui.now_playing_time_fields[1], TimeField::Remaining));
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert_eq!(
        s.library.catalog.as_deref(),
        Some(std::path::Path::new("/srv/archive/catalog.toml"))
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.loose_era_name, "Loose");
    assert_eq!(s.logging.filter, "eraplay=debug");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/eraplay.log"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[controls]
scrub_seconds = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ERAPLAY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("ERAPLAY__CONTROLS__SCRUB_SECONDS", "2");

    let s = Settings::load().unwrap();
    assert_eq!(s.controls.scrub_seconds, 2);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "ERAPLAY_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.ui.tick_ms, UiSettings::default().tick_ms);
    assert!(!s.playback.shuffle);
    assert!(!s.playback.repeat);
    assert_eq!(s.library.loose_era_name, "Singles");
}

#[test]
fn validate_rejects_zero_tick_and_bad_volume() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.ui.tick_ms = 0;
    assert!(matches!(
        s.validate(),
        Err(crate::error::Error::InvalidConfig(_))
    ));

    s.ui.tick_ms = 100;
    s.audio.volume = 3.0;
    assert!(s.validate().is_err());
}
