use nxgroup::config::{
    default_global_config_path, load_global_settings, save_settings, save_settings_to,
    ClientSettings, ConfigError, BASE_URL_ENV, DEFAULT_BASE_URL,
};
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn config_module_save_then_load_preserves_settings() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested/config.yaml");
    let settings = ClientSettings {
        base_url: "https://repo.example".to_string(),
        request_timeout_ms: 1500,
        state_root: Some(dir.path().join("state")),
    };

    save_settings_to(&settings, &path).expect("save settings");
    let loaded = ClientSettings::from_path(&path).expect("load settings");

    assert_eq!(loaded, settings);
    assert_eq!(loaded.request_timeout().as_millis(), 1500);
}

#[test]
fn config_module_refuses_to_save_invalid_settings() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    let settings = ClientSettings {
        base_url: "   ".to_string(),
        ..ClientSettings::default()
    };

    let err = save_settings_to(&settings, &path).expect_err("blank base url");
    assert!(matches!(err, ConfigError::Settings(_)));
    assert!(!path.exists());
}

#[test]
fn config_module_reports_parse_errors_with_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "base_url: [not, a, string]\n").expect("write config");

    let err = ClientSettings::from_path(&path).expect_err("bad yaml");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn config_module_global_load_defaults_state_root_and_applies_env_override() {
    let _guard = ENV_LOCK.lock().expect("env lock");
    let home = tempdir().expect("tempdir");
    std::env::set_var("HOME", home.path());
    std::env::remove_var(BASE_URL_ENV);

    let defaults = load_global_settings().expect("load defaults");
    assert_eq!(defaults.base_url, DEFAULT_BASE_URL);
    assert_eq!(defaults.state_root, Some(home.path().join(".nxgroup")));

    let saved_path = save_settings(&ClientSettings {
        base_url: "http://saved.example:8081".to_string(),
        ..ClientSettings::default()
    })
    .expect("save global settings");
    assert_eq!(
        saved_path,
        default_global_config_path().expect("global config path")
    );
    assert_eq!(
        load_global_settings().expect("load saved").base_url,
        "http://saved.example:8081"
    );

    std::env::set_var(BASE_URL_ENV, "https://override.example");
    let overridden = load_global_settings().expect("load with override");
    std::env::remove_var(BASE_URL_ENV);
    assert_eq!(overridden.base_url, "https://override.example");
}
