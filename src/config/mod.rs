pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_global_settings, load_settings_from};
pub use paths::{
    default_global_config_path, default_state_root, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use save::{init_settings_at, save_settings_to};
pub use settings::{
    ConsoleSettings, ConsoleUiSettings, OperationSettings, PlaceholderDefaults, ReportSettings,
    MAX_OPERATION_DELAY_MS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn partial_yaml_fills_defaults() {
        let settings: ConsoleSettings = serde_yaml::from_str(
            r#"
operations:
  connection_test_delay_ms: 10
placeholders:
  enabled: false
"#,
        )
        .expect("parse settings");

        assert_eq!(settings.operations.connection_test_delay_ms, 10);
        assert_eq!(settings.operations.report_generation_delay_ms, 1800);
        assert!(!settings.placeholders.enabled);
        assert_eq!(settings.placeholders.host, "0.0.0.0");
        assert_eq!(settings.reports.timezone, "UTC");
        assert_eq!(settings.console.poll_interval_ms, 250);
        settings.validate().expect("valid settings");
    }

    #[test]
    fn validation_rejects_relative_state_root() {
        let settings = ConsoleSettings {
            state_root: Some(PathBuf::from("relative/root")),
            ..ConsoleSettings::default()
        };
        let err = settings.validate().expect_err("relative root rejected");
        assert!(err.to_string().contains("state_root"));
    }

    #[test]
    fn validation_rejects_unknown_timezone_and_slow_delays() {
        let mut settings = ConsoleSettings::default();
        settings.reports.timezone = "Mars/Olympus".to_string();
        assert!(settings.validate().is_err());

        let mut settings = ConsoleSettings::default();
        settings.operations.report_generation_delay_ms = MAX_OPERATION_DELAY_MS + 1;
        assert!(settings.validate().is_err());

        let mut settings = ConsoleSettings::default();
        settings.console.poll_interval_ms = 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn enabled_placeholders_need_values() {
        let mut settings = ConsoleSettings::default();
        settings.placeholders.username = "  ".to_string();
        assert!(settings.validate().is_err());

        settings.placeholders.enabled = false;
        settings.validate().expect("disabled placeholders skip value checks");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().expect("tempdir");
        let settings = load_settings_from(&dir.path().join("config.yaml")).expect("defaults");
        assert_eq!(settings, ConsoleSettings::default());
    }

    #[test]
    fn init_writes_defaults_once() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/config.yaml");
        init_settings_at(&path).expect("init");
        let loaded = load_settings_from(&path).expect("load");
        assert_eq!(loaded, ConsoleSettings::default());
        assert!(matches!(
            init_settings_at(&path),
            Err(ConfigError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        fs::write(&path, "operations: [").expect("write");
        let err = load_settings_from(&path).expect_err("parse error");
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn global_paths_follow_home() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let dir = tempdir().expect("tempdir");
        let previous = std::env::var_os("HOME");
        std::env::set_var("HOME", dir.path());

        let path = default_global_config_path().expect("config path");
        assert_eq!(path, dir.path().join(".replconsole/config.yaml"));
        let settings = ConsoleSettings::default();
        assert_eq!(
            settings.resolve_state_root().expect("state root"),
            dir.path().join(".replconsole")
        );

        match previous {
            Some(value) => std::env::set_var("HOME", value),
            None => std::env::remove_var("HOME"),
        }
    }
}
