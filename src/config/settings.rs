use super::ConfigError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_OPERATION_DELAY_MS: u64 = 60_000;
pub const MIN_POLL_INTERVAL_MS: u64 = 50;
pub const MAX_POLL_INTERVAL_MS: u64 = 5_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConsoleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_root: Option<PathBuf>,
    #[serde(default)]
    pub operations: OperationSettings,
    #[serde(default)]
    pub placeholders: PlaceholderDefaults,
    #[serde(default)]
    pub reports: ReportSettings,
    #[serde(default)]
    pub console: ConsoleUiSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationSettings {
    #[serde(default = "default_connection_test_delay_ms")]
    pub connection_test_delay_ms: u64,
    #[serde(default = "default_report_generation_delay_ms")]
    pub report_generation_delay_ms: u64,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            connection_test_delay_ms: default_connection_test_delay_ms(),
            report_generation_delay_ms: default_report_generation_delay_ms(),
        }
    }
}

impl OperationSettings {
    pub fn connection_test_delay(&self) -> Duration {
        Duration::from_millis(self.connection_test_delay_ms)
    }

    pub fn report_generation_delay(&self) -> Duration {
        Duration::from_millis(self.report_generation_delay_ms)
    }
}

/// Fill-in values for optional endpoint connection fields.
///
/// When `enabled` is false the endpoint wizard requires host and username
/// instead of filling them in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaceholderDefaults {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_placeholder_host")]
    pub host: String,
    #[serde(default = "default_placeholder_username")]
    pub username: String,
}

impl Default for PlaceholderDefaults {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_placeholder_host(),
            username: default_placeholder_username(),
        }
    }
}

impl PlaceholderDefaults {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportSettings {
    #[serde(default = "default_report_timezone")]
    pub timezone: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            timezone: default_report_timezone(),
        }
    }
}

impl ReportSettings {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse::<Tz>().map_err(|_| {
            ConfigError::Settings(format!(
                "`reports.timezone` `{}` is not an IANA timezone id",
                self.timezone
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConsoleUiSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ConsoleUiSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_connection_test_delay_ms() -> u64 {
    1200
}

fn default_report_generation_delay_ms() -> u64 {
    1800
}

fn default_placeholder_host() -> String {
    "0.0.0.0".to_string()
}

fn default_placeholder_username() -> String {
    "user".to_string()
}

fn default_report_timezone() -> String {
    "UTC".to_string()
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl ConsoleSettings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.state_root {
            if !root.is_absolute() {
                return Err(ConfigError::Settings(
                    "`state_root` must be an absolute path".to_string(),
                ));
            }
        }
        if self.operations.connection_test_delay_ms > MAX_OPERATION_DELAY_MS {
            return Err(ConfigError::Settings(format!(
                "`operations.connection_test_delay_ms` must be <= {MAX_OPERATION_DELAY_MS}"
            )));
        }
        if self.operations.report_generation_delay_ms > MAX_OPERATION_DELAY_MS {
            return Err(ConfigError::Settings(format!(
                "`operations.report_generation_delay_ms` must be <= {MAX_OPERATION_DELAY_MS}"
            )));
        }
        if self.placeholders.enabled {
            if self.placeholders.host.trim().is_empty() {
                return Err(ConfigError::Settings(
                    "`placeholders.host` must be non-empty when placeholders are enabled"
                        .to_string(),
                ));
            }
            if self.placeholders.username.trim().is_empty() {
                return Err(ConfigError::Settings(
                    "`placeholders.username` must be non-empty when placeholders are enabled"
                        .to_string(),
                ));
            }
        }
        self.reports.tz()?;
        let poll = self.console.poll_interval_ms;
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&poll) {
            return Err(ConfigError::Settings(format!(
                "`console.poll_interval_ms` must be within {MIN_POLL_INTERVAL_MS}..={MAX_POLL_INTERVAL_MS}"
            )));
        }
        Ok(())
    }

    pub fn resolve_state_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_root {
            Some(root) => Ok(root.clone()),
            None => super::default_state_root(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.console.poll_interval_ms)
    }
}
