use super::{default_global_config_path, ConfigError, ConsoleSettings};
use std::path::Path;

pub fn load_settings_from(path: &Path) -> Result<ConsoleSettings, ConfigError> {
    if !path.exists() {
        return Ok(ConsoleSettings::default());
    }
    let settings = ConsoleSettings::from_path(path)?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_global_settings() -> Result<ConsoleSettings, ConfigError> {
    let path = default_global_config_path()?;
    load_settings_from(&path)
}
