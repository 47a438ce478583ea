use crate::app::command_support::{config_path, load_settings, map_config_err};
use crate::config::init_settings_at;

pub fn cmd_config(args: &[String]) -> Result<String, String> {
    if args.len() != 1 {
        return Err("usage: config <path|show|init>".to_string());
    }

    match args[0].as_str() {
        "path" => Ok(config_path()?.display().to_string()),
        "show" => {
            let settings = load_settings()?;
            serde_yaml::to_string(&settings)
                .map(|body| body.trim_end().to_string())
                .map_err(|e| format!("failed to encode settings: {e}"))
        }
        "init" => {
            let path = config_path()?;
            init_settings_at(&path).map_err(map_config_err)?;
            Ok(format!("config initialized\npath={}", path.display()))
        }
        other => Err(format!("unknown config subcommand `{other}`")),
    }
}
