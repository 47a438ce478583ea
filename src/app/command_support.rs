use crate::catalog::Catalog;
use crate::config::{default_global_config_path, load_settings_from, ConfigError, ConsoleSettings};
use std::path::PathBuf;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn config_path() -> Result<PathBuf, String> {
    default_global_config_path().map_err(map_config_err)
}

pub fn load_settings() -> Result<ConsoleSettings, String> {
    let path = config_path()?;
    load_settings_from(&path).map_err(map_config_err)
}

pub fn load_catalog() -> Result<Catalog, String> {
    Catalog::demo()
}

/// Parses `--flag value` pairs, rejecting flags outside `allowed`.
pub fn parse_flag_pairs<'a>(
    args: &'a [String],
    allowed: &[&str],
) -> Result<Vec<(&'a str, &'a str)>, String> {
    let mut pairs = Vec::new();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        if !allowed.contains(&flag) {
            return Err(format!("unexpected argument `{flag}`"));
        }
        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("{flag} requires a value"))?;
        pairs.push((flag, value.as_str()));
        i += 2;
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn flag_pairs_require_values_and_known_flags() {
        let parsed = args(&["--role", "source", "--search", "east"]);
        let pairs = parse_flag_pairs(&parsed, &["--role", "--search"]).expect("pairs");
        assert_eq!(pairs, vec![("--role", "source"), ("--search", "east")]);

        let missing = args(&["--role"]);
        assert_eq!(
            parse_flag_pairs(&missing, &["--role"]).expect_err("missing value"),
            "--role requires a value"
        );
        let unknown = args(&["--limit", "3"]);
        assert!(parse_flag_pairs(&unknown, &["--role"]).is_err());
    }
}
