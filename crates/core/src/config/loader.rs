use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides. Nesting uses a double underscore so that
/// snake_case keys survive, e.g. `DEBRIDGE_DEBRID__API_TOKEN`.
const ENV_PREFIX: &str = "DEBRIDGE_";

/// Names the config file itself, not a config key.
const CONFIG_PATH_VAR: &str = "CONFIG";

/// Load the TOML file at `path`, then apply `DEBRIDGE_*` overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::from(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&[CONFIG_PATH_VAR])
                .split("__"),
        )
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse TOML without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
